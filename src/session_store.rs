use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use crate::prediction::PredictionOptions;

const CACHE_DIR: &str = "courtside";
const DB_FILE: &str = "sessions.sqlite";

/// Where in-progress predictions live between edits, keyed by match id.
///
/// Entries are written on every accepted mutation and removed when the
/// prediction is cleared, dropped from the slip, or submitted.
pub trait PredictionSessionStore {
    fn get(&self, match_id: &str) -> Result<Option<PredictionOptions>>;
    fn set(&mut self, match_id: &str, prediction: &PredictionOptions) -> Result<()>;
    fn delete(&mut self, match_id: &str) -> Result<()>;
    fn match_ids(&self) -> Result<Vec<String>>;
}

pub fn session_key(namespace: &str, match_id: &str) -> String {
    format!("{namespace}_{match_id}")
}

#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    namespace: String,
    entries: HashMap<String, String>,
}

impl MemorySessionStore {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            entries: HashMap::new(),
        }
    }

    pub fn raw(&self, match_id: &str) -> Option<&str> {
        self.entries
            .get(&session_key(&self.namespace, match_id))
            .map(String::as_str)
    }
}

impl PredictionSessionStore for MemorySessionStore {
    fn get(&self, match_id: &str) -> Result<Option<PredictionOptions>> {
        let Some(raw) = self.raw(match_id) else {
            return Ok(None);
        };
        let prediction = serde_json::from_str(raw).context("decode stored prediction")?;
        Ok(Some(prediction))
    }

    fn set(&mut self, match_id: &str, prediction: &PredictionOptions) -> Result<()> {
        let json = serde_json::to_string(prediction).context("serialize prediction")?;
        self.entries.insert(session_key(&self.namespace, match_id), json);
        Ok(())
    }

    fn delete(&mut self, match_id: &str) -> Result<()> {
        self.entries.remove(&session_key(&self.namespace, match_id));
        Ok(())
    }

    fn match_ids(&self) -> Result<Vec<String>> {
        let prefix = session_key(&self.namespace, "");
        let mut ids: Vec<String> = self
            .entries
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix).map(str::to_string))
            .collect();
        ids.sort();
        Ok(ids)
    }
}

pub struct SqliteSessionStore {
    namespace: String,
    conn: Connection,
}

impl SqliteSessionStore {
    pub fn open(path: &Path, namespace: impl Into<String>) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = Connection::open(path)
            .with_context(|| format!("open session db {}", path.display()))?;
        init_schema(&conn)?;
        Ok(Self {
            namespace: namespace.into(),
            conn,
        })
    }

    pub fn in_memory(namespace: impl Into<String>) -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory session db")?;
        init_schema(&conn)?;
        Ok(Self {
            namespace: namespace.into(),
            conn,
        })
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS prediction_sessions (
            session_key TEXT PRIMARY KEY,
            payload TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .context("init session schema")?;
    Ok(())
}

impl PredictionSessionStore for SqliteSessionStore {
    fn get(&self, match_id: &str) -> Result<Option<PredictionOptions>> {
        let key = session_key(&self.namespace, match_id);
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM prediction_sessions WHERE session_key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("read session {key}"))?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        let prediction = serde_json::from_str(&raw).context("decode stored prediction")?;
        Ok(Some(prediction))
    }

    fn set(&mut self, match_id: &str, prediction: &PredictionOptions) -> Result<()> {
        let key = session_key(&self.namespace, match_id);
        let json = serde_json::to_string(prediction).context("serialize prediction")?;
        self.conn
            .execute(
                r#"
                INSERT INTO prediction_sessions (session_key, payload, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(session_key) DO UPDATE SET
                    payload = excluded.payload,
                    updated_at = excluded.updated_at
                "#,
                params![key, json, Utc::now().to_rfc3339()],
            )
            .with_context(|| format!("write session {key}"))?;
        Ok(())
    }

    fn delete(&mut self, match_id: &str) -> Result<()> {
        let key = session_key(&self.namespace, match_id);
        self.conn
            .execute(
                "DELETE FROM prediction_sessions WHERE session_key = ?1",
                params![key],
            )
            .with_context(|| format!("delete session {key}"))?;
        Ok(())
    }

    fn match_ids(&self) -> Result<Vec<String>> {
        let prefix = session_key(&self.namespace, "");
        let mut stmt = self
            .conn
            .prepare("SELECT session_key FROM prediction_sessions ORDER BY session_key")
            .context("prepare session listing")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .context("list sessions")?
            .collect::<rusqlite::Result<Vec<String>>>()
            .context("read session keys")?;
        Ok(keys
            .into_iter()
            .filter_map(|key| key.strip_prefix(&prefix).map(str::to_string))
            .collect())
    }
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(DB_FILE))
}
