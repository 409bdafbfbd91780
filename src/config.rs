use std::env;
use std::path::PathBuf;

use once_cell::sync::OnceCell;

use crate::parlay::StandardParlayPricer;
use crate::session_store;

static CONFIG: OnceCell<EngineConfig> = OnceCell::new();

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub min_bet: f64,
    pub session_namespace: String,
    pub parlay_step: f64,
    pub parlay_exponent: f64,
    pub parlay_bonus_cap: f64,
    pub safe_slip_cost: f64,
    pub session_db: Option<PathBuf>,
    pub demo_balance: f64,
    pub default_stake: f64,
    pub demo_streak: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let pricer = StandardParlayPricer::default();
        Self {
            min_bet: 1.0,
            session_namespace: "prediction".to_string(),
            parlay_step: pricer.bonus_step,
            parlay_exponent: pricer.bonus_exponent,
            parlay_bonus_cap: pricer.bonus_cap,
            safe_slip_cost: 0.0,
            session_db: session_store::default_db_path(),
            demo_balance: 1000.0,
            default_stake: 10.0,
            demo_streak: 0,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        let session_namespace = env::var("COURTSIDE_SESSION_NAMESPACE")
            .ok()
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty())
            .unwrap_or(d.session_namespace);
        let session_db = env::var("COURTSIDE_SESSION_DB")
            .ok()
            .filter(|val| !val.trim().is_empty())
            .map(PathBuf::from)
            .or(d.session_db);
        Self {
            min_bet: env_f64("COURTSIDE_MIN_BET", d.min_bet, 0.01, 10_000.0),
            session_namespace,
            parlay_step: env_f64("COURTSIDE_PARLAY_STEP", d.parlay_step, 0.0, 1.0),
            parlay_exponent: env_f64("COURTSIDE_PARLAY_EXPONENT", d.parlay_exponent, 1.0, 3.0),
            parlay_bonus_cap: env_f64("COURTSIDE_PARLAY_BONUS_CAP", d.parlay_bonus_cap, 1.0, 10.0),
            safe_slip_cost: env_f64("COURTSIDE_SAFE_SLIP_COST", d.safe_slip_cost, 0.0, 10_000.0),
            session_db,
            demo_balance: env_f64("COURTSIDE_DEMO_BALANCE", d.demo_balance, 0.0, 1_000_000.0),
            default_stake: env_f64("COURTSIDE_DEFAULT_STAKE", d.default_stake, 0.0, 10_000.0),
            demo_streak: env::var("COURTSIDE_DEMO_STREAK")
                .ok()
                .and_then(|val| val.trim().parse::<u32>().ok())
                .unwrap_or(d.demo_streak)
                .min(100),
        }
    }

    /// Process-wide config, read from the environment on first use.
    pub fn global() -> &'static EngineConfig {
        CONFIG.get_or_init(EngineConfig::from_env)
    }

    pub fn parlay_pricer(&self) -> StandardParlayPricer {
        StandardParlayPricer {
            bonus_step: self.parlay_step,
            bonus_exponent: self.parlay_exponent,
            bonus_cap: self.parlay_bonus_cap,
        }
    }
}

fn env_f64(key: &str, default: f64, min: f64, max: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|val| val.trim().parse::<f64>().ok())
        .filter(|val| val.is_finite())
        .unwrap_or(default)
        .clamp(min, max)
}
