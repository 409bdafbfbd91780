use std::env;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{Duration as ChronoDuration, Utc};
use rand::Rng;

use crate::multiplier::round_cents;
use crate::prediction::{MatchDetails, MatchFormat, PlayerSide};
use crate::state::Delta;

const MIN_ODDS: f64 = 1.05;
const MAX_ODDS: f64 = 9.0;

/// Emits a demo schedule, then nudges one match's prices every few seconds.
pub fn spawn_demo_provider(tx: Sender<Delta>) {
    thread::spawn(move || {
        let mut rng = rand::thread_rng();
        let jitter_interval = Duration::from_secs(
            env::var("COURTSIDE_ODDS_JITTER_SECS")
                .ok()
                .and_then(|val| val.parse::<u64>().ok())
                .unwrap_or(6)
                .max(2),
        );

        let mut matches = seed_matches();
        if tx.send(Delta::SetMatches(matches.clone())).is_err() {
            return;
        }
        let mut last_jitter = Instant::now();

        loop {
            thread::sleep(Duration::from_millis(500));
            if last_jitter.elapsed() < jitter_interval || matches.is_empty() {
                continue;
            }
            last_jitter = Instant::now();

            let idx = rng.gen_range(0..matches.len());
            let details = &mut matches[idx];
            jitter_odds(details, &mut rng);
            let msg = format!(
                "[INFO] Odds moved: {} {:.2} / {} {:.2}",
                details.side_a.name, details.side_a.base_odds, details.side_b.name, details.side_b.base_odds
            );
            if tx.send(Delta::UpsertMatch(details.clone())).is_err() {
                return;
            }
            if tx.send(Delta::Log(msg)).is_err() {
                return;
            }
        }
    });
}

// Moves the favourite's price a little and rebalances the other side around
// a fixed overround.
fn jitter_odds(details: &mut MatchDetails, rng: &mut impl Rng) {
    const OVERROUND: f64 = 1.05;
    let p_a = 1.0 / details.side_a.base_odds;
    let p_b = 1.0 / details.side_b.base_odds;
    let share_a = (p_a / (p_a + p_b) + rng.gen_range(-0.03..0.03)).clamp(0.08, 0.92);
    details.side_a.base_odds = price(share_a * OVERROUND);
    details.side_b.base_odds = price((1.0 - share_a) * OVERROUND);
}

fn price(implied: f64) -> f64 {
    round_cents((1.0 / implied).clamp(MIN_ODDS, MAX_ODDS))
}

fn player(name: &str, base_odds: f64, ntrp_rating: Option<f32>) -> PlayerSide {
    PlayerSide {
        name: name.to_string(),
        base_odds,
        ntrp_rating,
        team_name: None,
    }
}

pub fn seed_matches() -> Vec<MatchDetails> {
    let now = Utc::now();
    let at = |hours: i64| Some((now + ChronoDuration::hours(hours)).to_rfc3339());
    vec![
        MatchDetails {
            id: "m-1001".to_string(),
            side_a: player("Jannik Sinner", 1.45, None),
            side_b: player("Carlos Alcaraz", 2.70, None),
            round: "Final".to_string(),
            surface: "Hard".to_string(),
            format: MatchFormat::BestOfFive,
            is_doubles: false,
            scheduled_at: at(2),
        },
        MatchDetails {
            id: "m-1002".to_string(),
            side_a: player("Iga Swiatek", 1.30, None),
            side_b: player("Coco Gauff", 3.40, None),
            round: "Semifinal".to_string(),
            surface: "Clay".to_string(),
            format: MatchFormat::BestOfThree,
            is_doubles: false,
            scheduled_at: at(3),
        },
        MatchDetails {
            id: "m-1003".to_string(),
            side_a: player("Alexander Zverev", 1.80, None),
            side_b: player("Daniil Medvedev", 1.95, None),
            round: "Quarterfinal".to_string(),
            surface: "Grass".to_string(),
            format: MatchFormat::BestOfFive,
            is_doubles: false,
            scheduled_at: at(5),
        },
        MatchDetails {
            id: "m-1004".to_string(),
            side_a: player("Marco Rossi", 1.65, Some(4.0)),
            side_b: player("Tom Becker", 2.15, Some(4.0)),
            round: "Club ladder R3".to_string(),
            surface: "Clay".to_string(),
            format: MatchFormat::BestOfThreeSuperTiebreak,
            is_doubles: false,
            scheduled_at: at(20),
        },
        MatchDetails {
            id: "m-1005".to_string(),
            side_a: PlayerSide {
                name: "Anna Keller & Lea Brandt".to_string(),
                base_odds: 1.90,
                ntrp_rating: Some(3.5),
                team_name: Some("TC Nord".to_string()),
            },
            side_b: PlayerSide {
                name: "Mia Lang & Sara Vogel".to_string(),
                base_odds: 1.85,
                ntrp_rating: Some(3.5),
                team_name: Some("TC Süd".to_string()),
            },
            round: "League day 4".to_string(),
            surface: "Hard".to_string(),
            format: MatchFormat::BestOfThreeSuperTiebreak,
            is_doubles: true,
            scheduled_at: at(26),
        },
    ]
}
