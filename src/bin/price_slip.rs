use std::fs;
use std::path::PathBuf;

use anyhow::Context;

use courtside::codec::{describe, encode};
use courtside::config::EngineConfig;
use courtside::multiplier::{breakdown, max_multiplier};
use courtside::parlay::{ParlayAggregator, parlay_stake};
use courtside::slip::SlipCase;
use courtside::state_machine::stale_fields;

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/slip_case.json"));
    let show_payload = std::env::args().any(|arg| arg == "--json");

    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let case: SlipCase = serde_json::from_str(&raw).context("parse slip case")?;
    let slip = case.build().context("build slip")?;
    let config = EngineConfig::global();
    let aggregator = ParlayAggregator::new(config.parlay_pricer());

    for item in slip.items() {
        let details = &item.match_details;
        let p = &item.prediction;
        let parts = breakdown(p, details.format, item.predicted_odds());
        println!("{} [{}]", details.id, details.format.label());
        println!("  {}", describe(p, details));
        println!(
            "  base {:.2} + bonus {:.2} = {:.2}x (max {:.2}x)",
            parts.base_odds,
            parts.bonus(),
            item.multiplier,
            max_multiplier(p, details)
        );
        println!(
            "  stake {:.2} -> {:.2}",
            item.bet_amount, item.potential_winnings
        );
        let stale = stale_fields(p, details.format);
        if !stale.is_empty() {
            let labels: Vec<String> = stale.iter().map(|s| s.label()).collect();
            println!("  ignored: {}", labels.join(", "));
        }
        if show_payload {
            println!("  {}", serde_json::to_string(&encode(p))?);
        }
    }

    let legs = slip.parlay_legs();
    if slip.parlay_mode() {
        match aggregator.calculate(&legs, case.user_streak) {
            Some(calc) => {
                println!(
                    "Parlay: {:.2} x {:.2} x {:.2} = {:.2}",
                    calc.base_odds, calc.bonus_multiplier, calc.streak_booster, calc.final_odds
                );
                println!(
                    "Stake {:.2} -> {:.2}",
                    parlay_stake(&legs),
                    calc.potential_winnings
                );
            }
            None => println!("Parlay: needs more selections"),
        }
    } else {
        println!(
            "Singles: stake {:.2} -> {:.2}",
            slip.total_stake(),
            slip.individual_winnings()
        );
    }

    let validation = if slip.parlay_mode() {
        aggregator.validate(&legs, case.balance, case.min_bet)
    } else {
        slip.validate_individual(case.balance, case.min_bet)
    };
    match validation {
        Ok(()) => println!("Valid against balance {:.2}", case.balance),
        Err(err) => println!("Blocked: {err}"),
    }

    Ok(())
}
