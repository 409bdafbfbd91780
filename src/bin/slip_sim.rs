use std::env;

use rand::Rng;
use rand::seq::SliceRandom;
use rayon::prelude::*;

use courtside::config::EngineConfig;
use courtside::demo_feed::seed_matches;
use courtside::multiplier::{current_multiplier, max_multiplier};
use courtside::parlay::{ParlayAggregator, ParlayCalculation};
use courtside::prediction::{MatchDetails, PredictionOptions, Side};
use courtside::slip::{Slip, SlipItem};
use courtside::state_machine::{Mutation, apply_mutation, section_choices, visible_sections};

const STAKE: f64 = 10.0;
const EDITS_PER_PREDICTION: usize = 8;

struct SimOutcome {
    calc: Option<ParlayCalculation>,
    above_max: usize,
}

// Random walk through the builder: every edit is drawn from what the builder
// would offer at that point, and rejected edits are simply skipped.
fn random_prediction(details: &MatchDetails, rng: &mut impl Rng) -> PredictionOptions {
    let side = if rng.gen_bool(0.5) { Side::A } else { Side::B };
    let mut p = PredictionOptions::default();
    if let Ok(next) = apply_mutation(&p, details.format, Mutation::SelectWinner(side)) {
        p = next;
    }
    for _ in 0..EDITS_PER_PREDICTION {
        let sections: Vec<_> = visible_sections(&p, details.format).into_iter().collect();
        let Some(section) = sections.choose(rng).copied() else {
            break;
        };
        let choices = section_choices(&p, details.format, section);
        let Some(mutation) = choices.choose(rng).cloned() else {
            continue;
        };
        if let Ok(next) = apply_mutation(&p, details.format, mutation) {
            p = next;
        }
    }
    p
}

fn simulate(matches: &[MatchDetails], aggregator: &ParlayAggregator, streak: u32) -> SimOutcome {
    let mut rng = rand::thread_rng();
    let legs = rng.gen_range(2..=matches.len());
    let mut picked: Vec<&MatchDetails> = matches.iter().collect();
    picked.shuffle(&mut rng);

    let mut slip = Slip::new();
    let mut above_max = 0;
    for details in picked.into_iter().take(legs) {
        let p = random_prediction(details, &mut rng);
        if current_multiplier(&p, details) > max_multiplier(&p, details) {
            above_max += 1;
        }
        if let Ok(item) = SlipItem::new(details.clone(), p, STAKE) {
            slip.upsert(item);
        }
    }
    let calc = slip
        .set_parlay_mode(true)
        .ok()
        .and_then(|_| aggregator.calculate(&slip.parlay_legs(), streak));
    SimOutcome { calc, above_max }
}

fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() - 1) as f64 * pct).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let runs = env::args()
        .nth(1)
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(10_000)
        .max(1);
    let config = EngineConfig::global();
    let aggregator = ParlayAggregator::new(config.parlay_pricer());
    let matches = seed_matches();
    if matches.len() < 2 {
        anyhow::bail!("need at least two matches to build a parlay");
    }

    let outcomes: Vec<SimOutcome> = (0..runs)
        .into_par_iter()
        .map(|_| simulate(&matches, &aggregator, config.demo_streak))
        .collect();

    let above_max: usize = outcomes.iter().map(|o| o.above_max).sum();
    let mut finals: Vec<f64> = outcomes
        .iter()
        .filter_map(|o| o.calc.map(|c| c.final_odds))
        .collect();
    finals.sort_by(|a, b| a.total_cmp(b));
    let capped = outcomes
        .iter()
        .filter_map(|o| o.calc)
        .filter(|c| c.bonus_multiplier >= config.parlay_bonus_cap)
        .count();

    println!("Slips: {runs} ({} priced)", finals.len());
    println!(
        "Final odds: min {:.2}  p50 {:.2}  p90 {:.2}  max {:.2}",
        percentile(&finals, 0.0),
        percentile(&finals, 0.5),
        percentile(&finals, 0.9),
        percentile(&finals, 1.0)
    );
    println!("Bonus at cap: {capped}");
    println!("Predictions priced above their ceiling: {above_max}");

    Ok(())
}
