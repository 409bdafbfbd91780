use crate::prediction::{
    MatchDetails, MatchFormat, PredictionOptions, ResultShape, ScorePair, Side, TIEBREAK_SETS,
    result_shape,
};
use crate::state_machine::{
    effective_result, implied_set_winner, set_score_counts, super_tiebreak_counts,
    tiebreak_counts,
};

pub const BONUS_STEP: f64 = 0.2;
const TIEBREAK_CAP_STEPS: u32 = 2;

/// Bonus counts per group; each step is worth `BONUS_STEP`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MultiplierBreakdown {
    pub base_odds: f64,
    pub result_steps: u32,
    pub set_winner_steps: u32,
    pub set_score_steps: u32,
    pub tiebreak_steps: u32,
    pub super_tiebreak_steps: u32,
}

impl MultiplierBreakdown {
    pub fn bonus_steps(&self) -> u32 {
        self.result_steps
            + self.set_winner_steps
            + self.set_score_steps
            + self.tiebreak_steps
            + self.super_tiebreak_steps
    }

    pub fn bonus(&self) -> f64 {
        steps_to_bonus(self.bonus_steps())
    }

    pub fn total(&self) -> f64 {
        if self.base_odds <= 0.0 {
            return 0.0;
        }
        round_cents(self.base_odds + self.bonus())
    }
}

pub fn steps_to_bonus(steps: u32) -> f64 {
    round_cents(steps as f64 * BONUS_STEP)
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// What the filled fields of `p` are currently worth on top of `base_odds`.
///
/// Only fields consistent with the current winner and result are counted, so
/// detail left behind by an earlier result never inflates the price.
pub fn breakdown(p: &PredictionOptions, format: MatchFormat, base_odds: f64) -> MultiplierBreakdown {
    if p.winner.is_none() {
        return MultiplierBreakdown::default();
    }
    let mut out = MultiplierBreakdown {
        base_odds,
        ..MultiplierBreakdown::default()
    };
    let Some(result) = effective_result(p, format) else {
        return out;
    };
    out.result_steps = 1;

    let played = result.total() as usize;
    match result_shape(result) {
        ResultShape::StraightSets => {
            out.set_score_steps = count_set_scores(p, format, 1..=played);
        }
        ResultShape::Decider => {
            // Set 2 follows from set 1, so the pair earns a single step.
            out.set_winner_steps = u32::from(implied_set_winner(p, format, 1).is_some());
            out.set_score_steps = count_set_scores(p, format, 1..=2);
        }
        ResultShape::Extended => {
            out.set_winner_steps = capped_set_winners(p, result);
        }
    }

    let tiebreaks = (1..=TIEBREAK_SETS)
        .filter(|set| tiebreak_counts(p, format, *set))
        .count() as u32;
    out.tiebreak_steps = tiebreaks.min(TIEBREAK_CAP_STEPS);
    out.super_tiebreak_steps = u32::from(super_tiebreak_counts(p, format));
    out
}

fn count_set_scores(
    p: &PredictionOptions,
    format: MatchFormat,
    sets: std::ops::RangeInclusive<usize>,
) -> u32 {
    sets.filter(|set| set_score_counts(p, format, *set)).count() as u32
}

fn capped_set_winners(p: &PredictionOptions, result: ScorePair) -> u32 {
    let played = result.total() as usize;
    [Side::A, Side::B]
        .into_iter()
        .map(|side| {
            let held = p
                .set_winners
                .iter()
                .take(played)
                .filter(|w| **w == Some(side))
                .count() as u32;
            held.min(u32::from(result.for_side(side)))
        })
        .sum()
}

/// Multiplier shown for `p` on `details`, priced off the predicted winner.
pub fn current_multiplier(p: &PredictionOptions, details: &MatchDetails) -> f64 {
    let Some(winner) = p.winner else {
        return 0.0;
    };
    breakdown(p, details.format, details.base_odds(winner)).total()
}

/// Ceiling for each group given only the chosen winner and result.
pub fn max_breakdown(p: &PredictionOptions, format: MatchFormat, base_odds: f64) -> MultiplierBreakdown {
    if p.winner.is_none() {
        return MultiplierBreakdown::default();
    }
    let result = effective_result(p, format);
    MultiplierBreakdown {
        base_odds,
        result_steps: 1,
        set_winner_steps: max_set_winner_steps(result),
        set_score_steps: max_set_score_steps(result),
        tiebreak_steps: max_tiebreak_steps(result),
        super_tiebreak_steps: max_super_tiebreak_steps(result, format),
    }
}

pub fn max_multiplier(p: &PredictionOptions, details: &MatchDetails) -> f64 {
    let Some(winner) = p.winner else {
        return 0.0;
    };
    max_breakdown(p, details.format, details.base_odds(winner)).total()
}

pub fn max_result_bonus(p: &PredictionOptions) -> f64 {
    if p.winner.is_some() { BONUS_STEP } else { 0.0 }
}

pub fn max_set_winner_bonus(result: Option<ScorePair>) -> f64 {
    steps_to_bonus(max_set_winner_steps(result))
}

pub fn max_set_score_bonus(result: Option<ScorePair>) -> f64 {
    steps_to_bonus(max_set_score_steps(result))
}

pub fn max_tiebreak_bonus(result: Option<ScorePair>) -> f64 {
    steps_to_bonus(max_tiebreak_steps(result))
}

pub fn max_super_tiebreak_bonus(result: Option<ScorePair>, format: MatchFormat) -> f64 {
    steps_to_bonus(max_super_tiebreak_steps(result, format))
}

fn max_set_winner_steps(result: Option<ScorePair>) -> u32 {
    match result.map(|r| (r, result_shape(r))) {
        Some((_, ResultShape::Decider)) => 1,
        Some((r, ResultShape::Extended)) => u32::from(r.total()),
        _ => 0,
    }
}

fn max_set_score_steps(result: Option<ScorePair>) -> u32 {
    match result.map(|r| (r, result_shape(r))) {
        Some((r, ResultShape::StraightSets)) => u32::from(r.total()),
        Some((_, ResultShape::Decider)) => 2,
        _ => 0,
    }
}

fn max_tiebreak_steps(result: Option<ScorePair>) -> u32 {
    match result.map(result_shape) {
        Some(ResultShape::StraightSets | ResultShape::Decider) => TIEBREAK_CAP_STEPS,
        _ => 0,
    }
}

fn max_super_tiebreak_steps(result: Option<ScorePair>, format: MatchFormat) -> u32 {
    let decider = result.map(result_shape) == Some(ResultShape::Decider);
    u32::from(decider && format.has_super_tiebreak())
}
