use serde::{Deserialize, Serialize};

use crate::multiplier::round_cents;
use crate::slip::SlipError;

pub const MIN_PARLAY_LEGS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParlayLeg {
    pub match_id: String,
    /// Base odds of the side the leg predicts to win.
    pub odds: f64,
    pub stake: f64,
}

/// What a pricer hands back for a set of legs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParlayQuote {
    pub base_odds: f64,
    pub bonus_multiplier: f64,
    pub streak_booster: f64,
    pub final_odds: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParlayCalculation {
    pub base_odds: f64,
    pub bonus_multiplier: f64,
    pub streak_booster: f64,
    pub final_odds: f64,
    pub potential_winnings: f64,
}

/// Combination rule for parlay odds.
pub trait ParlayPricer {
    fn quote(&self, legs: &[ParlayLeg], user_streak: u32) -> ParlayQuote;
}

/// Compounds leg odds, then applies a leg-count bonus curve and a streak booster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardParlayPricer {
    pub bonus_step: f64,
    pub bonus_exponent: f64,
    pub bonus_cap: f64,
}

impl Default for StandardParlayPricer {
    fn default() -> Self {
        Self {
            bonus_step: 0.05,
            bonus_exponent: 1.5,
            bonus_cap: 2.0,
        }
    }
}

impl StandardParlayPricer {
    /// Grows faster than linearly with every leg past the first, up to `bonus_cap`.
    pub fn bonus_multiplier(&self, legs: usize) -> f64 {
        if legs < MIN_PARLAY_LEGS {
            return 1.0;
        }
        let extra = (legs - 1) as f64;
        let curve = 1.0 + self.bonus_step * extra.powf(self.bonus_exponent);
        round_cents(curve.min(self.bonus_cap).max(1.0))
    }
}

impl ParlayPricer for StandardParlayPricer {
    fn quote(&self, legs: &[ParlayLeg], user_streak: u32) -> ParlayQuote {
        let base_odds = round_cents(legs.iter().map(|leg| leg.odds).product::<f64>());
        let bonus_multiplier = self.bonus_multiplier(legs.len());
        let streak_booster = streak_booster(user_streak);
        ParlayQuote {
            base_odds,
            bonus_multiplier,
            streak_booster,
            final_odds: round_cents(base_odds * bonus_multiplier * streak_booster),
        }
    }
}

pub fn streak_booster(user_streak: u32) -> f64 {
    match user_streak {
        10.. => 1.25,
        5..=9 => 1.10,
        3..=4 => 1.05,
        _ => 1.0,
    }
}

pub fn parlay_stake(legs: &[ParlayLeg]) -> f64 {
    round_cents(legs.iter().map(|leg| leg.stake).sum())
}

/// Every leg at or above the minimum, and the combined stake affordable.
pub fn validate_parlay_bet(legs: &[ParlayLeg], balance: f64, min_bet: f64) -> Result<(), SlipError> {
    if legs.len() < MIN_PARLAY_LEGS {
        return Err(SlipError::ParlayNeedsLegs(MIN_PARLAY_LEGS));
    }
    if let Some(leg) = legs.iter().find(|leg| leg.stake < min_bet) {
        return Err(SlipError::StakeBelowMinimum {
            match_id: leg.match_id.clone(),
            min_bet,
        });
    }
    let total = parlay_stake(legs);
    if total <= 0.0 {
        return Err(SlipError::NothingStaked);
    }
    if total > balance {
        return Err(SlipError::InsufficientBalance {
            needed: total,
            available: balance,
        });
    }
    Ok(())
}

/// Reads a snapshot of parlay legs and prices it; never touches the slip.
#[derive(Debug, Clone, Default)]
pub struct ParlayAggregator<P = StandardParlayPricer> {
    pricer: P,
}

impl<P: ParlayPricer> ParlayAggregator<P> {
    pub fn new(pricer: P) -> Self {
        Self { pricer }
    }

    pub fn pricer(&self) -> &P {
        &self.pricer
    }

    pub fn calculate(&self, legs: &[ParlayLeg], user_streak: u32) -> Option<ParlayCalculation> {
        if legs.len() < MIN_PARLAY_LEGS {
            return None;
        }
        let quote = self.pricer.quote(legs, user_streak);
        Some(ParlayCalculation {
            base_odds: quote.base_odds,
            bonus_multiplier: quote.bonus_multiplier,
            streak_booster: quote.streak_booster,
            final_odds: quote.final_odds,
            potential_winnings: round_cents(parlay_stake(legs) * quote.final_odds),
        })
    }

    pub fn validate(&self, legs: &[ParlayLeg], balance: f64, min_bet: f64) -> Result<(), SlipError> {
        validate_parlay_bet(legs, balance, min_bet)
    }
}
