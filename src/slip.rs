use std::fmt;

use serde::{Deserialize, Serialize};

use crate::multiplier::{current_multiplier, round_cents};
use crate::parlay::{MIN_PARLAY_LEGS, ParlayLeg};
use crate::prediction::{MatchDetails, PredictionOptions};

#[derive(Debug, Clone, PartialEq)]
pub enum SlipError {
    EmptySlip,
    NoWinner(String),
    ParlayNeedsLegs(usize),
    StakeBelowMinimum { match_id: String, min_bet: f64 },
    NothingStaked,
    InsufficientBalance { needed: f64, available: f64 },
    SafeSlipUnavailable,
}

impl fmt::Display for SlipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlipError::EmptySlip => write!(f, "Your slip is empty"),
            SlipError::NoWinner(match_id) => write!(f, "Pick a winner for match {match_id} first"),
            SlipError::ParlayNeedsLegs(min) => write!(f, "A parlay needs at least {min} selections"),
            SlipError::StakeBelowMinimum { match_id, min_bet } => {
                write!(f, "Minimum bet is {min_bet:.2} (match {match_id})")
            }
            SlipError::NothingStaked => write!(f, "Enter a stake greater than zero"),
            SlipError::InsufficientBalance { needed, available } => write!(
                f,
                "Insufficient balance: stake {needed:.2}, available {available:.2}"
            ),
            SlipError::SafeSlipUnavailable => write!(f, "Safe slip is not available for this slip"),
        }
    }
}

impl std::error::Error for SlipError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlipItem {
    pub match_id: String,
    #[serde(rename = "match")]
    pub match_details: MatchDetails,
    pub prediction: PredictionOptions,
    pub bet_amount: f64,
    pub multiplier: f64,
    pub potential_winnings: f64,
}

impl SlipItem {
    /// Prices `prediction` at the moment it is added; later odds moves do not
    /// change an item already on the slip.
    pub fn new(
        match_details: MatchDetails,
        prediction: PredictionOptions,
        bet_amount: f64,
    ) -> Result<Self, SlipError> {
        if prediction.winner.is_none() {
            return Err(SlipError::NoWinner(match_details.id.clone()));
        }
        let multiplier = current_multiplier(&prediction, &match_details);
        let mut item = Self {
            match_id: match_details.id.clone(),
            match_details,
            prediction,
            bet_amount: 0.0,
            multiplier,
            potential_winnings: 0.0,
        };
        item.set_stake(bet_amount);
        Ok(item)
    }

    pub fn set_stake(&mut self, amount: f64) {
        self.bet_amount = round_cents(amount.max(0.0));
        self.potential_winnings = round_cents(self.bet_amount * self.multiplier);
    }

    pub fn predicted_odds(&self) -> f64 {
        self.prediction
            .winner
            .map(|side| self.match_details.base_odds(side))
            .unwrap_or(0.0)
    }
}

/// Which mode a safe-slip power-up is armed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafeSlip {
    #[default]
    Off,
    Singles,
    Parlay,
}

#[derive(Debug, Clone, Default)]
pub struct Slip {
    items: Vec<SlipItem>,
    parlay_mode: bool,
    safe_slip: SafeSlip,
}

impl Slip {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[SlipItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, match_id: &str) -> Option<&SlipItem> {
        self.items.iter().find(|item| item.match_id == match_id)
    }

    /// Adds the item, replacing any earlier pick on the same match.
    pub fn upsert(&mut self, item: SlipItem) {
        match self.items.iter_mut().find(|i| i.match_id == item.match_id) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    pub fn remove(&mut self, match_id: &str) -> Option<SlipItem> {
        let idx = self.items.iter().position(|item| item.match_id == match_id)?;
        let removed = self.items.remove(idx);
        if self.items.len() < MIN_PARLAY_LEGS && self.parlay_mode {
            self.parlay_mode = false;
            if self.safe_slip == SafeSlip::Parlay {
                self.safe_slip = SafeSlip::Off;
            }
        }
        if self.items.is_empty() {
            self.safe_slip = SafeSlip::Off;
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.parlay_mode = false;
        self.safe_slip = SafeSlip::Off;
    }

    pub fn set_stake(&mut self, match_id: &str, amount: f64) -> bool {
        match self.items.iter_mut().find(|item| item.match_id == match_id) {
            Some(item) => {
                item.set_stake(amount);
                true
            }
            None => false,
        }
    }

    pub fn parlay_mode(&self) -> bool {
        self.parlay_mode
    }

    pub fn can_parlay(&self) -> bool {
        self.items.len() >= MIN_PARLAY_LEGS
    }

    /// Switching modes disarms a safe slip armed for the other mode.
    pub fn set_parlay_mode(&mut self, on: bool) -> Result<(), SlipError> {
        if on && !self.can_parlay() {
            return Err(SlipError::ParlayNeedsLegs(MIN_PARLAY_LEGS));
        }
        if on != self.parlay_mode {
            self.safe_slip = SafeSlip::Off;
        }
        self.parlay_mode = on;
        Ok(())
    }

    pub fn safe_slip(&self) -> SafeSlip {
        self.safe_slip
    }

    pub fn safe_slip_eligible(&self, has_power_up: bool) -> bool {
        has_power_up && !self.items.is_empty() && (!self.parlay_mode || self.can_parlay())
    }

    pub fn disarm_safe_slip(&mut self) {
        self.safe_slip = SafeSlip::Off;
    }

    pub fn toggle_safe_slip(&mut self, has_power_up: bool) -> Result<SafeSlip, SlipError> {
        if self.safe_slip != SafeSlip::Off {
            self.disarm_safe_slip();
            return Ok(SafeSlip::Off);
        }
        if !self.safe_slip_eligible(has_power_up) {
            return Err(SlipError::SafeSlipUnavailable);
        }
        self.safe_slip = if self.parlay_mode {
            SafeSlip::Parlay
        } else {
            SafeSlip::Singles
        };
        Ok(self.safe_slip)
    }

    pub fn total_stake(&self) -> f64 {
        round_cents(self.items.iter().map(|item| item.bet_amount).sum())
    }

    /// Sum of each item's own payout, for individual mode.
    pub fn individual_winnings(&self) -> f64 {
        round_cents(self.items.iter().map(|item| item.potential_winnings).sum())
    }

    pub fn validate_individual(&self, balance: f64, min_bet: f64) -> Result<(), SlipError> {
        if self.items.is_empty() {
            return Err(SlipError::EmptySlip);
        }
        if let Some(item) = self.items.iter().find(|item| item.bet_amount < min_bet) {
            return Err(SlipError::StakeBelowMinimum {
                match_id: item.match_id.clone(),
                min_bet,
            });
        }
        let total = self.total_stake();
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

    pub fn parlay_legs(&self) -> Vec<ParlayLeg> {
        self.items
            .iter()
            .map(|item| ParlayLeg {
                match_id: item.match_id.clone(),
                odds: item.predicted_odds(),
                stake: item.bet_amount,
            })
            .collect()
    }
}

/// A slip written out as plain data, as the pricing tools read it.
#[derive(Debug, Clone, Deserialize)]
pub struct SlipCase {
    #[serde(default)]
    pub balance: f64,
    #[serde(default = "default_min_bet")]
    pub min_bet: f64,
    #[serde(default)]
    pub user_streak: u32,
    #[serde(default)]
    pub parlay: bool,
    pub items: Vec<SlipCaseItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlipCaseItem {
    #[serde(rename = "match")]
    pub match_details: MatchDetails,
    pub prediction: PredictionOptions,
    pub stake: f64,
}

fn default_min_bet() -> f64 {
    1.0
}

impl SlipCase {
    pub fn build(&self) -> Result<Slip, SlipError> {
        let mut slip = Slip::new();
        for item in &self.items {
            slip.upsert(SlipItem::new(
                item.match_details.clone(),
                item.prediction.clone(),
                item.stake,
            )?);
        }
        if self.parlay {
            slip.set_parlay_mode(true)?;
        }
        Ok(slip)
    }
}
