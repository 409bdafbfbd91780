use std::collections::{HashMap, VecDeque};

use crate::codec::describe;
use crate::config::EngineConfig;
use crate::multiplier::{current_multiplier, max_multiplier};
use crate::parlay::{ParlayAggregator, ParlayCalculation, ParlayPricer};
use crate::prediction::{MatchDetails, PredictionOptions};
use crate::session_store::PredictionSessionStore;
use crate::slip::{SafeSlip, Slip, SlipError, SlipItem};
use crate::state_machine::{Mutation, apply_mutation};
use crate::submission::Receipt;

const MAX_LOGS: usize = 200;

/// Everything one user's betting session holds between frames.
#[derive(Debug, Clone)]
pub struct BettingState {
    pub matches: Vec<MatchDetails>,
    pub selected: usize,
    pub predictions: HashMap<String, PredictionOptions>,
    // Last inline validation message per match; cleared by the next accepted edit.
    pub rejections: HashMap<String, String>,
    pub slip: Slip,
    pub user_streak: u32,
    pub balance: f64,
    pub safe_slip_owned: bool,
    pub min_bet: f64,
    pub default_stake: f64,
    pub last_receipt: Option<Receipt>,
    pub logs: VecDeque<String>,
}

impl Default for BettingState {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl BettingState {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            matches: Vec::with_capacity(16),
            selected: 0,
            predictions: HashMap::new(),
            rejections: HashMap::new(),
            slip: Slip::new(),
            user_streak: 0,
            balance: 0.0,
            safe_slip_owned: false,
            min_bet: config.min_bet,
            default_stake: config.default_stake,
            last_receipt: None,
            logs: VecDeque::with_capacity(MAX_LOGS),
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn match_by_id(&self, match_id: &str) -> Option<&MatchDetails> {
        self.matches.iter().find(|m| m.id == match_id)
    }

    pub fn selected_match(&self) -> Option<&MatchDetails> {
        self.matches.get(self.selected)
    }

    pub fn selected_match_id(&self) -> Option<String> {
        self.selected_match().map(|m| m.id.clone())
    }

    pub fn select_next(&mut self) {
        if !self.matches.is_empty() {
            self.selected = (self.selected + 1).min(self.matches.len() - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        if self.matches.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.matches.len() {
            self.selected = self.matches.len() - 1;
        }
    }

    pub fn prediction(&self, match_id: &str) -> PredictionOptions {
        self.predictions.get(match_id).cloned().unwrap_or_default()
    }

    pub fn multiplier(&self, match_id: &str) -> f64 {
        match (self.match_by_id(match_id), self.predictions.get(match_id)) {
            (Some(details), Some(p)) => current_multiplier(p, details),
            _ => 0.0,
        }
    }

    pub fn max_multiplier(&self, match_id: &str) -> f64 {
        match (self.match_by_id(match_id), self.predictions.get(match_id)) {
            (Some(details), Some(p)) => max_multiplier(p, details),
            _ => 0.0,
        }
    }

    /// Only priced while parlay mode is on.
    pub fn parlay_calculation<P: ParlayPricer>(
        &self,
        aggregator: &ParlayAggregator<P>,
    ) -> Option<ParlayCalculation> {
        if !self.slip.parlay_mode() {
            return None;
        }
        aggregator.calculate(&self.slip.parlay_legs(), self.user_streak)
    }

    /// The message that blocks placement, if any.
    pub fn slip_validation<P: ParlayPricer>(
        &self,
        aggregator: &ParlayAggregator<P>,
    ) -> Result<(), SlipError> {
        if self.slip.parlay_mode() {
            aggregator.validate(&self.slip.parlay_legs(), self.balance, self.min_bet)
        } else {
            self.slip.validate_individual(self.balance, self.min_bet)
        }
    }

    /// Reloads predictions left in the store by an earlier session.
    pub fn restore_sessions(&mut self, store: &dyn PredictionSessionStore) {
        let ids = match store.match_ids() {
            Ok(ids) => ids,
            Err(err) => {
                self.push_log(format!("[WARN] Session store: {err}"));
                return;
            }
        };
        let mut restored = 0usize;
        for id in ids {
            match store.get(&id) {
                Ok(Some(p)) => {
                    self.predictions.insert(id, p);
                    restored += 1;
                }
                Ok(None) => {}
                Err(err) => self.push_log(format!("[WARN] Session {id}: {err}")),
            }
        }
        if restored > 0 {
            self.push_log(format!("[INFO] Restored {restored} open predictions"));
        }
    }

    fn forget_prediction(&mut self, store: &mut dyn PredictionSessionStore, match_id: &str) {
        self.predictions.remove(match_id);
        self.rejections.remove(match_id);
        if let Err(err) = store.delete(match_id) {
            self.push_log(format!("[WARN] Session store: {err}"));
        }
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetMatches(Vec<MatchDetails>),
    UpsertMatch(MatchDetails),
    Mutate { match_id: String, mutation: Mutation },
    ClearPrediction { match_id: String },
    AddToSlip { match_id: String, stake: f64 },
    RemoveFromSlip { match_id: String },
    SetStake { match_id: String, stake: f64 },
    SetParlayMode(bool),
    ToggleSafeSlip,
    SetBalance(f64),
    SetStreak(u32),
    SetSafeSlipOwned(bool),
    Submitted(Receipt),
    Log(String),
}

/// Applies one change and everything derived from it before returning, so a
/// reader never sees a price that lags the field it depends on.
pub fn apply_delta(state: &mut BettingState, store: &mut dyn PredictionSessionStore, delta: Delta) {
    match delta {
        Delta::SetMatches(matches) => {
            let selected_id = state.selected_match_id();
            state.matches = matches;
            if let Some(id) = selected_id {
                if let Some(idx) = state.matches.iter().position(|m| m.id == id) {
                    state.selected = idx;
                }
            }
            state.clamp_selection();
            let count = state.matches.len();
            state.push_log(format!("[INFO] Loaded {count} matches"));
        }
        Delta::UpsertMatch(details) => {
            match state.matches.iter_mut().find(|m| m.id == details.id) {
                Some(existing) => *existing = details,
                None => state.matches.push(details),
            }
        }
        Delta::Mutate { match_id, mutation } => {
            let Some(format) = state.match_by_id(&match_id).map(|m| m.format) else {
                state.push_log(format!("[WARN] Unknown match {match_id}"));
                return;
            };
            if mutation == Mutation::ClearAll {
                state.forget_prediction(store, &match_id);
                return;
            }
            let current = state.prediction(&match_id);
            match apply_mutation(&current, format, mutation) {
                Ok(next) => {
                    if let Err(err) = store.set(&match_id, &next) {
                        state.push_log(format!("[WARN] Session store: {err}"));
                    }
                    state.rejections.remove(&match_id);
                    state.predictions.insert(match_id, next);
                }
                Err(rejection) => {
                    state.rejections.insert(match_id, rejection.to_string());
                }
            }
        }
        Delta::ClearPrediction { match_id } => state.forget_prediction(store, &match_id),
        Delta::AddToSlip { match_id, stake } => {
            let Some(details) = state.match_by_id(&match_id).cloned() else {
                state.push_log(format!("[WARN] Unknown match {match_id}"));
                return;
            };
            let prediction = state.prediction(&match_id);
            match SlipItem::new(details, prediction, stake) {
                Ok(item) => {
                    let summary = describe(&item.prediction, &item.match_details);
                    let multiplier = item.multiplier;
                    state.slip.upsert(item);
                    state.push_log(format!("[INFO] Slip: {summary} @ {multiplier:.2}x"));
                }
                Err(err) => {
                    state.rejections.insert(match_id, err.to_string());
                }
            }
        }
        Delta::RemoveFromSlip { match_id } => {
            let was_parlay = state.slip.parlay_mode();
            if state.slip.remove(&match_id).is_some() {
                state.forget_prediction(store, &match_id);
                state.push_log(format!("[INFO] Removed {match_id} from slip"));
                if was_parlay && !state.slip.parlay_mode() {
                    state.push_log("[INFO] Parlay mode off: fewer than 2 selections");
                }
            }
        }
        Delta::SetStake { match_id, stake } => {
            if !state.slip.set_stake(&match_id, stake) {
                state.push_log(format!("[WARN] {match_id} is not on the slip"));
            }
        }
        Delta::SetParlayMode(on) => {
            let armed = state.slip.safe_slip();
            match state.slip.set_parlay_mode(on) {
                Ok(()) => {
                    if armed != SafeSlip::Off && state.slip.safe_slip() == SafeSlip::Off {
                        state.push_log("[INFO] Safe slip disarmed by mode change");
                    }
                }
                Err(err) => state.push_log(format!("[WARN] {err}")),
            }
        }
        Delta::ToggleSafeSlip => match state.slip.toggle_safe_slip(state.safe_slip_owned) {
            Ok(SafeSlip::Off) => state.push_log("[INFO] Safe slip off"),
            Ok(mode) => state.push_log(format!("[INFO] Safe slip armed ({mode:?})")),
            Err(err) => state.push_log(format!("[WARN] {err}")),
        },
        Delta::SetBalance(balance) => state.balance = balance,
        Delta::SetStreak(streak) => state.user_streak = streak,
        Delta::SetSafeSlipOwned(owned) => {
            state.safe_slip_owned = owned;
            if !owned && state.slip.safe_slip() != SafeSlip::Off {
                state.slip.disarm_safe_slip();
                state.push_log("[INFO] Safe slip disarmed: no power-up left");
            }
        }
        Delta::Submitted(receipt) => {
            for match_id in &receipt.match_ids {
                state.slip.remove(match_id);
                state.forget_prediction(store, match_id);
            }
            state.push_log(format!(
                "[INFO] Placed {} bet(s), stake {:.2}, to win {:.2}",
                receipt.bet_ids.len(),
                receipt.total_stake,
                receipt.potential_winnings
            ));
            for warning in &receipt.warnings {
                state.push_log(warning.clone());
            }
            state.last_receipt = Some(receipt);
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
