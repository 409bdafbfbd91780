//! Placing a finished slip through the external collaborators.
//!
//! The engine validates and builds requests; the bet service owns the debit.
//! A failed bet creation aborts the submission. Singles already placed before
//! the failure stand and come back on a partial receipt, so the caller can drop
//! them from the slip. A failed power-up application after the bet exists is
//! reported as a warning and the bet stands.

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::codec::{StructuredPrediction, describe, encode};
use crate::multiplier::round_cents;
use crate::parlay::{MIN_PARLAY_LEGS, ParlayAggregator, ParlayPricer, parlay_stake};
use crate::slip::{SafeSlip, Slip, SlipError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    SafeSlip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleBetRequest {
    pub match_id: String,
    pub bet_amount: f64,
    pub multiplier: f64,
    pub potential_winnings: f64,
    pub prediction: StructuredPrediction,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParlayBetRequest {
    pub predictions: Vec<StructuredPrediction>,
    pub total_stake: f64,
    pub base_odds: f64,
    pub final_odds: f64,
    pub bonus_multiplier: f64,
    pub streak_booster: f64,
    pub is_safe_bet: bool,
    pub safe_bet_cost: f64,
}

pub trait Wallet {
    fn balance(&self) -> f64;
    fn place_bet(&mut self, amount: f64, match_ref: &str, description: &str) -> Result<()>;
}

/// Creates bets and debits the wallet it is handed. Returns the new bet id.
pub trait BetService {
    fn create_single_bet(&mut self, wallet: &mut dyn Wallet, req: &SingleBetRequest) -> Result<String>;
    fn create_parlay_bet(&mut self, wallet: &mut dyn Wallet, req: &ParlayBetRequest) -> Result<String>;
}

pub trait PowerUps {
    fn has_power_up(&self, user_id: &str, kind: PowerUpKind) -> bool;
    fn apply_power_up(&mut self, user_id: &str, kind: PowerUpKind, target_id: &str) -> Result<()>;
}

/// Told when a user's power-up inventory may have changed.
pub trait PowerUpListener {
    fn power_ups_changed(&mut self, user_id: &str);
}

pub struct SubmitContext<'a> {
    pub user_id: &'a str,
    pub bets: &'a mut dyn BetService,
    pub wallet: &'a mut dyn Wallet,
    pub power_ups: &'a mut dyn PowerUps,
    pub listener: Option<&'a mut dyn PowerUpListener>,
    pub min_bet: f64,
    pub safe_slip_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub bet_ids: Vec<String>,
    pub match_ids: Vec<String>,
    pub total_stake: f64,
    pub potential_winnings: f64,
    pub safe_slip_applied: bool,
    pub placed_at: String,
    pub warnings: Vec<String>,
    /// Set when a later bet failed after earlier ones were placed.
    #[serde(default)]
    pub failure: Option<String>,
}

impl Receipt {
    pub fn is_partial(&self) -> bool {
        self.failure.is_some()
    }
}

pub fn single_bet_requests(slip: &Slip) -> Vec<SingleBetRequest> {
    slip.items()
        .iter()
        .map(|item| SingleBetRequest {
            match_id: item.match_id.clone(),
            bet_amount: item.bet_amount,
            multiplier: item.multiplier,
            potential_winnings: item.potential_winnings,
            prediction: encode(&item.prediction),
            description: describe(&item.prediction, &item.match_details),
        })
        .collect()
}

/// Places one bet per slip item, in slip order.
///
/// Fails outright if the first bet cannot be created. A failure after that
/// stops the run and returns a receipt covering only the bets that were
/// placed, with `failure` set. A singles safe slip protects the first item in
/// slip order, which is always placed when any bet is.
pub fn submit_singles(slip: &Slip, ctx: &mut SubmitContext<'_>) -> Result<Receipt> {
    if slip.parlay_mode() {
        return Err(anyhow!("slip is in parlay mode"));
    }
    slip.validate_individual(ctx.wallet.balance(), ctx.min_bet)?;

    let mut bet_ids = Vec::with_capacity(slip.len());
    let mut failure = None;
    for req in single_bet_requests(slip) {
        let placed = ctx
            .bets
            .create_single_bet(&mut *ctx.wallet, &req)
            .with_context(|| format!("place bet on match {}", req.match_id));
        match placed {
            Ok(id) => bet_ids.push(id),
            Err(err) if bet_ids.is_empty() => return Err(err),
            Err(err) => {
                failure = Some(format!("{err:#}"));
                break;
            }
        }
    }

    let placed = &slip.items()[..bet_ids.len()];
    let mut warnings = Vec::new();
    if let Some(err) = &failure {
        warnings.push(format!(
            "[WARN] Only {} of {} bets placed: {err}",
            bet_ids.len(),
            slip.len()
        ));
    }
    let mut safe_slip_applied = false;
    if slip.safe_slip() == SafeSlip::Singles {
        if let Some(target) = bet_ids.first().cloned() {
            safe_slip_applied = apply_safe_slip(ctx, &target, &mut warnings);
        }
    }

    Ok(Receipt {
        bet_ids,
        match_ids: placed.iter().map(|item| item.match_id.clone()).collect(),
        total_stake: round_cents(placed.iter().map(|item| item.bet_amount).sum()),
        potential_winnings: round_cents(placed.iter().map(|item| item.potential_winnings).sum()),
        safe_slip_applied,
        placed_at: Utc::now().to_rfc3339(),
        warnings,
        failure,
    })
}

pub fn parlay_bet_request<P: ParlayPricer>(
    slip: &Slip,
    aggregator: &ParlayAggregator<P>,
    user_streak: u32,
    safe_slip_cost: f64,
) -> Result<ParlayBetRequest, SlipError> {
    let legs = slip.parlay_legs();
    let calc = aggregator
        .calculate(&legs, user_streak)
        .ok_or(SlipError::ParlayNeedsLegs(MIN_PARLAY_LEGS))?;
    let is_safe_bet = slip.safe_slip() == SafeSlip::Parlay;
    Ok(ParlayBetRequest {
        predictions: slip.items().iter().map(|item| encode(&item.prediction)).collect(),
        total_stake: parlay_stake(&legs),
        base_odds: calc.base_odds,
        final_odds: calc.final_odds,
        bonus_multiplier: calc.bonus_multiplier,
        streak_booster: calc.streak_booster,
        is_safe_bet,
        safe_bet_cost: if is_safe_bet { safe_slip_cost } else { 0.0 },
    })
}

pub fn submit_parlay<P: ParlayPricer>(
    slip: &Slip,
    aggregator: &ParlayAggregator<P>,
    user_streak: u32,
    ctx: &mut SubmitContext<'_>,
) -> Result<Receipt> {
    if !slip.parlay_mode() {
        return Err(anyhow!("parlay mode is off"));
    }
    let legs = slip.parlay_legs();
    aggregator.validate(&legs, ctx.wallet.balance(), ctx.min_bet)?;
    let req = parlay_bet_request(slip, aggregator, user_streak, ctx.safe_slip_cost)?;

    let id = ctx
        .bets
        .create_parlay_bet(&mut *ctx.wallet, &req)
        .context("place parlay")?;

    let mut warnings = Vec::new();
    let safe_slip_applied = req.is_safe_bet && apply_safe_slip(ctx, &id, &mut warnings);

    Ok(Receipt {
        bet_ids: vec![id],
        match_ids: legs.iter().map(|leg| leg.match_id.clone()).collect(),
        total_stake: req.total_stake,
        potential_winnings: round_cents(req.total_stake * req.final_odds),
        safe_slip_applied,
        placed_at: Utc::now().to_rfc3339(),
        warnings,
        failure: None,
    })
}

fn apply_safe_slip(ctx: &mut SubmitContext<'_>, target_id: &str, warnings: &mut Vec<String>) -> bool {
    let applied = match ctx
        .power_ups
        .apply_power_up(ctx.user_id, PowerUpKind::SafeSlip, target_id)
    {
        Ok(()) => true,
        Err(err) => {
            warnings.push(format!("[WARN] Bet placed but safe slip was not applied: {err}"));
            false
        }
    };
    if let Some(listener) = ctx.listener.as_mut() {
        listener.power_ups_changed(ctx.user_id);
    }
    applied
}
