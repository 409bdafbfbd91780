//! In-process stand-ins for the wallet, bet and power-up services, used by the
//! terminal and the pricing tools.

use std::collections::HashMap;

use anyhow::{Result, bail};
use chrono::Utc;

use crate::multiplier::round_cents;
use crate::submission::{
    BetService, ParlayBetRequest, PowerUpKind, PowerUps, SingleBetRequest, Wallet,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub amount: f64,
    pub match_ref: String,
    pub description: String,
    pub at: String,
}

#[derive(Debug, Clone, Default)]
pub struct PaperWallet {
    balance: f64,
    pub transactions: Vec<Transaction>,
}

impl PaperWallet {
    pub fn new(balance: f64) -> Self {
        Self {
            balance: round_cents(balance.max(0.0)),
            transactions: Vec::new(),
        }
    }
}

impl Wallet for PaperWallet {
    fn balance(&self) -> f64 {
        self.balance
    }

    fn place_bet(&mut self, amount: f64, match_ref: &str, description: &str) -> Result<()> {
        if amount <= 0.0 {
            bail!("stake must be positive");
        }
        if amount > self.balance {
            bail!(
                "insufficient balance: {:.2} requested, {:.2} available",
                amount,
                self.balance
            );
        }
        self.balance = round_cents(self.balance - amount);
        self.transactions.push(Transaction {
            amount: -amount,
            match_ref: match_ref.to_string(),
            description: description.to_string(),
            at: Utc::now().to_rfc3339(),
        });
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum PlacedBet {
    Single(SingleBetRequest),
    Parlay(ParlayBetRequest),
}

#[derive(Debug, Clone, Default)]
pub struct PaperBook {
    pub bets: Vec<(String, PlacedBet)>,
    next_id: u64,
}

impl PaperBook {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

impl BetService for PaperBook {
    fn create_single_bet(&mut self, wallet: &mut dyn Wallet, req: &SingleBetRequest) -> Result<String> {
        wallet.place_bet(req.bet_amount, &req.match_id, &req.description)?;
        let id = self.next_id("bet");
        self.bets.push((id.clone(), PlacedBet::Single(req.clone())));
        Ok(id)
    }

    fn create_parlay_bet(&mut self, wallet: &mut dyn Wallet, req: &ParlayBetRequest) -> Result<String> {
        let description = format!("Parlay x{} @ {:.2}", req.predictions.len(), req.final_odds);
        wallet.place_bet(req.total_stake, "parlay", &description)?;
        let id = self.next_id("parlay");
        self.bets.push((id.clone(), PlacedBet::Parlay(req.clone())));
        Ok(id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PaperPowerUps {
    inventory: HashMap<(String, PowerUpKind), u32>,
    pub applied: Vec<(String, PowerUpKind, String)>,
}

impl PaperPowerUps {
    pub fn grant(&mut self, user_id: &str, kind: PowerUpKind, count: u32) {
        *self.inventory.entry((user_id.to_string(), kind)).or_insert(0) += count;
    }

    pub fn count(&self, user_id: &str, kind: PowerUpKind) -> u32 {
        self.inventory
            .get(&(user_id.to_string(), kind))
            .copied()
            .unwrap_or(0)
    }
}

impl PowerUps for PaperPowerUps {
    fn has_power_up(&self, user_id: &str, kind: PowerUpKind) -> bool {
        self.count(user_id, kind) > 0
    }

    fn apply_power_up(&mut self, user_id: &str, kind: PowerUpKind, target_id: &str) -> Result<()> {
        let Some(left) = self.inventory.get_mut(&(user_id.to_string(), kind)) else {
            bail!("no {kind:?} power-up available");
        };
        if *left == 0 {
            bail!("no {kind:?} power-up available");
        }
        *left -= 1;
        self.applied
            .push((user_id.to_string(), kind, target_id.to_string()));
        Ok(())
    }
}
