use anyhow::{Result, bail};

use courtside::paper::{PaperBook, PaperPowerUps, PaperWallet, PlacedBet};
use courtside::parlay::{ParlayAggregator, StandardParlayPricer};
use courtside::prediction::{MatchDetails, MatchFormat, PlayerSide, PredictionOptions, ScorePair, Side};
use courtside::slip::{SafeSlip, Slip, SlipItem};
use courtside::submission::{
    BetService, ParlayBetRequest, PowerUpKind, PowerUpListener, PowerUps, SingleBetRequest,
    SubmitContext, Wallet, parlay_bet_request, single_bet_requests, submit_parlay, submit_singles,
};

const USER: &str = "u-1";

fn details(id: &str, odds_a: f64) -> MatchDetails {
    MatchDetails {
        id: id.to_string(),
        side_a: PlayerSide {
            name: "Jannik Sinner".to_string(),
            base_odds: odds_a,
            ntrp_rating: None,
            team_name: None,
        },
        side_b: PlayerSide {
            name: "Carlos Alcaraz".to_string(),
            base_odds: 2.4,
            ntrp_rating: None,
            team_name: None,
        },
        round: "Final".to_string(),
        surface: "Hard".to_string(),
        format: MatchFormat::BestOfThree,
        is_doubles: false,
        scheduled_at: None,
    }
}

fn slip_with(items: &[(&str, f64, f64)]) -> Slip {
    let mut slip = Slip::new();
    for (id, odds, stake) in items {
        let prediction = PredictionOptions {
            winner: Some(Side::A),
            match_result: Some(ScorePair::new(2, 1)),
            ..PredictionOptions::default()
        };
        slip.upsert(SlipItem::new(details(id, *odds), prediction, *stake).expect("winner is set"));
    }
    slip
}

#[derive(Default)]
struct CountingListener {
    calls: Vec<String>,
}

impl PowerUpListener for CountingListener {
    fn power_ups_changed(&mut self, user_id: &str) {
        self.calls.push(user_id.to_string());
    }
}

struct DownBetService;

impl BetService for DownBetService {
    fn create_single_bet(&mut self, _wallet: &mut dyn Wallet, _req: &SingleBetRequest) -> Result<String> {
        bail!("bet service unavailable")
    }

    fn create_parlay_bet(&mut self, _wallet: &mut dyn Wallet, _req: &ParlayBetRequest) -> Result<String> {
        bail!("bet service unavailable")
    }
}

/// Places bets through a paper book until call `fail_on`, which errors.
struct FailsOnCall {
    book: PaperBook,
    calls: usize,
    fail_on: usize,
}

impl FailsOnCall {
    fn new(fail_on: usize) -> Self {
        Self {
            book: PaperBook::new(),
            calls: 0,
            fail_on,
        }
    }
}

impl BetService for FailsOnCall {
    fn create_single_bet(&mut self, wallet: &mut dyn Wallet, req: &SingleBetRequest) -> Result<String> {
        self.calls += 1;
        if self.calls == self.fail_on {
            bail!("bet service unavailable");
        }
        self.book.create_single_bet(wallet, req)
    }

    fn create_parlay_bet(&mut self, wallet: &mut dyn Wallet, req: &ParlayBetRequest) -> Result<String> {
        self.calls += 1;
        if self.calls == self.fail_on {
            bail!("bet service unavailable");
        }
        self.book.create_parlay_bet(wallet, req)
    }
}

struct BrokenPowerUps;

impl PowerUps for BrokenPowerUps {
    fn has_power_up(&self, _user_id: &str, _kind: PowerUpKind) -> bool {
        true
    }

    fn apply_power_up(&mut self, _user_id: &str, _kind: PowerUpKind, _target_id: &str) -> Result<()> {
        bail!("power-up service timed out")
    }
}

fn aggregator() -> ParlayAggregator {
    ParlayAggregator::new(StandardParlayPricer::default())
}

#[test]
fn single_requests_carry_price_and_payload() {
    let slip = slip_with(&[("m-1", 1.8, 10.0)]);
    let reqs = single_bet_requests(&slip);
    assert_eq!(reqs.len(), 1);
    let req = &reqs[0];
    assert_eq!(req.match_id, "m-1");
    assert!((req.multiplier - 2.0).abs() < 1e-9);
    assert!((req.potential_winnings - 20.0).abs() < 1e-9);
    assert_eq!(req.prediction.winner, Some(Side::A));
    assert_eq!(req.description, "Winner: Sinner • Result: 2-1");

    let value = serde_json::to_value(req).expect("serializable");
    assert!(value.get("betAmount").is_some());
    assert!(value.get("potentialWinnings").is_some());
}

#[test]
fn singles_debit_wallet_and_apply_safe_slip() {
    let mut slip = slip_with(&[("m-1", 1.8, 10.0), ("m-2", 1.5, 5.0)]);
    slip.toggle_safe_slip(true).expect("power-up owned");

    let mut book = PaperBook::new();
    let mut wallet = PaperWallet::new(100.0);
    let mut power_ups = PaperPowerUps::default();
    power_ups.grant(USER, PowerUpKind::SafeSlip, 1);
    let mut listener = CountingListener::default();

    let receipt = {
        let mut ctx = SubmitContext {
            user_id: USER,
            bets: &mut book,
            wallet: &mut wallet,
            power_ups: &mut power_ups,
            listener: Some(&mut listener),
            min_bet: 1.0,
            safe_slip_cost: 0.0,
        };
        submit_singles(&slip, &mut ctx).expect("placement succeeds")
    };

    assert_eq!(receipt.bet_ids, vec!["bet-1", "bet-2"]);
    assert_eq!(receipt.match_ids, vec!["m-1", "m-2"]);
    assert!(receipt.safe_slip_applied);
    assert!(receipt.warnings.is_empty());
    assert!((wallet.balance() - 85.0).abs() < 1e-9);
    assert_eq!(wallet.transactions.len(), 2);
    assert_eq!(power_ups.count(USER, PowerUpKind::SafeSlip), 0);
    assert_eq!(power_ups.applied[0].2, "bet-1");
    assert_eq!(listener.calls, vec![USER]);
}

#[test]
fn bet_service_failure_aborts_submission() {
    let slip = slip_with(&[("m-1", 1.8, 10.0)]);
    let mut bets = DownBetService;
    let mut wallet = PaperWallet::new(100.0);
    let mut power_ups = PaperPowerUps::default();
    let mut ctx = SubmitContext {
        user_id: USER,
        bets: &mut bets,
        wallet: &mut wallet,
        power_ups: &mut power_ups,
        listener: None,
        min_bet: 1.0,
        safe_slip_cost: 0.0,
    };
    let err = submit_singles(&slip, &mut ctx).expect_err("service is down");
    let msg = format!("{err:#}");
    assert!(msg.contains("m-1"), "{msg}");
    assert!(msg.contains("bet service unavailable"), "{msg}");
    assert!((wallet.balance() - 100.0).abs() < 1e-9);
}

#[test]
fn failure_after_first_bet_returns_partial_receipt() {
    let mut slip = slip_with(&[("m-1", 1.8, 10.0), ("m-2", 1.5, 10.0), ("m-3", 1.6, 10.0)]);
    slip.toggle_safe_slip(true).expect("power-up owned");
    let mut bets = FailsOnCall::new(2);
    let mut wallet = PaperWallet::new(100.0);
    let mut power_ups = PaperPowerUps::default();
    power_ups.grant(USER, PowerUpKind::SafeSlip, 1);

    let receipt = {
        let mut ctx = SubmitContext {
            user_id: USER,
            bets: &mut bets,
            wallet: &mut wallet,
            power_ups: &mut power_ups,
            listener: None,
            min_bet: 1.0,
            safe_slip_cost: 0.0,
        };
        submit_singles(&slip, &mut ctx).expect("first bet stands")
    };

    assert!(receipt.is_partial());
    assert_eq!(receipt.bet_ids, vec!["bet-1"]);
    assert_eq!(receipt.match_ids, vec!["m-1"]);
    assert!((receipt.total_stake - 10.0).abs() < 1e-9);
    assert!((receipt.potential_winnings - 20.0).abs() < 1e-9);
    let failure = receipt.failure.as_deref().unwrap_or_default();
    assert!(failure.contains("m-2"), "{failure}");
    assert!(receipt.warnings.iter().any(|w| w.contains("Only 1 of 3")));
    assert!(receipt.safe_slip_applied);
    assert_eq!(power_ups.applied[0].2, "bet-1");

    // Only the placed bet was charged.
    assert!((wallet.balance() - 90.0).abs() < 1e-9);
    assert_eq!(bets.book.bets.len(), 1);
}

#[test]
fn retry_after_partial_receipt_does_not_charge_twice() {
    let mut slip = slip_with(&[("m-1", 1.8, 10.0), ("m-2", 1.5, 10.0)]);
    let mut bets = FailsOnCall::new(2);
    let mut wallet = PaperWallet::new(100.0);
    let mut power_ups = PaperPowerUps::default();

    let first = {
        let mut ctx = SubmitContext {
            user_id: USER,
            bets: &mut bets,
            wallet: &mut wallet,
            power_ups: &mut power_ups,
            listener: None,
            min_bet: 1.0,
            safe_slip_cost: 0.0,
        };
        submit_singles(&slip, &mut ctx).expect("partial")
    };
    for match_id in &first.match_ids {
        slip.remove(match_id);
    }
    assert_eq!(slip.len(), 1);

    let second = {
        let mut ctx = SubmitContext {
            user_id: USER,
            bets: &mut bets,
            wallet: &mut wallet,
            power_ups: &mut power_ups,
            listener: None,
            min_bet: 1.0,
            safe_slip_cost: 0.0,
        };
        submit_singles(&slip, &mut ctx).expect("retry succeeds")
    };
    assert!(!second.is_partial());
    assert_eq!(second.match_ids, vec!["m-2"]);
    assert!((wallet.balance() - 80.0).abs() < 1e-9);
    assert_eq!(bets.book.bets.len(), 2);
}

#[test]
fn invalid_slip_is_never_sent() {
    let slip = slip_with(&[("m-1", 1.8, 50.0)]);
    let mut book = PaperBook::new();
    let mut wallet = PaperWallet::new(20.0);
    let mut power_ups = PaperPowerUps::default();
    let mut ctx = SubmitContext {
        user_id: USER,
        bets: &mut book,
        wallet: &mut wallet,
        power_ups: &mut power_ups,
        listener: None,
        min_bet: 1.0,
        safe_slip_cost: 0.0,
    };
    let err = submit_singles(&slip, &mut ctx).expect_err("over balance");
    assert!(err.to_string().starts_with("Insufficient balance"));
    assert!(book.bets.is_empty());
}

#[test]
fn power_up_failure_is_a_warning_not_a_rollback() {
    let mut slip = slip_with(&[("m-1", 1.8, 10.0), ("m-2", 1.5, 5.0)]);
    slip.set_parlay_mode(true).expect("two legs");
    slip.toggle_safe_slip(true).expect("power-up owned");
    assert_eq!(slip.safe_slip(), SafeSlip::Parlay);

    let mut book = PaperBook::new();
    let mut wallet = PaperWallet::new(100.0);
    let mut power_ups = BrokenPowerUps;
    let mut listener = CountingListener::default();
    let receipt = {
        let mut ctx = SubmitContext {
            user_id: USER,
            bets: &mut book,
            wallet: &mut wallet,
            power_ups: &mut power_ups,
            listener: Some(&mut listener),
            min_bet: 1.0,
            safe_slip_cost: 2.0,
        };
        submit_parlay(&slip, &aggregator(), 0, &mut ctx).expect("bet stands")
    };

    assert_eq!(receipt.bet_ids, vec!["parlay-1"]);
    assert!(!receipt.safe_slip_applied);
    assert_eq!(receipt.warnings.len(), 1);
    assert!(receipt.warnings[0].contains("safe slip was not applied"));
    assert!((wallet.balance() - 85.0).abs() < 1e-9);
    assert_eq!(listener.calls.len(), 1);

    let Some((_, PlacedBet::Parlay(req))) = book.bets.first() else {
        panic!("expected a parlay bet");
    };
    assert!(req.is_safe_bet);
    assert!((req.safe_bet_cost - 2.0).abs() < 1e-9);
}

#[test]
fn parlay_request_snapshots_the_quote() {
    let mut slip = slip_with(&[("m-1", 2.0, 10.0), ("m-2", 1.5, 5.0)]);
    slip.set_parlay_mode(true).expect("two legs");
    let req = parlay_bet_request(&slip, &aggregator(), 5, 3.0).expect("priced");
    assert_eq!(req.predictions.len(), 2);
    assert!((req.total_stake - 15.0).abs() < 1e-9);
    assert!((req.base_odds - 3.0).abs() < 1e-9);
    assert!((req.bonus_multiplier - 1.05).abs() < 1e-9);
    assert!((req.streak_booster - 1.10).abs() < 1e-9);
    assert!(!req.is_safe_bet);
    assert_eq!(req.safe_bet_cost, 0.0);

    let value = serde_json::to_value(&req).expect("serializable");
    for key in ["predictions", "totalStake", "baseOdds", "finalOdds", "bonusMultiplier", "streakBooster", "isSafeBet", "safeBetCost"] {
        assert!(value.get(key).is_some(), "missing {key}");
    }
}

#[test]
fn parlay_submit_requires_parlay_mode() {
    let slip = slip_with(&[("m-1", 2.0, 10.0), ("m-2", 1.5, 5.0)]);
    let mut book = PaperBook::new();
    let mut wallet = PaperWallet::new(100.0);
    let mut power_ups = PaperPowerUps::default();
    let mut ctx = SubmitContext {
        user_id: USER,
        bets: &mut book,
        wallet: &mut wallet,
        power_ups: &mut power_ups,
        listener: None,
        min_bet: 1.0,
        safe_slip_cost: 0.0,
    };
    assert!(submit_parlay(&slip, &aggregator(), 0, &mut ctx).is_err());
    assert!(book.bets.is_empty());
}
