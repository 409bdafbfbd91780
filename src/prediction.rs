use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const MAX_SETS: usize = 5;
// Only the first two sets carry a separate tiebreak prediction.
pub const TIEBREAK_SETS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::A => "A",
            Side::B => "B",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchFormat {
    BestOfThree,
    /// Amateur format: a super tiebreak replaces the deciding set.
    BestOfThreeSuperTiebreak,
    BestOfFive,
}

impl MatchFormat {
    pub fn sets_to_win(self) -> u16 {
        match self {
            MatchFormat::BestOfThree | MatchFormat::BestOfThreeSuperTiebreak => 2,
            MatchFormat::BestOfFive => 3,
        }
    }

    pub fn max_sets(self) -> usize {
        match self {
            MatchFormat::BestOfThree | MatchFormat::BestOfThreeSuperTiebreak => 3,
            MatchFormat::BestOfFive => 5,
        }
    }

    pub fn max_games_per_set(self) -> u16 {
        7
    }

    pub fn has_super_tiebreak(self) -> bool {
        matches!(self, MatchFormat::BestOfThreeSuperTiebreak)
    }

    pub fn label(self) -> &'static str {
        match self {
            MatchFormat::BestOfThree => "Bo3",
            MatchFormat::BestOfThreeSuperTiebreak => "Bo3 STB",
            MatchFormat::BestOfFive => "Bo5",
        }
    }
}

/// A two-sided score written from side A's point of view (`"N-M"`).
///
/// The same shape is used for set tallies, set scores in games, and tiebreak
/// points. Serialized as the plain `"N-M"` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScorePair {
    pub a: u16,
    pub b: u16,
}

impl ScorePair {
    pub const fn new(a: u16, b: u16) -> Self {
        Self { a, b }
    }

    /// Builds a pair with `won` credited to `side`.
    pub fn oriented(side: Side, won: u16, lost: u16) -> Self {
        match side {
            Side::A => Self::new(won, lost),
            Side::B => Self::new(lost, won),
        }
    }

    pub fn leader(self) -> Option<Side> {
        if self.a > self.b {
            Some(Side::A)
        } else if self.b > self.a {
            Some(Side::B)
        } else {
            None
        }
    }

    pub fn for_side(self, side: Side) -> u16 {
        match side {
            Side::A => self.a,
            Side::B => self.b,
        }
    }

    pub fn high(self) -> u16 {
        self.a.max(self.b)
    }

    pub fn low(self) -> u16 {
        self.a.min(self.b)
    }

    pub fn margin(self) -> u16 {
        self.a.abs_diff(self.b)
    }

    pub fn total(self) -> u16 {
        self.a.saturating_add(self.b)
    }

    pub fn is_tiebreak_set(self) -> bool {
        self.high() == 7 && self.low() == 6
    }
}

impl fmt::Display for ScorePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.a, self.b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseScoreError(pub String);

impl fmt::Display for ParseScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a score of the form N-M", self.0)
    }
}

impl std::error::Error for ParseScoreError {}

impl FromStr for ScorePair {
    type Err = ParseScoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let err = || ParseScoreError(raw.to_string());
        let (left, right) = raw.trim().split_once('-').ok_or_else(err)?;
        let parse = |part: &str| -> Option<u16> {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            part.parse::<u16>().ok()
        };
        let a = parse(left).ok_or_else(err)?;
        let b = parse(right).ok_or_else(err)?;
        Ok(Self { a, b })
    }
}

impl TryFrom<String> for ScorePair {
    type Error = ParseScoreError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<ScorePair> for String {
    fn from(score: ScorePair) -> Self {
        score.to_string()
    }
}

/// How a match result constrains the per-set detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    /// The loser won no sets (3-0, 2-0 and mirrors).
    StraightSets,
    /// 2-1 or 1-2: one split pair of sets before the decider.
    Decider,
    /// Best-of-five results with both sides on the board.
    Extended,
}

pub fn result_shape(result: ScorePair) -> ResultShape {
    if result.low() == 0 {
        ResultShape::StraightSets
    } else if result.high() == 2 && result.low() == 1 {
        ResultShape::Decider
    } else {
        ResultShape::Extended
    }
}

pub fn is_consistent_result(result: ScorePair, winner: Side, format: MatchFormat) -> bool {
    let need = format.sets_to_win();
    result.for_side(winner) == need && result.for_side(winner.other()) < need
}

/// Every sets tally `winner` can win by under `format`, straight sets first.
pub fn results_for(winner: Side, format: MatchFormat) -> Vec<ScorePair> {
    let need = format.sets_to_win();
    (0..need)
        .map(|lost| ScorePair::oriented(winner, need, lost))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionOptions {
    pub winner: Option<Side>,
    pub match_result: Option<ScorePair>,
    #[serde(default)]
    pub set_winners: [Option<Side>; MAX_SETS],
    #[serde(default)]
    pub set_scores: [Option<ScorePair>; MAX_SETS],
    #[serde(default)]
    pub tiebreak_scores: [Option<ScorePair>; TIEBREAK_SETS],
    #[serde(default)]
    pub super_tiebreak_score: Option<ScorePair>,
    #[serde(default)]
    pub super_tiebreak_winner: Option<Side>,
}

impl PredictionOptions {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn set_winner(&self, set: usize) -> Option<Side> {
        set_slot(set).and_then(|idx| self.set_winners[idx])
    }

    pub fn set_score(&self, set: usize) -> Option<ScorePair> {
        set_slot(set).and_then(|idx| self.set_scores[idx])
    }

    pub fn tiebreak_score(&self, set: usize) -> Option<ScorePair> {
        tiebreak_slot(set).and_then(|idx| self.tiebreak_scores[idx])
    }
}

/// Zero-based slot for a one-based set number.
pub fn set_slot(set: usize) -> Option<usize> {
    (1..=MAX_SETS).contains(&set).then(|| set - 1)
}

pub fn tiebreak_slot(set: usize) -> Option<usize> {
    (1..=TIEBREAK_SETS).contains(&set).then(|| set - 1)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSide {
    pub name: String,
    pub base_odds: f64,
    #[serde(default)]
    pub ntrp_rating: Option<f32>,
    #[serde(default)]
    pub team_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDetails {
    pub id: String,
    pub side_a: PlayerSide,
    pub side_b: PlayerSide,
    #[serde(default)]
    pub round: String,
    #[serde(default)]
    pub surface: String,
    pub format: MatchFormat,
    #[serde(default)]
    pub is_doubles: bool,
    #[serde(default)]
    pub scheduled_at: Option<String>,
}

impl MatchDetails {
    pub fn side(&self, side: Side) -> &PlayerSide {
        match side {
            Side::A => &self.side_a,
            Side::B => &self.side_b,
        }
    }

    pub fn base_odds(&self, side: Side) -> f64 {
        self.side(side).base_odds
    }
}
