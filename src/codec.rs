use serde::{Deserialize, Serialize};

use crate::prediction::{
    MAX_SETS, MatchDetails, PredictionOptions, ResultShape, ScorePair, Side, TIEBREAK_SETS,
    result_shape,
};
use crate::score_grammar::last_name;

pub const NO_PREDICTION: &str = "No prediction";
const BULLET: &str = " • ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionType {
    Winner,
    MatchResult,
    SetWinner,
    SetScore,
}

/// Payload stored with a bet and read back by the resolution service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredPrediction {
    #[serde(rename = "type")]
    pub kind: PredictionType,
    pub winner: Option<Side>,
    pub match_result: Option<ScorePair>,
    pub set_winners: [Option<Side>; MAX_SETS],
    pub set_scores: [Option<ScorePair>; MAX_SETS],
    pub tiebreak_scores: [Option<ScorePair>; TIEBREAK_SETS],
    pub super_tiebreak_score: Option<ScorePair>,
    pub super_tiebreak_winner: Option<Side>,
}

impl StructuredPrediction {
    fn empty() -> Self {
        Self {
            kind: PredictionType::Winner,
            winner: None,
            match_result: None,
            set_winners: [None; MAX_SETS],
            set_scores: [None; MAX_SETS],
            tiebreak_scores: [None; TIEBREAK_SETS],
            super_tiebreak_score: None,
            super_tiebreak_winner: None,
        }
    }
}

pub fn prediction_type(p: &PredictionOptions) -> PredictionType {
    let has_result = p.match_result.is_some();
    if has_result && p.set_scores.iter().any(Option::is_some) {
        PredictionType::SetScore
    } else if has_result && p.set_winners.iter().any(Option::is_some) {
        PredictionType::SetWinner
    } else if has_result {
        PredictionType::MatchResult
    } else {
        PredictionType::Winner
    }
}

pub fn encode(p: &PredictionOptions) -> StructuredPrediction {
    StructuredPrediction {
        kind: prediction_type(p),
        winner: p.winner,
        match_result: p.match_result,
        set_winners: p.set_winners,
        set_scores: p.set_scores,
        tiebreak_scores: p.tiebreak_scores,
        super_tiebreak_score: p.super_tiebreak_score,
        super_tiebreak_winner: p.super_tiebreak_winner,
    }
}

/// Like `encode`, but a missing record yields an all-null `winner` payload.
pub fn encode_or_default(
    p: Option<&PredictionOptions>,
    log: impl FnOnce(String),
) -> StructuredPrediction {
    match p {
        Some(p) => encode(p),
        None => {
            log("[WARN] Encoding missing prediction as empty winner pick".to_string());
            StructuredPrediction::empty()
        }
    }
}

/// One-line summary such as `Winner: Sinner • Result: 2-0 • Set 1 score: 6-4`.
pub fn describe(p: &PredictionOptions, details: &MatchDetails) -> String {
    if p.is_empty() {
        return NO_PREDICTION.to_string();
    }
    let name = |side: Side| last_name(&details.side(side).name, details.is_doubles);
    let mut parts: Vec<String> = Vec::new();

    if let Some(winner) = p.winner {
        parts.push(format!("Winner: {}", name(winner)));
    }
    if let Some(result) = p.match_result {
        parts.push(format!("Result: {result}"));
    }

    let auto_winners = p
        .match_result
        .is_some_and(|r| result_shape(r) == ResultShape::StraightSets);
    if !auto_winners {
        for (idx, side) in p.set_winners.iter().enumerate() {
            if let Some(side) = side {
                parts.push(format!("Set {}: {}", idx + 1, name(*side)));
            }
        }
    }
    for (idx, score) in p.set_scores.iter().enumerate() {
        if let Some(score) = score {
            parts.push(format!("Set {} score: {score}", idx + 1));
        }
    }
    for (idx, score) in p.tiebreak_scores.iter().enumerate() {
        if let Some(score) = score {
            parts.push(format!("Set {} TB: {score}", idx + 1));
        }
    }
    match (p.super_tiebreak_winner, p.super_tiebreak_score) {
        (Some(side), Some(score)) => parts.push(format!("Super TB: {} {score}", name(side))),
        (None, Some(score)) => parts.push(format!("Super TB: {score}")),
        (Some(side), None) => parts.push(format!("Super TB: {}", name(side))),
        (None, None) => {}
    }

    if parts.is_empty() {
        return NO_PREDICTION.to_string();
    }
    parts.join(BULLET)
}
