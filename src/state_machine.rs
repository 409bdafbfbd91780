//! Field-by-field construction of a single match prediction.
//!
//! There are no named states: what the user may edit next is derived from the
//! current `PredictionOptions` every time through `visible_sections`, and every
//! edit goes through `apply_mutation`, which either returns the next record or
//! a `Rejection` the caller shows inline while keeping the previous record.

use std::collections::BTreeSet;
use std::fmt;

use crate::prediction::{
    MatchFormat, PredictionOptions, ResultShape, ScorePair, Side, TIEBREAK_SETS,
    is_consistent_result, result_shape, results_for, set_slot, tiebreak_slot,
};
use crate::score_grammar::{
    is_completed_set, parse_score, validate_set_score, validate_super_tiebreak_score,
    validate_tiebreak_score,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    SelectWinner(Side),
    SelectMatchResult(ScorePair),
    SelectSetWinner { set: usize, side: Side },
    SetSetScore { set: usize, token: String },
    SetTiebreakScore { set: usize, token: String },
    SetSuperTiebreakScore(String),
    ClearAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SectionId {
    MatchResult,
    SetWinner(usize),
    SetScore(usize),
    TiebreakScore(usize),
    SuperTiebreak,
}

impl SectionId {
    pub fn label(self) -> String {
        match self {
            SectionId::MatchResult => "Result".to_string(),
            SectionId::SetWinner(set) => format!("Set {set} winner"),
            SectionId::SetScore(set) => format!("Set {set} score"),
            SectionId::TiebreakScore(set) => format!("Set {set} tiebreak"),
            SectionId::SuperTiebreak => "Super tiebreak".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    WinnerRequired,
    ResultInconsistent(ScorePair),
    SectionLocked(SectionId),
    SetOutOfRange(usize),
    AutoAssigned(usize),
    MaxReached { side: Side, cap: u16 },
    MalformedScore(String),
    IncompleteSet(ScorePair),
    SetWinnerMismatch(usize),
    InvalidTiebreak(String),
    InvalidSuperTiebreak(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::WinnerRequired => write!(f, "Pick a winner first"),
            Rejection::ResultInconsistent(result) => {
                write!(f, "{result} does not fit the chosen winner and format")
            }
            Rejection::SectionLocked(section) => write!(f, "{} is not available yet", section.label()),
            Rejection::SetOutOfRange(set) => write!(f, "Set {set} is not played in this result"),
            Rejection::AutoAssigned(set) => write!(f, "Set {set} winner follows from the result"),
            Rejection::MaxReached { side, cap } => {
                write!(f, "Max reached: side {} wins only {cap} sets", side.label())
            }
            Rejection::MalformedScore(token) => write!(f, "'{token}' is not a valid set score"),
            Rejection::IncompleteSet(score) => write!(f, "{score} is not a finished set"),
            Rejection::SetWinnerMismatch(set) => {
                write!(f, "Set {set} score must be won by the set winner")
            }
            Rejection::InvalidTiebreak(token) => write!(f, "'{token}' is not a valid tiebreak score"),
            Rejection::InvalidSuperTiebreak(token) => {
                write!(f, "'{token}' is not a valid super tiebreak score")
            }
        }
    }
}

impl std::error::Error for Rejection {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Selected,
    Open,
    /// Side already holds every set the result allows it.
    MaxReached,
    /// Filled in from the result; not user-editable.
    Locked,
}

pub fn apply_mutation(
    state: &PredictionOptions,
    format: MatchFormat,
    mutation: Mutation,
) -> Result<PredictionOptions, Rejection> {
    let mut next = state.clone();
    match mutation {
        Mutation::SelectWinner(side) => {
            next.winner = if state.winner == Some(side) { None } else { Some(side) };
        }
        Mutation::SelectMatchResult(result) => {
            let winner = state.winner.ok_or(Rejection::WinnerRequired)?;
            if state.match_result == Some(result) {
                next.match_result = None;
                return Ok(next);
            }
            if !is_consistent_result(result, winner, format) {
                return Err(Rejection::ResultInconsistent(result));
            }
            next.match_result = Some(result);
            // Straight-sets winners were filled in, not picked; they leave with
            // that result. Everything the user entered stays.
            if let Some(old) = state.match_result {
                if result_shape(old) == ResultShape::StraightSets
                    && result_shape(result) != ResultShape::StraightSets
                {
                    for slot in next.set_winners.iter_mut().take(old.total() as usize) {
                        *slot = None;
                    }
                }
            }
            if result_shape(result) == ResultShape::StraightSets {
                for slot in next.set_winners.iter_mut().take(result.total() as usize) {
                    *slot = Some(winner);
                }
            }
        }
        Mutation::SelectSetWinner { set, side } => select_set_winner(&mut next, format, set, side)?,
        Mutation::SetSetScore { set, token } => set_set_score(&mut next, format, set, &token)?,
        Mutation::SetTiebreakScore { set, token } => {
            set_tiebreak_score(&mut next, format, set, &token)?
        }
        Mutation::SetSuperTiebreakScore(token) => set_super_tiebreak(&mut next, format, &token)?,
        Mutation::ClearAll => next = PredictionOptions::default(),
    }
    Ok(next)
}

/// The match result, if it agrees with the winner and the format.
pub fn effective_result(state: &PredictionOptions, format: MatchFormat) -> Option<ScorePair> {
    let winner = state.winner?;
    let result = state.match_result?;
    is_consistent_result(result, winner, format).then_some(result)
}

pub fn visible_sections(state: &PredictionOptions, format: MatchFormat) -> BTreeSet<SectionId> {
    let mut out = BTreeSet::new();
    if state.winner.is_none() {
        return out;
    }
    out.insert(SectionId::MatchResult);
    let Some(result) = effective_result(state, format) else {
        return out;
    };

    let played = result.total() as usize;
    match result_shape(result) {
        ResultShape::StraightSets => {
            out.extend((1..=played).map(SectionId::SetScore));
        }
        ResultShape::Decider => {
            out.insert(SectionId::SetWinner(1));
            if implied_set_winner(state, format, 1).is_some() {
                out.insert(SectionId::SetScore(1));
                out.insert(SectionId::SetScore(2));
            }
            if format.has_super_tiebreak() {
                out.insert(SectionId::SuperTiebreak);
            }
        }
        ResultShape::Extended => {
            out.extend((1..=played).map(SectionId::SetWinner));
        }
    }

    for set in 1..=TIEBREAK_SETS {
        let seven_six = state.set_score(set).is_some_and(ScorePair::is_tiebreak_set);
        if seven_six && out.contains(&SectionId::SetScore(set)) {
            out.insert(SectionId::TiebreakScore(set));
        }
    }
    out
}

/// Who the prediction says won `set`, whether chosen or implied by the result.
pub fn implied_set_winner(state: &PredictionOptions, format: MatchFormat, set: usize) -> Option<Side> {
    let result = effective_result(state, format)?;
    let winner = state.winner?;
    let idx = set_slot(set)?;
    if set > result.total() as usize {
        return None;
    }
    match result_shape(result) {
        ResultShape::StraightSets => Some(winner),
        // Set 1 only counts as picked when set 2 holds the other side.
        ResultShape::Decider => {
            let first = state.set_winners[0]
                .filter(|side| state.set_winners[1] == Some(side.other()));
            match set {
                1 => first,
                2 => first.map(Side::other),
                _ => Some(winner),
            }
        }
        ResultShape::Extended => state.set_winners[idx],
    }
}

pub fn set_winner_availability(
    state: &PredictionOptions,
    format: MatchFormat,
    set: usize,
    side: Side,
) -> Availability {
    let Some(result) = effective_result(state, format) else {
        return Availability::Locked;
    };
    let Some(idx) = set_slot(set) else {
        return Availability::Locked;
    };
    if set > result.total() as usize {
        return Availability::Locked;
    }
    let selected = implied_set_winner(state, format, set) == Some(side);
    match result_shape(result) {
        ResultShape::StraightSets => Availability::Locked,
        ResultShape::Decider if set != 1 => Availability::Locked,
        _ if selected => Availability::Selected,
        ResultShape::Decider => Availability::Open,
        ResultShape::Extended => {
            let taken = sets_held(state, result, side, Some(idx));
            if taken >= result.for_side(side) {
                Availability::MaxReached
            } else {
                Availability::Open
            }
        }
    }
}

// Sets credited to `side` among the sets the result says were played.
fn sets_held(state: &PredictionOptions, result: ScorePair, side: Side, skip: Option<usize>) -> u16 {
    state
        .set_winners
        .iter()
        .take(result.total() as usize)
        .enumerate()
        .filter(|(idx, winner)| Some(*idx) != skip && **winner == Some(side))
        .count() as u16
}

fn select_set_winner(
    next: &mut PredictionOptions,
    format: MatchFormat,
    set: usize,
    side: Side,
) -> Result<(), Rejection> {
    let result =
        effective_result(next, format).ok_or(Rejection::SectionLocked(SectionId::SetWinner(set)))?;
    let idx = set_slot(set).ok_or(Rejection::SetOutOfRange(set))?;
    if set > result.total() as usize {
        return Err(Rejection::SetOutOfRange(set));
    }
    match result_shape(result) {
        ResultShape::StraightSets => Err(Rejection::AutoAssigned(set)),
        ResultShape::Decider => {
            if set != 1 {
                return Err(Rejection::AutoAssigned(set));
            }
            if implied_set_winner(next, format, 1) == Some(side) {
                next.set_winners[0] = None;
                next.set_winners[1] = None;
            } else {
                next.set_winners[0] = Some(side);
                next.set_winners[1] = Some(side.other());
            }
            Ok(())
        }
        ResultShape::Extended => {
            if next.set_winners[idx] == Some(side) {
                next.set_winners[idx] = None;
                return Ok(());
            }
            let cap = result.for_side(side);
            if sets_held(next, result, side, Some(idx)) >= cap {
                return Err(Rejection::MaxReached { side, cap });
            }
            next.set_winners[idx] = Some(side);
            Ok(())
        }
    }
}

fn set_set_score(
    next: &mut PredictionOptions,
    format: MatchFormat,
    set: usize,
    token: &str,
) -> Result<(), Rejection> {
    let idx = set_slot(set).ok_or(Rejection::SetOutOfRange(set))?;
    if token.trim().is_empty() {
        next.set_scores[idx] = None;
        return Ok(());
    }
    if !visible_sections(next, format).contains(&SectionId::SetScore(set)) {
        return Err(Rejection::SectionLocked(SectionId::SetScore(set)));
    }
    let score = parse_score(token)
        .filter(|_| validate_set_score(token, format))
        .ok_or_else(|| Rejection::MalformedScore(token.trim().to_string()))?;
    if !is_completed_set(score) {
        return Err(Rejection::IncompleteSet(score));
    }
    if score.leader() != implied_set_winner(next, format, set) {
        return Err(Rejection::SetWinnerMismatch(set));
    }
    next.set_scores[idx] = Some(score);
    Ok(())
}

fn set_tiebreak_score(
    next: &mut PredictionOptions,
    format: MatchFormat,
    set: usize,
    token: &str,
) -> Result<(), Rejection> {
    let idx = tiebreak_slot(set).ok_or(Rejection::SetOutOfRange(set))?;
    if token.trim().is_empty() {
        next.tiebreak_scores[idx] = None;
        return Ok(());
    }
    let section = SectionId::TiebreakScore(set);
    if !visible_sections(next, format).contains(&section) {
        return Err(Rejection::SectionLocked(section));
    }
    let set_leader = next.set_score(set).and_then(ScorePair::leader);
    let Some(set_leader) = set_leader else {
        return Err(Rejection::SectionLocked(section));
    };
    if !validate_tiebreak_score(token, set_leader == Side::A) {
        return Err(Rejection::InvalidTiebreak(token.trim().to_string()));
    }
    next.tiebreak_scores[idx] = parse_score(token);
    Ok(())
}

fn set_super_tiebreak(
    next: &mut PredictionOptions,
    format: MatchFormat,
    token: &str,
) -> Result<(), Rejection> {
    if token.trim().is_empty() {
        next.super_tiebreak_score = None;
        next.super_tiebreak_winner = None;
        return Ok(());
    }
    if !visible_sections(next, format).contains(&SectionId::SuperTiebreak) {
        return Err(Rejection::SectionLocked(SectionId::SuperTiebreak));
    }
    let winner = next.winner.ok_or(Rejection::WinnerRequired)?;
    if !validate_super_tiebreak_score(token, winner == Side::A) {
        return Err(Rejection::InvalidSuperTiebreak(token.trim().to_string()));
    }
    next.super_tiebreak_score = parse_score(token);
    next.super_tiebreak_winner = next.super_tiebreak_score.map(|_| winner);
    Ok(())
}

/// Set score that agrees with the current result and set winner.
pub fn set_score_counts(state: &PredictionOptions, format: MatchFormat, set: usize) -> bool {
    let Some(score) = state.set_score(set) else {
        return false;
    };
    visible_sections(state, format).contains(&SectionId::SetScore(set))
        && is_completed_set(score)
        && score.leader() == implied_set_winner(state, format, set)
}

pub fn tiebreak_counts(state: &PredictionOptions, format: MatchFormat, set: usize) -> bool {
    let (Some(tiebreak), Some(score)) = (state.tiebreak_score(set), state.set_score(set)) else {
        return false;
    };
    score.is_tiebreak_set()
        && set_score_counts(state, format, set)
        && tiebreak.high() >= 7
        && tiebreak.margin() >= 2
        && tiebreak.leader() == score.leader()
}

pub fn super_tiebreak_counts(state: &PredictionOptions, format: MatchFormat) -> bool {
    let (Some(score), Some(winner)) = (state.super_tiebreak_score, state.winner) else {
        return false;
    };
    visible_sections(state, format).contains(&SectionId::SuperTiebreak)
        && state.super_tiebreak_winner == Some(winner)
        && score.high() >= 10
        && score.margin() >= 2
        && score.leader() == Some(winner)
}

/// Filled fields that no longer agree with the current winner and result.
///
/// Changing the result keeps earlier detail around; these are the entries the
/// multiplier ignores until the user edits or clears them.
pub fn stale_fields(state: &PredictionOptions, format: MatchFormat) -> Vec<SectionId> {
    let mut out = Vec::new();
    if state.match_result.is_some() && effective_result(state, format).is_none() {
        out.push(SectionId::MatchResult);
    }
    for (idx, winner) in state.set_winners.iter().enumerate() {
        let set = idx + 1;
        if winner.is_some() && *winner != implied_set_winner(state, format, set) {
            out.push(SectionId::SetWinner(set));
        }
    }
    for (idx, score) in state.set_scores.iter().enumerate() {
        let set = idx + 1;
        if score.is_some() && !set_score_counts(state, format, set) {
            out.push(SectionId::SetScore(set));
        }
    }
    for (idx, score) in state.tiebreak_scores.iter().enumerate() {
        let set = idx + 1;
        if score.is_some() && !tiebreak_counts(state, format, set) {
            out.push(SectionId::TiebreakScore(set));
        }
    }
    if state.super_tiebreak_score.is_some() && !super_tiebreak_counts(state, format) {
        out.push(SectionId::SuperTiebreak);
    }
    out
}

/// Legal inputs for a section, in the order a picker should offer them.
pub fn section_choices(
    state: &PredictionOptions,
    format: MatchFormat,
    section: SectionId,
) -> Vec<Mutation> {
    match section {
        SectionId::MatchResult => state
            .winner
            .map(|winner| {
                results_for(winner, format)
                    .into_iter()
                    .map(Mutation::SelectMatchResult)
                    .collect()
            })
            .unwrap_or_default(),
        SectionId::SetWinner(set) => [Side::A, Side::B]
            .into_iter()
            .map(|side| Mutation::SelectSetWinner { set, side })
            .collect(),
        SectionId::SetScore(set) => {
            let Some(winner) = implied_set_winner(state, format, set) else {
                return Vec::new();
            };
            [(6, 0), (6, 1), (6, 2), (6, 3), (6, 4), (7, 5), (7, 6)]
                .into_iter()
                .map(|(won, lost)| Mutation::SetSetScore {
                    set,
                    token: ScorePair::oriented(winner, won, lost).to_string(),
                })
                .collect()
        }
        SectionId::TiebreakScore(set) => {
            let Some(leader) = state.set_score(set).and_then(ScorePair::leader) else {
                return Vec::new();
            };
            [(7, 0), (7, 1), (7, 2), (7, 3), (7, 4), (7, 5), (8, 6), (9, 7), (10, 8)]
                .into_iter()
                .map(|(won, lost)| Mutation::SetTiebreakScore {
                    set,
                    token: ScorePair::oriented(leader, won, lost).to_string(),
                })
                .collect()
        }
        SectionId::SuperTiebreak => {
            let Some(winner) = state.winner else {
                return Vec::new();
            };
            [(10, 0), (10, 2), (10, 4), (10, 5), (10, 6), (10, 7), (10, 8), (11, 9), (12, 10)]
                .into_iter()
                .map(|(won, lost)| {
                    Mutation::SetSuperTiebreakScore(ScorePair::oriented(winner, won, lost).to_string())
                })
                .collect()
        }
    }
}

/// The edit that empties a section, if it holds anything to clear.
pub fn clear_section(state: &PredictionOptions, section: SectionId) -> Option<Mutation> {
    match section {
        SectionId::MatchResult => state.match_result.map(Mutation::SelectMatchResult),
        SectionId::SetWinner(set) => state
            .set_winner(set)
            .map(|side| Mutation::SelectSetWinner { set, side }),
        SectionId::SetScore(set) => state.set_score(set).map(|_| Mutation::SetSetScore {
            set,
            token: String::new(),
        }),
        SectionId::TiebreakScore(set) => state.tiebreak_score(set).map(|_| Mutation::SetTiebreakScore {
            set,
            token: String::new(),
        }),
        SectionId::SuperTiebreak => state
            .super_tiebreak_score
            .map(|_| Mutation::SetSuperTiebreakScore(String::new())),
    }
}

impl Mutation {
    /// The value this edit writes, in the same form `section_value` reports.
    pub fn value_label(&self) -> Option<String> {
        match self {
            Mutation::SelectWinner(side) => Some(side.label().to_string()),
            Mutation::SelectMatchResult(result) => Some(result.to_string()),
            Mutation::SelectSetWinner { side, .. } => Some(side.label().to_string()),
            Mutation::SetSetScore { token, .. }
            | Mutation::SetTiebreakScore { token, .. }
            | Mutation::SetSuperTiebreakScore(token) => {
                parse_score(token).map(|score| score.to_string())
            }
            Mutation::ClearAll => None,
        }
    }
}

/// Current value of a section, rendered for display.
pub fn section_value(state: &PredictionOptions, format: MatchFormat, section: SectionId) -> Option<String> {
    match section {
        SectionId::MatchResult => state.match_result.map(|r| r.to_string()),
        SectionId::SetWinner(set) => {
            implied_set_winner(state, format, set).map(|side| side.label().to_string())
        }
        SectionId::SetScore(set) => state.set_score(set).map(|s| s.to_string()),
        SectionId::TiebreakScore(set) => state.tiebreak_score(set).map(|s| s.to_string()),
        SectionId::SuperTiebreak => state.super_tiebreak_score.map(|s| s.to_string()),
    }
}
