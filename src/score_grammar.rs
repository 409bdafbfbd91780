use crate::prediction::{MatchFormat, ScorePair};

const TIEBREAK_POINTS: u16 = 7;
const SUPER_TIEBREAK_POINTS: u16 = 10;
const MIN_MARGIN: u16 = 2;

pub fn parse_score(token: &str) -> Option<ScorePair> {
    token.parse().ok()
}

/// Accepts `"N-M"` game counts that fit inside a set of `format`.
pub fn validate_set_score(token: &str, format: MatchFormat) -> bool {
    let Some(score) = parse_score(token) else {
        return false;
    };
    let cap = format.max_games_per_set();
    score.a <= cap && score.b <= cap
}

/// A finished set: 6-0 through 6-4, 7-5, or 7-6 (either orientation).
pub fn is_completed_set(score: ScorePair) -> bool {
    match score.high() {
        6 => score.low() <= 4,
        7 => score.low() == 5 || score.low() == 6,
        _ => false,
    }
}

pub fn validate_tiebreak_score(token: &str, winner_is_side_a: bool) -> bool {
    validate_race(token, winner_is_side_a, TIEBREAK_POINTS)
}

pub fn validate_super_tiebreak_score(token: &str, winner_is_side_a: bool) -> bool {
    validate_race(token, winner_is_side_a, SUPER_TIEBREAK_POINTS)
}

// Empty input means "no score entered" and is accepted so a field can be cleared.
fn validate_race(token: &str, winner_is_side_a: bool, floor: u16) -> bool {
    if token.trim().is_empty() {
        return true;
    }
    let Some(score) = parse_score(token) else {
        return false;
    };
    if score.high() < floor || score.margin() < MIN_MARGIN {
        return false;
    }
    (score.a > score.b) == winner_is_side_a
}

/// `"Lastname F."` for singles. Doubles pairs (`"X & Y"`) are abbreviated
/// per partner; anything that does not split into two names comes back as-is.
pub fn display_name(full_name: &str, is_doubles: bool) -> String {
    if !is_doubles {
        return abbreviate(full_name.trim());
    }
    match split_pair(full_name) {
        Some((first, second)) => format!("{} & {}", abbreviate(first), abbreviate(second)),
        None => full_name.to_string(),
    }
}

/// Surname only, per partner for doubles.
pub fn last_name(full_name: &str, is_doubles: bool) -> String {
    if is_doubles {
        if let Some((first, second)) = split_pair(full_name) {
            return format!("{} & {}", surname(first), surname(second));
        }
    }
    surname(full_name.trim()).to_string()
}

fn split_pair(full_name: &str) -> Option<(&str, &str)> {
    let (first, second) = full_name.split_once(" & ")?;
    let (first, second) = (first.trim(), second.trim());
    if first.is_empty() || second.is_empty() || second.contains(" & ") {
        return None;
    }
    Some((first, second))
}

fn abbreviate(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    match words.as_slice() {
        [] => String::new(),
        [only] => (*only).to_string(),
        [first, .., last] => match first.chars().next() {
            Some(initial) => format!("{last} {}.", initial.to_uppercase()),
            None => (*last).to_string(),
        },
    }
}

fn surname(name: &str) -> &str {
    name.split_whitespace().last().unwrap_or(name)
}
