use courtside::prediction::{MatchFormat, PredictionOptions, ScorePair, Side};
use courtside::state_machine::{
    Availability, Mutation, Rejection, SectionId, apply_mutation, clear_section,
    implied_set_winner, section_choices, section_value, set_winner_availability, stale_fields,
    visible_sections,
};

fn score(raw: &str) -> ScorePair {
    raw.parse().expect("valid score")
}

fn apply(p: &PredictionOptions, format: MatchFormat, mutation: Mutation) -> PredictionOptions {
    apply_mutation(p, format, mutation).expect("mutation should be accepted")
}

fn with_result(format: MatchFormat, winner: Side, result: &str) -> PredictionOptions {
    let p = apply(&PredictionOptions::default(), format, Mutation::SelectWinner(winner));
    apply(&p, format, Mutation::SelectMatchResult(score(result)))
}

fn set_score(set: usize, token: &str) -> Mutation {
    Mutation::SetSetScore {
        set,
        token: token.to_string(),
    }
}

#[test]
fn selecting_same_winner_twice_clears_it() {
    let format = MatchFormat::BestOfThree;
    let p = apply(&PredictionOptions::default(), format, Mutation::SelectWinner(Side::A));
    assert_eq!(p.winner, Some(Side::A));
    let p = apply(&p, format, Mutation::SelectWinner(Side::A));
    assert_eq!(p.winner, None);
    assert!(p.is_empty());
}

#[test]
fn switching_winner_replaces_it() {
    let format = MatchFormat::BestOfThree;
    let p = apply(&PredictionOptions::default(), format, Mutation::SelectWinner(Side::A));
    let p = apply(&p, format, Mutation::SelectWinner(Side::B));
    assert_eq!(p.winner, Some(Side::B));
}

#[test]
fn result_needs_winner_and_consistent_tally() {
    let format = MatchFormat::BestOfThree;
    let err = apply_mutation(
        &PredictionOptions::default(),
        format,
        Mutation::SelectMatchResult(score("2-0")),
    )
    .expect_err("no winner yet");
    assert_eq!(err, Rejection::WinnerRequired);

    let p = apply(&PredictionOptions::default(), format, Mutation::SelectWinner(Side::A));
    for bad in ["1-2", "0-2", "3-0", "2-2"] {
        let err = apply_mutation(&p, format, Mutation::SelectMatchResult(score(bad)))
            .expect_err("inconsistent result");
        assert_eq!(err, Rejection::ResultInconsistent(score(bad)));
    }
    assert!(visible_sections(&p, format).contains(&SectionId::MatchResult));
}

#[test]
fn nothing_visible_before_winner() {
    let p = PredictionOptions::default();
    assert!(visible_sections(&p, MatchFormat::BestOfFive).is_empty());
}

#[test]
fn reselecting_result_toggles_it_off() {
    let format = MatchFormat::BestOfThree;
    let p = with_result(format, Side::A, "2-1");
    let p = apply(&p, format, Mutation::SelectMatchResult(score("2-1")));
    assert_eq!(p.match_result, None);
}

#[test]
fn straight_sets_assign_every_set_to_winner() {
    let format = MatchFormat::BestOfFive;
    let p = with_result(format, Side::A, "3-0");
    assert_eq!(
        p.set_winners,
        [Some(Side::A), Some(Side::A), Some(Side::A), None, None]
    );
    for set in 1..=3 {
        assert_eq!(implied_set_winner(&p, format, set), Some(Side::A));
    }

    let sections = visible_sections(&p, format);
    for set in 1..=3 {
        assert!(sections.contains(&SectionId::SetScore(set)));
        assert!(!sections.contains(&SectionId::SetWinner(set)));
    }
    assert!(!sections.contains(&SectionId::SetScore(4)));

    let err = apply_mutation(
        &p,
        format,
        Mutation::SelectSetWinner {
            set: 2,
            side: Side::B,
        },
    )
    .expect_err("set winners follow the result");
    assert_eq!(err, Rejection::AutoAssigned(2));
    assert_eq!(set_winner_availability(&p, format, 1, Side::A), Availability::Locked);
}

#[test]
fn decider_first_set_pick_fixes_second_set() {
    let format = MatchFormat::BestOfThree;
    let p = with_result(format, Side::B, "1-2");
    assert_eq!(p.set_winners, [None; 5]);
    assert!(visible_sections(&p, format).contains(&SectionId::SetWinner(1)));
    assert!(!visible_sections(&p, format).contains(&SectionId::SetScore(1)));

    let p = apply(
        &p,
        format,
        Mutation::SelectSetWinner {
            set: 1,
            side: Side::A,
        },
    );
    assert_eq!(p.set_winners[0], Some(Side::A));
    assert_eq!(p.set_winners[1], Some(Side::B));
    let sections = visible_sections(&p, format);
    assert!(sections.contains(&SectionId::SetScore(1)));
    assert!(sections.contains(&SectionId::SetScore(2)));
    assert!(!sections.contains(&SectionId::SuperTiebreak));

    let err = apply_mutation(
        &p,
        format,
        Mutation::SelectSetWinner {
            set: 2,
            side: Side::A,
        },
    )
    .expect_err("set 2 follows set 1");
    assert_eq!(err, Rejection::AutoAssigned(2));

    let cleared = apply(
        &p,
        format,
        Mutation::SelectSetWinner {
            set: 1,
            side: Side::A,
        },
    );
    assert_eq!(cleared.set_winners[0], None);
    assert_eq!(cleared.set_winners[1], None);
}

#[test]
fn set_winner_cap_blocks_extra_sets_for_a_side() {
    let format = MatchFormat::BestOfFive;
    let mut p = with_result(format, Side::A, "3-1");
    for set in 1..=3 {
        p = apply(&p, format, Mutation::SelectSetWinner { set, side: Side::A });
    }
    assert_eq!(
        set_winner_availability(&p, format, 4, Side::A),
        Availability::MaxReached
    );
    assert_eq!(set_winner_availability(&p, format, 4, Side::B), Availability::Open);
    assert_eq!(set_winner_availability(&p, format, 5, Side::A), Availability::Locked);

    let err = apply_mutation(&p, format, Mutation::SelectSetWinner { set: 4, side: Side::A })
        .expect_err("A only wins three sets");
    assert_eq!(err, Rejection::MaxReached { side: Side::A, cap: 3 });

    let p = apply(&p, format, Mutation::SelectSetWinner { set: 4, side: Side::B });
    let err = apply_mutation(&p, format, Mutation::SelectSetWinner { set: 5, side: Side::B })
        .expect_err("only four sets are played");
    assert_eq!(err, Rejection::SetOutOfRange(5));

    // Clearing one of A's sets frees a slot again.
    let p = apply(&p, format, Mutation::SelectSetWinner { set: 1, side: Side::A });
    assert_eq!(p.set_winners[0], None);
    assert_eq!(set_winner_availability(&p, format, 1, Side::A), Availability::Open);
    assert_eq!(
        set_winner_availability(&p, format, 1, Side::B),
        Availability::MaxReached
    );
    assert_eq!(set_winner_availability(&p, format, 2, Side::A), Availability::Selected);
}

#[test]
fn set_scores_must_be_finished_and_match_set_winner() {
    let format = MatchFormat::BestOfThree;
    let p = with_result(format, Side::A, "2-0");

    let p = apply(&p, format, set_score(1, "6-4"));
    assert_eq!(p.set_score(1), Some(score("6-4")));

    let err = apply_mutation(&p, format, set_score(2, "6-5")).expect_err("unfinished set");
    assert_eq!(err, Rejection::IncompleteSet(score("6-5")));

    let err = apply_mutation(&p, format, set_score(2, "4-6")).expect_err("B did not win set 2");
    assert_eq!(err, Rejection::SetWinnerMismatch(2));

    let err = apply_mutation(&p, format, set_score(2, "8-6")).expect_err("too many games");
    assert_eq!(err, Rejection::MalformedScore("8-6".to_string()));

    let err = apply_mutation(&p, format, set_score(2, "six-four")).expect_err("not a score");
    assert_eq!(err, Rejection::MalformedScore("six-four".to_string()));

    let err = apply_mutation(&p, format, set_score(3, "6-4")).expect_err("no third set");
    assert_eq!(err, Rejection::SectionLocked(SectionId::SetScore(3)));

    let cleared = apply(&p, format, set_score(1, ""));
    assert_eq!(cleared.set_score(1), None);
}

#[test]
fn set_score_is_locked_before_result() {
    let format = MatchFormat::BestOfThree;
    let p = apply(&PredictionOptions::default(), format, Mutation::SelectWinner(Side::A));
    let err = apply_mutation(&p, format, set_score(1, "6-4")).expect_err("no result yet");
    assert_eq!(err, Rejection::SectionLocked(SectionId::SetScore(1)));
}

#[test]
fn seven_six_unlocks_tiebreak_for_that_set_only() {
    let format = MatchFormat::BestOfThree;
    let p = with_result(format, Side::A, "2-0");
    let p = apply(&p, format, set_score(1, "7-6"));
    let p = apply(&p, format, set_score(2, "6-3"));

    let sections = visible_sections(&p, format);
    assert!(sections.contains(&SectionId::TiebreakScore(1)));
    assert!(!sections.contains(&SectionId::TiebreakScore(2)));

    let err = apply_mutation(
        &p,
        format,
        Mutation::SetTiebreakScore {
            set: 2,
            token: "7-3".to_string(),
        },
    )
    .expect_err("set 2 went 6-3");
    assert_eq!(err, Rejection::SectionLocked(SectionId::TiebreakScore(2)));

    let err = apply_mutation(
        &p,
        format,
        Mutation::SetTiebreakScore {
            set: 1,
            token: "5-7".to_string(),
        },
    )
    .expect_err("tiebreak must go to the set winner");
    assert_eq!(err, Rejection::InvalidTiebreak("5-7".to_string()));

    let p = apply(
        &p,
        format,
        Mutation::SetTiebreakScore {
            set: 1,
            token: "7-5".to_string(),
        },
    );
    assert_eq!(p.tiebreak_score(1), Some(score("7-5")));
}

#[test]
fn super_tiebreak_follows_match_winner() {
    let format = MatchFormat::BestOfThreeSuperTiebreak;
    let p = with_result(format, Side::A, "2-1");
    assert!(visible_sections(&p, format).contains(&SectionId::SuperTiebreak));

    let err = apply_mutation(&p, format, Mutation::SetSuperTiebreakScore("8-10".to_string()))
        .expect_err("A won the match");
    assert_eq!(err, Rejection::InvalidSuperTiebreak("8-10".to_string()));

    let p = apply(&p, format, Mutation::SetSuperTiebreakScore("10-8".to_string()));
    assert_eq!(p.super_tiebreak_score, Some(score("10-8")));
    assert_eq!(p.super_tiebreak_winner, Some(Side::A));

    let p = apply(&p, format, Mutation::SetSuperTiebreakScore(String::new()));
    assert_eq!(p.super_tiebreak_score, None);
    assert_eq!(p.super_tiebreak_winner, None);
}

#[test]
fn super_tiebreak_only_in_amateur_format() {
    let format = MatchFormat::BestOfThree;
    let p = with_result(format, Side::A, "2-1");
    assert!(!visible_sections(&p, format).contains(&SectionId::SuperTiebreak));
    let err = apply_mutation(&p, format, Mutation::SetSuperTiebreakScore("10-8".to_string()))
        .expect_err("no super tiebreak in this format");
    assert_eq!(err, Rejection::SectionLocked(SectionId::SuperTiebreak));

    let p = with_result(MatchFormat::BestOfThreeSuperTiebreak, Side::A, "2-0");
    assert!(
        !visible_sections(&p, MatchFormat::BestOfThreeSuperTiebreak)
            .contains(&SectionId::SuperTiebreak)
    );
}

#[test]
fn rejected_edit_leaves_record_untouched() {
    let format = MatchFormat::BestOfThree;
    let p = with_result(format, Side::A, "2-0");
    let p = apply(&p, format, set_score(1, "6-2"));
    let before = p.clone();
    assert!(apply_mutation(&p, format, set_score(2, "2-6")).is_err());
    assert_eq!(p, before);
}

#[test]
fn changing_result_keeps_old_detail_and_flags_it() {
    let format = MatchFormat::BestOfThree;
    let p = with_result(format, Side::A, "2-0");
    let p = apply(&p, format, set_score(1, "6-4"));
    let p = apply(&p, format, set_score(2, "6-3"));

    let p = apply(&p, format, Mutation::SelectMatchResult(score("2-1")));
    assert_eq!(p.match_result, Some(score("2-1")));
    assert_eq!(p.set_score(1), Some(score("6-4")));
    assert_eq!(p.set_score(2), Some(score("6-3")));
    // The filled-in straight-sets winners go; the typed scores wait for set 1.
    assert!(p.set_winners.iter().all(Option::is_none));
    assert_eq!(implied_set_winner(&p, format, 1), None);
    assert_eq!(
        stale_fields(&p, format),
        vec![SectionId::SetScore(1), SectionId::SetScore(2)]
    );

    let picked = apply(
        &p,
        format,
        Mutation::SelectSetWinner {
            set: 1,
            side: Side::A,
        },
    );
    assert_eq!(stale_fields(&picked, format), vec![SectionId::SetScore(2)]);

    // Flipping the winner strands everything below it.
    let p = apply(&p, format, Mutation::SelectWinner(Side::B));
    let stale = stale_fields(&p, format);
    assert!(stale.contains(&SectionId::MatchResult));
    assert!(stale.contains(&SectionId::SetScore(1)));
    assert_eq!(visible_sections(&p, format).len(), 1);
}

#[test]
fn decider_ignores_set_winners_that_do_not_pair_up() {
    let format = MatchFormat::BestOfThree;
    let mut p = with_result(format, Side::A, "2-1");
    // A restored record can carry a pair no edit would produce.
    p.set_winners[0] = Some(Side::A);
    p.set_winners[1] = Some(Side::A);

    assert_eq!(implied_set_winner(&p, format, 1), None);
    assert_eq!(implied_set_winner(&p, format, 2), None);
    assert!(!visible_sections(&p, format).contains(&SectionId::SetScore(1)));
    assert_eq!(
        stale_fields(&p, format),
        vec![SectionId::SetWinner(1), SectionId::SetWinner(2)]
    );
    assert_eq!(set_winner_availability(&p, format, 1, Side::A), Availability::Open);

    let p = apply(
        &p,
        format,
        Mutation::SelectSetWinner {
            set: 1,
            side: Side::A,
        },
    );
    assert_eq!(p.set_winners[..2], [Some(Side::A), Some(Side::B)]);
    assert_eq!(implied_set_winner(&p, format, 1), Some(Side::A));
}

#[test]
fn clear_all_resets_every_field() {
    let format = MatchFormat::BestOfThree;
    let p = with_result(format, Side::A, "2-0");
    let p = apply(&p, format, set_score(1, "6-4"));
    let p = apply(&p, format, Mutation::ClearAll);
    assert_eq!(p, PredictionOptions::default());
}

#[test]
fn choices_are_oriented_to_the_set_winner() {
    let format = MatchFormat::BestOfFive;
    let p = apply(&PredictionOptions::default(), format, Mutation::SelectWinner(Side::B));
    let results: Vec<String> = section_choices(&p, format, SectionId::MatchResult)
        .iter()
        .filter_map(Mutation::value_label)
        .collect();
    assert_eq!(results, vec!["0-3", "1-3", "2-3"]);

    let p = with_result(format, Side::B, "0-3");
    let first = section_choices(&p, format, SectionId::SetScore(1));
    assert_eq!(first.first(), Some(&set_score(1, "0-6")));
    for mutation in first {
        assert!(apply_mutation(&p, format, mutation).is_ok());
    }
}

#[test]
fn clear_section_empties_the_focused_field() {
    let format = MatchFormat::BestOfThree;
    let p = with_result(format, Side::A, "2-1");
    let p = apply(&p, format, Mutation::SelectSetWinner { set: 1, side: Side::B });
    assert_eq!(
        section_value(&p, format, SectionId::SetWinner(1)),
        Some("B".to_string())
    );

    let clear = clear_section(&p, SectionId::SetWinner(1)).expect("set 1 is filled");
    let p = apply(&p, format, clear);
    assert_eq!(p.set_winners[0], None);
    assert_eq!(clear_section(&p, SectionId::SetScore(1)), None);

    let clear = clear_section(&p, SectionId::MatchResult).expect("result is filled");
    let p = apply(&p, format, clear);
    assert_eq!(p.match_result, None);
}
