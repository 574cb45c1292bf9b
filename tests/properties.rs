//! Property tests for the score engine and the calendar normalizer
//!
//! Properties:
//! - decay never increases a score without an explicit check
//! - an explicit check never scores lower than no check, and never above MAX_SCORE
//! - MAX_SCORE is stable under explicit checks for frequencies up to 1
//! - recency ordering is a total order that agrees with equality
//! - score histories reject timestamps past the timeline instead of panicking
//! - truncating to the start of a day keeps the weekday
//! - truncating to a year is idempotent
//! - day distance is symmetric and zero on the diagonal

use chrono::{Datelike, TimeZone, Utc};
use habit_strength::calendar;
use habit_strength::{
    CheckmarkOutcome, EnglishNames, FixedClock, Score, ScoreEngine, ScoreHistory, StrengthError,
    TimeNormalizer, TruncateUnit, MAX_SCORE,
};
use proptest::prelude::*;

type Normalizer = TimeNormalizer<FixedClock, Utc, EnglishNames>;

fn normalizer() -> Normalizer {
    TimeNormalizer::new(FixedClock(0), Utc, EnglishNames)
}

fn arb_frequency() -> impl Strategy<Value = f64> {
    // Open interval (0, 14)
    (1u32..14_000u32).prop_map(|n| n as f64 / 1000.0)
}

fn arb_score() -> impl Strategy<Value = u32> {
    0..=MAX_SCORE
}

fn arb_outcome() -> impl Strategy<Value = CheckmarkOutcome> {
    prop_oneof![
        Just(CheckmarkOutcome::Unchecked),
        Just(CheckmarkOutcome::CheckedImplicitly),
        Just(CheckmarkOutcome::CheckedExplicitly),
    ]
}

/// Year 1 through year 9999, in millis
fn arb_timestamp() -> impl Strategy<Value = i64> {
    -62_135_596_800_000i64..253_402_300_799_000i64
}

proptest! {
    #[test]
    fn prop_decay_never_increases(frequency in arb_frequency(), previous in arb_score()) {
        let score = ScoreEngine::compute(frequency, previous, CheckmarkOutcome::Unchecked);
        prop_assert!(score <= previous);
    }

    #[test]
    fn prop_explicit_check_dominates(
        frequency in arb_frequency(),
        previous in arb_score(),
        outcome in arb_outcome(),
    ) {
        let checked = ScoreEngine::compute(frequency, previous, CheckmarkOutcome::CheckedExplicitly);
        let other = ScoreEngine::compute(frequency, previous, outcome);
        prop_assert!(checked >= other);
        prop_assert!(checked <= MAX_SCORE);
    }

    #[test]
    fn prop_saturation_is_stable(frequency in (1u32..=1000u32).prop_map(|n| n as f64 / 1000.0)) {
        // Holds up to one repetition per day; faster decay drops below the cap.
        prop_assert_eq!(
            ScoreEngine::compute(frequency, MAX_SCORE, CheckmarkOutcome::CheckedExplicitly),
            MAX_SCORE
        );
    }

    #[test]
    fn prop_compare_newer_is_total_order(
        mut scores in prop::collection::vec((any::<i64>(), arb_score()), 1..40)
            .prop_map(|v| v.into_iter().map(|(t, s)| Score::new(t, s)).collect::<Vec<_>>())
    ) {
        scores.sort_by(|a, b| a.compare_newer(b));
        for pair in scores.windows(2) {
            prop_assert!(ScoreEngine::compare_newer(&pair[0], &pair[1]) <= 0);
            prop_assert!(ScoreEngine::compare_newer(&pair[1], &pair[0]) >= 0);
        }
        for a in &scores {
            for b in &scores {
                prop_assert_eq!(ScoreEngine::compare_newer(a, b), -ScoreEngine::compare_newer(b, a));
                prop_assert_eq!(a.cmp(b), a.compare_newer(b));
                prop_assert_eq!(a == b, a.timestamp() == b.timestamp());
            }
        }
        if let (Some(first), Some(last)) = (scores.first(), scores.last()) {
            prop_assert!(ScoreEngine::compare_newer(first, last) <= 0);
        }
    }

    #[test]
    fn prop_history_never_panics_on_first_day(first_day in any::<i64>(), days in 0usize..4) {
        let outcomes = vec![CheckmarkOutcome::CheckedExplicitly; days];
        match ScoreHistory::compute(1.0, first_day, &outcomes) {
            Ok(history) => prop_assert_eq!(history.len(), days),
            Err(e) => prop_assert!(matches!(e, StrengthError::InvalidTimestamp(_))),
        }
    }

    #[test]
    fn prop_start_of_day_keeps_weekday(t in arb_timestamp()) {
        prop_assert_eq!(
            calendar::get_weekday(calendar::get_start_of_day(t).unwrap()),
            calendar::get_weekday(t)
        );
    }

    #[test]
    fn prop_truncate_year_is_idempotent(t in arb_timestamp()) {
        let n = normalizer();
        let once = n.truncate(TruncateUnit::Year, t).unwrap();
        prop_assert_eq!(n.truncate(TruncateUnit::Year, once).unwrap(), once);
    }

    #[test]
    fn prop_truncate_month_keeps_month(t in arb_timestamp()) {
        let n = normalizer();
        let original = Utc.timestamp_millis_opt(t).unwrap();
        let truncated = Utc.timestamp_millis_opt(n.truncate(TruncateUnit::Month, t).unwrap()).unwrap();
        prop_assert_eq!(truncated.day(), 1);
        prop_assert_eq!(truncated.month(), original.month());
        prop_assert_eq!(truncated.year(), original.year());
    }

    #[test]
    fn prop_truncate_week_lands_on_first_day(t in arb_timestamp(), first in 1u32..=7) {
        let n = normalizer().with_first_day_of_week(first).unwrap();
        let start = n.truncate(TruncateUnit::Week, t).unwrap();
        prop_assert!(start <= t);
        prop_assert!(calendar::get_days_between(start, t) < 7);
        prop_assert_eq!(calendar::get_weekday(start), first % 7);
    }

    #[test]
    fn prop_days_between_symmetric(t1 in arb_timestamp(), t2 in arb_timestamp()) {
        prop_assert_eq!(calendar::get_days_between(t1, t1), 0);
        prop_assert_eq!(
            calendar::get_days_between(t1, t2),
            calendar::get_days_between(t2, t1)
        );
    }
}
