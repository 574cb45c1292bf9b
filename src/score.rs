//! Habit strength scoring
//!
//! Strength decays exponentially every day and receives a fixed boost on days
//! the habit is explicitly checked. The decay is tuned by the habit's
//! frequency so that a habit performed exactly on target converges towards
//! `MAX_SCORE` without ever jumping to it in one step.

use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};

use crate::calendar::get_start_of_day;
use crate::error::StrengthError;
use crate::types::{CheckmarkOutcome, Score, MAX_SCORE, MILLISECONDS_IN_ONE_DAY};

/// Boost added on an explicitly checked day
pub const CHECK_BOOST: u32 = 1_000_000;

/// Frequency at which the decay exponent divides by zero
pub const FREQUENCY_LIMIT: f64 = 14.0;

/// Stateless score computation
pub struct ScoreEngine;

impl ScoreEngine {
    /// Compute today's score from the previous score and today's checkmark.
    ///
    /// `frequency` is repetitions divided by interval length, e.g. a habit
    /// repeated 3 times in 8 days has frequency `0.375`. The result is only
    /// meaningful for frequencies in `(0, 14)`; use [`ScoreEngine::try_compute`]
    /// to have that checked.
    pub fn compute(frequency: f64, previous_score: u32, outcome: CheckmarkOutcome) -> u32 {
        let multiplier = Self::multiplier(frequency);
        // Float-to-int casts saturate, so out-of-domain inputs stay in range.
        let mut score = (previous_score as f64 * multiplier) as u32;

        if outcome.is_explicit() {
            score = score.saturating_add(CHECK_BOOST).min(MAX_SCORE);
        }

        score
    }

    /// Like [`ScoreEngine::compute`] but rejects frequencies outside `(0, 14)`.
    pub fn try_compute(
        frequency: f64,
        previous_score: u32,
        outcome: CheckmarkOutcome,
    ) -> Result<u32, StrengthError> {
        Self::validate_frequency(frequency)?;
        Ok(Self::compute(
            frequency,
            previous_score.min(MAX_SCORE),
            outcome,
        ))
    }

    /// Daily decay multiplier, `0.5 ^ (1 / (14 / frequency - 1))`
    pub fn multiplier(frequency: f64) -> f64 {
        0.5_f64.powf(1.0 / (FREQUENCY_LIMIT / frequency - 1.0))
    }

    /// Number of unchecked days for a score to halve
    pub fn half_life_days(frequency: f64) -> f64 {
        FREQUENCY_LIMIT / frequency - 1.0
    }

    /// Frequency of a habit repeated `repetitions` times every `interval_days`
    pub fn frequency(repetitions: u32, interval_days: u32) -> Result<f64, StrengthError> {
        if interval_days == 0 {
            return Err(StrengthError::InvalidArgument(
                "interval must be at least one day".to_string(),
            ));
        }
        let frequency = repetitions as f64 / interval_days as f64;
        Self::validate_frequency(frequency)?;
        Ok(frequency)
    }

    /// Sign of `a.timestamp - b.timestamp`: `-1`, `0` or `1`
    pub fn compare_newer(a: &Score, b: &Score) -> i32 {
        match a.compare_newer(b) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }
    }

    fn validate_frequency(frequency: f64) -> Result<(), StrengthError> {
        if frequency.is_finite() && frequency > 0.0 && frequency < FREQUENCY_LIMIT {
            Ok(())
        } else {
            tracing::warn!(frequency, "frequency outside the decay domain");
            Err(StrengthError::InvalidFrequency(frequency))
        }
    }
}

/// Day-by-day score series for one habit, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreHistory {
    scores: Vec<Score>,
}

impl ScoreHistory {
    /// Run the engine once per day, starting from a zero score.
    ///
    /// `outcomes[0]` belongs to the day containing `first_day`; each
    /// following outcome belongs to the next day.
    pub fn compute(
        frequency: f64,
        first_day: i64,
        outcomes: &[CheckmarkOutcome],
    ) -> Result<Self, StrengthError> {
        Self::compute_from(frequency, first_day, 0, outcomes)
    }

    /// Same as [`ScoreHistory::compute`] but continuing from a known score.
    pub fn compute_from(
        frequency: f64,
        first_day: i64,
        initial_score: u32,
        outcomes: &[CheckmarkOutcome],
    ) -> Result<Self, StrengthError> {
        let first_day = get_start_of_day(first_day)?;
        let mut previous = initial_score.min(MAX_SCORE);
        let mut scores = Vec::with_capacity(outcomes.len());

        for (day, outcome) in outcomes.iter().enumerate() {
            previous = ScoreEngine::try_compute(frequency, previous, *outcome)?;
            let timestamp = i64::try_from(day)
                .ok()
                .and_then(|day| day.checked_mul(MILLISECONDS_IN_ONE_DAY))
                .and_then(|offset| first_day.checked_add(offset))
                .ok_or(StrengthError::InvalidTimestamp(first_day))?;
            scores.push(Score::new(timestamp, previous));
        }

        scores.sort_by_key(|score| Reverse(*score));

        tracing::debug!(
            days = scores.len(),
            frequency,
            latest = scores.first().map(Score::value),
            "computed score history"
        );

        Ok(Self { scores })
    }

    /// Merge additional scores, keeping newest-first order
    pub fn merge(&mut self, other: ScoreHistory) {
        self.scores.extend(other.scores);
        self.scores.sort_by_key(|score| Reverse(*score));
    }

    pub fn latest(&self) -> Option<&Score> {
        self.scores.first()
    }

    /// Score of the day containing `timestamp`, if the history covers it
    pub fn value_at(&self, timestamp: i64) -> Option<u32> {
        let day = get_start_of_day(timestamp).ok()?;
        self.scores
            .iter()
            .find(|s| s.timestamp() == day)
            .map(Score::value)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Score> {
        self.scores.iter()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a stored history, restoring newest-first order
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut history: Self = serde_json::from_str(json)?;
        history.scores.sort_by_key(|score| Reverse(*score));
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use CheckmarkOutcome::*;

    const DAY: i64 = MILLISECONDS_IN_ONE_DAY;

    #[test]
    fn test_first_check_from_zero() {
        let frequency = 3.0 / 8.0;
        assert_eq!(ScoreEngine::compute(frequency, 0, CheckedExplicitly), 1_000_000);
    }

    #[test]
    fn test_daily_decay_without_check() {
        let score = ScoreEngine::compute(1.0, 1_000_000, Unchecked);
        let expected = (1_000_000.0 * 0.5_f64.powf(1.0 / 13.0)) as u32;
        assert_eq!(score, expected);
        assert!((947_000..949_000).contains(&score));
    }

    #[test]
    fn test_implicit_check_only_decays() {
        let a = ScoreEngine::compute(0.5, 5_000_000, CheckedImplicitly);
        let b = ScoreEngine::compute(0.5, 5_000_000, Unchecked);
        assert_eq!(a, b);
        assert!(a < 5_000_000);
    }

    #[test]
    fn test_saturates_at_max() {
        // MAX_SCORE is the fixed point of a daily habit checked every day
        assert_eq!(ScoreEngine::compute(1.0, MAX_SCORE, CheckedExplicitly), MAX_SCORE);
        assert_eq!(ScoreEngine::compute(0.375, MAX_SCORE, CheckedExplicitly), MAX_SCORE);

        // Faster decay cannot hold the maximum with one boost a day
        assert!(ScoreEngine::compute(2.0, MAX_SCORE, CheckedExplicitly) < MAX_SCORE);
        assert_eq!(ScoreEngine::compute(13.9, MAX_SCORE, CheckedExplicitly), CHECK_BOOST);
    }

    #[test]
    fn test_half_life() {
        // Daily habit: half-life of 13 days
        assert!((ScoreEngine::half_life_days(1.0) - 13.0).abs() < 1e-12);

        let mut score = 8_000_000;
        for _ in 0..13 {
            score = ScoreEngine::compute(1.0, score, Unchecked);
        }
        assert!((score as i64 - 4_000_000).abs() < 20);
    }

    #[test]
    fn test_try_compute_rejects_bad_frequency() {
        for bad in [0.0, -1.0, 14.0, 20.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                ScoreEngine::try_compute(bad, 0, Unchecked),
                Err(StrengthError::InvalidFrequency(_))
            ));
        }
        assert_eq!(ScoreEngine::try_compute(0.375, 0, CheckedExplicitly).unwrap(), 1_000_000);
    }

    #[test]
    fn test_frequency_helper() {
        assert!((ScoreEngine::frequency(3, 8).unwrap() - 0.375).abs() < 1e-12);
        assert!(ScoreEngine::frequency(1, 0).is_err());
        assert!(ScoreEngine::frequency(0, 7).is_err());
    }

    #[test]
    fn test_compare_newer() {
        let old = Score::new(DAY, 10);
        let new = Score::new(2 * DAY, 5);
        assert_eq!(ScoreEngine::compare_newer(&old, &new), -1);
        assert_eq!(ScoreEngine::compare_newer(&new, &old), 1);
        assert_eq!(ScoreEngine::compare_newer(&old, &Score::new(DAY, 99)), 0);
    }

    #[test]
    fn test_history_is_newest_first() {
        let history =
            ScoreHistory::compute(1.0, 10 * DAY, &[CheckedExplicitly, Unchecked, CheckedExplicitly])
                .unwrap();

        let timestamps: Vec<i64> = history.iter().map(Score::timestamp).collect();
        assert_eq!(timestamps, vec![12 * DAY, 11 * DAY, 10 * DAY]);

        let day0 = ScoreEngine::compute(1.0, 0, CheckedExplicitly);
        let day1 = ScoreEngine::compute(1.0, day0, Unchecked);
        let day2 = ScoreEngine::compute(1.0, day1, CheckedExplicitly);
        assert_eq!(history.latest().unwrap().value(), day2);
        assert_eq!(history.value_at(11 * DAY + 3_600_000), Some(day1));
        assert_eq!(history.value_at(9 * DAY), None);
    }

    #[test]
    fn test_history_rejects_bad_frequency() {
        assert!(ScoreHistory::compute(14.0, 0, &[Unchecked]).is_err());
        assert!(ScoreHistory::compute(1.0, 0, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_history_merge_and_json() {
        let mut a = ScoreHistory::compute(1.0, 0, &[CheckedExplicitly]).unwrap();
        let b = ScoreHistory::compute_from(1.0, DAY, 1_000_000, &[Unchecked]).unwrap();
        a.merge(b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.latest().unwrap().timestamp(), DAY);

        let restored = ScoreHistory::from_json(&a.to_json().unwrap()).unwrap();
        assert_eq!(restored, a);
        let values: Vec<u32> = restored.iter().map(Score::value).collect();
        assert_eq!(values, a.iter().map(Score::value).collect::<Vec<_>>());
    }

    #[test]
    fn test_history_from_json_rejects_value_above_max() {
        let json = r#"{"scores":[{"timestamp":0,"value":20259478}]}"#;
        assert!(ScoreHistory::from_json(json).is_err());

        let unordered = r#"{"scores":[{"timestamp":0,"value":1},{"timestamp":86400000,"value":2}]}"#;
        let history = ScoreHistory::from_json(unordered).unwrap();
        assert_eq!(history.latest().unwrap().value(), 2);
    }

    #[test]
    fn test_history_merge_keeps_ties_in_insertion_order() {
        let mut a = ScoreHistory::compute(1.0, 0, &[CheckedExplicitly]).unwrap();
        let b = ScoreHistory::compute(1.0, 0, &[Unchecked]).unwrap();
        a.merge(b);
        let values: Vec<u32> = a.iter().map(Score::value).collect();
        assert_eq!(values, vec![CHECK_BOOST, 0]);
    }

    #[test]
    fn test_history_aligns_first_day_to_midnight() {
        let history =
            ScoreHistory::compute(1.0, 3 * DAY + 5 * 3_600_000, &[CheckedExplicitly, Unchecked])
                .unwrap();
        let timestamps: Vec<i64> = history.iter().map(Score::timestamp).collect();
        assert_eq!(timestamps, vec![4 * DAY, 3 * DAY]);
        assert_eq!(history.value_at(3 * DAY + 1), Some(CHECK_BOOST));
    }

    #[test]
    fn test_history_rejects_days_past_representable_range() {
        let result = ScoreHistory::compute(1.0, i64::MAX, &[Unchecked, Unchecked]);
        assert!(matches!(result, Err(StrengthError::InvalidTimestamp(_))));
        let result = ScoreHistory::compute(1.0, i64::MAX - DAY / 2, &[Unchecked; 3]);
        assert!(matches!(result, Err(StrengthError::InvalidTimestamp(_))));
        assert!(ScoreHistory::compute(1.0, i64::MIN, &[Unchecked]).is_err());
        assert_eq!(ScoreHistory::compute(1.0, 0, &[Unchecked]).unwrap().value_at(i64::MIN), None);
    }
}
