//! Core types shared by the score engine and the calendar normalizer
//!
//! Timestamps are plain epoch milliseconds (`i64`). Whether a value is a raw
//! UTC instant or a "local-naive" instant (zone offset already added) is a
//! convention of the caller; the doc of each operation says which it expects.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::StrengthError;

/// Number of milliseconds in one calendar day
pub const MILLISECONDS_IN_ONE_DAY: i64 = 24 * 60 * 60 * 1000;

/// Score value representing a saturated, perfect streak
pub const MAX_SCORE: u32 = 19_259_478;

/// Outcome of a single day's checkmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckmarkOutcome {
    Unchecked,
    CheckedImplicitly,
    CheckedExplicitly,
}

impl CheckmarkOutcome {
    /// Numeric code used by storage and FFI callers (0, 1, 2)
    pub fn code(&self) -> u8 {
        match self {
            CheckmarkOutcome::Unchecked => 0,
            CheckmarkOutcome::CheckedImplicitly => 1,
            CheckmarkOutcome::CheckedExplicitly => 2,
        }
    }

    pub fn from_code(code: i64) -> Result<Self, StrengthError> {
        match code {
            0 => Ok(CheckmarkOutcome::Unchecked),
            1 => Ok(CheckmarkOutcome::CheckedImplicitly),
            2 => Ok(CheckmarkOutcome::CheckedExplicitly),
            other => Err(StrengthError::InvalidArgument(format!(
                "unknown checkmark code {other}"
            ))),
        }
    }

    /// Whether this outcome boosts the score
    pub fn is_explicit(&self) -> bool {
        matches!(self, CheckmarkOutcome::CheckedExplicitly)
    }
}

impl FromStr for CheckmarkOutcome {
    type Err = StrengthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "." | "unchecked" => Ok(CheckmarkOutcome::Unchecked),
            "1" | "i" | "implicit" | "checked_implicitly" => Ok(CheckmarkOutcome::CheckedImplicitly),
            "2" | "x" | "explicit" | "checked_explicitly" => Ok(CheckmarkOutcome::CheckedExplicitly),
            other => Err(StrengthError::ParseError(format!(
                "unknown checkmark '{other}'"
            ))),
        }
    }
}

/// Parse a whitespace- or comma-separated checkmark sequence, oldest first,
/// e.g. `"2 0 1 2"` or `"x,.,i,x"`.
pub fn parse_outcomes(input: &str) -> Result<Vec<CheckmarkOutcome>, StrengthError> {
    input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(str::parse)
        .collect()
}

/// Habit strength at the start of a given day.
///
/// Produced by the score engine and never mutated afterwards. Equality and
/// ordering look at the timestamp only, so two scores for the same day
/// compare equal whatever their values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "RawScore")]
pub struct Score {
    /// Start of the day this score belongs to (epoch millis, UTC-normalized)
    timestamp: i64,
    /// Strength value in `[0, MAX_SCORE]`
    value: u32,
}

#[derive(Deserialize)]
struct RawScore {
    timestamp: i64,
    value: u32,
}

impl TryFrom<RawScore> for Score {
    type Error = StrengthError;

    fn try_from(raw: RawScore) -> Result<Self, Self::Error> {
        if raw.value > MAX_SCORE {
            return Err(StrengthError::InvalidArgument(format!(
                "score value {} above maximum {MAX_SCORE}",
                raw.value
            )));
        }
        Ok(Self {
            timestamp: raw.timestamp,
            value: raw.value,
        })
    }
}

impl Score {
    pub fn new(timestamp: i64, value: u32) -> Self {
        Self {
            timestamp,
            value: value.min(MAX_SCORE),
        }
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    /// Order two scores by recency only; values are ignored.
    pub fn compare_newer(&self, other: &Score) -> Ordering {
        self.cmp(other)
    }

    /// Value scaled to `[0, 1]` for display
    pub fn fraction(&self) -> f64 {
        self.value as f64 / MAX_SCORE as f64
    }
}

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp
    }
}

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp.cmp(&other.timestamp)
    }
}

impl Hash for Score {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.timestamp.hash(state);
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timestamp {} value {}", self.timestamp, self.value)
    }
}

/// Calendar unit selected by `TimeNormalizer::truncate`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TruncateUnit {
    Month,
    Week,
    Quarter,
    Year,
}

impl TruncateUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TruncateUnit::Month => "month",
            TruncateUnit::Week => "week",
            TruncateUnit::Quarter => "quarter",
            TruncateUnit::Year => "year",
        }
    }
}

impl FromStr for TruncateUnit {
    type Err = StrengthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "month" => Ok(TruncateUnit::Month),
            "week" | "week_number" => Ok(TruncateUnit::Week),
            "quarter" => Ok(TruncateUnit::Quarter),
            "year" => Ok(TruncateUnit::Year),
            other => Err(StrengthError::InvalidArgument(format!(
                "unknown truncate unit '{other}'"
            ))),
        }
    }
}

/// Long ("Monday") or short ("Mon") weekday names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameFormat {
    Long,
    Short,
}

/// Clock-time presentation preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFormat {
    #[default]
    TwelveHour,
    TwentyFourHour,
}

/// Convert a calendar weekday (Sunday=1 … Saturday=7) to the internal
/// numbering (Saturday=0 … Friday=6).
pub fn weekday_from_calendar(number: u32) -> Result<u32, StrengthError> {
    if !(1..=7).contains(&number) {
        return Err(StrengthError::InvalidArgument(format!(
            "calendar weekday {number} outside 1..=7"
        )));
    }
    Ok(number % 7)
}

/// Convert an internal weekday (Saturday=0 … Friday=6) back to the calendar
/// numbering (Sunday=1 … Saturday=7).
pub fn weekday_to_calendar(weekday: u32) -> Result<u32, StrengthError> {
    if weekday > 6 {
        return Err(StrengthError::InvalidArgument(format!(
            "weekday {weekday} outside 0..=6"
        )));
    }
    Ok(if weekday == 0 { 7 } else { weekday })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_conversion() {
        // Sunday=1 -> 1, Saturday=7 -> 0, Friday=6 -> 6
        assert_eq!(weekday_from_calendar(1).unwrap(), 1);
        assert_eq!(weekday_from_calendar(7).unwrap(), 0);
        assert_eq!(weekday_from_calendar(6).unwrap(), 6);

        for n in 1..=7 {
            let internal = weekday_from_calendar(n).unwrap();
            assert_eq!(weekday_to_calendar(internal).unwrap(), n);
        }
    }

    #[test]
    fn test_weekday_conversion_rejects_out_of_range() {
        assert!(weekday_from_calendar(0).is_err());
        assert!(weekday_from_calendar(8).is_err());
        assert!(weekday_to_calendar(7).is_err());
    }

    #[test]
    fn test_checkmark_codes() {
        for code in 0..=2 {
            assert_eq!(CheckmarkOutcome::from_code(code).unwrap().code() as i64, code);
        }
        assert!(CheckmarkOutcome::from_code(3).is_err());
        assert!(CheckmarkOutcome::CheckedExplicitly.is_explicit());
        assert!(!CheckmarkOutcome::CheckedImplicitly.is_explicit());
    }

    #[test]
    fn test_parse_outcomes() {
        use CheckmarkOutcome::*;
        assert_eq!(
            parse_outcomes("2 0 1\n2").unwrap(),
            vec![CheckedExplicitly, Unchecked, CheckedImplicitly, CheckedExplicitly]
        );
        assert_eq!(parse_outcomes("x,.,i").unwrap(), vec![CheckedExplicitly, Unchecked, CheckedImplicitly]);
        assert!(parse_outcomes("").unwrap().is_empty());
        assert!(matches!(parse_outcomes("2 3"), Err(StrengthError::ParseError(_))));
    }

    #[test]
    fn test_score_clamps_and_orders_by_timestamp() {
        let a = Score::new(1_000, MAX_SCORE + 5);
        assert_eq!(a.value(), MAX_SCORE);
        assert!((a.fraction() - 1.0).abs() < 1e-12);

        let b = Score::new(2_000, 0);
        assert_eq!(a.compare_newer(&b), Ordering::Less);
        assert_eq!(b.compare_newer(&a), Ordering::Greater);
        assert_eq!(a.compare_newer(&Score::new(1_000, 7)), Ordering::Equal);
    }

    #[test]
    fn test_score_equality_ignores_value() {
        let a = Score::new(1_000, 5);
        let b = Score::new(1_000, 7);
        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), a.compare_newer(&b));

        let later = Score::new(2_000, 1);
        assert!(a < later);
        assert_eq!(a.cmp(&later), a.compare_newer(&later));
        assert_eq!(later.cmp(&a), later.compare_newer(&a));

        let days: std::collections::HashSet<Score> = [a, b, later].into_iter().collect();
        assert_eq!(days.len(), 2);
    }

    #[test]
    fn test_score_deserialize_rejects_value_above_max() {
        let ok: Score = serde_json::from_str(r#"{"timestamp":0,"value":19259478}"#).unwrap();
        assert_eq!(ok.value(), MAX_SCORE);

        let err = serde_json::from_str::<Score>(r#"{"timestamp":0,"value":20259478}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_truncate_unit_parse() {
        assert_eq!("Month".parse::<TruncateUnit>().unwrap(), TruncateUnit::Month);
        assert_eq!("week_number".parse::<TruncateUnit>().unwrap(), TruncateUnit::Week);
        assert!(matches!(
            "fortnight".parse::<TruncateUnit>(),
            Err(StrengthError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&CheckmarkOutcome::CheckedExplicitly).unwrap();
        assert_eq!(json, "\"checked_explicitly\"");
        let unit: TruncateUnit = serde_json::from_str("\"quarter\"").unwrap();
        assert_eq!(unit, TruncateUnit::Quarter);
    }
}
