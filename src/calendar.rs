//! Timezone-independent calendar normalization
//!
//! Event timestamps are shifted into a "local-naive" timeline (the zone offset
//! added to the UTC instant) so that day, week, month, quarter and year
//! boundaries can be found with fixed-offset arithmetic. All calendar fields
//! are evaluated in UTC on that shifted timeline.
//!
//! Weekdays use two numberings:
//! - calendar numbering: Sunday=1 … Saturday=7 (first-day-of-week settings)
//! - internal numbering: Saturday=0 … Friday=6 (weekday sets, `get_weekday`)

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::clock::{Clock, SystemClock, Zone, ZoneSpec};
use crate::error::StrengthError;
use crate::locale::{LocaleTag, WeekdayNameProvider};
use crate::types::{
    weekday_from_calendar, NameFormat, TimeFormat, TruncateUnit, MILLISECONDS_IN_ONE_DAY,
};

/// 1970-01-01 was a Thursday (calendar weekday 5)
const EPOCH_CALENDAR_WEEKDAY: i64 = 5;

/// Calendar normalizer bound to a clock, a zone and a weekday-name catalog
#[derive(Debug, Clone)]
pub struct TimeNormalizer<C = SystemClock, Z = ZoneSpec, N = LocaleTag> {
    clock: C,
    zone: Z,
    names: N,
    /// Calendar numbering, Sunday=1
    first_day_of_week: u32,
    time_format: TimeFormat,
}

impl<C: Clock, Z: Zone, N: WeekdayNameProvider> TimeNormalizer<C, Z, N> {
    /// Create a normalizer with Sunday as first day of week and 12-hour times
    pub fn new(clock: C, zone: Z, names: N) -> Self {
        Self {
            clock,
            zone,
            names,
            first_day_of_week: 1,
            time_format: TimeFormat::default(),
        }
    }

    /// Set the first day of week in calendar numbering (Sunday=1 … Saturday=7)
    pub fn with_first_day_of_week(mut self, first_day_of_week: u32) -> Result<Self, StrengthError> {
        weekday_from_calendar(first_day_of_week)?;
        self.first_day_of_week = first_day_of_week;
        Ok(self)
    }

    pub fn with_time_format(mut self, time_format: TimeFormat) -> Self {
        self.time_format = time_format;
        self
    }

    pub fn first_day_of_week(&self) -> u32 {
        self.first_day_of_week
    }

    pub fn zone(&self) -> &Z {
        &self.zone
    }

    pub fn names(&self) -> &N {
        &self.names
    }

    // ------------------------------------------------------------------
    // Clock and zone
    // ------------------------------------------------------------------

    /// Current time shifted so that midnight falls on local day boundaries.
    ///
    /// A clock with a pinned local time is returned unchanged.
    pub fn get_local_time(&self) -> Result<i64, StrengthError> {
        if let Some(fixed) = self.clock.fixed_local_time() {
            return Ok(fixed);
        }
        let now = self.clock.now_millis();
        now.checked_add(self.zone.offset_millis_at(now))
            .ok_or(StrengthError::InvalidTimestamp(now))
    }

    /// Convert a local-naive timestamp back to a UTC instant.
    ///
    /// The offset is resolved at the instant obtained by subtracting the
    /// offset found at `local_timestamp` itself. This round-trips
    /// [`TimeNormalizer::remove_timezone`] exactly in zones without
    /// daylight saving; within one DST delta before a backward transition
    /// the result is late by that delta.
    pub fn apply_timezone(&self, local_timestamp: i64) -> Result<i64, StrengthError> {
        let first = self.zone.offset_millis_at(local_timestamp);
        local_timestamp
            .checked_sub(first)
            .map(|shifted| self.zone.offset_millis_at(shifted))
            .and_then(|offset| local_timestamp.checked_sub(offset))
            .ok_or(StrengthError::InvalidTimestamp(local_timestamp))
    }

    /// Convert a UTC instant into the local-naive timeline
    pub fn remove_timezone(&self, timestamp: i64) -> Result<i64, StrengthError> {
        timestamp
            .checked_add(self.zone.offset_millis_at(timestamp))
            .ok_or(StrengthError::InvalidTimestamp(timestamp))
    }

    // ------------------------------------------------------------------
    // Days
    // ------------------------------------------------------------------

    pub fn get_start_of_today(&self) -> Result<i64, StrengthError> {
        get_start_of_day(self.get_local_time()?)
    }

    pub fn milliseconds_until_tomorrow(&self) -> Result<i64, StrengthError> {
        let now = self.get_local_time()?;
        Ok(MILLISECONDS_IN_ONE_DAY - now.rem_euclid(MILLISECONDS_IN_ONE_DAY))
    }

    /// Today's date on the normalized timeline
    pub fn get_start_of_today_date(&self) -> Result<NaiveDate, StrengthError> {
        Ok(decompose(self.get_start_of_today()?)?.date_naive())
    }

    // ------------------------------------------------------------------
    // Weekdays
    // ------------------------------------------------------------------

    /// Start of the enclosing calendar unit, time-of-day zeroed
    pub fn truncate(&self, unit: TruncateUnit, timestamp: i64) -> Result<i64, StrengthError> {
        let date = decompose(timestamp)?.date_naive();
        let (year, month) = (date.year(), date.month());

        let start = match unit {
            TruncateUnit::Month => NaiveDate::from_ymd_opt(year, month, 1),
            TruncateUnit::Week => {
                let weekday = date.weekday().number_from_sunday();
                let delta = (weekday + 7 - self.first_day_of_week) % 7;
                date.checked_sub_days(Days::new(delta as u64))
            }
            TruncateUnit::Quarter => {
                let quarter = date.month0() / 3;
                NaiveDate::from_ymd_opt(year, quarter * 3 + 1, 1)
            }
            TruncateUnit::Year => NaiveDate::from_ymd_opt(year, 1, 1),
        }
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .ok_or(StrengthError::InvalidTimestamp(timestamp))?;

        Ok(Utc.from_utc_datetime(&start).timestamp_millis())
    }

    /// [`TimeNormalizer::truncate`] with the unit given by name
    pub fn truncate_named(&self, unit: &str, timestamp: i64) -> Result<i64, StrengthError> {
        self.truncate(unit.parse()?, timestamp)
    }

    /// Seven names in internal order, index 0 = Saturday
    pub fn get_day_names(&self, format: NameFormat) -> [String; 7] {
        let sunday_first = self.names.day_names(format);
        std::array::from_fn(|i| sunday_first[(i + 6) % 7].clone())
    }

    pub fn get_long_day_names(&self) -> [String; 7] {
        self.get_day_names(NameFormat::Long)
    }

    pub fn get_short_day_names(&self) -> [String; 7] {
        self.get_day_names(NameFormat::Short)
    }

    /// Seven names starting at the configured first day of week
    pub fn get_locale_day_names(&self, format: NameFormat) -> [String; 7] {
        let sunday_first = self.names.day_names(format);
        let start = (self.first_day_of_week - 1) as usize;
        std::array::from_fn(|i| sunday_first[(start + i) % 7].clone())
    }

    /// Calendar weekday numbers starting at the configured first day of week,
    /// e.g. `[2, 3, 4, 5, 6, 7, 1]` when weeks start on Monday
    pub fn get_locale_weekday_list(&self) -> [u32; 7] {
        let start = self.first_day_of_week - 1;
        std::array::from_fn(|i| (start + i as u32) % 7 + 1)
    }

    /// Summarize a weekday set indexed in internal order (0 = Saturday).
    ///
    /// First match wins: a single day gives its long name; exactly
    /// Saturday and Sunday give the weekend label; exactly the other five
    /// give the weekdays label; all seven give the every-day label;
    /// anything else joins the short names with ", ".
    pub fn format_weekday_list(&self, weekdays: &[bool; 7]) -> String {
        let short_names = self.get_short_day_names();
        let selected: Vec<usize> = (0..7).filter(|&i| weekdays[i]).collect();

        match selected.len() {
            1 => return self.get_long_day_names()[selected[0]].clone(),
            2 if weekdays[0] && weekdays[1] => return self.names.weekend_label(),
            5 if !weekdays[0] && !weekdays[1] => return self.names.weekdays_label(),
            7 => return self.names.every_day_label(),
            _ => {}
        }

        selected
            .iter()
            .map(|&i| short_names[i].as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    // ------------------------------------------------------------------
    // Presentation
    // ------------------------------------------------------------------

    /// Short weekday name and day of month on two lines, e.g. `"Mon\n15"`
    pub fn format_header_date(&self, timestamp: i64) -> Result<String, StrengthError> {
        let date = decompose(timestamp)?.date_naive();
        let weekday = date.weekday().num_days_from_sunday() as usize;
        let names = self.names.day_names(NameFormat::Short);
        Ok(format!("{}\n{}", names[weekday], date.day()))
    }

    /// Clock time in the configured format, e.g. `"9:05 AM"` or `"09:05"`
    pub fn format_time(&self, hours: u32, minutes: u32) -> Result<String, StrengthError> {
        let time = NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(|| {
            StrengthError::InvalidArgument(format!("invalid time {hours}:{minutes:02}"))
        })?;
        let pattern = match self.time_format {
            TimeFormat::TwelveHour => "%-I:%M %p",
            TimeFormat::TwentyFourHour => "%H:%M",
        };
        Ok(time.format(pattern).to_string())
    }
}

/// Most recent midnight on the normalized timeline
pub fn get_start_of_day(timestamp: i64) -> Result<i64, StrengthError> {
    timestamp
        .checked_sub(timestamp.rem_euclid(MILLISECONDS_IN_ONE_DAY))
        .ok_or(StrengthError::InvalidTimestamp(timestamp))
}

/// Whole days between two timestamps, ignoring DST shifts between them
pub fn get_days_between(t1: i64, t2: i64) -> u64 {
    t1.abs_diff(t2) / MILLISECONDS_IN_ONE_DAY as u64
}

/// Internal weekday (Saturday=0 … Friday=6) of a normalized timestamp
pub fn get_weekday(timestamp: i64) -> u32 {
    calendar_weekday(timestamp) % 7
}

/// Calendar weekday (Sunday=1 … Saturday=7) of a normalized timestamp
fn calendar_weekday(timestamp: i64) -> u32 {
    let days = timestamp.div_euclid(MILLISECONDS_IN_ONE_DAY);
    ((days + EPOCH_CALENDAR_WEEKDAY - 1).rem_euclid(7) + 1) as u32
}

fn decompose(timestamp: i64) -> Result<DateTime<Utc>, StrengthError> {
    DateTime::from_timestamp_millis(timestamp).ok_or(StrengthError::InvalidTimestamp(timestamp))
}
