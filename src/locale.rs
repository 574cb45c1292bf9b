//! Weekday name catalogs
//!
//! The calendar normalizer never consults ambient locale state. It asks a
//! [`WeekdayNameProvider`] for names and summary labels instead.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::StrengthError;
use crate::types::NameFormat;

/// Weekday names and weekday-set labels for one locale
pub trait WeekdayNameProvider {
    /// Seven names, starting at Sunday
    fn day_names(&self, format: NameFormat) -> [String; 7];

    /// Label for exactly Saturday and Sunday
    fn weekend_label(&self) -> String;

    /// Label for exactly Monday through Friday
    fn weekdays_label(&self) -> String;

    /// Label for all seven days
    fn every_day_label(&self) -> String;
}

/// English weekday names
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishNames;

impl WeekdayNameProvider for EnglishNames {
    fn day_names(&self, format: NameFormat) -> [String; 7] {
        let names = match format {
            NameFormat::Long => [
                "Sunday",
                "Monday",
                "Tuesday",
                "Wednesday",
                "Thursday",
                "Friday",
                "Saturday",
            ],
            NameFormat::Short => ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
        };
        names.map(String::from)
    }

    fn weekend_label(&self) -> String {
        "Weekends".to_string()
    }

    fn weekdays_label(&self) -> String {
        "Mon - Fri".to_string()
    }

    fn every_day_label(&self) -> String {
        "Any day of the week".to_string()
    }
}

/// Korean weekday names
#[derive(Debug, Clone, Copy, Default)]
pub struct KoreanNames;

impl WeekdayNameProvider for KoreanNames {
    fn day_names(&self, format: NameFormat) -> [String; 7] {
        let names = match format {
            NameFormat::Long => [
                "일요일", "월요일", "화요일", "수요일", "목요일", "금요일", "토요일",
            ],
            NameFormat::Short => ["일", "월", "화", "수", "목", "금", "토"],
        };
        names.map(String::from)
    }

    fn weekend_label(&self) -> String {
        "주말".to_string()
    }

    fn weekdays_label(&self) -> String {
        "월 ~ 금".to_string()
    }

    fn every_day_label(&self) -> String {
        "한 주의 어떤 날".to_string()
    }
}

/// Built-in catalogs selectable from configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocaleTag {
    #[default]
    En,
    Ko,
}

impl LocaleTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocaleTag::En => "en",
            LocaleTag::Ko => "ko",
        }
    }

    /// Conventional first day of week (calendar numbering, Sunday=1)
    pub fn default_first_day_of_week(&self) -> u32 {
        match self {
            LocaleTag::En | LocaleTag::Ko => 1,
        }
    }
}

impl FromStr for LocaleTag {
    type Err = StrengthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        // Region suffixes ("en-US", "ko_KR") select the same catalog.
        let language = lower.split(['-', '_']).next().unwrap_or_default();
        match language {
            "en" => Ok(LocaleTag::En),
            "ko" => Ok(LocaleTag::Ko),
            _ => Err(StrengthError::InvalidArgument(format!(
                "unsupported locale '{}'",
                s.trim()
            ))),
        }
    }
}

impl WeekdayNameProvider for LocaleTag {
    fn day_names(&self, format: NameFormat) -> [String; 7] {
        match self {
            LocaleTag::En => EnglishNames.day_names(format),
            LocaleTag::Ko => KoreanNames.day_names(format),
        }
    }

    fn weekend_label(&self) -> String {
        match self {
            LocaleTag::En => EnglishNames.weekend_label(),
            LocaleTag::Ko => KoreanNames.weekend_label(),
        }
    }

    fn weekdays_label(&self) -> String {
        match self {
            LocaleTag::En => EnglishNames.weekdays_label(),
            LocaleTag::Ko => KoreanNames.weekdays_label(),
        }
    }

    fn every_day_label(&self) -> String {
        match self {
            LocaleTag::En => EnglishNames.every_day_label(),
            LocaleTag::Ko => KoreanNames.every_day_label(),
        }
    }
}
