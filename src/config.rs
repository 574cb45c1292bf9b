//! Calendar configuration
//!
//! Locale, timezone and display preferences are plain inputs. They are loaded
//! from JSON by the caller (or built in code) and bound into a
//! [`TimeNormalizer`] once.

use serde::{Deserialize, Serialize};

use crate::calendar::TimeNormalizer;
use crate::clock::{Clock, ZoneSpec};
use crate::error::StrengthError;
use crate::locale::LocaleTag;
use crate::types::{weekday_from_calendar, TimeFormat};

/// Calendar settings for one user/device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// `"UTC"`, `"local"`, or a fixed offset like `"+09:00"`
    pub timezone: ZoneSpec,
    /// Calendar numbering, Sunday=1 … Saturday=7
    pub first_day_of_week: u32,
    pub locale: LocaleTag,
    pub time_format: TimeFormat,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        let locale = LocaleTag::default();
        Self {
            timezone: ZoneSpec::Utc,
            first_day_of_week: locale.default_first_day_of_week(),
            locale,
            time_format: TimeFormat::default(),
        }
    }
}

impl CalendarConfig {
    /// Check values serde cannot constrain
    pub fn validate(&self) -> Result<(), StrengthError> {
        weekday_from_calendar(self.first_day_of_week).map_err(|_| {
            StrengthError::InvalidArgument(format!(
                "first_day_of_week must be in 1..=7, got {}",
                self.first_day_of_week
            ))
        })?;
        Ok(())
    }

    /// Load and validate configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, StrengthError> {
        let config: CalendarConfig = serde_json::from_str(json)?;
        config.validate()?;
        tracing::debug!(
            timezone = %config.timezone,
            first_day_of_week = config.first_day_of_week,
            locale = config.locale.as_str(),
            "loaded calendar config"
        );
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, StrengthError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Bind this configuration to a clock
    pub fn build<C: Clock>(
        &self,
        clock: C,
    ) -> Result<TimeNormalizer<C, ZoneSpec, LocaleTag>, StrengthError> {
        self.validate()?;
        Ok(TimeNormalizer::new(clock, self.timezone, self.locale)
            .with_first_day_of_week(self.first_day_of_week)?
            .with_time_format(self.time_format))
    }
}
