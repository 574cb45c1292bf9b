//! Injectable clock and timezone sources
//!
//! Nothing in the crate reads the wall clock or the host timezone directly.
//! Callers pass a [`Clock`] and a [`Zone`]; production code uses
//! [`SystemClock`] and [`SystemZone`], tests use [`FixedClock`] and a fixed
//! offset.

use chrono::{DateTime, FixedOffset, Local, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StrengthError;

/// Source of the current instant
pub trait Clock {
    /// Current UTC instant in epoch milliseconds
    fn now_millis(&self) -> i64;

    /// A pinned local time, bypassing zone resolution entirely
    fn fixed_local_time(&self) -> Option<i64> {
        None
    }
}

/// Real system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Clock pinned to a local (zone already applied) timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }

    fn fixed_local_time(&self) -> Option<i64> {
        Some(self.0)
    }
}

/// Timezone offset lookup
pub trait Zone {
    /// Offset from UTC in milliseconds at the given UTC instant
    fn offset_millis_at(&self, utc_millis: i64) -> i64;
}

impl Zone for Utc {
    fn offset_millis_at(&self, _utc_millis: i64) -> i64 {
        0
    }
}

impl Zone for FixedOffset {
    fn offset_millis_at(&self, _utc_millis: i64) -> i64 {
        self.local_minus_utc() as i64 * 1000
    }
}

/// The host's timezone, including its daylight-saving rules
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemZone;

impl Zone for SystemZone {
    fn offset_millis_at(&self, utc_millis: i64) -> i64 {
        // Instants chrono cannot represent fall back to no offset.
        match DateTime::from_timestamp_millis(utc_millis) {
            Some(instant) => {
                let offset = Local.offset_from_utc_datetime(&instant.naive_utc());
                offset.fix().local_minus_utc() as i64 * 1000
            }
            None => 0,
        }
    }
}

impl<Z: Zone + ?Sized> Zone for &Z {
    fn offset_millis_at(&self, utc_millis: i64) -> i64 {
        (**self).offset_millis_at(utc_millis)
    }
}

/// Timezone named in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneSpec {
    Utc,
    Local,
    Fixed(FixedOffset),
}

impl Zone for ZoneSpec {
    fn offset_millis_at(&self, utc_millis: i64) -> i64 {
        match self {
            ZoneSpec::Utc => Utc.offset_millis_at(utc_millis),
            ZoneSpec::Local => SystemZone.offset_millis_at(utc_millis),
            ZoneSpec::Fixed(offset) => offset.offset_millis_at(utc_millis),
        }
    }
}

impl fmt::Display for ZoneSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneSpec::Utc => write!(f, "UTC"),
            ZoneSpec::Local => write!(f, "local"),
            ZoneSpec::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

impl FromStr for ZoneSpec {
    type Err = StrengthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_zone(s)
    }
}

impl Serialize for ZoneSpec {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ZoneSpec {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_zone(&raw).map_err(serde::de::Error::custom)
    }
}

/// Parse `"UTC"`, `"local"`, or a fixed offset such as `"+09:00"`,
/// `"-0530"`, `"UTC+2"` or `"GMT-03:30"`.
pub fn parse_zone(input: &str) -> Result<ZoneSpec, StrengthError> {
    let trimmed = input.trim();
    let lower = trimmed.to_ascii_lowercase();

    match lower.as_str() {
        "utc" | "gmt" | "z" => return Ok(ZoneSpec::Utc),
        "local" | "system" => return Ok(ZoneSpec::Local),
        _ => {}
    }

    let rest = lower
        .strip_prefix("utc")
        .or_else(|| lower.strip_prefix("gmt"))
        .unwrap_or(&lower);

    let invalid = || StrengthError::InvalidTimezone(trimmed.to_string());

    let (sign, digits) = match rest.chars().next() {
        Some('+') => (1, &rest[1..]),
        Some('-') => (-1, &rest[1..]),
        _ => return Err(invalid()),
    };

    let (hours, minutes) = match digits.split_once(':') {
        Some((h, m)) => (h, m),
        None if digits.len() == 4 => digits.split_at(2),
        None => (digits, "0"),
    };

    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    let seconds = sign * (hours * 3600 + minutes * 60);
    FixedOffset::east_opt(seconds)
        .map(ZoneSpec::Fixed)
        .ok_or_else(invalid)
}
