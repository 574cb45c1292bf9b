//! habit-strength - On-device engine for habit strength scores and calendar math
//!
//! Two independent pieces, composed by a caller that owns the event history:
//!
//! - **Score engine**: decays a habit's strength every day and boosts it on
//!   explicitly checked days, saturating at [`MAX_SCORE`].
//! - **Time normalizer**: shifts timestamps into a timezone-independent
//!   "local-naive" timeline and finds day, week, month, quarter and year
//!   boundaries on it, plus weekday numbering and weekday-set labels.
//!
//! Clock, timezone and locale are injected; nothing reads ambient global state.

pub mod calendar;
pub mod clock;
pub mod config;
pub mod error;
pub mod locale;
pub mod score;
pub mod scroll;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use calendar::TimeNormalizer;
pub use clock::{parse_zone, Clock, FixedClock, SystemClock, SystemZone, Zone, ZoneSpec};
pub use config::CalendarConfig;
pub use error::StrengthError;
pub use locale::{EnglishNames, KoreanNames, LocaleTag, WeekdayNameProvider};
pub use score::{ScoreEngine, ScoreHistory};
pub use scroll::{DataOffsetListener, ScrollState};
pub use types::{
    CheckmarkOutcome, NameFormat, Score, TimeFormat, TruncateUnit, MAX_SCORE,
    MILLISECONDS_IN_ONE_DAY,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
