//! FFI bindings for habit-strength
//!
//! C-compatible functions for calling the engine from mobile hosts. Strings
//! are null-terminated; any string returned by this module must be freed with
//! `habit_free_string`. Functions that can fail record a message readable
//! through `habit_last_error`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;
use std::slice;

use chrono::Utc;

use crate::calendar::{self, TimeNormalizer};
use crate::clock::FixedClock;
use crate::error::StrengthError;
use crate::locale::LocaleTag;
use crate::score::{ScoreEngine, ScoreHistory};
use crate::types::{CheckmarkOutcome, TruncateUnit};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

fn truncate_unit_from_code(code: i32) -> Result<TruncateUnit, StrengthError> {
    match code {
        0 => Ok(TruncateUnit::Month),
        1 => Ok(TruncateUnit::Week),
        2 => Ok(TruncateUnit::Quarter),
        3 => Ok(TruncateUnit::Year),
        other => Err(StrengthError::InvalidArgument(format!(
            "unknown truncate unit code {other}"
        ))),
    }
}

/// Normalizer for operations that never read the clock or zone
fn offline_normalizer(
    locale: LocaleTag,
    first_day_of_week: u32,
) -> Result<TimeNormalizer<FixedClock, Utc, LocaleTag>, StrengthError> {
    TimeNormalizer::new(FixedClock(0), Utc, locale).with_first_day_of_week(first_day_of_week)
}

// ============================================================================
// Scores
// ============================================================================

/// Compute today's score without validating the frequency.
///
/// `outcome` is 0 (unchecked), 1 (checked implicitly) or 2 (checked
/// explicitly). Returns -1 for an unknown outcome code.
#[no_mangle]
pub extern "C" fn habit_score_compute(frequency: f64, previous_score: u32, outcome: i32) -> i64 {
    clear_last_error();

    match CheckmarkOutcome::from_code(outcome as i64) {
        Ok(outcome) => ScoreEngine::compute(frequency, previous_score, outcome) as i64,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Compute today's score, rejecting frequencies outside (0, 14).
///
/// Returns -1 on error; call `habit_last_error` for the message.
#[no_mangle]
pub extern "C" fn habit_score_try_compute(
    frequency: f64,
    previous_score: u32,
    outcome: i32,
) -> i64 {
    clear_last_error();

    let result = CheckmarkOutcome::from_code(outcome as i64)
        .and_then(|outcome| ScoreEngine::try_compute(frequency, previous_score, outcome));

    match result {
        Ok(score) => score as i64,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Compute a day-by-day score history and return it as a JSON string.
///
/// # Safety
/// - `outcomes` must point to `len` readable `i32` values (or be NULL when
///   `len` is 0).
/// - Returns a newly allocated string that must be freed with `habit_free_string`.
/// - Returns NULL on error; call `habit_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn habit_score_history(
    frequency: f64,
    first_day: i64,
    outcomes: *const i32,
    len: usize,
) -> *mut c_char {
    clear_last_error();

    let codes: &[i32] = if len == 0 {
        &[]
    } else if outcomes.is_null() {
        set_last_error("Null outcomes pointer");
        return ptr::null_mut();
    } else {
        slice::from_raw_parts(outcomes, len)
    };

    let result = codes
        .iter()
        .map(|&code| CheckmarkOutcome::from_code(code as i64))
        .collect::<Result<Vec<_>, _>>()
        .and_then(|outcomes| ScoreHistory::compute(frequency, first_day, &outcomes))
        .and_then(|history| history.to_json().map_err(StrengthError::from));

    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Calendar
// ============================================================================

/// Truncate a normalized timestamp to the start of a calendar unit.
///
/// `unit` is 0 (month), 1 (week), 2 (quarter) or 3 (year);
/// `first_day_of_week` uses Sunday=1 … Saturday=7.
///
/// # Safety
/// - `out` must be a valid pointer to an `i64`.
/// - Returns 0 on success, -1 on error.
#[no_mangle]
pub unsafe extern "C" fn habit_truncate(
    unit: i32,
    timestamp: i64,
    first_day_of_week: u32,
    out: *mut i64,
) -> i32 {
    clear_last_error();

    if out.is_null() {
        set_last_error("Null output pointer");
        return -1;
    }

    let result = truncate_unit_from_code(unit).and_then(|unit| {
        offline_normalizer(LocaleTag::En, first_day_of_week)?.truncate(unit, timestamp)
    });

    match result {
        Ok(value) => {
            *out = value;
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Weekday of a normalized timestamp, 0 = Saturday … 6 = Friday
#[no_mangle]
pub extern "C" fn habit_weekday(timestamp: i64) -> i32 {
    calendar::get_weekday(timestamp) as i32
}

/// Whole days between two timestamps
#[no_mangle]
pub extern "C" fn habit_days_between(t1: i64, t2: i64) -> u64 {
    calendar::get_days_between(t1, t2)
}

/// Summarize a weekday set (index 0 = Saturday) as a display label.
///
/// # Safety
/// - `weekdays` must point to `len` readable bools; `len` must be 7.
/// - `locale` must be a valid null-terminated C string such as "en" or "ko".
/// - Returns a newly allocated string that must be freed with `habit_free_string`.
/// - Returns NULL on error; call `habit_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn habit_format_weekday_list(
    weekdays: *const bool,
    len: usize,
    locale: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if weekdays.is_null() {
        set_last_error("Null weekdays pointer");
        return ptr::null_mut();
    }
    if len != 7 {
        set_last_error(&format!("Weekday set must have 7 entries, got {len}"));
        return ptr::null_mut();
    }

    let locale_str = match cstr_to_string(locale) {
        Some(s) => s,
        None => {
            set_last_error("Invalid locale string pointer");
            return ptr::null_mut();
        }
    };

    let mut set = [false; 7];
    set.copy_from_slice(slice::from_raw_parts(weekdays, len));

    let result = locale_str
        .parse::<LocaleTag>()
        .and_then(|locale| offline_normalizer(locale, locale.default_first_day_of_week()))
        .map(|normalizer| normalizer.format_weekday_list(&set));

    match result {
        Ok(label) => string_to_cstr(&label),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by this library.
///
/// # Safety
/// - `ptr` must have been returned by a habit-strength function, or be NULL.
/// - Must not be called twice on the same pointer.
#[no_mangle]
pub unsafe extern "C" fn habit_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next library call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn habit_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn habit_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
