//! Headless data-offset tracking for scrollable charts and calendars
//!
//! The view layer owns gestures and animation and reports raw scroller
//! positions here. This module turns them into a clamped integer data offset
//! (how many buckets, usually days, the view is scrolled back) and notifies a
//! listener when it changes.

use crate::error::StrengthError;

/// Default upper bound for the data offset
pub const DEFAULT_MAX_DATA_OFFSET: i32 = 10_000;

/// Receives data offset changes
pub trait DataOffsetListener {
    fn on_data_offset_changed(&mut self, new_data_offset: i32);
}

impl<F: FnMut(i32)> DataOffsetListener for F {
    fn on_data_offset_changed(&mut self, new_data_offset: i32) {
        self(new_data_offset)
    }
}

/// Scroll position of one chart, in scroller pixels and data buckets
pub struct ScrollState {
    data_offset: i32,
    max_data_offset: i32,
    bucket_size: i32,
    direction: i32,
    /// Raw scroller x position
    position: i32,
    listener: Option<Box<dyn DataOffsetListener>>,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollState {
    pub fn new() -> Self {
        Self {
            data_offset: 0,
            max_data_offset: DEFAULT_MAX_DATA_OFFSET,
            bucket_size: 1,
            direction: 1,
            position: 0,
            listener: None,
        }
    }

    pub fn data_offset(&self) -> i32 {
        self.data_offset
    }

    pub fn max_data_offset(&self) -> i32 {
        self.max_data_offset
    }

    pub fn direction(&self) -> i32 {
        self.direction
    }

    pub fn set_listener(&mut self, listener: impl DataOffsetListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Scroll direction, `1` or `-1`
    pub fn set_direction(&mut self, direction: i32) -> Result<(), StrengthError> {
        if direction != 1 && direction != -1 {
            return Err(StrengthError::InvalidArgument(format!(
                "scroll direction must be 1 or -1, got {direction}"
            )));
        }
        self.direction = direction;
        Ok(())
    }

    /// Pixels per data bucket; zero disables scrolling
    pub fn set_bucket_size(&mut self, bucket_size: i32) -> Result<(), StrengthError> {
        if bucket_size < 0 {
            return Err(StrengthError::InvalidArgument(format!(
                "bucket size must not be negative, got {bucket_size}"
            )));
        }
        self.bucket_size = bucket_size;
        Ok(())
    }

    /// Change the upper bound, clamping the current offset. Always notifies.
    pub fn set_max_data_offset(&mut self, max_data_offset: i32) {
        self.max_data_offset = max_data_offset.max(0);
        self.data_offset = self.data_offset.min(self.max_data_offset);
        self.notify();
    }

    /// Largest scroller position
    pub fn max_x(&self) -> i32 {
        self.max_data_offset.saturating_mul(self.bucket_size)
    }

    /// Apply a drag of `dx` pixels. Returns false when scrolling is disabled.
    pub fn scroll_by(&mut self, dx: i32) -> bool {
        if self.bucket_size == 0 {
            return false;
        }
        let dx = (-self.direction).saturating_mul(dx);
        let dx = dx.min(self.max_x().saturating_sub(self.position));
        self.scroll_to_position(self.position.saturating_add(dx));
        true
    }

    /// Move the scroller to `position` and update the data offset
    pub fn scroll_to_position(&mut self, position: i32) {
        self.position = position;
        if self.bucket_size == 0 {
            return;
        }

        let new_offset = (position / self.bucket_size).clamp(0, self.max_data_offset);
        if new_offset != self.data_offset {
            self.data_offset = new_offset;
            self.notify();
        }
    }

    fn notify(&mut self) {
        let offset = self.data_offset;
        if let Some(listener) = self.listener.as_mut() {
            listener.on_data_offset_changed(offset);
        }
    }
}
