use serde::{Deserialize, Serialize};
use std::fmt;

/// A display mode as enumerated by the display backend.
///
/// Values are immutable snapshots. The backend supplies them as an ordered list whose
/// order is stable for the whole session, so list indices double as UI selection indices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayMode {
    pub width: u32,
    pub height: u32,
    pub refresh_rate: f64,
}

impl DisplayMode {
    pub fn new(width: u32, height: u32, refresh_rate: f64) -> Self {
        Self {
            width,
            height,
            refresh_rate,
        }
    }

    /// Refresh rate rounded to whole hertz.
    ///
    /// Halfway values round to even, so 59.5 and 60.5 both land on 60.
    pub fn rounded_refresh_rate(&self) -> i64 {
        self.refresh_rate.round_ties_even() as i64
    }

    /// Same resolution and same whole-hertz refresh rate.
    pub fn approx_eq(&self, other: &DisplayMode) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.rounded_refresh_rate() == other.rounded_refresh_rate()
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} x {} @ {}Hz",
            self.width,
            self.height,
            self.rounded_refresh_rate()
        )
    }
}
