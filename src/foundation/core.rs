use crate::foundation::error::{GifError, GifResult};

/// Half-open playback window `[start_s, end_s)` in host timeline seconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimeWindow {
    /// Inclusive window start.
    pub start_s: f64,
    /// Exclusive window end.
    pub end_s: f64, // exclusive
}

impl TimeWindow {
    /// Create a validated window with finite bounds and `start_s <= end_s`.
    pub fn new(start_s: f64, end_s: f64) -> GifResult<Self> {
        if !start_s.is_finite() || !end_s.is_finite() {
            return Err(GifError::validation("TimeWindow bounds must be finite"));
        }
        if start_s > end_s {
            return Err(GifError::validation("TimeWindow start must be <= end"));
        }
        Ok(Self { start_s, end_s })
    }

    /// Window length in seconds.
    pub fn len_s(self) -> f64 {
        self.end_s - self.start_s
    }

    /// Return `true` when the window covers no time.
    pub fn is_empty(self) -> bool {
        self.start_s == self.end_s
    }

    /// Return `true` when `t` is inside `[start_s, end_s)`.
    pub fn contains(self, t: f64) -> bool {
        self.start_s <= t && t < self.end_s
    }

    /// Convert a host timeline time into window-local time.
    pub fn local(self, t: f64) -> f64 {
        t - self.start_s
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32, // must be > 0
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> GifResult<Self> {
        if den == 0 {
            return Err(GifError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(GifError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one refresh interval in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Convert a tick count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }
}

/// Logical GIF canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Byte length of one tightly packed RGBA8 image of this size.
    pub fn rgba8_len(self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
