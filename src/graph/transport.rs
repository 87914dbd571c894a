use crate::foundation::{
    core::Fps,
    error::{GifError, GifResult},
};

/// Host clock that advances timeline time one display refresh at a time.
///
/// Time is derived from an origin plus a tick count rather than accumulated, so long runs do not
/// drift.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transport {
    fps: Fps,
    origin_s: f64,
    ticks: u64,
    playing: bool,
}

impl Transport {
    /// Create a paused transport at time zero.
    pub fn new(fps: Fps) -> Self {
        Self {
            fps,
            origin_s: 0.0,
            ticks: 0,
            playing: false,
        }
    }

    /// Refresh cadence.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Start advancing on [`Transport::step`].
    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Stop advancing; the current time is kept.
    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Whether [`Transport::step`] advances time.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Current timeline time in seconds.
    pub fn time_s(&self) -> f64 {
        self.origin_s + self.fps.frames_to_secs(self.ticks)
    }

    /// Jump to `time_s`. Does not change the playing flag.
    pub fn seek(&mut self, time_s: f64) -> GifResult<()> {
        if !time_s.is_finite() || time_s < 0.0 {
            return Err(GifError::invalid_seek(format!(
                "transport time must be finite and >= 0, got {time_s}"
            )));
        }
        self.origin_s = time_s;
        self.ticks = 0;
        Ok(())
    }

    /// Advance one refresh interval when playing and return the resulting time.
    pub fn step(&mut self) -> f64 {
        if self.playing {
            self.ticks = self.ticks.saturating_add(1);
        }
        self.time_s()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/transport.rs"]
mod tests;
