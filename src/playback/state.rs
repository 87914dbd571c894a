use crate::{
    foundation::error::{GifError, GifResult},
    present::presenter::{Presenter, SurfaceConfig},
    timing::{
        frame_table::{Frame, FrameTable},
        time_mapper::index_at,
    },
};

/// Host-sampled playback state for one decoded animation.
///
/// The state never advances on its own. A host calls [`PlaybackState::seek`] or
/// [`PlaybackState::update`] with its clock time, then [`PlaybackState::refresh`] at each display
/// refresh boundary. Selecting a frame only marks it pending; `refresh` hands the last pending
/// frame to the presenter, so several seeks within one tick present once.
pub struct PlaybackState<P: Presenter> {
    table: Option<FrameTable>,
    current: usize,
    looping: bool,
    running: bool,
    pending: Option<usize>,
    last_presented: Option<usize>,
    presenter: P,
}

impl<P: Presenter> PlaybackState<P> {
    /// Create a not-yet-loaded state. `looping` is fixed for the lifetime of the state.
    pub fn new(looping: bool, presenter: P) -> Self {
        Self {
            table: None,
            current: 0,
            looping,
            running: false,
            pending: None,
            last_presented: None,
            presenter,
        }
    }

    /// Install the decoded frame table. Allowed exactly once.
    ///
    /// Configures the presenter and schedules the first frame for presentation.
    pub fn install(&mut self, table: FrameTable) -> GifResult<()> {
        if self.table.is_some() {
            return Err(GifError::already_loading(
                "playback state already holds a frame table",
            ));
        }
        self.presenter.begin(SurfaceConfig {
            canvas: table.canvas(),
            frame_count: table.len(),
        })?;
        self.current = 0;
        self.pending = Some(0);
        self.table = Some(table);
        Ok(())
    }

    /// `true` once a frame table is installed. Hosts must not sample the source before this.
    pub fn is_ready(&self) -> bool {
        self.table.is_some()
    }

    /// Whether playback time wraps around at the end of the animation.
    pub fn looping(&self) -> bool {
        self.looping
    }

    /// Select the frame on screen at `time_s`. No-op before load.
    pub fn seek(&mut self, time_s: f64) -> GifResult<()> {
        let Some(table) = self.table.as_ref() else {
            return Ok(());
        };
        let index = index_at(table, time_s, self.looping)?;
        self.select(index);
        Ok(())
    }

    /// Steady-state per-tick sampling. Same semantics as [`PlaybackState::seek`].
    pub fn update(&mut self, time_s: f64) -> GifResult<()> {
        self.seek(time_s)
    }

    /// Select a frame directly by index. No-op before load.
    pub fn seek_to_frame(&mut self, index: usize) -> GifResult<()> {
        let Some(table) = self.table.as_ref() else {
            return Ok(());
        };
        if index >= table.len() {
            return Err(GifError::IndexOutOfRange {
                index,
                len: table.len(),
            });
        }
        self.select(index);
        Ok(())
    }

    /// Move `delta` frames from the selected one. No-op before load.
    ///
    /// Wraps around the ends when looping, otherwise stops at the first or last frame.
    pub fn step_frame(&mut self, delta: isize) {
        let Some(table) = self.table.as_ref() else {
            return;
        };
        let len = table.len() as isize;
        let next = self.current as isize + delta;
        let index = if self.looping {
            next.rem_euclid(len)
        } else {
            next.clamp(0, len - 1)
        };
        self.select(index as usize);
    }

    fn select(&mut self, index: usize) {
        self.current = index;
        self.pending = Some(index);
    }

    /// Set the running flag. Does not advance time.
    pub fn play(&mut self) {
        self.running = true;
    }

    /// Clear the running flag.
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Current value of the running flag.
    pub fn is_playing(&self) -> bool {
        self.running
    }

    /// Display refresh boundary: present the pending frame, if any.
    ///
    /// Returns `true` when the presenter was invoked. A pending frame equal to the one already on
    /// screen is dropped without presenting.
    pub fn refresh(&mut self) -> GifResult<bool> {
        let Some(table) = self.table.as_ref() else {
            return Ok(false);
        };
        let Some(index) = self.pending.take() else {
            return Ok(false);
        };
        if self.last_presented == Some(index) {
            return Ok(false);
        }
        let frame = &table.frames()[index];
        self.presenter.present(index, &frame.pixels)?;
        self.last_presented = Some(index);
        tracing::trace!(index, "presented frame");
        Ok(true)
    }

    /// `true` when a selected frame is waiting for the next refresh.
    pub fn has_pending_presentation(&self) -> bool {
        self.pending.is_some()
    }

    /// Index of the selected frame, or `None` before load.
    pub fn current_frame_index(&self) -> Option<usize> {
        self.table.as_ref().map(|_| self.current)
    }

    /// The selected frame, or `None` before load.
    pub fn current_frame(&self) -> Option<&Frame> {
        self.table.as_ref().map(|t| &t.frames()[self.current])
    }

    /// The installed frame table, or `None` before load.
    pub fn frame_table(&self) -> Option<&FrameTable> {
        self.table.as_ref()
    }

    /// Borrow the presenter.
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Mutably borrow the presenter.
    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/state.rs"]
mod tests;
