use std::sync::Arc;

use crate::{
    assets::source::{GifDecoder, GifSource},
    foundation::error::GifResult,
    playback::player::{GifPlayer, GifPlayerOpts},
    present::presenter::Presenter,
};

/// Capability a render graph needs from a timed media source.
///
/// All times are source-local seconds (the graph subtracts the source's start time). While
/// [`MediaSource::is_ready`] is `false` the graph neither samples nor presents the source.
pub trait MediaSource: Send {
    /// Name used in logs and reports.
    fn display_name(&self) -> &str;
    /// Begin loading. Called once by the graph when the source enters its preload window.
    fn load(&mut self) -> GifResult<()>;
    /// Make progress on a pending load without blocking.
    fn poll(&mut self) -> GifResult<()>;
    /// `true` once the source may be sampled.
    fn is_ready(&self) -> bool;
    /// Reposition to `time_s`.
    fn seek(&mut self, time_s: f64) -> GifResult<()>;
    /// Steady-state per-tick sampling at `time_s`.
    fn update(&mut self, time_s: f64) -> GifResult<()>;
    /// Display refresh boundary. Returns `true` when something was presented.
    fn refresh(&mut self) -> GifResult<bool>;
    /// Currently selected frame index, if ready.
    fn current_frame(&self) -> Option<usize>;
}

/// Graph node wrapping a [`GifPlayer`] and the source it loads from.
pub struct GifSourceNode<P: Presenter> {
    name: String,
    source: GifSource,
    player: GifPlayer<P>,
}

impl<P: Presenter> GifSourceNode<P> {
    /// Create a node; nothing is decoded until the graph calls [`MediaSource::load`].
    pub fn new(
        name: impl Into<String>,
        source: impl Into<GifSource>,
        opts: GifPlayerOpts,
        decoder: Arc<dyn GifDecoder>,
        presenter: P,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            player: GifPlayer::new(opts, decoder, presenter),
        }
    }

    /// Borrow the wrapped player.
    pub fn player(&self) -> &GifPlayer<P> {
        &self.player
    }

    /// Mutably borrow the wrapped player.
    pub fn player_mut(&mut self) -> &mut GifPlayer<P> {
        &mut self.player
    }
}

impl<P: Presenter> MediaSource for GifSourceNode<P> {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn load(&mut self) -> GifResult<()> {
        self.player.load(self.source.clone())
    }

    fn poll(&mut self) -> GifResult<()> {
        self.player.poll_load().map(|_| ())
    }

    fn is_ready(&self) -> bool {
        self.player.is_ready()
    }

    fn seek(&mut self, time_s: f64) -> GifResult<()> {
        self.player.seek(time_s)
    }

    fn update(&mut self, time_s: f64) -> GifResult<()> {
        self.player.update(time_s)
    }

    fn refresh(&mut self) -> GifResult<bool> {
        self.player.refresh()
    }

    fn current_frame(&self) -> Option<usize> {
        self.player.current_frame_index()
    }
}

impl<P: Presenter> Drop for GifSourceNode<P> {
    fn drop(&mut self) {
        self.player.dispose();
    }
}
