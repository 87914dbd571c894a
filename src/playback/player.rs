use std::sync::{Arc, mpsc};
use std::thread::JoinHandle;

use anyhow::Context;

use crate::{
    assets::source::{GifDecoder, GifSource},
    foundation::error::{GifError, GifResult},
    playback::state::PlaybackState,
    present::presenter::Presenter,
    timing::frame_table::{Frame, FrameTable},
};

/// Options for a [`GifPlayer`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GifPlayerOpts {
    /// Wrap playback time around at the end of the animation.
    #[serde(default = "default_looping")]
    pub looping: bool,
}

fn default_looping() -> bool {
    true
}

impl Default for GifPlayerOpts {
    fn default() -> Self {
        Self { looping: true }
    }
}

/// Observable state of a player's single load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadStatus {
    /// `load` has not been called.
    Idle,
    /// Decode is running on the loader thread.
    Pending,
    /// The frame table is installed; the player is ready.
    Loaded,
    /// Decode failed; the player stays not-ready for good.
    Failed(String),
    /// The player was disposed.
    Disposed,
}

struct PendingLoad {
    rx: mpsc::Receiver<GifResult<FrameTable>>,
    // Never joined: the thread exits right after sending, and a disposed player must not wait.
    _handle: JoinHandle<()>,
    label: String,
}

enum LoadSlot {
    Idle,
    Pending(PendingLoad),
    Loaded,
    Failed(String),
}

type LoadedHook = Box<dyn FnMut(&FrameTable) + Send>;

/// A GIF media source: asynchronous one-shot load plus host-sampled playback.
///
/// `load` decodes on a dedicated thread. The host polls [`GifPlayer::poll_load`] from its tick;
/// until the decode result has been applied, [`GifPlayer::is_ready`] is `false` and every
/// per-tick operation is a no-op.
pub struct GifPlayer<P: Presenter> {
    state: PlaybackState<P>,
    decoder: Arc<dyn GifDecoder>,
    slot: LoadSlot,
    disposed: bool,
    on_loaded: Option<LoadedHook>,
}

impl<P: Presenter> GifPlayer<P> {
    /// Create an idle player. The presenter receives frames once the animation is loaded.
    pub fn new(opts: GifPlayerOpts, decoder: Arc<dyn GifDecoder>, presenter: P) -> Self {
        Self {
            state: PlaybackState::new(opts.looping, presenter),
            decoder,
            slot: LoadSlot::Idle,
            disposed: false,
            on_loaded: None,
        }
    }

    /// Register a hook run once, on the thread that applies the load, right after the frame
    /// table is installed. Replaces any previous hook.
    pub fn on_loaded(&mut self, hook: impl FnMut(&FrameTable) + Send + 'static) {
        self.on_loaded = Some(Box::new(hook));
    }

    /// Start decoding `source` on a loader thread.
    ///
    /// A player loads at most once: calling this while a load is pending, after it finished, or
    /// after it failed returns [`GifError::AlreadyLoading`].
    pub fn load(&mut self, source: impl Into<GifSource>) -> GifResult<()> {
        if self.disposed {
            return Err(GifError::validation("cannot load a disposed player"));
        }
        if !matches!(self.slot, LoadSlot::Idle) {
            return Err(GifError::already_loading(
                "a player accepts a single load",
            ));
        }

        let source = source.into();
        let label = source.label();
        let decoder = Arc::clone(&self.decoder);
        let (tx, rx) = mpsc::sync_channel::<GifResult<FrameTable>>(1);
        let handle = std::thread::Builder::new()
            .name("wavyte-gif-load".to_owned())
            .spawn(move || {
                let res = decoder
                    .decode(&source)
                    .and_then(FrameTable::from_decoded);
                // The receiver is gone when the player was disposed or dropped.
                let _ = tx.send(res);
            })
            .context("spawn gif loader thread")?;

        tracing::debug!(source = %label, "gif load started");
        self.slot = LoadSlot::Pending(PendingLoad {
            rx,
            _handle: handle,
            label,
        });
        Ok(())
    }

    /// Apply a finished decode, if any, without blocking.
    ///
    /// A decode failure is returned as `Err` by the call that applies it; later polls return
    /// `Ok(`[`LoadStatus::Failed`]`)`.
    pub fn poll_load(&mut self) -> GifResult<LoadStatus> {
        if self.disposed {
            return Ok(LoadStatus::Disposed);
        }
        let received = match &self.slot {
            LoadSlot::Pending(p) => match p.rx.try_recv() {
                Ok(res) => Some(res),
                Err(mpsc::TryRecvError::Empty) => None,
                Err(mpsc::TryRecvError::Disconnected) => Some(Err(GifError::decode(
                    "loader thread exited without a result",
                ))),
            },
            _ => None,
        };
        if let Some(res) = received {
            self.finish_load(res)?;
        }
        Ok(self.status())
    }

    /// Block until the pending load finishes, then apply it.
    ///
    /// Reports the outcome on every call: `Ok` once loaded, `Err` for a failed load (including one
    /// already surfaced by [`GifPlayer::poll_load`]).
    pub fn wait_load(&mut self) -> GifResult<()> {
        if self.disposed {
            return Err(GifError::validation("player is disposed"));
        }
        let res = match &self.slot {
            LoadSlot::Idle => return Err(GifError::validation("no load has been started")),
            LoadSlot::Loaded => return Ok(()),
            LoadSlot::Failed(msg) => return Err(GifError::decode(msg.clone())),
            LoadSlot::Pending(p) => p.rx.recv().unwrap_or_else(|_| {
                Err(GifError::decode("loader thread exited without a result"))
            }),
        };
        self.finish_load(res)
    }

    fn finish_load(&mut self, res: GifResult<FrameTable>) -> GifResult<()> {
        let label = match &self.slot {
            LoadSlot::Pending(p) => p.label.clone(),
            _ => String::new(),
        };
        match res.and_then(|table| self.state.install(table)) {
            Ok(()) => {
                tracing::debug!(source = %label, "gif load finished");
                self.slot = LoadSlot::Loaded;
                if let (Some(hook), Some(table)) =
                    (self.on_loaded.as_mut(), self.state.frame_table())
                {
                    hook(table);
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!(source = %label, error = %e, "gif load failed");
                self.slot = LoadSlot::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Current load status.
    pub fn status(&self) -> LoadStatus {
        if self.disposed {
            return LoadStatus::Disposed;
        }
        match &self.slot {
            LoadSlot::Idle => LoadStatus::Idle,
            LoadSlot::Pending(_) => LoadStatus::Pending,
            LoadSlot::Loaded => LoadStatus::Loaded,
            LoadSlot::Failed(msg) => LoadStatus::Failed(msg.clone()),
        }
    }

    /// Tear the player down. A decode still in flight is discarded when it completes.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        if let LoadSlot::Pending(p) = &self.slot {
            tracing::warn!(source = %p.label, "disposing player with a load in flight");
        }
        self.disposed = true;
        // Dropping the receiver makes the loader's send fail; its result never reaches us.
        self.slot = LoadSlot::Idle;
        self.state.pause();
    }

    /// `true` once the animation is decoded and the player has not been disposed.
    pub fn is_ready(&self) -> bool {
        !self.disposed && self.state.is_ready()
    }

    /// Whether playback time wraps around at the end of the animation.
    pub fn looping(&self) -> bool {
        self.state.looping()
    }

    /// Select the frame at `time_s`. No-op until ready.
    pub fn seek(&mut self, time_s: f64) -> GifResult<()> {
        if self.disposed {
            return Ok(());
        }
        self.state.seek(time_s)
    }

    /// Per-tick sampling; same semantics as [`GifPlayer::seek`].
    pub fn update(&mut self, time_s: f64) -> GifResult<()> {
        if self.disposed {
            return Ok(());
        }
        self.state.update(time_s)
    }

    /// Select a frame by index. No-op until ready.
    pub fn seek_to_frame(&mut self, index: usize) -> GifResult<()> {
        if self.disposed {
            return Ok(());
        }
        self.state.seek_to_frame(index)
    }

    /// Step `delta` frames from the selected one (`1` next, `-1` previous). No-op until ready.
    pub fn step_frame(&mut self, delta: isize) {
        if !self.disposed {
            self.state.step_frame(delta);
        }
    }

    /// Set the running flag.
    pub fn play(&mut self) {
        if !self.disposed {
            self.state.play();
        }
    }

    /// Clear the running flag.
    pub fn pause(&mut self) {
        self.state.pause();
    }

    /// Current value of the running flag.
    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    /// Display refresh boundary: present the pending frame, if any.
    pub fn refresh(&mut self) -> GifResult<bool> {
        if self.disposed {
            return Ok(false);
        }
        self.state.refresh()
    }

    /// Index of the selected frame, or `None` until ready.
    pub fn current_frame_index(&self) -> Option<usize> {
        if self.disposed {
            return None;
        }
        self.state.current_frame_index()
    }

    /// The selected frame, or `None` until ready.
    pub fn current_frame(&self) -> Option<&Frame> {
        if self.disposed {
            return None;
        }
        self.state.current_frame()
    }

    /// The decoded frame table, or `None` until ready.
    pub fn frame_table(&self) -> Option<&FrameTable> {
        if self.disposed {
            return None;
        }
        self.state.frame_table()
    }

    /// Total duration in seconds, or `None` until ready.
    pub fn duration_s(&self) -> Option<f64> {
        self.frame_table().map(FrameTable::duration_s)
    }

    /// Number of frames, or `None` until ready.
    pub fn frame_count(&self) -> Option<usize> {
        self.frame_table().map(FrameTable::len)
    }

    /// Borrow the presenter.
    pub fn presenter(&self) -> &P {
        self.state.presenter()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/player.rs"]
mod tests;
