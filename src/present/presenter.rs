use crate::{
    assets::source::FramePixels,
    foundation::{core::Canvas, error::GifResult},
};

/// Configuration handed to a [`Presenter`] once the animation has been decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceConfig {
    /// Logical GIF screen size.
    pub canvas: Canvas,
    /// Number of frames in the animation.
    pub frame_count: usize,
}

/// Presentation collaborator: receives the frame to show at each refresh boundary.
///
/// Ordering contract: `begin` is called exactly once, after decode and before any `present`.
/// `present` is called at most once per refresh boundary with the last frame selected before it.
pub trait Presenter: Send {
    /// Called once when the source becomes ready.
    fn begin(&mut self, cfg: SurfaceConfig) -> GifResult<()>;
    /// Show frame `index`.
    fn present(&mut self, index: usize, pixels: &FramePixels) -> GifResult<()>;
}

impl Presenter for Box<dyn Presenter> {
    fn begin(&mut self, cfg: SurfaceConfig) -> GifResult<()> {
        (**self).begin(cfg)
    }

    fn present(&mut self, index: usize, pixels: &FramePixels) -> GifResult<()> {
        (**self).present(index, pixels)
    }
}

/// In-memory presenter for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemoryPresenter {
    cfg: Option<SurfaceConfig>,
    /// Presented frames in presentation order.
    pub(crate) presented: Vec<(usize, FramePixels)>,
}

impl InMemoryPresenter {
    /// Create a new in-memory presenter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the surface configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SurfaceConfig> {
        self.cfg
    }

    /// Borrow the presented frames.
    pub fn presented(&self) -> &[(usize, FramePixels)] {
        &self.presented
    }

    /// Indices of presented frames in presentation order.
    pub fn presented_indices(&self) -> Vec<usize> {
        self.presented.iter().map(|(i, _)| *i).collect()
    }
}

impl Presenter for InMemoryPresenter {
    fn begin(&mut self, cfg: SurfaceConfig) -> GifResult<()> {
        self.cfg = Some(cfg);
        self.presented.clear();
        Ok(())
    }

    fn present(&mut self, index: usize, pixels: &FramePixels) -> GifResult<()> {
        self.presented.push((index, pixels.clone()));
        Ok(())
    }
}

/// Presenter that drops every frame. Useful for headless timing runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn begin(&mut self, _cfg: SurfaceConfig) -> GifResult<()> {
        Ok(())
    }

    fn present(&mut self, _index: usize, _pixels: &FramePixels) -> GifResult<()> {
        Ok(())
    }
}
