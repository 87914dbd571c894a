use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::foundation::{core::Canvas, error::GifResult};

/// Where the encoded GIF bytes come from.
#[derive(Clone, Debug)]
pub enum GifSource {
    /// A file on disk.
    Path(PathBuf),
    /// An in-memory byte buffer (already fetched by the host).
    Bytes(Arc<[u8]>),
}

impl GifSource {
    /// Short human-readable label used in logs and errors.
    pub fn label(&self) -> String {
        match self {
            Self::Path(p) => p.display().to_string(),
            Self::Bytes(b) => format!("<{} bytes>", b.len()),
        }
    }
}

impl From<PathBuf> for GifSource {
    fn from(p: PathBuf) -> Self {
        Self::Path(p)
    }
}

impl From<&Path> for GifSource {
    fn from(p: &Path) -> Self {
        Self::Path(p.to_path_buf())
    }
}

impl From<Vec<u8>> for GifSource {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b.into())
    }
}

impl From<&[u8]> for GifSource {
    fn from(b: &[u8]) -> Self {
        Self::Bytes(b.into())
    }
}

/// One decoded full-canvas image in premultiplied RGBA8 form.
///
/// The bytes are shared: frame tables and presenters only hold references.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FramePixels {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl FramePixels {
    /// Wrap premultiplied RGBA8 bytes.
    pub fn new(width: u32, height: u32, rgba8_premul: Vec<u8>) -> Self {
        Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        }
    }

    /// A fully transparent image of the given size.
    pub fn transparent(canvas: Canvas) -> Self {
        Self::new(canvas.width, canvas.height, vec![0; canvas.rgba8_len()])
    }
}

/// Timing information delivered by a decoder.
///
/// Some decoders know each frame's delay; others only report a total duration for the whole
/// animation. Both are accepted when building a frame table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodedTiming {
    /// One delay in milliseconds per frame, in frame order.
    PerFrame(Vec<u32>),
    /// Total animation length in milliseconds; frames share it evenly.
    Total {
        /// Sum of all frame delays in milliseconds.
        duration_ms: u64,
    },
}

/// Output of the decode collaborator.
#[derive(Clone, Debug)]
pub struct DecodedGif {
    /// Logical screen size.
    pub canvas: Canvas,
    /// Composited frames in display order.
    pub frames: Vec<FramePixels>,
    /// Frame timing.
    pub timing: DecodedTiming,
}

/// Decode collaborator: turns encoded GIF bytes into frames plus timing.
///
/// Implementations run on a loader thread and may block on IO.
pub trait GifDecoder: Send + Sync {
    /// Decode the whole animation.
    fn decode(&self, source: &GifSource) -> GifResult<DecodedGif>;
}

impl<F> GifDecoder for F
where
    F: Fn(&GifSource) -> GifResult<DecodedGif> + Send + Sync,
{
    fn decode(&self, source: &GifSource) -> GifResult<DecodedGif> {
        self(source)
    }
}
