use crate::{
    assets::source::{DecodedGif, DecodedTiming, FramePixels},
    foundation::{
        core::Canvas,
        error::{GifError, GifResult},
    },
};

/// One decoded still image plus how long it stays on screen.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Shared pixel data (owned by the decoder output, referenced here).
    pub pixels: FramePixels,
    /// Display time in milliseconds. Zero is legal.
    pub delay_ms: u32,
}

/// Ordered, immutable sequence of frames with derived timing.
///
/// A table is never empty. Cumulative end offsets are computed once at build time; since the table
/// cannot change afterwards they always agree with the frame delays.
#[derive(Clone, Debug)]
pub struct FrameTable {
    canvas: Canvas,
    frames: Vec<Frame>,
    /// `ends_ms[i]` is the sum of delays of frames `0..=i`.
    ends_ms: Vec<u64>,
}

impl FrameTable {
    /// Build a table from full-canvas frames in display order.
    pub fn new(canvas: Canvas, frames: Vec<Frame>) -> GifResult<Self> {
        if frames.is_empty() {
            return Err(GifError::empty_input(
                "a frame table needs at least one frame",
            ));
        }
        for (i, f) in frames.iter().enumerate() {
            if f.pixels.width != canvas.width || f.pixels.height != canvas.height {
                return Err(GifError::decode(format!(
                    "frame {i} is {}x{}, expected the {}x{} canvas",
                    f.pixels.width, f.pixels.height, canvas.width, canvas.height
                )));
            }
            let expected = f.pixels.width as usize * f.pixels.height as usize * 4;
            if f.pixels.rgba8_premul.len() != expected {
                return Err(GifError::decode(format!(
                    "frame {i} has {} pixel bytes, expected {expected} for {}x{}",
                    f.pixels.rgba8_premul.len(),
                    f.pixels.width,
                    f.pixels.height
                )));
            }
        }

        let mut acc = 0u64;
        let ends_ms = frames
            .iter()
            .map(|f| {
                acc += u64::from(f.delay_ms);
                acc
            })
            .collect();

        Ok(Self {
            canvas,
            frames,
            ends_ms,
        })
    }

    /// Build a table from decoder output, accepting per-frame delays or a total duration.
    ///
    /// A total duration is shared evenly; leftover milliseconds go to the leading frames so the
    /// delays always sum to exactly `duration_ms`.
    #[tracing::instrument(skip(decoded), fields(frames = decoded.frames.len()))]
    pub fn from_decoded(decoded: DecodedGif) -> GifResult<Self> {
        let DecodedGif {
            canvas,
            frames,
            timing,
        } = decoded;
        if frames.is_empty() {
            return Err(GifError::empty_input("decoder produced zero frames"));
        }

        let delays = match timing {
            DecodedTiming::PerFrame(delays) => {
                if delays.len() != frames.len() {
                    return Err(GifError::decode(format!(
                        "decoder produced {} frames but {} delays",
                        frames.len(),
                        delays.len()
                    )));
                }
                delays
            }
            DecodedTiming::Total { duration_ms } => split_duration_ms(duration_ms, frames.len())?,
        };

        let frames = frames
            .into_iter()
            .zip(delays)
            .map(|(pixels, delay_ms)| Frame { pixels, delay_ms })
            .collect();
        let table = Self::new(canvas, frames)?;
        tracing::debug!(
            len = table.len(),
            total_ms = table.total_ms(),
            "built frame table"
        );
        Ok(table)
    }

    /// Number of frames (always >= 1).
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always `false`; tables are non-empty by construction.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Logical screen size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// All frames in display order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Frame at `index`, if in range.
    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Sum of all delays in milliseconds.
    pub fn total_ms(&self) -> u64 {
        self.ends_ms.last().copied().unwrap_or(0)
    }

    /// Sum of all delays in seconds.
    pub fn duration_s(&self) -> f64 {
        self.total_ms() as f64 / 1000.0
    }

    /// Start of frame `index`'s display window in milliseconds.
    pub fn start_ms(&self, index: usize) -> Option<u64> {
        match index {
            0 => Some(0),
            i if i < self.len() => Some(self.ends_ms[i - 1]),
            _ => None,
        }
    }

    /// Exclusive end of frame `index`'s display window in milliseconds.
    pub fn end_ms(&self, index: usize) -> Option<u64> {
        self.ends_ms.get(index).copied()
    }

    pub(crate) fn ends_ms(&self) -> &[u64] {
        &self.ends_ms
    }

    /// Average frames per second (`len / duration`).
    ///
    /// Advisory only: GIF delays vary per frame, so this is never used to resolve a time to a
    /// frame. Fails when the total duration is zero.
    pub fn frame_rate(&self) -> GifResult<f64> {
        let duration = self.duration_s();
        if duration <= 0.0 {
            return Err(GifError::division_undefined(
                "frame rate of a zero-duration animation",
            ));
        }
        Ok(self.len() as f64 / duration)
    }

    /// Mean frame spacing in seconds (`1 / frame_rate`). Advisory only.
    pub fn frame_duration_s(&self) -> GifResult<f64> {
        Ok(1.0 / self.frame_rate()?)
    }
}

fn split_duration_ms(duration_ms: u64, n: usize) -> GifResult<Vec<u32>> {
    let n64 = n as u64;
    let base = duration_ms / n64;
    let rem = duration_ms % n64;
    (0..n64)
        .map(|i| {
            let d = base + u64::from(i < rem);
            u32::try_from(d)
                .map_err(|_| GifError::decode(format!("frame delay {d}ms does not fit in u32")))
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/timing/frame_table.rs"]
mod tests;
