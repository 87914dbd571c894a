use std::io::Cursor;

use anyhow::Context;
use image::{AnimationDecoder, ImageDecoder, codecs::gif::GifDecoder as CodecGifDecoder};
use rayon::prelude::*;

use crate::{
    assets::source::{DecodedGif, DecodedTiming, FramePixels, GifDecoder, GifSource},
    foundation::{
        core::Canvas,
        error::{GifError, GifResult},
        math::premultiply_rgba8_in_place,
    },
};

/// Default decoder backed by the `image` crate's GIF codec.
///
/// Frames come out of the codec already composited onto the full logical screen, so every
/// [`FramePixels`] has the canvas size. Pixels are converted to premultiplied alpha.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageGifDecoder;

impl ImageGifDecoder {
    /// Create the decoder.
    pub fn new() -> Self {
        Self
    }
}

impl GifDecoder for ImageGifDecoder {
    #[tracing::instrument(skip(self, source), fields(source = %source.label()))]
    fn decode(&self, source: &GifSource) -> GifResult<DecodedGif> {
        match source {
            GifSource::Path(path) => {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("read gif '{}'", path.display()))?;
                decode_gif_bytes(&bytes)
            }
            GifSource::Bytes(bytes) => decode_gif_bytes(bytes),
        }
    }
}

/// Decode encoded GIF bytes into premultiplied frames and per-frame delays.
pub fn decode_gif_bytes(bytes: &[u8]) -> GifResult<DecodedGif> {
    let decoder = CodecGifDecoder::new(Cursor::new(bytes))
        .map_err(|e| GifError::decode(format!("parse gif header: {e}")))?;
    let (width, height) = decoder.dimensions();
    let frames = decoder
        .into_frames()
        .collect_frames()
        .map_err(|e| GifError::decode(format!("decode gif frames: {e}")))?;

    let delays: Vec<u32> = frames
        .iter()
        .map(|f| {
            let (num, den) = f.delay().numer_denom_ms();
            delay_to_ms(num, den)
        })
        .collect();

    let frames: Vec<FramePixels> = frames
        .into_par_iter()
        .map(|f| {
            let buf = f.into_buffer();
            let (w, h) = buf.dimensions();
            let mut rgba = buf.into_raw();
            premultiply_rgba8_in_place(&mut rgba);
            FramePixels::new(w, h, rgba)
        })
        .collect();

    tracing::debug!(
        width,
        height,
        frames = frames.len(),
        "decoded gif"
    );

    Ok(DecodedGif {
        canvas: Canvas { width, height },
        frames,
        timing: DecodedTiming::PerFrame(delays),
    })
}

/// Round a rational millisecond delay to whole milliseconds.
fn delay_to_ms(num: u32, den: u32) -> u32 {
    if den == 0 {
        return 0;
    }
    let ms = (u64::from(num) + u64::from(den) / 2) / u64::from(den);
    u32::try_from(ms).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
