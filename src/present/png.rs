use std::path::{Path, PathBuf};

use crate::{
    assets::source::FramePixels,
    foundation::{
        error::{GifError, GifResult},
        math::unpremultiply_rgba8,
    },
    present::presenter::{Presenter, SurfaceConfig},
};

/// Presenter that writes the most recently presented frame to a PNG file.
///
/// Every `present` overwrites the file, so after a run the file holds the last frame shown.
pub struct PngPresenter {
    out_path: PathBuf,
    cfg: Option<SurfaceConfig>,
    scratch: Vec<u8>,
    last_index: Option<usize>,
}

impl PngPresenter {
    /// Create a presenter writing to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            cfg: None,
            scratch: Vec::new(),
            last_index: None,
        }
    }

    /// Index of the last frame written, if any.
    pub fn last_index(&self) -> Option<usize> {
        self.last_index
    }

    /// Destination path.
    pub fn out_path(&self) -> &Path {
        &self.out_path
    }
}

impl Presenter for PngPresenter {
    fn begin(&mut self, cfg: SurfaceConfig) -> GifResult<()> {
        if cfg.canvas.width == 0 || cfg.canvas.height == 0 {
            return Err(GifError::presentation(
                "png presenter width/height must be non-zero",
            ));
        }
        ensure_parent_dir(&self.out_path)?;
        self.scratch = vec![0u8; cfg.canvas.rgba8_len()];
        self.cfg = Some(cfg);
        self.last_index = None;
        Ok(())
    }

    fn present(&mut self, index: usize, pixels: &FramePixels) -> GifResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| GifError::presentation("png presenter not started"))?;
        if pixels.width != cfg.canvas.width || pixels.height != cfg.canvas.height {
            return Err(GifError::presentation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                pixels.width, pixels.height, cfg.canvas.width, cfg.canvas.height
            )));
        }
        if pixels.rgba8_premul.len() != self.scratch.len() {
            return Err(GifError::presentation(
                "frame data size mismatch with width*height*4",
            ));
        }

        unpremultiply_rgba8(&mut self.scratch, &pixels.rgba8_premul);
        image::save_buffer_with_format(
            &self.out_path,
            &self.scratch,
            pixels.width,
            pixels.height,
            image::ExtendedColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| {
            GifError::presentation(format!(
                "write png '{}': {e}",
                self.out_path.display()
            ))
        })?;
        self.last_index = Some(index);
        Ok(())
    }
}

/// Create the parent directory of `path` if it does not exist.
pub fn ensure_parent_dir(path: &Path) -> GifResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            GifError::presentation(format!(
                "create output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/present/png.rs"]
mod tests;
