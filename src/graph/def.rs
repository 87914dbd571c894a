use std::{
    collections::HashSet,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    assets::source::GifDecoder,
    foundation::{
        core::{Fps, TimeWindow},
        error::{GifError, GifResult},
    },
    graph::{
        render_graph::{DEFAULT_PRELOAD_S, RenderGraph},
        source::GifSourceNode,
    },
    playback::player::GifPlayerOpts,
    present::presenter::Presenter,
};

/// JSON description of a render graph: a timeline plus the GIF sources scheduled on it.
///
/// ```json
/// {
///   "fps": { "num": 30, "den": 1 },
///   "duration_s": 6.0,
///   "sources": [
///     { "id": "spinner", "path": "media/spinner.gif", "start_s": 1.0, "stop_s": 5.0 }
///   ]
/// }
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphDef {
    /// Host refresh cadence.
    pub fps: Fps,
    /// Timeline length in seconds.
    pub duration_s: f64,
    /// Seconds before a source's start at which its load begins.
    #[serde(default = "default_preload_s")]
    pub preload_s: f64,
    /// Scheduled sources.
    #[serde(default)]
    pub sources: Vec<SourceDef>,
}

/// One GIF source scheduled on a [`GraphDef`] timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceDef {
    /// Unique name, used in logs and reports.
    pub id: String,
    /// GIF path relative to the graph file.
    pub path: String,
    /// Timeline time at which the source becomes active.
    pub start_s: f64,
    /// Timeline time at which the source stops being active (exclusive).
    pub stop_s: f64,
    /// Wrap playback around at the end of the animation.
    #[serde(default = "default_looping")]
    pub looping: bool,
}

fn default_preload_s() -> f64 {
    DEFAULT_PRELOAD_S
}

fn default_looping() -> bool {
    true
}

impl GraphDef {
    /// Parse a graph definition from JSON.
    pub fn from_reader<R: std::io::Read>(r: R) -> GifResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| GifError::validation(format!("parse graph JSON: {e}")))
    }

    /// Parse a graph definition from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> GifResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            GifError::validation(format!("open graph JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check cadence, durations, source ids, windows and paths.
    pub fn validate(&self) -> GifResult<()> {
        Fps::new(self.fps.num, self.fps.den)?;
        if !self.duration_s.is_finite() || self.duration_s <= 0.0 {
            return Err(GifError::validation("graph duration_s must be finite and > 0"));
        }
        if !self.preload_s.is_finite() || self.preload_s < 0.0 {
            return Err(GifError::validation("graph preload_s must be finite and >= 0"));
        }

        let mut seen = HashSet::new();
        for s in &self.sources {
            if s.id.trim().is_empty() {
                return Err(GifError::validation("source id must be non-empty"));
            }
            if !seen.insert(s.id.as_str()) {
                return Err(GifError::validation(format!(
                    "duplicate source id '{}'",
                    s.id
                )));
            }
            TimeWindow::new(s.start_s, s.stop_s).map_err(|e| {
                GifError::validation(format!("source '{}' has a bad window: {e}", s.id))
            })?;
            if s.start_s < 0.0 {
                return Err(GifError::validation(format!(
                    "source '{}' starts before the timeline",
                    s.id
                )));
            }
            normalize_rel_path(&s.path).map_err(|e| {
                GifError::validation(format!("source '{}' path: {e}", s.id))
            })?;
        }
        Ok(())
    }

    /// Number of refresh ticks covering `duration_s`.
    pub fn tick_count(&self) -> u64 {
        (self.duration_s * self.fps.as_f64()).ceil() as u64
    }

    /// Validate, then build a [`RenderGraph`] with one [`GifSourceNode`] per source.
    ///
    /// Source paths are resolved against `assets_root`. `make_presenter` supplies the presentation
    /// surface for each source.
    pub fn build_with<P, F>(
        &self,
        assets_root: &Path,
        decoder: Arc<dyn GifDecoder>,
        mut make_presenter: F,
    ) -> GifResult<RenderGraph>
    where
        P: Presenter + 'static,
        F: FnMut(&SourceDef) -> GifResult<P>,
    {
        self.validate()?;
        let mut graph = RenderGraph::with_preload(self.preload_s)?;
        for s in &self.sources {
            let path = resolve_source_path(assets_root, &s.path)?;
            let node = GifSourceNode::new(
                s.id.clone(),
                path,
                GifPlayerOpts { looping: s.looping },
                Arc::clone(&decoder),
                make_presenter(s)?,
            );
            graph.add_source(Box::new(node), s.start_s, s.stop_s)?;
        }
        tracing::debug!(sources = graph.len(), "graph built");
        Ok(graph)
    }
}

fn resolve_source_path(assets_root: &Path, source: &str) -> GifResult<PathBuf> {
    let rel = normalize_rel_path(source)?;
    Ok(assets_root.join(rel))
}

pub(crate) fn normalize_rel_path(source: &str) -> GifResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(GifError::validation("source paths must be relative"));
    }
    if s.is_empty() {
        return Err(GifError::validation("source path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(GifError::validation("source paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(GifError::validation("source path must contain a file name"));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/graph/def.rs"]
mod tests;
