use crate::{
    foundation::{
        core::TimeWindow,
        error::{GifError, GifResult},
    },
    graph::source::MediaSource,
};

/// Seconds before a source's start at which the graph begins loading it.
pub const DEFAULT_PRELOAD_S: f64 = 4.0;

/// Handle to a source added to a [`RenderGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// Per-tick summary returned by [`RenderGraph::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct TickReport {
    /// Sources inside their window that were ready and got sampled.
    pub sampled: usize,
    /// Sources inside their window that were skipped because they were not ready.
    pub skipped_not_ready: usize,
    /// Sources that handed a frame to their presenter this tick.
    pub presented: usize,
    /// Sources whose load failed (never sampled again).
    pub failed: usize,
    /// Sources whose `update` or `refresh` returned an error this tick.
    pub errored: usize,
}

struct ScheduledSource {
    source: Box<dyn MediaSource>,
    window: TimeWindow,
    load_requested: bool,
    failed: bool,
    /// Host time at which the source-local clock reads zero. Set on the first ready sample.
    clock_origin_s: Option<f64>,
    /// The source spent in-window ticks not ready, so its clock starts late.
    stalled: bool,
}

impl ScheduledSource {
    /// Source-local time for host time `time_s`.
    ///
    /// The local clock does not advance while the source is inside its window but not ready: a
    /// source that becomes ready late starts at zero from that tick.
    fn local_time(&mut self, time_s: f64) -> f64 {
        let origin = *self.clock_origin_s.get_or_insert(if self.stalled {
            time_s
        } else {
            self.window.start_s
        });
        (time_s - origin).max(0.0)
    }

    fn sample(&mut self, time_s: f64, report: &mut TickReport) -> GifResult<()> {
        let local = self.local_time(time_s);
        self.source.update(local)?;
        report.sampled += 1;
        if self.source.refresh()? {
            report.presented += 1;
        }
        Ok(())
    }
}

/// Host timeline that schedules media sources and samples them each tick.
///
/// Sources are composed behind [`MediaSource`]; the graph knows nothing about GIFs.
pub struct RenderGraph {
    nodes: Vec<ScheduledSource>,
    preload_s: f64,
}

impl Default for RenderGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderGraph {
    /// Create an empty graph with the default preload window.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            preload_s: DEFAULT_PRELOAD_S,
        }
    }

    /// Create an empty graph with a custom preload window.
    pub fn with_preload(preload_s: f64) -> GifResult<Self> {
        if !preload_s.is_finite() || preload_s < 0.0 {
            return Err(GifError::validation(
                "preload window must be finite and >= 0",
            ));
        }
        Ok(Self {
            nodes: Vec::new(),
            preload_s,
        })
    }

    /// Schedule `source` to play during `[start_s, stop_s)` of the host timeline.
    pub fn add_source(
        &mut self,
        source: Box<dyn MediaSource>,
        start_s: f64,
        stop_s: f64,
    ) -> GifResult<NodeId> {
        let window = TimeWindow::new(start_s, stop_s)?;
        let id = u32::try_from(self.nodes.len())
            .map_err(|_| GifError::validation("too many sources in one graph"))?;
        self.nodes.push(ScheduledSource {
            source,
            window,
            load_requested: false,
            failed: false,
            clock_origin_s: None,
            stalled: false,
        });
        Ok(NodeId(id))
    }

    /// Number of scheduled sources.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `true` when no sources are scheduled.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, id: NodeId) -> GifResult<&ScheduledSource> {
        self.nodes
            .get(id.0 as usize)
            .ok_or(GifError::IndexOutOfRange {
                index: id.0 as usize,
                len: self.nodes.len(),
            })
    }

    /// Display name of a source.
    pub fn display_name(&self, id: NodeId) -> GifResult<&str> {
        Ok(self.node(id)?.source.display_name())
    }

    /// Whether a source is ready to be sampled.
    pub fn is_ready(&self, id: NodeId) -> GifResult<bool> {
        Ok(self.node(id)?.source.is_ready())
    }

    /// Currently selected frame of a source.
    pub fn current_frame(&self, id: NodeId) -> GifResult<Option<usize>> {
        Ok(self.node(id)?.source.current_frame())
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| NodeId(i as u32))
    }

    /// Advance the graph to host time `time_s`.
    ///
    /// Starts loads for sources entering their preload window, applies finished loads, then
    /// samples and presents every ready source whose window contains `time_s`.
    ///
    /// Each source has its own clock, which stays at zero while the source sits in its window
    /// without being ready. A source that fails to load is logged and skipped from then on; a
    /// source whose sampling or presentation fails is logged and counted in
    /// [`TickReport::errored`]. Neither fails the tick.
    pub fn tick(&mut self, time_s: f64) -> GifResult<TickReport> {
        check_host_time(time_s)?;
        let mut report = TickReport::default();

        for node in &mut self.nodes {
            if node.failed {
                report.failed += 1;
                continue;
            }
            if let Err(e) = drive_load(node, time_s, self.preload_s) {
                tracing::warn!(
                    source = node.source.display_name(),
                    error = %e,
                    "source failed to load; skipping it"
                );
                node.failed = true;
                report.failed += 1;
                continue;
            }

            if !node.window.contains(time_s) {
                continue;
            }
            if !node.source.is_ready() {
                if node.clock_origin_s.is_none() {
                    node.stalled = true;
                }
                report.skipped_not_ready += 1;
                continue;
            }

            if let Err(e) = node.sample(time_s, &mut report) {
                tracing::warn!(
                    source = node.source.display_name(),
                    error = %e,
                    "source failed to sample or present"
                );
                report.errored += 1;
            }
        }

        Ok(report)
    }

    /// Reposition every ready source whose window contains `time_s`.
    ///
    /// A seek re-anchors each ready source's clock to its window start, discarding any delay
    /// accumulated while it was loading. Sources that reject the seek are logged and skipped.
    /// Presentation happens at the next [`RenderGraph::tick`].
    pub fn seek(&mut self, time_s: f64) -> GifResult<()> {
        check_host_time(time_s)?;
        for node in &mut self.nodes {
            if node.failed || !node.source.is_ready() {
                continue;
            }
            node.clock_origin_s = Some(node.window.start_s);
            node.stalled = false;
            if !node.window.contains(time_s) {
                continue;
            }
            let local = node.local_time(time_s);
            if let Err(e) = node.source.seek(local) {
                tracing::warn!(
                    source = node.source.display_name(),
                    error = %e,
                    "source rejected seek"
                );
            }
        }
        Ok(())
    }
}

fn drive_load(node: &mut ScheduledSource, time_s: f64, preload_s: f64) -> GifResult<()> {
    if !node.load_requested {
        let preload_from = node.window.start_s - preload_s;
        if time_s < preload_from || time_s >= node.window.end_s {
            return Ok(());
        }
        node.load_requested = true;
        tracing::debug!(source = node.source.display_name(), "requesting load");
        node.source.load()?;
    }
    node.source.poll()
}

fn check_host_time(time_s: f64) -> GifResult<()> {
    if !time_s.is_finite() || time_s < 0.0 {
        return Err(GifError::invalid_seek(format!(
            "host time must be finite and >= 0, got {time_s}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/graph/render_graph.rs"]
mod tests;
