use std::sync::{Arc, Mutex};

use super::*;
use crate::assets::source::{DecodedGif, DecodedTiming, FramePixels, GifDecoder, GifSource};
use crate::foundation::core::Canvas;
use crate::graph::source::GifSourceNode;
use crate::playback::player::GifPlayerOpts;
use crate::present::presenter::{InMemoryPresenter, Presenter, SurfaceConfig};

type Log = Arc<Mutex<Vec<String>>>;

/// Scripted source: becomes ready on the `ready_after`-th poll after `load`, or fails there.
struct FakeSource {
    name: &'static str,
    log: Log,
    fail_load: bool,
    fail_refresh: bool,
    ready_after: u32,
    polls: u32,
    loaded: bool,
    ready: bool,
    frame: Option<usize>,
    dirty: bool,
}

impl FakeSource {
    fn new(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            log: Arc::clone(log),
            fail_load: false,
            fail_refresh: false,
            ready_after: 1,
            polls: 0,
            loaded: false,
            ready: false,
            frame: None,
            dirty: false,
        }
    }

    fn failing(mut self) -> Self {
        self.fail_load = true;
        self
    }

    fn ready_after(mut self, polls: u32) -> Self {
        self.ready_after = polls;
        self
    }

    fn failing_refresh(mut self) -> Self {
        self.fail_refresh = true;
        self
    }

    fn record(&self, what: String) {
        self.log.lock().unwrap().push(format!("{}:{what}", self.name));
    }
}

impl MediaSource for FakeSource {
    fn display_name(&self) -> &str {
        self.name
    }

    fn load(&mut self) -> GifResult<()> {
        self.record("load".to_owned());
        self.loaded = true;
        Ok(())
    }

    fn poll(&mut self) -> GifResult<()> {
        if self.loaded && !self.ready {
            if self.fail_load {
                return Err(GifError::decode("scripted failure"));
            }
            self.polls += 1;
            self.ready = self.polls >= self.ready_after;
        }
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn seek(&mut self, time_s: f64) -> GifResult<()> {
        self.record(format!("seek@{time_s}"));
        self.frame = Some((time_s * 10.0) as usize);
        self.dirty = true;
        Ok(())
    }

    fn update(&mut self, time_s: f64) -> GifResult<()> {
        self.record(format!("update@{time_s}"));
        let next = Some((time_s * 10.0) as usize);
        self.dirty |= next != self.frame;
        self.frame = next;
        Ok(())
    }

    fn refresh(&mut self) -> GifResult<bool> {
        if self.fail_refresh {
            return Err(GifError::presentation("surface lost"));
        }
        Ok(std::mem::take(&mut self.dirty))
    }

    fn current_frame(&self) -> Option<usize> {
        self.frame
    }
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

#[test]
fn load_starts_inside_preload_window_only() {
    let log = Log::default();
    let mut g = RenderGraph::with_preload(1.0).unwrap();
    let id = g
        .add_source(Box::new(FakeSource::new("a", &log)), 5.0, 8.0)
        .unwrap();

    g.tick(3.9).unwrap();
    assert!(entries(&log).is_empty());
    assert!(!g.is_ready(id).unwrap());

    let report = g.tick(4.0).unwrap();
    assert_eq!(entries(&log), vec!["a:load"]);
    assert_eq!(report, TickReport::default());
    assert!(g.is_ready(id).unwrap());

    g.tick(4.5).unwrap();
    assert_eq!(entries(&log), vec!["a:load"]);
}

#[test]
fn sources_are_sampled_with_local_time_inside_half_open_window() {
    let log = Log::default();
    let mut g = RenderGraph::with_preload(0.0).unwrap();
    let id = g
        .add_source(Box::new(FakeSource::new("a", &log)), 2.0, 3.0)
        .unwrap();

    let r = g.tick(2.5).unwrap();
    assert_eq!(r.sampled, 1);
    assert_eq!(r.presented, 1);
    assert_eq!(g.current_frame(id).unwrap(), Some(5));

    let r = g.tick(3.0).unwrap();
    assert_eq!(r.sampled, 0);
    assert_eq!(entries(&log), vec!["a:load", "a:update@0.5"]);
}

#[test]
fn source_whose_window_ended_before_loading_is_never_loaded() {
    let log = Log::default();
    let mut g = RenderGraph::new();
    g.add_source(Box::new(FakeSource::new("a", &log)), 1.0, 2.0)
        .unwrap();
    g.tick(2.0).unwrap();
    g.tick(10.0).unwrap();
    assert!(entries(&log).is_empty());
}

#[test]
fn failed_load_is_reported_and_does_not_stop_other_sources() {
    let log = Log::default();
    let mut g = RenderGraph::with_preload(0.0).unwrap();
    let bad = g
        .add_source(Box::new(FakeSource::new("bad", &log).failing()), 0.0, 10.0)
        .unwrap();
    let good = g
        .add_source(Box::new(FakeSource::new("good", &log)), 0.0, 10.0)
        .unwrap();

    let r = g.tick(1.0).unwrap();
    assert_eq!(r.failed, 1);
    assert_eq!(r.sampled, 1);
    assert!(!g.is_ready(bad).unwrap());
    assert!(g.is_ready(good).unwrap());

    let r = g.tick(1.2).unwrap();
    assert_eq!(r.failed, 1);
    assert_eq!(r.sampled, 1);
    assert_eq!(
        entries(&log)
            .iter()
            .filter(|e| e.starts_with("bad:"))
            .count(),
        1
    );
}

#[test]
fn seek_repositions_only_active_ready_sources() {
    let log = Log::default();
    let mut g = RenderGraph::with_preload(0.0).unwrap();
    g.add_source(Box::new(FakeSource::new("a", &log)), 0.0, 2.0)
        .unwrap();
    g.add_source(Box::new(FakeSource::new("b", &log)), 5.0, 6.0)
        .unwrap();

    g.tick(0.0).unwrap();
    g.seek(1.5).unwrap();
    g.seek(5.5).unwrap();
    let log = entries(&log);
    assert!(log.contains(&"a:seek@1.5".to_owned()));
    assert!(!log.iter().any(|e| e.starts_with("b:")));
}

#[test]
fn invalid_host_times_are_rejected() {
    let mut g = RenderGraph::new();
    assert!(matches!(g.tick(-1.0).unwrap_err(), GifError::InvalidSeek(_)));
    assert!(matches!(
        g.tick(f64::INFINITY).unwrap_err(),
        GifError::InvalidSeek(_)
    ));
    assert!(matches!(g.seek(f64::NAN).unwrap_err(), GifError::InvalidSeek(_)));
    assert!(RenderGraph::with_preload(-1.0).is_err());
}

#[test]
fn bad_windows_and_unknown_nodes_are_errors() {
    let log = Log::default();
    let mut g = RenderGraph::new();
    assert!(g
        .add_source(Box::new(FakeSource::new("a", &log)), 3.0, 1.0)
        .is_err());
    assert!(g.is_empty());
    assert!(matches!(
        g.is_ready(NodeId(7)).unwrap_err(),
        GifError::IndexOutOfRange { index: 7, len: 0 }
    ));
}

/// Presenter sharing its record with the test after being boxed into the graph.
#[derive(Clone, Default)]
struct SharedPresenter(Arc<Mutex<InMemoryPresenter>>);

impl Presenter for SharedPresenter {
    fn begin(&mut self, cfg: SurfaceConfig) -> GifResult<()> {
        self.0.lock().unwrap().begin(cfg)
    }

    fn present(&mut self, index: usize, pixels: &FramePixels) -> GifResult<()> {
        self.0.lock().unwrap().present(index, pixels)
    }
}

#[test]
fn gif_node_is_skipped_until_decoded_then_follows_the_timeline() {
    let (gate_tx, gate_rx) = std::sync::mpsc::channel::<()>();
    let gate_rx = Mutex::new(gate_rx);
    let decoder: Arc<dyn GifDecoder> = Arc::new(move |_: &GifSource| -> GifResult<DecodedGif> {
        gate_rx.lock().unwrap().recv().unwrap();
        Ok(DecodedGif {
            canvas: Canvas {
                width: 1,
                height: 1,
            },
            frames: (0..3u8)
                .map(|i| FramePixels::new(1, 1, vec![i, i, i, 255]))
                .collect(),
            timing: DecodedTiming::PerFrame(vec![100, 200, 100]),
        })
    });
    let presenter = SharedPresenter::default();
    let node = GifSourceNode::new(
        "spinner",
        vec![0u8; 8],
        GifPlayerOpts::default(),
        decoder,
        presenter.clone(),
    );

    let mut g = RenderGraph::with_preload(0.5).unwrap();
    let id = g.add_source(Box::new(node), 1.0, 3.0).unwrap();
    assert_eq!(g.display_name(id).unwrap(), "spinner");

    let r = g.tick(1.1).unwrap();
    assert_eq!(r.skipped_not_ready, 1);
    assert_eq!(g.current_frame(id).unwrap(), None);

    gate_tx.send(()).unwrap();
    let mut r = TickReport::default();
    for _ in 0..2000 {
        r = g.tick(1.15).unwrap();
        if r.sampled == 1 {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(1));
    }
    assert_eq!(r.sampled, 1);

    // The source was not ready at 1.1, so its clock starts when it first gets sampled.
    assert_eq!(g.current_frame(id).unwrap(), Some(0));

    let r = g.tick(1.15 + 0.3).unwrap();
    assert_eq!(r.presented, 1);
    assert_eq!(g.current_frame(id).unwrap(), Some(2));

    assert_eq!(presenter.0.lock().unwrap().presented_indices(), vec![0, 2]);
}

#[test]
fn source_clock_does_not_advance_while_not_ready() {
    let log = Log::default();
    let mut g = RenderGraph::with_preload(0.0).unwrap();
    g.add_source(
        Box::new(FakeSource::new("a", &log).ready_after(4)),
        2.0,
        10.0,
    )
    .unwrap();

    let mut skipped = 0;
    for t in [2.0, 2.1, 2.2, 2.3, 2.4, 2.5] {
        skipped += g.tick(t).unwrap().skipped_not_ready;
    }
    assert_eq!(skipped, 3);

    let updates: Vec<f64> = entries(&log)
        .iter()
        .filter_map(|e| e.strip_prefix("a:update@"))
        .map(|v| v.parse().unwrap())
        .collect();
    assert_eq!(updates.len(), 3);
    assert_eq!(updates[0], 0.0);
    assert!((updates[1] - 0.1).abs() < 1e-9);
    assert!((updates[2] - 0.2).abs() < 1e-9);
}

#[test]
fn preloaded_source_starts_on_window_start() {
    let log = Log::default();
    let mut g = RenderGraph::with_preload(1.0).unwrap();
    g.add_source(Box::new(FakeSource::new("a", &log)), 2.0, 4.0)
        .unwrap();
    g.tick(1.5).unwrap();
    g.tick(2.25).unwrap();
    assert_eq!(entries(&log), vec!["a:load", "a:update@0.25"]);
}

#[test]
fn seek_reanchors_a_late_source_to_its_window() {
    let log = Log::default();
    let mut g = RenderGraph::with_preload(0.0).unwrap();
    let id = g
        .add_source(
            Box::new(FakeSource::new("a", &log).ready_after(3)),
            1.0,
            5.0,
        )
        .unwrap();
    for t in [1.0, 1.1, 1.2] {
        g.tick(t).unwrap();
    }
    assert!(g.is_ready(id).unwrap());

    g.seek(3.0).unwrap();
    assert!(entries(&log).contains(&"a:seek@2".to_owned()));
    g.tick(3.5).unwrap();
    assert_eq!(entries(&log).last().unwrap(), "a:update@2.5");
}

#[test]
fn presentation_error_is_isolated_to_its_source() {
    let log = Log::default();
    let mut g = RenderGraph::with_preload(0.0).unwrap();
    g.add_source(
        Box::new(FakeSource::new("bad", &log).failing_refresh()),
        0.0,
        10.0,
    )
    .unwrap();
    let good = g
        .add_source(Box::new(FakeSource::new("good", &log)), 0.0, 10.0)
        .unwrap();

    for t in [1.0, 1.5] {
        let r = g.tick(t).unwrap();
        assert_eq!(r.errored, 1);
        assert_eq!(r.sampled, 2);
        assert_eq!(r.presented, 1);
    }
    assert_eq!(g.current_frame(good).unwrap(), Some(15));
    assert!(entries(&log).contains(&"good:update@1".to_owned()));
}
