use std::sync::Mutex;

use super::*;
use crate::assets::source::{DecodedGif, DecodedTiming, FramePixels};
use crate::foundation::core::Canvas;
use crate::present::presenter::InMemoryPresenter;

fn decoded(delays: &[u32]) -> DecodedGif {
    DecodedGif {
        canvas: Canvas {
            width: 1,
            height: 1,
        },
        frames: delays
            .iter()
            .map(|_| FramePixels::new(1, 1, vec![0, 0, 0, 255]))
            .collect(),
        timing: DecodedTiming::PerFrame(delays.to_vec()),
    }
}

fn static_decoder(delays: &'static [u32]) -> Arc<dyn GifDecoder> {
    Arc::new(move |_: &GifSource| -> GifResult<DecodedGif> { Ok(decoded(delays)) })
}

/// Decoder that blocks until the test sends on the returned channel.
fn gated_decoder(delays: &'static [u32]) -> (Arc<dyn GifDecoder>, mpsc::Sender<()>) {
    let (tx, rx) = mpsc::channel::<()>();
    let rx = Mutex::new(rx);
    let dec = move |_: &GifSource| -> GifResult<DecodedGif> {
        rx.lock()
            .map_err(|_| GifError::decode("gate poisoned"))?
            .recv()
            .map_err(|_| GifError::decode("gate closed"))?;
        Ok(decoded(delays))
    };
    (Arc::new(dec), tx)
}

fn player(decoder: Arc<dyn GifDecoder>) -> GifPlayer<InMemoryPresenter> {
    GifPlayer::new(GifPlayerOpts::default(), decoder, InMemoryPresenter::new())
}

#[test]
fn opts_default_to_looping() {
    assert!(GifPlayerOpts::default().looping);
    let parsed: GifPlayerOpts = serde_json::from_str("{}").unwrap();
    assert!(parsed.looping);
}

#[test]
fn load_then_wait_makes_player_ready() {
    let mut p = player(static_decoder(&[100, 200, 100]));
    assert_eq!(p.status(), LoadStatus::Idle);
    assert!(!p.is_ready());

    p.load(vec![0u8; 4]).unwrap();
    p.wait_load().unwrap();
    assert_eq!(p.status(), LoadStatus::Loaded);
    assert!(p.is_ready());
    assert_eq!(p.frame_count(), Some(3));
    assert!((p.duration_s().unwrap() - 0.4).abs() < 1e-12);

    p.seek(0.1).unwrap();
    assert_eq!(p.current_frame_index(), Some(1));
    assert!(p.refresh().unwrap());
    assert_eq!(p.presenter().presented_indices(), vec![1]);
}

#[test]
fn poll_load_eventually_applies_result() {
    let (dec, gate) = gated_decoder(&[50]);
    let mut p = player(dec);
    p.load(vec![1u8]).unwrap();
    assert_eq!(p.poll_load().unwrap(), LoadStatus::Pending);
    assert!(!p.is_ready());

    gate.send(()).unwrap();
    let mut status = LoadStatus::Pending;
    for _ in 0..2000 {
        status = p.poll_load().unwrap();
        if status != LoadStatus::Pending {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(1));
    }
    assert_eq!(status, LoadStatus::Loaded);
    assert!(p.is_ready());
}

#[test]
fn not_ready_player_ignores_per_tick_calls() {
    let (dec, gate) = gated_decoder(&[100, 100]);
    let mut p = player(dec);
    p.seek(0.15).unwrap();
    p.update(-5.0).unwrap();
    p.seek_to_frame(42).unwrap();
    assert!(!p.refresh().unwrap());

    p.load(vec![1u8]).unwrap();
    p.seek(0.15).unwrap();
    p.update(0.15).unwrap();
    assert!(!p.is_ready());
    assert_eq!(p.current_frame_index(), None);
    assert!(p.presenter().presented().is_empty());
    drop(gate);
}

#[test]
fn second_load_is_rejected_while_pending_and_after_success() {
    let (dec, gate) = gated_decoder(&[100]);
    let mut p = player(dec);
    p.load(vec![1u8]).unwrap();
    let err = p.load(vec![2u8]).unwrap_err();
    assert!(matches!(err, GifError::AlreadyLoading(_)));

    gate.send(()).unwrap();
    p.wait_load().unwrap();
    let err = p.load(vec![3u8]).unwrap_err();
    assert!(matches!(err, GifError::AlreadyLoading(_)));
    assert!(p.is_ready());
}

#[test]
fn decode_failure_surfaces_once_and_player_stays_not_ready() {
    let dec: Arc<dyn GifDecoder> =
        Arc::new(|_: &GifSource| -> GifResult<DecodedGif> { Err(GifError::decode("corrupt")) });
    let mut p = player(dec);
    p.load(vec![1u8]).unwrap();
    let err = p.wait_load().unwrap_err();
    assert!(err.to_string().contains("corrupt"));
    assert!(matches!(p.status(), LoadStatus::Failed(_)));
    assert!(!p.is_ready());
    assert_eq!(p.poll_load().unwrap(), p.status());
    assert!(matches!(
        p.load(vec![1u8]).unwrap_err(),
        GifError::AlreadyLoading(_)
    ));
}

#[test]
fn empty_decode_output_fails_the_load() {
    let mut p = player(static_decoder(&[]));
    p.load(vec![1u8]).unwrap();
    let err = p.wait_load().unwrap_err();
    assert!(matches!(err, GifError::EmptyInput(_)));
    assert!(!p.is_ready());
}

#[test]
fn dispose_discards_in_flight_decode() {
    let (dec, gate) = gated_decoder(&[100, 100]);
    let mut p = player(dec);
    p.load(vec![1u8]).unwrap();
    p.dispose();
    gate.send(()).ok();

    std::thread::sleep(std::time::Duration::from_millis(20));
    assert_eq!(p.poll_load().unwrap(), LoadStatus::Disposed);
    assert!(!p.is_ready());
    assert!(p.frame_table().is_none());
    p.seek(0.1).unwrap();
    assert!(!p.refresh().unwrap());
    assert!(p.presenter().config().is_none());
    assert!(p.load(vec![1u8]).is_err());
    assert!(p.wait_load().is_err());
}

#[test]
fn dispose_after_load_turns_player_off() {
    let mut p = player(static_decoder(&[100]));
    p.load(vec![1u8]).unwrap();
    p.wait_load().unwrap();
    p.play();
    p.dispose();
    assert!(!p.is_ready());
    assert!(!p.is_playing());
    assert_eq!(p.current_frame_index(), None);
    assert_eq!(p.status(), LoadStatus::Disposed);
}

#[test]
fn wait_without_load_is_a_validation_error() {
    let mut p = player(static_decoder(&[100]));
    assert!(matches!(
        p.wait_load().unwrap_err(),
        GifError::Validation(_)
    ));
}

#[test]
fn non_looping_player_rejects_negative_seek() {
    let mut p = GifPlayer::new(
        GifPlayerOpts { looping: false },
        static_decoder(&[100, 100]),
        InMemoryPresenter::new(),
    );
    p.load(vec![1u8]).unwrap();
    p.wait_load().unwrap();
    assert!(!p.looping());
    assert!(matches!(
        p.seek(-0.5).unwrap_err(),
        GifError::InvalidSeek(_)
    ));
    p.seek(5.0).unwrap();
    assert_eq!(p.current_frame_index(), Some(1));
}

#[test]
fn on_loaded_hook_runs_once_with_the_table() {
    let seen = Arc::new(Mutex::new(Vec::<usize>::new()));
    let seen_in_hook = Arc::clone(&seen);
    let mut p = player(static_decoder(&[100, 200]));
    p.on_loaded(move |table| seen_in_hook.lock().unwrap().push(table.len()));
    p.load(vec![1u8]).unwrap();
    p.wait_load().unwrap();
    p.wait_load().unwrap();
    p.poll_load().unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![2]);
}

#[test]
fn on_loaded_hook_is_skipped_when_load_fails() {
    let called = Arc::new(Mutex::new(false));
    let called_in_hook = Arc::clone(&called);
    let mut p = player(static_decoder(&[]));
    p.on_loaded(move |_| *called_in_hook.lock().unwrap() = true);
    p.load(vec![1u8]).unwrap();
    assert!(p.wait_load().is_err());
    assert!(!*called.lock().unwrap());
}

#[test]
fn step_frame_moves_through_frames_after_load() {
    let mut p = player(static_decoder(&[100, 100, 100]));
    p.step_frame(1);
    assert_eq!(p.current_frame_index(), None);

    p.load(vec![1u8]).unwrap();
    p.wait_load().unwrap();
    p.step_frame(1);
    assert_eq!(p.current_frame_index(), Some(1));
    p.step_frame(-2);
    assert_eq!(p.current_frame_index(), Some(2));
    assert!(p.refresh().unwrap());
    assert_eq!(p.presenter().presented_indices(), vec![2]);
}

#[test]
fn failed_load_is_reported_by_every_wait_and_once_by_poll() {
    let (dec, gate) = gated_decoder(&[]);
    let mut p = player(dec);
    p.load(vec![1u8]).unwrap();
    gate.send(()).unwrap();

    let mut first = None;
    for _ in 0..2000 {
        match p.poll_load() {
            Ok(LoadStatus::Pending) => std::thread::sleep(std::time::Duration::from_millis(1)),
            other => {
                first = Some(other);
                break;
            }
        }
    }
    assert!(matches!(first, Some(Err(GifError::EmptyInput(_)))));
    assert!(matches!(p.poll_load().unwrap(), LoadStatus::Failed(_)));
    assert!(p.wait_load().is_err());
    assert!(p.wait_load().is_err());
}
