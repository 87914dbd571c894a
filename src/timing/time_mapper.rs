use crate::{
    foundation::error::{GifError, GifResult},
    timing::frame_table::{Frame, FrameTable},
};

/// Float noise below this many milliseconds is snapped to the nearest whole millisecond, so that
/// e.g. `1.1 s * 1000` lands on the `1100 ms` boundary instead of just past it.
const SNAP_EPS_MS: f64 = 1e-6;

/// A resolved frame: its index and a reference into the table.
#[derive(Clone, Copy, Debug)]
pub struct FrameAt<'a> {
    /// Index into the frame table.
    pub index: usize,
    /// The frame itself.
    pub frame: &'a Frame,
}

/// Resolve playback time (seconds) to the frame on screen at that instant.
///
/// Each frame `i` owns the half-open window `[start_i, end_i)` of the cumulative delay sequence, so
/// a time exactly on a boundary belongs to the later frame and zero-delay frames are never hit.
///
/// - Non-finite time fails with [`GifError::InvalidSeek`].
/// - Negative time fails with [`GifError::InvalidSeek`] unless `looping`, in which case it wraps
///   (`-0.1 s` on a `0.4 s` table resolves like `0.3 s`).
/// - With `looping`, time wraps modulo the total duration; exactly `duration` maps to frame 0.
/// - Without `looping`, time at or beyond the duration clamps to the last frame.
/// - A zero-duration table always resolves to frame 0.
pub fn frame_at(table: &FrameTable, time_s: f64, looping: bool) -> GifResult<FrameAt<'_>> {
    let index = index_at(table, time_s, looping)?;
    Ok(FrameAt {
        index,
        frame: &table.frames()[index],
    })
}

/// Index-only variant of [`frame_at`].
pub fn index_at(table: &FrameTable, time_s: f64, looping: bool) -> GifResult<usize> {
    if !time_s.is_finite() {
        return Err(GifError::invalid_seek(format!(
            "playback time must be finite, got {time_s}"
        )));
    }
    if time_s < 0.0 && !looping {
        return Err(GifError::invalid_seek(format!(
            "playback time must be >= 0 when not looping, got {time_s}s"
        )));
    }

    let total_ms = table.total_ms();
    if total_ms == 0 {
        return Ok(0);
    }

    let mut target_ms = snap_ms(time_s * 1000.0);
    if looping {
        target_ms = snap_ms(target_ms.rem_euclid(total_ms as f64));
        // rem_euclid can round up to the modulus itself for tiny negative inputs.
        if target_ms >= total_ms as f64 {
            target_ms = 0.0;
        }
    }

    let ends = table.ends_ms();
    let i = ends.partition_point(|&end| (end as f64) <= target_ms);
    Ok(i.min(ends.len() - 1))
}

fn snap_ms(ms: f64) -> f64 {
    let r = ms.round();
    if (ms - r).abs() < SNAP_EPS_MS { r } else { ms }
}

#[cfg(test)]
#[path = "../../tests/unit/timing/time_mapper.rs"]
mod tests;
