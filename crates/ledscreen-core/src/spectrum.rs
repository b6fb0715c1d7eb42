//! Linear resampling of the analyser histogram onto the LED columns.

/// Linearly interpolated value of `from` at fractional index `location`.
///
/// Past the last sample the final value is reused instead of reading out of
/// bounds. An empty source reads as silence.
pub fn sample_at<T: Copy + Into<f32>>(from: &[T], location: f32) -> f32 {
    let Some(last) = from.len().checked_sub(1) else {
        return 0.0;
    };
    let base = location.max(0.0).floor();
    let delta = location.max(0.0) - base;
    let i = (base as usize).min(last);
    let y1: f32 = from[i].into();
    let y2: f32 = if i + 1 > last { y1 } else { from[i + 1].into() };
    y1 * (1.0 - delta) + y2 * delta
}

/// Resamples `from` across the whole of `to`: the first and last target slots
/// land exactly on the first and last source samples.
pub fn resample_into<T: Copy + Into<f32>>(from: &[T], to: &mut [f32]) {
    let n = to.len();
    if n == 1 {
        to[0] = sample_at(from, 0.0);
        return;
    }
    let span = from.len().saturating_sub(1) as f32;
    let steps = n.saturating_sub(1) as f32;
    for (idx, out) in to.iter_mut().enumerate() {
        // multiply first so same-length resampling lands on whole indices
        let location = (idx as f32 * span) / steps;
        *out = sample_at(from, location);
    }
}

/// Allocating convenience wrapper around [`resample_into`].
pub fn resample<T: Copy + Into<f32>>(from: &[T], len: usize) -> Vec<f32> {
    let mut out = vec![0.0; len];
    resample_into(from, &mut out);
    out
}

/// Byte magnitude (0..=255) to `[0, 1]`.
#[inline]
pub fn normalize_byte(v: f32) -> f32 {
    (v / 255.0).clamp(0.0, 1.0)
}
