//! Fixed-length windows centred on an anchor sample
//!
//! The anchor always lands at relative position `window_samples / 2`;
//! positions outside the source are filled with [`MISSING`].

use jumpsync_core::types::{KinematicTriple, MISSING};

/// Number of samples in a window of `duration_seconds`.
///
/// Non-positive or non-finite durations give 0.
#[must_use]
pub fn window_samples(duration_seconds: f64, sample_rate: f64) -> usize {
    let n = (duration_seconds * sample_rate).round();
    if n.is_finite() && n > 0.0 {
        n as usize
    } else {
        0
    }
}

/// Crop `signal` to a window of `duration_seconds` centred on `anchor`.
///
/// `anchor` may be negative or past the end. Never fails; the output length
/// is always [`window_samples`].
#[must_use]
pub fn crop(signal: &[f64], anchor: i64, sample_rate: f64, duration_seconds: f64) -> Vec<f64> {
    let size = window_samples(duration_seconds, sample_rate);
    let mut out = vec![MISSING; size];
    if size == 0 {
        return out;
    }

    let half = (size / 2) as i64;
    let len = signal.len() as i64;
    let src_start = anchor.saturating_sub(half).max(0);
    let src_end = anchor.saturating_add(half).min(len);
    if src_start >= src_end {
        return out;
    }

    let dst_start = half.saturating_sub(anchor).max(0) as usize;
    let src = &signal[src_start as usize..src_end as usize];
    let dst_end = (dst_start + src.len()).min(size);
    out[dst_start..dst_end].copy_from_slice(&src[..dst_end - dst_start]);
    out
}

/// Crop every channel and the time axis of `triple` around the same anchor.
///
/// Time stamps outside the source are [`MISSING`] as well.
#[must_use]
pub fn crop_triple(triple: &KinematicTriple, anchor: i64, duration_seconds: f64) -> KinematicTriple {
    let fs = triple.sample_rate;
    KinematicTriple {
        time: crop(&triple.time, anchor, fs, duration_seconds),
        displacement: crop(&triple.displacement, anchor, fs, duration_seconds),
        velocity: crop(&triple.velocity, anchor, fs, duration_seconds),
        acceleration: crop(&triple.acceleration, anchor, fs, duration_seconds),
        sample_rate: fs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jumpsync_core::types::is_missing;

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    #[test]
    fn test_anchor_maps_to_center() {
        let out = crop(&ramp(100), 50, 10.0, 2.0);
        assert_eq!(out.len(), 20);
        assert_eq!(out[10], 50.0);
        assert_eq!(out[0], 40.0);
        assert_eq!(out[19], 59.0);
    }

    #[test]
    fn test_length_invariant_for_all_anchors() {
        let signal = ramp(30);
        for anchor in [-100, -5, 0, 3, 15, 29, 30, 40, 500] {
            for duration in [0.5, 1.0, 2.5, 7.0] {
                let out = crop(&signal, anchor, 10.0, duration);
                assert_eq!(out.len(), window_samples(duration, 10.0), "anchor {anchor}, duration {duration}");
            }
        }
    }

    #[test]
    fn test_left_padding() {
        let out = crop(&ramp(100), 3, 10.0, 2.0);
        assert!(out[..7].iter().all(|v| is_missing(*v)));
        assert_eq!(out[7], 0.0);
        assert_eq!(out[10], 3.0);
    }

    #[test]
    fn test_right_padding() {
        let out = crop(&ramp(20), 18, 10.0, 2.0);
        assert_eq!(out[10], 18.0);
        assert_eq!(out[11], 19.0);
        assert!(out[12..].iter().all(|v| is_missing(*v)));
    }

    #[test]
    fn test_window_longer_than_signal() {
        let out = crop(&ramp(5), 2, 10.0, 2.0);
        assert_eq!(out.len(), 20);
        assert_eq!(&out[8..13], &[0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(out.iter().filter(|v| !is_missing(**v)).count(), 5);
    }

    #[test]
    fn test_anchor_outside_signal() {
        assert!(crop(&ramp(10), -50, 10.0, 2.0).iter().all(|v| is_missing(*v)));
        assert!(crop(&ramp(10), 50, 10.0, 2.0).iter().all(|v| is_missing(*v)));
        assert!(crop(&ramp(10), 10, 10.0, 2.0).iter().take(10).all(|v| !is_missing(*v)));
    }

    #[test]
    fn test_extreme_anchors() {
        let signal = ramp(30);
        for anchor in [i64::MIN, i64::MIN + 1, i64::MAX - 1, i64::MAX] {
            let out = crop(&signal, anchor, 10.0, 2.0);
            assert_eq!(out.len(), 20, "anchor {anchor}");
            assert!(out.iter().all(|v| is_missing(*v)), "anchor {anchor}");
        }
    }

    #[test]
    fn test_degenerate_durations() {
        assert!(crop(&ramp(10), 5, 10.0, 0.0).is_empty());
        assert!(crop(&ramp(10), 5, 10.0, -1.0).is_empty());
        assert!(crop(&ramp(10), 5, 10.0, f64::NAN).is_empty());
    }

    #[test]
    fn test_crop_triple_shares_anchor() {
        let triple = KinematicTriple::uniform(ramp(50), ramp(50), ramp(50), 10.0, 0.0).unwrap();
        let cropped = crop_triple(&triple, 25, 1.0);
        assert_eq!(cropped.len(), 10);
        assert_eq!(cropped.displacement[5], 25.0);
        assert_eq!(cropped.acceleration[5], 25.0);
        assert!((cropped.time[5] - 2.5).abs() < 1e-12);
    }
}
