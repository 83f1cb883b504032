//! Automatic thresholding and spot-threshold finding.
//!
//! `auto_threshold` is the iterative intermeans (IsoData) method over a
//! 256-bin histogram, applied dark-background: foreground is at or above
//! the returned value. `find_spot_threshold` derives the per-cell spot
//! threshold from the brightest particle found this way.

use serde::{Deserialize, Serialize};

use super::measure::measure;
use super::particles::{analyze_particles, ParticleOptions};
use crate::models::{ChannelImage, Region};

const HIST_BINS: usize = 256;
const MAX_ITERATIONS: usize = 256;

/// The [low, high] intensity range used to binarize a channel before
/// spot detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdWindow {
    pub lower: f64,
    pub upper: f64,
}

impl ThresholdWindow {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Open-ended window: everything at or above `lower`.
    pub fn above(lower: f64) -> Self {
        Self {
            lower,
            upper: f64::INFINITY,
        }
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// IsoData automatic threshold over a value sample (dark background).
///
/// Returns `None` when the sample is empty or has no dynamic range -
/// there is nothing to separate.
pub fn auto_threshold(values: &[f32]) -> Option<f64> {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &v in values {
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
    }
    if !min.is_finite() || !max.is_finite() || min >= max {
        return None;
    }

    let scale = (HIST_BINS - 1) as f32 / (max - min);
    let mut hist = [0u64; HIST_BINS];
    for &v in values {
        hist[(((v - min) * scale) as usize).min(HIST_BINS - 1)] += 1;
    }

    // Iterative intermeans: move the split point to the midpoint of the
    // class means until it stops moving. Bins 0 and 255 are non-empty by
    // construction, so both classes stay populated for 1 <= level <= 255.
    let mut level = HIST_BINS / 2;
    for _ in 0..MAX_ITERATIONS {
        let (mut sum_lo, mut n_lo, mut sum_hi, mut n_hi) = (0f64, 0u64, 0f64, 0u64);
        for (i, &count) in hist.iter().enumerate() {
            if i < level {
                sum_lo += (i as f64) * count as f64;
                n_lo += count;
            } else {
                sum_hi += (i as f64) * count as f64;
                n_hi += count;
            }
        }
        let mean_lo = if n_lo > 0 { sum_lo / n_lo as f64 } else { 0.0 };
        let mean_hi = if n_hi > 0 {
            sum_hi / n_hi as f64
        } else {
            (HIST_BINS - 1) as f64
        };

        let next = (((mean_lo + mean_hi) / 2.0).round() as usize).clamp(1, HIST_BINS - 1);
        if next == level {
            break;
        }
        level = next;
    }

    Some(min as f64 + level as f64 * (max - min) as f64 / (HIST_BINS - 1) as f64)
}

/// Find the per-cell spot threshold for one nucleus.
///
/// Auto-thresholds the channel restricted to `region`, detects particles
/// of at least `min_area` pixels (no upper bound, borders allowed) and
/// returns the maximum per-particle maximum intensity.
///
/// `None` is the "no threshold" sentinel: no particles were found, or
/// the region has no usable signal. Callers skip manual-threshold
/// prompting in that case instead of windowing on a degenerate [0, 0].
pub fn find_spot_threshold(
    channel: &ChannelImage,
    region: &Region,
    min_area: usize,
) -> Option<f64> {
    let stats = measure(channel, region);
    if stats.area == 0.0 {
        return None;
    }

    let values: Vec<f32> = region
        .pixels()
        .iter()
        .filter(|&&(x, y)| x < channel.width() && y < channel.height())
        .map(|&(x, y)| channel.get(x, y))
        .collect();

    let auto = auto_threshold(&values)?;

    let particles = analyze_particles(
        channel,
        ThresholdWindow::above(auto),
        Some(region),
        ParticleOptions {
            min_area,
            max_area: None,
            exclude_border: false,
        },
    );

    particles
        .iter()
        .map(|(_, stats)| stats.max)
        .fold(None, |best, max| match best {
            Some(b) if b >= max => Some(b),
            _ => Some(max),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChannelRole, Rect};

    fn channel(width: u32, height: u32, background: f32, spots: &[(Rect, f32)]) -> ChannelImage {
        ChannelImage::from_fn("test", ChannelRole::Primary, width, height, |x, y| {
            for &(rect, value) in spots {
                if x >= rect.x && x < rect.right() && y >= rect.y && y < rect.bottom() {
                    return value;
                }
            }
            background
        })
    }

    #[test]
    fn auto_threshold_separates_two_classes() {
        let mut values = vec![10.0f32; 80];
        values.extend(vec![200.0f32; 20]);
        let t = auto_threshold(&values).unwrap();
        assert!(t > 10.0 && t < 200.0);
    }

    #[test]
    fn auto_threshold_flat_sample_is_none() {
        assert!(auto_threshold(&[7.0; 64]).is_none());
        assert!(auto_threshold(&[]).is_none());
    }

    #[test]
    fn window_contains_bounds() {
        let w = ThresholdWindow::new(6.0, 10.0);
        assert!(w.contains(6.0));
        assert!(w.contains(10.0));
        assert!(!w.contains(5.9));
        assert!(!w.contains(10.1));
        assert!(ThresholdWindow::above(6.0).contains(1e12));
    }

    #[test]
    fn spot_threshold_is_brightest_particle_maximum() {
        // Two spots inside the nucleus area, different peak intensities.
        let ch = channel(
            32,
            32,
            20.0,
            &[
                (Rect::new(6, 6, 3, 3), 180.0),
                (Rect::new(14, 14, 3, 3), 240.0),
            ],
        );

        let nucleus = Region::from_rect(Rect::new(2, 2, 24, 24)).unwrap();
        let t = find_spot_threshold(&ch, &nucleus, 3).unwrap();
        assert_eq!(t, 240.0);
    }

    #[test]
    fn spot_threshold_sentinel_on_flat_region() {
        let ch = channel(16, 16, 50.0, &[]);
        let nucleus = Region::from_rect(Rect::new(2, 2, 10, 10)).unwrap();
        assert!(find_spot_threshold(&ch, &nucleus, 3).is_none());
    }

    #[test]
    fn spot_threshold_never_negative_or_nan() {
        let ch = channel(16, 16, 0.0, &[]);
        let nucleus = Region::from_rect(Rect::new(1, 1, 8, 8)).unwrap();
        match find_spot_threshold(&ch, &nucleus, 3) {
            None => {}
            Some(t) => {
                assert!(t.is_finite());
                assert!(t >= 0.0);
            }
        }
    }
}
