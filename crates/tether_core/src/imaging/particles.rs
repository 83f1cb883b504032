//! Connected-component particle analysis.
//!
//! Binarizes a channel with a threshold window, labels 8-connected
//! components and returns each qualifying component as a region with its
//! statistics. Components are produced in scan order of their first
//! pixel.

use super::measure::measure;
use super::threshold::ThresholdWindow;
use crate::models::{ChannelImage, Region, RegionStats};

/// Size and border constraints for particle detection.
#[derive(Debug, Clone, Copy)]
pub struct ParticleOptions {
    /// Minimum particle area in pixels, inclusive.
    pub min_area: usize,
    /// Maximum particle area in pixels, inclusive. `None` = unbounded.
    pub max_area: Option<usize>,
    /// Drop particles whose bounding box touches the image border.
    pub exclude_border: bool,
}

impl Default for ParticleOptions {
    fn default() -> Self {
        Self {
            min_area: 1,
            max_area: None,
            exclude_border: false,
        }
    }
}

/// Detect particles in `channel` whose pixel values fall inside `window`.
///
/// When `within` is given, detection is confined to that region's
/// interior; pixels outside it never join a particle.
pub fn analyze_particles(
    channel: &ChannelImage,
    window: ThresholdWindow,
    within: Option<&Region>,
    options: ParticleOptions,
) -> Vec<(Region, RegionStats)> {
    let width = channel.width() as usize;
    let height = channel.height() as usize;
    if width == 0 || height == 0 {
        return Vec::new();
    }

    // Foreground mask, optionally confined to the enclosing region.
    let mut mask = vec![false; width * height];
    match within {
        Some(region) => {
            for &(x, y) in region.pixels() {
                if (x as usize) < width && (y as usize) < height {
                    let idx = (y as usize) * width + x as usize;
                    mask[idx] = window.contains(channel.get(x, y) as f64);
                }
            }
        }
        None => {
            for (idx, flag) in mask.iter_mut().enumerate() {
                let x = (idx % width) as u32;
                let y = (idx / width) as u32;
                *flag = window.contains(channel.get(x, y) as f64);
            }
        }
    }

    let mut visited = vec![false; width * height];
    let mut particles = Vec::new();
    let mut stack = Vec::new();

    for seed in 0..mask.len() {
        if !mask[seed] || visited[seed] {
            continue;
        }

        // Flood fill, 8-connectivity.
        let mut pixels = Vec::new();
        visited[seed] = true;
        stack.push(seed);
        while let Some(idx) = stack.pop() {
            let x = idx % width;
            let y = idx / width;
            pixels.push((x as u32, y as u32));

            let x0 = x.saturating_sub(1);
            let y0 = y.saturating_sub(1);
            let x1 = (x + 1).min(width - 1);
            let y1 = (y + 1).min(height - 1);
            for ny in y0..=y1 {
                for nx in x0..=x1 {
                    let nidx = ny * width + nx;
                    if mask[nidx] && !visited[nidx] {
                        visited[nidx] = true;
                        stack.push(nidx);
                    }
                }
            }
        }

        if pixels.len() < options.min_area {
            continue;
        }
        if let Some(max_area) = options.max_area {
            if pixels.len() > max_area {
                continue;
            }
        }

        let region = match Region::from_pixels(pixels) {
            Some(r) => r,
            None => continue,
        };
        if options.exclude_border && region.touches_border(channel.width(), channel.height()) {
            continue;
        }

        let stats = measure(channel, &region);
        particles.push((region, stats));
    }

    particles
}
