//! Region measurement against a channel.

use crate::models::{ChannelImage, Region, RegionStats};

/// Measure a region against a channel.
///
/// Pixels falling outside the channel bounds are ignored. A region with
/// no in-bounds pixels measures as all zeros, which downstream code
/// treats as an absent measurement (mean <= 0).
pub fn measure(channel: &ChannelImage, region: &Region) -> RegionStats {
    let mut sum = 0.0f64;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum_x = 0.0f64;
    let mut sum_y = 0.0f64;
    let mut count = 0usize;

    for &(x, y) in region.pixels() {
        if x >= channel.width() || y >= channel.height() {
            continue;
        }
        let v = channel.get(x, y) as f64;
        sum += v;
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
        sum_x += x as f64;
        sum_y += y as f64;
        count += 1;
    }

    if count == 0 {
        return RegionStats {
            area: 0.0,
            mean: 0.0,
            min: 0.0,
            max: 0.0,
            centroid_x: 0.0,
            centroid_y: 0.0,
            integrated_density: 0.0,
        };
    }

    let n = count as f64;
    RegionStats {
        area: n,
        mean: sum / n,
        min,
        max,
        centroid_x: sum_x / n,
        centroid_y: sum_y / n,
        integrated_density: sum,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChannelRole, Rect};

    #[test]
    fn measures_uniform_region() {
        let ch = ChannelImage::from_fn("c", ChannelRole::Secondary, 8, 8, |_, _| 12.5);
        let region = Region::from_rect(Rect::new(1, 1, 5, 6)).unwrap();

        let stats = measure(&ch, &region);
        assert_eq!(stats.area, 30.0);
        assert_eq!(stats.mean, 12.5);
        assert_eq!(stats.integrated_density, 375.0);
        assert_eq!(stats.min, 12.5);
        assert_eq!(stats.max, 12.5);
    }

    #[test]
    fn integrated_density_is_mean_times_area() {
        let ch = ChannelImage::from_fn("c", ChannelRole::Primary, 4, 4, |x, y| (x + y) as f32);
        let region = Region::from_rect(Rect::new(0, 0, 4, 4)).unwrap();

        let stats = measure(&ch, &region);
        assert!((stats.integrated_density - stats.mean * stats.area).abs() < 1e-9);
    }

    #[test]
    fn out_of_bounds_pixels_are_ignored() {
        let ch = ChannelImage::from_fn("c", ChannelRole::Primary, 4, 4, |_, _| 3.0);
        let region = Region::from_rect(Rect::new(2, 2, 4, 4)).unwrap();

        let stats = measure(&ch, &region);
        assert_eq!(stats.area, 4.0);
        assert_eq!(stats.mean, 3.0);
    }

    #[test]
    fn fully_outside_region_measures_as_absent() {
        let ch = ChannelImage::from_fn("c", ChannelRole::Primary, 4, 4, |_, _| 3.0);
        let region = Region::from_rect(Rect::new(10, 10, 2, 2)).unwrap();

        let stats = measure(&ch, &region);
        assert_eq!(stats.area, 0.0);
        assert!(!stats.measurement().is_valid());
    }

    #[test]
    fn centroid_tracks_region_position() {
        let ch = ChannelImage::from_fn("c", ChannelRole::Primary, 16, 16, |_, _| 1.0);
        let region = Region::from_rect(Rect::new(4, 6, 3, 3)).unwrap();

        let stats = measure(&ch, &region);
        assert_eq!(stats.centroid_x, 5.0);
        assert_eq!(stats.centroid_y, 7.0);
    }
}
