//! Regions: closed planar outlines over image pixels.
//!
//! A region is used both for whole-nucleus selections and for individual
//! detected spots. Pixel membership is stored explicitly so the same
//! region can be measured against any channel.

use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge, exclusive.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Bottom edge, exclusive.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }
}

/// A closed pixel region: bounding box plus owned pixel coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    bounds: Rect,
    pixels: Vec<(u32, u32)>,
}

impl Region {
    /// Build a region from an arbitrary pixel set.
    ///
    /// Returns `None` for an empty set. Pixels are sorted in scan order
    /// so equal pixel sets compare equal.
    pub fn from_pixels(mut pixels: Vec<(u32, u32)>) -> Option<Self> {
        if pixels.is_empty() {
            return None;
        }
        pixels.sort_unstable_by_key(|&(x, y)| (y, x));
        pixels.dedup();

        let min_x = pixels.iter().map(|p| p.0).min().unwrap_or(0);
        let max_x = pixels.iter().map(|p| p.0).max().unwrap_or(0);
        let min_y = pixels.iter().map(|p| p.1).min().unwrap_or(0);
        let max_y = pixels.iter().map(|p| p.1).max().unwrap_or(0);

        Some(Self {
            bounds: Rect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1),
            pixels,
        })
    }

    /// Build a filled rectangular region (user-placed background sample).
    ///
    /// Returns `None` for a zero-area rectangle.
    pub fn from_rect(rect: Rect) -> Option<Self> {
        if rect.width == 0 || rect.height == 0 {
            return None;
        }
        let mut pixels = Vec::with_capacity((rect.width as usize) * (rect.height as usize));
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                pixels.push((x, y));
            }
        }
        Some(Self {
            bounds: rect,
            pixels,
        })
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Pixel count (the region area).
    pub fn area(&self) -> usize {
        self.pixels.len()
    }

    /// Pixels in scan order.
    pub fn pixels(&self) -> &[(u32, u32)] {
        &self.pixels
    }

    /// Pixel-count-weighted centroid.
    pub fn centroid(&self) -> (f64, f64) {
        let n = self.pixels.len() as f64;
        let (sx, sy) = self
            .pixels
            .iter()
            .fold((0.0f64, 0.0f64), |(sx, sy), &(x, y)| {
                (sx + x as f64, sy + y as f64)
            });
        (sx / n, sy / n)
    }

    /// Whether the region touches the border of a `width` x `height` image.
    pub fn touches_border(&self, width: u32, height: u32) -> bool {
        self.bounds.x == 0
            || self.bounds.y == 0
            || self.bounds.right() >= width
            || self.bounds.bottom() >= height
    }

    /// Membership test. Pixels are kept sorted in scan order.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.pixels
            .binary_search_by_key(&(y, x), |&(px, py)| (py, px))
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_pixels_computes_bounds() {
        let region = Region::from_pixels(vec![(2, 3), (3, 3), (2, 4)]).unwrap();
        assert_eq!(region.bounds(), Rect::new(2, 3, 2, 2));
        assert_eq!(region.area(), 3);
    }

    #[test]
    fn from_pixels_rejects_empty() {
        assert!(Region::from_pixels(Vec::new()).is_none());
    }

    #[test]
    fn from_rect_fills_pixels() {
        let region = Region::from_rect(Rect::new(1, 1, 3, 2)).unwrap();
        assert_eq!(region.area(), 6);
        assert!(region.contains(3, 2));
        assert!(!region.contains(0, 1));
    }

    #[test]
    fn centroid_of_square() {
        let region = Region::from_rect(Rect::new(0, 0, 3, 3)).unwrap();
        assert_eq!(region.centroid(), (1.0, 1.0));
    }

    #[test]
    fn border_touch_detection() {
        let inner = Region::from_rect(Rect::new(1, 1, 2, 2)).unwrap();
        assert!(!inner.touches_border(10, 10));
        assert!(inner.touches_border(3, 10));

        let edge = Region::from_rect(Rect::new(0, 4, 2, 2)).unwrap();
        assert!(edge.touches_border(10, 10));
    }

    #[test]
    fn equal_pixel_sets_compare_equal() {
        let a = Region::from_pixels(vec![(1, 1), (2, 1), (1, 2)]).unwrap();
        let b = Region::from_pixels(vec![(1, 2), (1, 1), (2, 1)]).unwrap();
        assert_eq!(a, b);
    }
}
