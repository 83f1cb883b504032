//! Channel stack loading for front-ends.
//!
//! A stack path is either a single image file (one slice) or a directory
//! whose image files, sorted by name, form the z-slices. Pixels are read
//! as 16-bit luma and widened to `f32`.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::ImageStack;

/// Extensions recognized as image slices when scanning a directory.
const SLICE_EXTENSIONS: &[&str] = &["tif", "tiff", "png", "jpg", "jpeg", "bmp"];

/// Errors from channel stack loading.
#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("No image slices found at {0}")]
    EmptyStack(String),

    #[error("Slice {path} is {width}x{height}, expected {expected_width}x{expected_height}")]
    MismatchedSlice {
        path: String,
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },
}

impl ImagingError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    fn decode(path: &Path, source: image::ImageError) -> Self {
        Self::Decode {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Load a z-stack from a file or a directory of slice files.
pub fn load_stack(path: &Path) -> Result<ImageStack, ImagingError> {
    let slice_paths = if path.is_dir() {
        let mut slices: Vec<PathBuf> = std::fs::read_dir(path)
            .map_err(|e| ImagingError::io(path, e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| is_slice_file(p))
            .collect();
        slices.sort();
        slices
    } else {
        vec![path.to_path_buf()]
    };

    if slice_paths.is_empty() {
        return Err(ImagingError::EmptyStack(path.display().to_string()));
    }

    let mut stack: Option<ImageStack> = None;
    for slice_path in &slice_paths {
        let decoded = image::open(slice_path).map_err(|e| ImagingError::decode(slice_path, e))?;
        let luma = decoded.to_luma16();
        let (width, height) = luma.dimensions();
        let pixels: Vec<f32> = luma.into_raw().into_iter().map(|v| v as f32).collect();

        let stack = stack.get_or_insert_with(|| ImageStack::new(width, height));
        if !stack.push_slice(pixels) {
            return Err(ImagingError::MismatchedSlice {
                path: slice_path.display().to_string(),
                width,
                height,
                expected_width: stack.width(),
                expected_height: stack.height(),
            });
        }
    }

    // slice_paths is non-empty, so the stack was initialized above.
    Ok(stack.unwrap_or_else(|| ImageStack::new(0, 0)))
}

fn is_slice_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| SLICE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
}
