//! Report line formatting.
//!
//! The layout is consumed by downstream spreadsheet/plotting tooling,
//! so field order and spacing are fixed. There are two spaces between
//! the mean value and `Area`.

use crate::models::Measurement;

/// Format a measurement value: integral values carry a trailing `.0`.
pub fn fmt_value(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

/// One per-spot measurement line. `cell_index` is 0-based; the report
/// shows cells 1-based.
pub fn spot_line(tag: &str, cell_index: usize, m: &Measurement) -> String {
    format!(
        "{} Cell {} Mean Intensity = {}  Area = {} Integrated Intensity = {}",
        tag,
        cell_index + 1,
        fmt_value(m.mean),
        fmt_value(m.area),
        fmt_value(m.integrated_density)
    )
}

/// One background sample line; background samples carry no cell index.
pub fn background_line(m: &Measurement) -> String {
    format!(
        "BackGround Mean Intensity = {}  Area = {} Integrated Intensity = {}",
        fmt_value(m.mean),
        fmt_value(m.area),
        fmt_value(m.integrated_density)
    )
}
