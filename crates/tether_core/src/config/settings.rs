//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level
//! updates.

use serde::{Deserialize, Serialize};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Channel projection settings.
    #[serde(default)]
    pub projection: ProjectionSettings,

    /// Spot/nucleus detection settings.
    #[serde(default)]
    pub detection: DetectionSettings,

    /// Report output settings.
    #[serde(default)]
    pub report: ReportSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Path configuration for output, temp, and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Output folder for the cumulative results file.
    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    /// Root folder for working files (region archive).
    #[serde(default = "default_temp_root")]
    pub temp_root: String,

    /// Folder for log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_output_folder() -> String {
    "tether_output".to_string()
}

fn default_temp_root() -> String {
    ".temp".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            output_folder: default_output_folder(),
            temp_root: default_temp_root(),
            logs_folder: default_logs_folder(),
        }
    }
}

/// Channel projection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionSettings {
    /// Percentage of pixels allowed to saturate when autoscaling the
    /// display range of a projected channel.
    #[serde(default = "default_contrast_saturation")]
    pub contrast_saturation_pct: f64,
}

fn default_contrast_saturation() -> f64 {
    0.35
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            contrast_saturation_pct: default_contrast_saturation(),
        }
    }
}

/// Detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionSettings {
    /// Minimum candidate nucleus area in pixels.
    #[serde(default = "default_nucleus_min_area")]
    pub nucleus_min_area: usize,

    /// Minimum spot area in pixels.
    #[serde(default = "default_spot_min_area")]
    pub spot_min_area: usize,

    /// Maximum spot area in pixels.
    #[serde(default = "default_spot_max_area")]
    pub spot_max_area: usize,

    /// Minimum particle area during threshold finding.
    #[serde(default = "default_threshold_min_area")]
    pub threshold_min_area: usize,

    /// Lower bound of the spot threshold window as a fraction of the
    /// detected maximum. A heuristic noise floor, not a statistically
    /// derived one; tune per assay.
    #[serde(default = "default_threshold_floor_fraction")]
    pub threshold_floor_fraction: f64,

    /// Background samples collected per measured cell.
    #[serde(default = "default_background_samples")]
    pub background_samples: usize,
}

fn default_nucleus_min_area() -> usize {
    150
}

fn default_spot_min_area() -> usize {
    5
}

fn default_spot_max_area() -> usize {
    200
}

fn default_threshold_min_area() -> usize {
    3
}

fn default_threshold_floor_fraction() -> f64 {
    0.6
}

fn default_background_samples() -> usize {
    4
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            nucleus_min_area: default_nucleus_min_area(),
            spot_min_area: default_spot_min_area(),
            spot_max_area: default_spot_max_area(),
            threshold_min_area: default_threshold_min_area(),
            threshold_floor_fraction: default_threshold_floor_fraction(),
            background_samples: default_background_samples(),
        }
    }
}

/// Report output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    /// File name of the cumulative results file (under the output folder).
    #[serde(default = "default_report_file")]
    pub file_name: String,

    /// Tag for primary-channel spot lines.
    #[serde(default = "default_primary_tag")]
    pub primary_tag: String,

    /// Tag for secondary-channel spot lines.
    #[serde(default = "default_secondary_tag")]
    pub secondary_tag: String,
}

fn default_report_file() -> String {
    "Results.txt".to_string()
}

fn default_primary_tag() -> String {
    "Green Dot".to_string()
}

fn default_secondary_tag() -> String {
    "Red Dot".to_string()
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            file_name: default_report_file(),
            primary_tag: default_primary_tag(),
            secondary_tag: default_secondary_tag(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Use compact log format.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,

    /// Show timestamps in log output.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,
}

fn default_true() -> bool {
    true
}

fn default_progress_step() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: true,
            progress_step: default_progress_step(),
            show_timestamps: true,
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Projection,
    Detection,
    Report,
    Logging,
}

impl ConfigSection {
    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Projection => "projection",
            ConfigSection::Detection => "detection",
            ConfigSection::Report => "report",
            ConfigSection::Logging => "logging",
        }
    }
}
