//! Core types for the measurement pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::interaction::Interaction;
use crate::logging::SessionLogger;
use crate::models::{ChannelSet, ChannelStacks, Measurement};
use crate::roi::RegionArchive;

/// Progress callback type for reporting pipeline progress.
///
/// Arguments: (step_name, percent_complete, message)
pub type ProgressCallback = Box<dyn Fn(&str, u32, &str) + Send + Sync>;

/// Read-only context passed to pipeline steps.
///
/// The session context object: created once at session start and
/// threaded through every call. Contains configuration and shared
/// capabilities that steps can read but not modify; mutable state goes
/// in `SessionState`.
pub struct Context {
    /// The three raw channel stacks for this session.
    pub stacks: ChannelStacks,
    /// Application settings.
    pub settings: Settings,
    /// Session name (the source image name; used in the report header).
    pub session_name: String,
    /// Session working directory (region archive lives here).
    pub work_dir: PathBuf,
    /// Path of the shared cumulative results file.
    pub report_path: PathBuf,
    /// Per-session logger.
    pub logger: Arc<SessionLogger>,
    /// User-prompt capability.
    pub interaction: Arc<dyn Interaction>,
    /// Optional progress callback.
    progress_callback: Option<ProgressCallback>,
}

impl Context {
    /// Create a new context for a session.
    pub fn new(
        stacks: ChannelStacks,
        settings: Settings,
        session_name: impl Into<String>,
        work_dir: PathBuf,
        report_path: PathBuf,
        logger: Arc<SessionLogger>,
        interaction: Arc<dyn Interaction>,
    ) -> Self {
        Self {
            stacks,
            settings,
            session_name: session_name.into(),
            work_dir,
            report_path,
            logger,
            interaction,
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Report progress to callback (if set).
    pub fn report_progress(&self, step_name: &str, percent: u32, message: &str) {
        if let Some(ref callback) = self.progress_callback {
            callback(step_name, percent, message);
        }
    }

    /// The persisted region archive for this session.
    pub fn region_archive(&self) -> RegionArchive {
        RegionArchive::new(self.work_dir.join("RoiSet.json"))
    }
}

/// Mutable session state that accumulates results from pipeline steps.
///
/// Steps add new data but should not overwrite existing values. Each
/// step's output is stored in its own section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    /// Unique session identifier.
    pub session_id: String,
    /// When the session started.
    pub started_at: Option<String>,
    /// Projected channels (from ProjectChannels step). Pixel buffers are
    /// not serialized with the state snapshot.
    #[serde(skip)]
    pub channels: Option<ChannelSet>,
    /// Nucleus selection results (from SelectNuclei step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionOutput>,
    /// Measurement results (from MeasureCells step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurement: Option<MeasurementOutput>,
}

impl SessionState {
    /// Create a new session state with the given ID.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    /// Check if channels have been projected.
    pub fn has_channels(&self) -> bool {
        self.channels.is_some()
    }

    /// Check if nucleus selection has been completed.
    pub fn has_selection(&self) -> bool {
        self.selection.is_some()
    }

    /// Number of confirmed cells (0 before selection).
    pub fn cell_count(&self) -> usize {
        self.selection.as_ref().map(|s| s.cell_count).unwrap_or(0)
    }
}

/// Output from the SelectNuclei step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionOutput {
    /// Number of confirmed nucleus regions, in selection order.
    pub cell_count: usize,
    /// Path of the persisted region archive.
    pub archive_path: PathBuf,
}

/// Output from the MeasureCells step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeasurementOutput {
    /// Per-cell measurements, in cell-index order.
    pub cells: Vec<CellMeasurements>,
    /// Spot report lines actually written (valid measurements only).
    pub spot_lines_written: usize,
    /// Background report lines actually written.
    pub background_lines_written: usize,
}

/// Measurements collected for one cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellMeasurements {
    /// 0-based cell index (selection order).
    pub cell_index: usize,
    /// Spot threshold used for this cell; `None` = no usable signal.
    pub threshold: Option<f64>,
    /// Primary-channel spot measurements, in detection order.
    pub primary: Vec<Measurement>,
    /// Secondary-channel measurements over the same spot regions,
    /// same order.
    pub secondary: Vec<Measurement>,
    /// Background samples taken after this cell.
    pub background: Vec<Measurement>,
}

/// Result of executing a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step completed successfully.
    Success,
    /// Step was skipped (preconditions not met, but not an error).
    Skipped(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_state_tracks_completion() {
        let mut state = SessionState::new("test-123");
        assert!(!state.has_selection());
        assert_eq!(state.cell_count(), 0);

        state.selection = Some(SelectionOutput {
            cell_count: 3,
            archive_path: PathBuf::from(".temp/RoiSet.json"),
        });

        assert!(state.has_selection());
        assert_eq!(state.cell_count(), 3);
    }

    #[test]
    fn session_state_serializes() {
        let state = SessionState::new("test-456");
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"session_id\":\"test-456\""));
    }
}
