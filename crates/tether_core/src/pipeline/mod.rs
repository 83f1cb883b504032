//! Measurement pipeline for coordinating a session.
//!
//! This module provides the infrastructure for running the interactive
//! per-cell measurement session. Each session consists of a sequence of
//! steps that validate, execute, and record their results.
//!
//! # Architecture
//!
//! ```text
//! Pipeline
//!     ├── Step: ProjectChannels
//!     ├── Step: SelectNuclei
//!     └── Step: MeasureCells
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tether_core::pipeline::{create_standard_pipeline, Context, SessionState};
//!
//! let pipeline = create_standard_pipeline();
//!
//! let ctx = Context::new(stacks, settings, "cells_01.tif", work_dir,
//!     report_path, logger, interaction);
//! let mut state = SessionState::new("session-123");
//!
//! let result = pipeline.run(&ctx, &mut state)?;
//! println!("Completed: {:?}", result.steps_completed);
//! ```

mod errors;
#[allow(clippy::module_inception)]
mod pipeline;
mod step;
pub mod steps;
mod types;

pub use errors::{SessionError, SessionResult, StepError, StepResult};
pub use pipeline::{CancelHandle, Pipeline, PipelineRunResult};
pub use step::PipelineStep;
pub use steps::{MeasureCellsStep, ProjectChannelsStep, SelectNucleiStep};
pub use types::{
    CellMeasurements, Context, MeasurementOutput, ProgressCallback, SelectionOutput, SessionState,
    StepOutcome,
};

/// Create the standard measurement pipeline with all steps in order.
///
/// 1. ProjectChannels - z-project and autoscale the three channels
/// 2. SelectNuclei - detect candidates and confirm cells of interest
/// 3. MeasureCells - per-cell dual-channel spot measurement, background
///    sampling and report writing
pub fn create_standard_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(ProjectChannelsStep::new())
        .with_step(SelectNucleiStep::new())
        .with_step(MeasureCellsStep::new())
}
