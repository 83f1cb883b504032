//! MeasureCells step - the per-cell dual-channel measurement loop.
//!
//! For each confirmed nucleus, in selection order:
//! 1. find the spot threshold on the primary channel inside the nucleus
//! 2. window it and offer the user a manual override
//! 3. detect spots confined to the nucleus interior
//! 4. measure every spot on the primary channel, then the same spot
//!    regions (same order) on the secondary channel
//! 5. reset the working set from the persisted nucleus archive
//! 6. collect background samples in the secondary channel
//!
//! Measuring the identical spot geometry on both channels is the core
//! analytical intent: a primary-label spot can later be correlated with
//! co-localized secondary signal at the same pixel location.

use crate::imaging::{
    analyze_particles, find_spot_threshold, measure, ParticleOptions, ThresholdWindow,
};
use crate::models::{ChannelRole, ChannelSet, Measurement, Rect, Region};
use crate::pipeline::errors::{StepError, StepResult};
use crate::pipeline::step::PipelineStep;
use crate::pipeline::types::{
    CellMeasurements, Context, MeasurementOutput, SessionState, StepOutcome,
};
use crate::report::ReportWriter;
use crate::roi::{RegionArchive, RegionSet};

/// MeasureCells step for the per-cell measurement pipeline.
pub struct MeasureCellsStep;

impl MeasureCellsStep {
    pub fn new() -> Self {
        Self
    }

    /// Detect this cell's spots in the primary channel, with the user
    /// given a chance to override the automatic threshold window.
    ///
    /// A `None` threshold means no usable signal: the manual prompt is
    /// skipped and the cell yields zero spots.
    fn detect_spots(
        ctx: &Context,
        channels: &ChannelSet,
        nucleus: &Region,
        threshold: Option<f64>,
    ) -> StepResult<Vec<Region>> {
        let det = &ctx.settings.detection;

        let threshold = match threshold {
            Some(t) => t,
            None => {
                ctx.logger
                    .warn("No usable signal in this cell; skipping spot detection");
                return Ok(Vec::new());
            }
        };

        let auto_window = ThresholdWindow::new(det.threshold_floor_fraction * threshold, threshold);
        let window = ctx.interaction.adjust_threshold(auto_window)?;
        if window != auto_window {
            ctx.logger.info(&format!(
                "Threshold window adjusted to [{:.1}, {:.1}]",
                window.lower, window.upper
            ));
        }

        let detected = analyze_particles(
            &channels.primary,
            window,
            Some(nucleus),
            ParticleOptions {
                min_area: det.spot_min_area,
                max_area: Some(det.spot_max_area),
                exclude_border: true,
            },
        );

        Ok(detected.into_iter().map(|(region, _)| region).collect())
    }

    /// Collect the configured number of user-placed background samples
    /// from the secondary channel.
    fn sample_background(
        ctx: &Context,
        channels: &ChannelSet,
    ) -> StepResult<Vec<Measurement>> {
        let bounds = Rect::new(
            0,
            0,
            channels.secondary.width(),
            channels.secondary.height(),
        );

        let mut samples = Vec::with_capacity(ctx.settings.detection.background_samples);
        for i in 0..ctx.settings.detection.background_samples {
            let region = ctx.interaction.place_region(
                &format!("Place ROI {} on area of background", i + 1),
                bounds,
            )?;
            samples.push(measure(&channels.secondary, &region).measurement());
        }
        Ok(samples)
    }
}

impl Default for MeasureCellsStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for MeasureCellsStep {
    fn name(&self) -> &str {
        "MeasureCells"
    }

    fn description(&self) -> &str {
        "Measure spots in both signal channels for every confirmed cell"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        let det = &ctx.settings.detection;
        if det.spot_min_area > det.spot_max_area {
            return Err(StepError::invalid_input(format!(
                "spot size range is empty: [{}, {}]",
                det.spot_min_area, det.spot_max_area
            )));
        }
        if !(0.0..=1.0).contains(&det.threshold_floor_fraction) {
            return Err(StepError::invalid_input(format!(
                "threshold_floor_fraction must be in [0, 1], got {}",
                det.threshold_floor_fraction
            )));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut SessionState) -> StepResult<StepOutcome> {
        let channels = state
            .channels
            .as_ref()
            .ok_or_else(|| StepError::precondition_failed("channels not projected"))?;
        let selection = state
            .selection
            .as_ref()
            .ok_or_else(|| StepError::precondition_failed("nuclei not selected"))?;

        let archive = RegionArchive::new(&selection.archive_path);
        let mut working = RegionSet::new();
        working.reload_from(&archive)?;

        if working.len() != selection.cell_count {
            return Err(StepError::precondition_failed(format!(
                "archive holds {} regions, expected {}",
                working.len(),
                selection.cell_count
            )));
        }

        let mut writer = ReportWriter::new(&ctx.report_path, &ctx.session_name);
        let mut output = MeasurementOutput::default();
        let total = selection.cell_count;

        if total == 0 {
            state.measurement = Some(output);
            return Ok(StepOutcome::Skipped("No cells selected".to_string()));
        }

        for cell_index in 0..total {
            ctx.logger.section(&format!("Cell {}", cell_index + 1));
            ctx.report_progress(
                self.name(),
                (cell_index * 100 / total) as u32,
                &format!("Measuring cell {} of {}", cell_index + 1, total),
            );

            let nucleus = working
                .get(cell_index)
                .cloned()
                .ok_or_else(|| {
                    StepError::precondition_failed(format!("nucleus {} missing", cell_index))
                })?;

            // Threshold finding, restricted to the nucleus interior.
            let threshold = find_spot_threshold(
                &channels.primary,
                &nucleus,
                ctx.settings.detection.threshold_min_area,
            );
            if let Some(t) = threshold {
                ctx.logger.info(&format!("Spot threshold: {:.1}", t));
            }

            // Spot detection replaces the working set contents.
            let spots = Self::detect_spots(ctx, channels, &nucleus, threshold)?;
            ctx.logger
                .info(&format!("{} spots detected", spots.len()));
            working.replace_all(spots);

            // Primary pass, then the secondary pass over the exact same
            // regions in the same order.
            let primary: Vec<Measurement> = working
                .iter()
                .map(|r| measure(&channels.primary, r).measurement())
                .collect();
            output.spot_lines_written += writer.write_spot_batch(
                ChannelRole::Primary,
                &ctx.settings.report.primary_tag,
                cell_index,
                &primary,
            );

            let secondary: Vec<Measurement> = working
                .iter()
                .map(|r| measure(&channels.secondary, r).measurement())
                .collect();
            output.spot_lines_written += writer.write_spot_batch(
                ChannelRole::Secondary,
                &ctx.settings.report.secondary_tag,
                cell_index,
                &secondary,
            );

            // Clear detections and restore the persisted nucleus set so
            // region indices for the next cell are unaffected.
            working.clear();
            working.reload_from(&archive)?;

            // Background is resampled per cell to track field-to-field
            // illumination drift.
            let background = Self::sample_background(ctx, channels)?;
            output.background_lines_written += writer.write_background_batch(&background);

            output.cells.push(CellMeasurements {
                cell_index,
                threshold,
                primary,
                secondary,
                background,
            });
        }

        state.measurement = Some(output);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, state: &SessionState) -> StepResult<()> {
        let output = state
            .measurement
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("measurements not recorded"))?;

        if output.cells.len() != state.cell_count() {
            return Err(StepError::invalid_output(format!(
                "measured {} cells, expected {}",
                output.cells.len(),
                state.cell_count()
            )));
        }

        for cell in &output.cells {
            // Co-localization invariant: one secondary measurement per
            // primary spot region, same order.
            if cell.secondary.len() != cell.primary.len() {
                return Err(StepError::invalid_output(format!(
                    "cell {}: {} secondary measurements for {} spots",
                    cell.cell_index + 1,
                    cell.secondary.len(),
                    cell.primary.len()
                )));
            }
            if cell.background.len() != ctx.settings.detection.background_samples {
                return Err(StepError::invalid_output(format!(
                    "cell {}: {} background samples, expected {}",
                    cell.cell_index + 1,
                    cell.background.len(),
                    ctx.settings.detection.background_samples
                )));
            }
        }

        Ok(())
    }
}
