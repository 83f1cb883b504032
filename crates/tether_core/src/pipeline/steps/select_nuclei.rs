//! SelectNuclei step - interactive nucleus confirmation.
//!
//! Auto-detects candidate nuclei on the reference channel, then walks
//! the user through confirming cells of interest one at a time. The
//! loop has a single termination condition: the user answering "no" to
//! the "another?" prompt. The confirmed set (in selection order) is
//! persisted to the region archive so later channel passes can restore
//! it verbatim.

use crate::imaging::{analyze_particles, auto_threshold, ParticleOptions, ThresholdWindow};
use crate::models::Region;
use crate::pipeline::errors::{StepError, StepResult};
use crate::pipeline::step::PipelineStep;
use crate::pipeline::types::{Context, SelectionOutput, SessionState, StepOutcome};

/// SelectNuclei step for building the confirmed-cell set.
pub struct SelectNucleiStep;

impl SelectNucleiStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SelectNucleiStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for SelectNucleiStep {
    fn name(&self) -> &str {
        "SelectNuclei"
    }

    fn description(&self) -> &str {
        "Detect candidate nuclei and confirm cells of interest"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        if ctx.settings.detection.nucleus_min_area == 0 {
            return Err(StepError::invalid_input("nucleus_min_area must be > 0"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut SessionState) -> StepResult<StepOutcome> {
        let channels = state
            .channels
            .as_ref()
            .ok_or_else(|| StepError::precondition_failed("channels not projected"))?;
        let reference = &channels.reference;

        ctx.logger.section("Nucleus selection");

        // Candidate nuclei: dark-background auto threshold, particles at
        // or above the configured minimum area, border-touching excluded.
        let candidates = match auto_threshold(reference.pixels()) {
            Some(t) => analyze_particles(
                reference,
                ThresholdWindow::above(t),
                None,
                ParticleOptions {
                    min_area: ctx.settings.detection.nucleus_min_area,
                    max_area: None,
                    exclude_border: true,
                },
            ),
            None => Vec::new(),
        };
        ctx.logger
            .info(&format!("{} candidate nuclei detected", candidates.len()));

        let mut confirmed: Vec<Region> = Vec::new();
        if candidates.is_empty() {
            ctx.logger
                .warn("No candidate nuclei found in the reference channel");
        } else {
            ctx.interaction.acknowledge(
                "Select Cells",
                "Select each cell of interest in the reference channel",
            )?;

            loop {
                let pick = ctx
                    .interaction
                    .choose_region("Select ROI then OK", candidates.len())?;
                let region = candidates[pick].0.clone();
                ctx.logger.info(&format!(
                    "Cell {} confirmed (candidate {}, {} px)",
                    confirmed.len() + 1,
                    pick,
                    region.area()
                ));
                confirmed.push(region);

                if !ctx.interaction.ask_yes_no("Another y/n", true)? {
                    break;
                }
            }
        }

        let archive = ctx.region_archive();
        archive.save(&confirmed)?;
        ctx.logger.info(&format!(
            "{} confirmed nuclei saved to {}",
            confirmed.len(),
            archive.path().display()
        ));

        state.selection = Some(SelectionOutput {
            cell_count: confirmed.len(),
            archive_path: archive.path().to_path_buf(),
        });

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &SessionState) -> StepResult<()> {
        let selection = state
            .selection
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("selection not recorded"))?;
        if !selection.archive_path.exists() {
            return Err(StepError::invalid_output(format!(
                "region archive missing at {}",
                selection.archive_path.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::ScriptedInteraction;
    use crate::pipeline::errors::SessionError;
    use crate::pipeline::test_support::{
        context_with, run_projection, two_nuclei_stacks,
    };
    use crate::pipeline::Pipeline;
    use crate::pipeline::steps::ProjectChannelsStep;
    use crate::roi::RegionArchive;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn confirms_cells_until_no() {
        let dir = tempdir().unwrap();
        let interaction = Arc::new(
            ScriptedInteraction::new()
                .with_picks([1, 0])
                .with_answers([true, false]),
        );
        let ctx = context_with(dir.path(), two_nuclei_stacks(), interaction);
        let mut state = run_projection(&ctx);

        let step = SelectNucleiStep::new();
        assert_eq!(step.execute(&ctx, &mut state).unwrap(), StepOutcome::Success);
        step.validate_output(&ctx, &state).unwrap();

        let selection = state.selection.unwrap();
        assert_eq!(selection.cell_count, 2);

        // Archive holds the confirmed set, in selection order.
        let saved = RegionArchive::new(&selection.archive_path).load().unwrap();
        assert_eq!(saved.len(), 2);
        // Pick 1 was the lower-right nucleus, selected first.
        assert!(saved[0].bounds().y > saved[1].bounds().y);
    }

    #[test]
    fn single_cell_selection_stops_immediately() {
        let dir = tempdir().unwrap();
        let interaction = Arc::new(
            ScriptedInteraction::new()
                .with_picks([0])
                .with_answers([false]),
        );
        let ctx = context_with(dir.path(), two_nuclei_stacks(), interaction);
        let mut state = run_projection(&ctx);

        SelectNucleiStep::new().execute(&ctx, &mut state).unwrap();
        assert_eq!(state.cell_count(), 1);
    }

    #[test]
    fn cancelled_prompt_aborts_the_session() {
        let dir = tempdir().unwrap();
        let interaction = Arc::new(ScriptedInteraction::cancelling());
        let ctx = context_with(dir.path(), two_nuclei_stacks(), interaction);
        let mut state = SessionState::new("test");

        let pipeline = Pipeline::new()
            .with_step(ProjectChannelsStep::new())
            .with_step(SelectNucleiStep::new());

        assert!(matches!(
            pipeline.run(&ctx, &mut state),
            Err(SessionError::Cancelled { .. })
        ));
    }

    #[test]
    fn requires_projected_channels() {
        let dir = tempdir().unwrap();
        let interaction = Arc::new(ScriptedInteraction::new());
        let ctx = context_with(dir.path(), two_nuclei_stacks(), interaction);
        let mut state = SessionState::new("test");

        assert!(matches!(
            SelectNucleiStep::new().execute(&ctx, &mut state),
            Err(StepError::PreconditionFailed(_))
        ));
    }
}
