//! ProjectChannels step - builds the channel registry.
//!
//! Max-projects each of the three raw z-stacks into a single 2-D
//! channel image and autoscales its display range. The projected
//! channels are immutable for the rest of the session.

use crate::imaging::{enhance_contrast, max_project};
use crate::models::{ChannelImage, ChannelRole, ChannelSet, ImageStack};
use crate::pipeline::errors::{StepError, StepResult};
use crate::pipeline::step::PipelineStep;
use crate::pipeline::types::{Context, SessionState, StepOutcome};

/// ProjectChannels step for populating the channel registry.
pub struct ProjectChannelsStep;

impl ProjectChannelsStep {
    pub fn new() -> Self {
        Self
    }

    fn project_one(
        ctx: &Context,
        stack: &ImageStack,
        role: ChannelRole,
    ) -> StepResult<ChannelImage> {
        let pixels = max_project(stack)
            .ok_or_else(|| StepError::invalid_input(format!("{} stack has no slices", role)))?;

        let mut image = ChannelImage::new(
            format!("MAX_{}_{}", ctx.session_name, role),
            role,
            stack.width(),
            stack.height(),
            pixels,
        )
        .ok_or_else(|| StepError::other(format!("{} projection buffer size mismatch", role)))?;

        let range = enhance_contrast(&mut image, ctx.settings.projection.contrast_saturation_pct);
        ctx.logger.info(&format!(
            "{}: {} slices projected, display range [{:.1}, {:.1}]",
            role,
            stack.slice_count(),
            range.min,
            range.max
        ));
        Ok(image)
    }
}

impl Default for ProjectChannelsStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ProjectChannelsStep {
    fn name(&self) -> &str {
        "ProjectChannels"
    }

    fn description(&self) -> &str {
        "Z-project and autoscale the three channel stacks"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        let stacks = [
            (ChannelRole::Reference, &ctx.stacks.reference),
            (ChannelRole::Primary, &ctx.stacks.primary),
            (ChannelRole::Secondary, &ctx.stacks.secondary),
        ];

        for (role, stack) in &stacks {
            if stack.is_empty() {
                return Err(StepError::invalid_input(format!(
                    "{} stack has no slices",
                    role
                )));
            }
        }

        let (w, h) = (ctx.stacks.reference.width(), ctx.stacks.reference.height());
        for (role, stack) in &stacks {
            if stack.width() != w || stack.height() != h {
                return Err(StepError::invalid_input(format!(
                    "{} stack is {}x{}, expected {}x{}",
                    role,
                    stack.width(),
                    stack.height(),
                    w,
                    h
                )));
            }
        }

        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut SessionState) -> StepResult<StepOutcome> {
        ctx.logger.section("Channel projection");

        state.channels = Some(ChannelSet {
            reference: Self::project_one(ctx, &ctx.stacks.reference, ChannelRole::Reference)?,
            primary: Self::project_one(ctx, &ctx.stacks.primary, ChannelRole::Primary)?,
            secondary: Self::project_one(ctx, &ctx.stacks.secondary, ChannelRole::Secondary)?,
        });

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &SessionState) -> StepResult<()> {
        let channels = state
            .channels
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("channels not recorded"))?;

        let (w, h) = (channels.reference.width(), channels.reference.height());
        for image in [&channels.primary, &channels.secondary] {
            if image.width() != w || image.height() != h {
                return Err(StepError::invalid_output(format!(
                    "{} channel is {}x{}, expected {}x{}",
                    image.role(),
                    image.width(),
                    image.height(),
                    w,
                    h
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::{context_with_stacks, stack_from_fn};
    use crate::models::ChannelStacks;
    use tempfile::tempdir;

    #[test]
    fn projects_all_three_channels() {
        let dir = tempdir().unwrap();
        let stacks = ChannelStacks::new(
            stack_from_fn(8, 8, 2, |x, _, z| (x + z as u32) as f32),
            stack_from_fn(8, 8, 1, |_, y, _| y as f32),
            stack_from_fn(8, 8, 3, |_, _, z| z as f32 * 10.0),
        );
        let ctx = context_with_stacks(dir.path(), stacks);
        let mut state = SessionState::new("test");

        let step = ProjectChannelsStep::new();
        step.validate_input(&ctx).unwrap();
        assert_eq!(step.execute(&ctx, &mut state).unwrap(), StepOutcome::Success);
        step.validate_output(&ctx, &state).unwrap();

        let channels = state.channels.unwrap();
        // Reference: max over z of (x + z) = x + 1
        assert_eq!(channels.reference.get(3, 0), 4.0);
        // Secondary: max over z of 10z with 3 slices = 20
        assert_eq!(channels.secondary.get(0, 0), 20.0);
        assert_eq!(channels.primary.role(), ChannelRole::Primary);
    }

    #[test]
    fn empty_stack_fails_validation() {
        let dir = tempdir().unwrap();
        let stacks = ChannelStacks::new(
            stack_from_fn(8, 8, 1, |_, _, _| 0.0),
            ImageStack::new(8, 8),
            stack_from_fn(8, 8, 1, |_, _, _| 0.0),
        );
        let ctx = context_with_stacks(dir.path(), stacks);

        assert!(matches!(
            ProjectChannelsStep::new().validate_input(&ctx),
            Err(StepError::InvalidInput(_))
        ));
    }

    #[test]
    fn mismatched_stack_sizes_fail_validation() {
        let dir = tempdir().unwrap();
        let stacks = ChannelStacks::new(
            stack_from_fn(8, 8, 1, |_, _, _| 0.0),
            stack_from_fn(16, 8, 1, |_, _, _| 0.0),
            stack_from_fn(8, 8, 1, |_, _, _| 0.0),
        );
        let ctx = context_with_stacks(dir.path(), stacks);

        assert!(matches!(
            ProjectChannelsStep::new().validate_input(&ctx),
            Err(StepError::InvalidInput(_))
        ));
    }
}
