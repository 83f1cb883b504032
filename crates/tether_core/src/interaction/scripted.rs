//! Scripted interaction for tests and unattended replay.
//!
//! Responses are queued up front; each prompt pops from its queue. An
//! exhausted queue behaves like the user dismissing the prompt, so a
//! script that is too short aborts the session instead of hanging.

use std::collections::VecDeque;

use parking_lot::Mutex;

use super::{Interaction, InteractionError, InteractionResult};
use crate::imaging::ThresholdWindow;
use crate::models::{Rect, Region};

/// Plays back pre-recorded responses to every prompt.
#[derive(Debug, Default)]
pub struct ScriptedInteraction {
    picks: Mutex<VecDeque<usize>>,
    answers: Mutex<VecDeque<bool>>,
    threshold_overrides: Mutex<VecDeque<ThresholdWindow>>,
    placements: Mutex<VecDeque<Rect>>,
    cancel_everything: bool,
}

impl ScriptedInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    /// An interaction where the user cancels every prompt.
    pub fn cancelling() -> Self {
        Self {
            cancel_everything: true,
            ..Self::default()
        }
    }

    /// Queue region picks for `choose_region`.
    pub fn with_picks(self, picks: impl IntoIterator<Item = usize>) -> Self {
        self.picks.lock().extend(picks);
        self
    }

    /// Queue yes/no answers for `ask_yes_no`.
    pub fn with_answers(self, answers: impl IntoIterator<Item = bool>) -> Self {
        self.answers.lock().extend(answers);
        self
    }

    /// Queue manual threshold overrides. When the queue is empty the
    /// automatic window is accepted unchanged.
    pub fn with_threshold_overrides(
        self,
        windows: impl IntoIterator<Item = ThresholdWindow>,
    ) -> Self {
        self.threshold_overrides.lock().extend(windows);
        self
    }

    /// Queue rectangles for `place_region`.
    pub fn with_placements(self, rects: impl IntoIterator<Item = Rect>) -> Self {
        self.placements.lock().extend(rects);
        self
    }
}

impl Interaction for ScriptedInteraction {
    fn acknowledge(&self, title: &str, _message: &str) -> InteractionResult<()> {
        if self.cancel_everything {
            return Err(InteractionError::cancelled(title));
        }
        Ok(())
    }

    fn ask_yes_no(&self, prompt: &str, _default_yes: bool) -> InteractionResult<bool> {
        if self.cancel_everything {
            return Err(InteractionError::cancelled(prompt));
        }
        self.answers
            .lock()
            .pop_front()
            .ok_or_else(|| InteractionError::cancelled(prompt))
    }

    fn choose_region(&self, prompt: &str, available: usize) -> InteractionResult<usize> {
        if self.cancel_everything {
            return Err(InteractionError::cancelled(prompt));
        }
        let pick = self
            .picks
            .lock()
            .pop_front()
            .ok_or_else(|| InteractionError::cancelled(prompt))?;
        if pick >= available {
            return Err(InteractionError::invalid_response(
                prompt,
                format!("index {} out of {} regions", pick, available),
            ));
        }
        Ok(pick)
    }

    fn adjust_threshold(&self, window: ThresholdWindow) -> InteractionResult<ThresholdWindow> {
        if self.cancel_everything {
            return Err(InteractionError::cancelled("Adjust Threshold"));
        }
        Ok(self
            .threshold_overrides
            .lock()
            .pop_front()
            .unwrap_or(window))
    }

    fn place_region(&self, prompt: &str, _bounds: Rect) -> InteractionResult<Region> {
        if self.cancel_everything {
            return Err(InteractionError::cancelled(prompt));
        }
        let rect = self
            .placements
            .lock()
            .pop_front()
            .ok_or_else(|| InteractionError::cancelled(prompt))?;
        Region::from_rect(rect)
            .ok_or_else(|| InteractionError::invalid_response(prompt, "empty rectangle"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plays_back_queued_responses() {
        let script = ScriptedInteraction::new()
            .with_picks([1, 0])
            .with_answers([true, false]);

        assert_eq!(script.choose_region("pick", 3).unwrap(), 1);
        assert_eq!(script.choose_region("pick", 3).unwrap(), 0);
        assert!(script.ask_yes_no("another?", true).unwrap());
        assert!(!script.ask_yes_no("another?", true).unwrap());
    }

    #[test]
    fn exhausted_queue_cancels() {
        let script = ScriptedInteraction::new();
        assert!(matches!(
            script.ask_yes_no("another?", true),
            Err(InteractionError::Cancelled(_))
        ));
    }

    #[test]
    fn out_of_range_pick_is_invalid() {
        let script = ScriptedInteraction::new().with_picks([5]);
        assert!(matches!(
            script.choose_region("pick", 3),
            Err(InteractionError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn threshold_defaults_to_automatic_window() {
        let script = ScriptedInteraction::new();
        let auto = ThresholdWindow::new(60.0, 100.0);
        assert_eq!(script.adjust_threshold(auto).unwrap(), auto);

        let override_script = ScriptedInteraction::new()
            .with_threshold_overrides([ThresholdWindow::new(50.0, 90.0)]);
        assert_eq!(
            override_script.adjust_threshold(auto).unwrap(),
            ThresholdWindow::new(50.0, 90.0)
        );
    }

    #[test]
    fn cancelling_interaction_cancels_every_prompt() {
        let script = ScriptedInteraction::cancelling();
        assert!(script.acknowledge("title", "msg").is_err());
        assert!(script.choose_region("pick", 3).is_err());
        assert!(script.place_region("place", Rect::new(0, 0, 8, 8)).is_err());
    }
}
