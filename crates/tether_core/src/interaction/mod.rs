//! User-interaction capability.
//!
//! Every step of the pipeline that blocks on a human (confirm a region,
//! adjust a threshold, place a background sample) goes through this
//! trait, so the pipeline logic runs unchanged against a real front-end
//! or a scripted implementation in tests.

mod scripted;

pub use scripted::ScriptedInteraction;

use thiserror::Error;

use crate::imaging::ThresholdWindow;
use crate::models::{Rect, Region};

/// Errors from user prompts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InteractionError {
    /// The user dismissed the prompt. Aborts the session cleanly.
    #[error("Prompt '{0}' was cancelled")]
    Cancelled(String),

    /// The front-end produced a response the pipeline cannot use.
    #[error("Invalid response to prompt '{prompt}': {message}")]
    InvalidResponse { prompt: String, message: String },
}

impl InteractionError {
    pub fn cancelled(prompt: impl Into<String>) -> Self {
        Self::Cancelled(prompt.into())
    }

    pub fn invalid_response(prompt: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            prompt: prompt.into(),
            message: message.into(),
        }
    }
}

/// Result type for prompt operations.
pub type InteractionResult<T> = Result<T, InteractionError>;

/// Synchronous, blocking user prompts.
///
/// Each method corresponds to one modal dialog of the measurement
/// workflow. Implementations block until the user responds; there are
/// no timeouts.
pub trait Interaction: Send + Sync {
    /// Modal "OK" dialog; returns when the user confirms.
    fn acknowledge(&self, title: &str, message: &str) -> InteractionResult<()>;

    /// Free-form yes/no question (the "another?" prompt).
    fn ask_yes_no(&self, prompt: &str, default_yes: bool) -> InteractionResult<bool>;

    /// Ask the user to pick one region index out of `available` regions.
    fn choose_region(&self, prompt: &str, available: usize) -> InteractionResult<usize>;

    /// Present an automatic threshold window for manual override.
    ///
    /// Returning the input unchanged accepts the automatic value.
    fn adjust_threshold(&self, window: ThresholdWindow) -> InteractionResult<ThresholdWindow>;

    /// Ask the user to place one region inside `bounds`.
    fn place_region(&self, prompt: &str, bounds: Rect) -> InteractionResult<Region>;
}
