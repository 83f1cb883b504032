//! Error types for the measurement pipeline.
//!
//! Errors carry context that chains through layers:
//! Session → Step → Operation → Detail

use std::io;

use thiserror::Error;

use crate::interaction::InteractionError;
use crate::roi::ArchiveError;

/// Top-level session error with session context.
#[derive(Error, Debug)]
pub enum SessionError {
    /// A step failed during execution.
    #[error("Session '{session_name}' failed at step '{step_name}': {source}")]
    StepFailed {
        session_name: String,
        step_name: String,
        #[source]
        source: StepError,
    },

    /// Input validation failed before the pipeline started.
    #[error("Session '{session_name}' failed validation: {message}")]
    ValidationFailed {
        session_name: String,
        message: String,
    },

    /// The user cancelled a prompt; the session aborted cleanly.
    #[error("Session '{session_name}' was cancelled")]
    Cancelled { session_name: String },

    /// Failed to set up the session (create directories, etc.).
    #[error("Session '{session_name}' setup failed: {message}")]
    SetupFailed {
        session_name: String,
        message: String,
    },
}

impl SessionError {
    /// Create a step failed error.
    pub fn step_failed(
        session_name: impl Into<String>,
        step_name: impl Into<String>,
        source: StepError,
    ) -> Self {
        Self::StepFailed {
            session_name: session_name.into(),
            step_name: step_name.into(),
            source,
        }
    }

    /// Create a validation failed error.
    pub fn validation_failed(
        session_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ValidationFailed {
            session_name: session_name.into(),
            message: message.into(),
        }
    }

    /// Create a setup failed error.
    pub fn setup_failed(session_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SetupFailed {
            session_name: session_name.into(),
            message: message.into(),
        }
    }

    /// Create a cancelled error.
    pub fn cancelled(session_name: impl Into<String>) -> Self {
        Self::Cancelled {
            session_name: session_name.into(),
        }
    }
}

/// Error from a pipeline step with operation context.
#[derive(Error, Debug)]
pub enum StepError {
    /// Input validation failed.
    #[error("Input validation failed: {0}")]
    InvalidInput(String),

    /// Output validation failed.
    #[error("Output validation failed: {0}")]
    InvalidOutput(String),

    /// The user cancelled a prompt inside this step.
    #[error("Prompt cancelled: {0}")]
    Cancelled(String),

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    IoError {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// Region archive persistence failed.
    #[error("Region archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// A precondition was not met.
    #[error("Precondition not met: {0}")]
    PreconditionFailed(String),

    /// Generic step error with message.
    #[error("{0}")]
    Other(String),
}

impl StepError {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an invalid output error.
    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }

    /// Create an I/O error with context.
    pub fn io_error(operation: impl Into<String>, source: io::Error) -> Self {
        Self::IoError {
            operation: operation.into(),
            source,
        }
    }

    /// Create a precondition failed error.
    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::PreconditionFailed(message.into())
    }

    /// Create a generic error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Whether this error is a user cancellation (clean abort).
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

impl From<InteractionError> for StepError {
    fn from(e: InteractionError) -> Self {
        match e {
            InteractionError::Cancelled(prompt) => Self::Cancelled(prompt),
            InteractionError::InvalidResponse { prompt, message } => {
                Self::InvalidInput(format!("response to '{}': {}", prompt, message))
            }
        }
    }
}

/// Result type for step operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
