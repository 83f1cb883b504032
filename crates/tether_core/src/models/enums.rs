//! Core enums used throughout the crate.

use serde::{Deserialize, Serialize};

/// Role of a fluorescence channel within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelRole {
    /// Reference channel (blue/DAPI) used to select nuclei.
    Reference,
    /// Primary signal channel (green) in which spots are detected.
    Primary,
    /// Secondary signal channel (red) measured over the same spot regions.
    Secondary,
}

impl std::fmt::Display for ChannelRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelRole::Reference => write!(f, "reference"),
            ChannelRole::Primary => write!(f, "primary"),
            ChannelRole::Secondary => write!(f, "secondary"),
        }
    }
}

/// Status of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// All cells measured and reported.
    Completed,
    /// User cancelled a prompt; session ended cleanly without finishing.
    Aborted,
    /// Session failed with an error.
    Failed,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Completed => write!(f, "completed"),
            SessionStatus::Aborted => write!(f, "aborted"),
            SessionStatus::Failed => write!(f, "failed"),
        }
    }
}
