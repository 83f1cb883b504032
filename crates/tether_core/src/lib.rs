//! Tether Core - Backend logic for the spot-tether measurement pipeline.
//!
//! This crate contains all business logic with zero UI dependencies:
//! channel projection, nucleus selection, dual-channel spot measurement
//! and report writing. It can be used by the terminal front-end or any
//! other interactive shell that implements the [`interaction::Interaction`]
//! capability.

pub mod config;
pub mod imaging;
pub mod interaction;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod roi;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
