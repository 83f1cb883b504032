//! ROI storage: the working region set and its persisted archive.
//!
//! The working set plays the role of the interactive region manager: it
//! holds whichever regions are currently live (confirmed nuclei, or a
//! cell's detected spots) and is reset from the archive between channel
//! passes so spot detections never leak into the next cell.

mod archive;
mod manager;

pub use archive::{ArchiveError, RegionArchive};
pub use manager::RegionSet;
