//! Application layer - Use cases and orchestration

pub mod batch;
pub mod tag_file;

pub use batch::{BatchReport, FileStatus};
pub use tag_file::{FileOutcome, ResourceChange, TaggingService};
