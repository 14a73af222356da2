//! Infrastructure layer - External I/O and process integration

pub mod config;
pub mod logging;
pub mod repository;
pub mod revision;

pub use config::{DialectRegistry, TaggerConfig};
pub use repository::{discover_sources, LockedFile};
pub use revision::{FixedRevision, GitRevisionLookup, RevisionLookup};
