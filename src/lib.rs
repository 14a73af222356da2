//! iac-tagger - Resource tracking markers for infrastructure-as-code
//!
//! Stamps every Terraform resource block and Kubernetes manifest document with
//! a marker `identity:fingerprint:revision`. The fingerprint ignores the marker
//! itself, so re-running the tagger on unchanged files is a no-op.

pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use error::TaggerError;
