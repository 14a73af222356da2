//! Manifest dialect (Kubernetes-style YAML)

pub mod document;
pub mod inject;
pub mod parser;

pub use inject::inject_marker;
pub use parser::{identity, last_marker, parse_resources, LABELS_FIELD};
