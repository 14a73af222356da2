//! Domain layer - Resource model, fingerprinting and dialect handling

pub mod dialect;
pub mod fingerprint;
pub mod manifest;
pub mod resource;
pub mod terraform;

pub use dialect::Dialect;
pub use fingerprint::fingerprint;
pub use resource::{Locator, Marker, Resource, ResourceContent, ResourceId};
