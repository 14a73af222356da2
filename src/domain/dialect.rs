//! Supported source dialects and per-dialect dispatch

use super::resource::{Locator, Resource, ResourceId};
use super::{manifest, terraform};
use crate::error::{Result, TaggerError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A declarative infrastructure file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dialect {
    /// Terraform-style `resource "type" "name" { ... }` blocks (HCL)
    #[serde(rename = "hcl", alias = "terraform")]
    DeclarativeBlock,
    /// Kubernetes-style YAML manifests, possibly multi-document
    #[serde(rename = "manifest", alias = "kubernetes")]
    Manifest,
}

impl Dialect {
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::DeclarativeBlock => "hcl",
            Dialect::Manifest => "manifest",
        }
    }

    /// Enumerate the resources declared in `source`.
    pub fn parse(&self, source: &str) -> Result<BTreeMap<ResourceId, Resource>> {
        match self {
            Dialect::DeclarativeBlock => terraform::parse_resources(source),
            Dialect::Manifest => manifest::parse_resources(source),
        }
    }

    /// Marker currently stored on `resource`, if any.
    pub fn last_marker<'a>(&self, resource: &'a Resource, key: &str) -> Option<&'a str> {
        match self {
            Dialect::DeclarativeBlock => terraform::last_marker(resource, key),
            Dialect::Manifest => manifest::last_marker(resource, key),
        }
    }

    /// Return `source` with `marker` stored under `key` on `resource`.
    pub fn inject(
        &self,
        source: &str,
        resource: &Resource,
        key: &str,
        marker: &str,
    ) -> Result<String> {
        match (self, &resource.locator) {
            (Dialect::DeclarativeBlock, Locator::Block { resource_type, name }) => {
                terraform::inject_marker(source, resource_type, name, key, marker)
            }
            (Dialect::Manifest, Locator::Document { index }) => {
                manifest::inject_marker(source, *index, key, marker)
            }
            _ => Err(TaggerError::InjectionNotFound(resource.id.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hcl" | "terraform" => Ok(Dialect::DeclarativeBlock),
            "manifest" | "kubernetes" => Ok(Dialect::Manifest),
            _ => Err(format!(
                "Invalid dialect: {}. Valid dialects: hcl, manifest",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_dialect_names() {
        assert_eq!(Dialect::from_str("HCL").unwrap(), Dialect::DeclarativeBlock);
        assert_eq!(Dialect::from_str("terraform").unwrap(), Dialect::DeclarativeBlock);
        assert_eq!(Dialect::from_str("manifest").unwrap(), Dialect::Manifest);
        assert!(Dialect::from_str("json").is_err());
    }

    #[test]
    fn dispatches_by_dialect() {
        let tf = "resource \"a\" \"b\" {\n  x = 1\n}\n";
        let resources = Dialect::DeclarativeBlock.parse(tf).unwrap();
        let resource = resources.values().next().unwrap();
        let out = Dialect::DeclarativeBlock
            .inject(tf, resource, "iac_tagger", "a.b:0123456789abcdef0123:r")
            .unwrap();
        let reparsed = Dialect::DeclarativeBlock.parse(&out).unwrap();
        assert_eq!(
            Dialect::DeclarativeBlock.last_marker(&reparsed[&resource.id], "iac_tagger"),
            Some("a.b:0123456789abcdef0123:r")
        );
    }

    #[test]
    fn mismatched_locator_is_not_found() {
        let yaml = "kind: Pod\nmetadata:\n  name: p\n";
        let resources = Dialect::Manifest.parse(yaml).unwrap();
        let pod = resources.values().next().unwrap();
        let err = Dialect::DeclarativeBlock
            .inject(yaml, pod, "iac_tagger", "x")
            .unwrap_err();
        assert!(matches!(err, TaggerError::InjectionNotFound(_)));
    }
}
