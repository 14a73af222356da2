//! Resource extraction from Kubernetes-style manifests

use super::document::{parse_document, split_documents, yaml_to_json};
use crate::domain::resource::{Locator, Resource, ResourceContent, ResourceId};
use crate::error::Result;
use serde_yaml::Value as YamlValue;
use std::collections::BTreeMap;

/// Name of the label container under `metadata`.
pub const LABELS_FIELD: &str = "labels";

/// Parse every document of a manifest stream into resources.
///
/// Documents without both `kind` and `metadata.name` are not resources and are skipped.
pub fn parse_resources(source: &str) -> Result<BTreeMap<ResourceId, Resource>> {
    let mut resources = BTreeMap::new();

    for (index, range) in split_documents(source).into_iter().enumerate() {
        let Some(document) = parse_document(&source[range])? else {
            continue;
        };
        let Some(id) = identity(&document) else {
            tracing::debug!(document = index, "skipping document without kind and name");
            continue;
        };

        let resource = Resource::new(
            id.clone(),
            ResourceContent::Structured(yaml_to_json(&document)),
            Locator::Document { index },
        );
        if resources.insert(id.clone(), resource).is_some() {
            tracing::warn!(resource = %id, "duplicate resource identity, keeping the last document");
        }
    }

    Ok(resources)
}

/// `kind.namespace.name` identity of a document, if it describes a resource.
pub fn identity(document: &YamlValue) -> Option<ResourceId> {
    let kind = document
        .get("kind")
        .and_then(YamlValue::as_str)
        .filter(|k| !k.is_empty())?;
    let metadata = document.get("metadata")?;
    let name = metadata
        .get("name")
        .and_then(YamlValue::as_str)
        .filter(|n| !n.is_empty())?;
    let namespace = metadata
        .get("namespace")
        .and_then(YamlValue::as_str)
        .filter(|ns| !ns.is_empty());

    Some(ResourceId::manifest(kind, namespace, name))
}

/// Read the current marker from `metadata.labels`.
pub fn last_marker<'a>(resource: &'a Resource, key: &str) -> Option<&'a str> {
    match &resource.content {
        ResourceContent::Structured(value) => value
            .get("metadata")?
            .get(LABELS_FIELD)?
            .get(key)?
            .as_str(),
        ResourceContent::Raw(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STREAM: &str = r#"# cluster resources
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
  namespace: prod
  labels:
    app: web
    iac_tagger: deployment.prod.web:0123456789abcdef0123:abc
spec:
  replicas: 2
---
apiVersion: v1
kind: Service
metadata:
  name: web
---
# just a comment
---
not: a resource
"#;

    #[test]
    fn derives_identities_with_default_namespace() {
        let resources = parse_resources(STREAM).unwrap();
        let ids: Vec<&str> = resources.keys().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["deployment.prod.web", "service.default.web"]);
    }

    #[test]
    fn records_document_index() {
        let resources = parse_resources(STREAM).unwrap();
        let service = &resources[&ResourceId::manifest("Service", None, "web")];
        assert_eq!(service.locator, Locator::Document { index: 2 });
    }

    #[test]
    fn reads_marker_from_labels() {
        let resources = parse_resources(STREAM).unwrap();
        let deployment = &resources[&ResourceId::manifest("Deployment", Some("prod"), "web")];
        let service = &resources[&ResourceId::manifest("Service", None, "web")];
        assert_eq!(
            last_marker(deployment, "iac_tagger"),
            Some("deployment.prod.web:0123456789abcdef0123:abc")
        );
        assert_eq!(last_marker(service, "iac_tagger"), None);
    }

    #[test]
    fn kind_without_name_is_skipped() {
        let resources = parse_resources("kind: ConfigMap\nmetadata: {}\n").unwrap();
        assert!(resources.is_empty());
    }

    #[test]
    fn scalar_documents_are_skipped() {
        let resources = parse_resources("just text\n---\n- a\n- b\n").unwrap();
        assert!(resources.is_empty());
    }
}
