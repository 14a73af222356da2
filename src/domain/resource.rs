//! Resource identity, content and marker types

use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::OnceLock;

/// Revision id used when the file has no version-control history.
pub const NO_HISTORY_REVISION: &str = "no_git_history";

/// Default attribute name the marker is stored under.
pub const DEFAULT_MARKER_KEY: &str = "iac_tagger";

/// Key under which a structured `merge(...)` call keeps its arguments.
pub const MERGE_CALL_KEY: &str = "fn::merge";

/// Prefix for structured function call keys.
pub const FUNC_CALL_PREFIX: &str = "fn::";

/// Names of tag/label containers across dialects.
pub const CONTAINER_NAMES: &[&str] = &["tags", "labels"];

fn marker_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^[^:\s]+:[0-9a-f]{20,}:.+$").unwrap())
}

/// Whether a value looks like `identity:hexdigest:revision`.
///
/// The revision part is opaque and may hold any non-empty text.
pub fn is_marker_value(value: &str) -> bool {
    marker_regex().is_match(value)
}

/// Composite, dialect-specific resource identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId(String);

impl ResourceId {
    /// `type.name` identity of a declarative block.
    pub fn block(resource_type: &str, name: &str) -> Self {
        ResourceId(format!("{}.{}", resource_type, name))
    }

    /// `kind.namespace.name` identity of a manifest document.
    pub fn manifest(kind: &str, namespace: Option<&str>, name: &str) -> Self {
        ResourceId(format!(
            "{}.{}.{}",
            kind.to_lowercase(),
            namespace.unwrap_or("default"),
            name
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declared content of a resource as seen by the fingerprint engine.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceContent {
    /// Parsed attribute mapping.
    Structured(Value),
    /// Dialect source text, for expressions that cannot be parsed into a mapping.
    ///
    /// Not produced by the bundled parsers; library callers may fingerprint
    /// unparsed resource source with it.
    Raw(String),
}

/// Where a resource lives in its source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Block { resource_type: String, name: String },
    Document { index: usize },
}

/// A resource enumerated from one source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: ResourceId,
    pub content: ResourceContent,
    pub locator: Locator,
}

impl Resource {
    pub fn new(id: ResourceId, content: ResourceContent, locator: Locator) -> Self {
        Self {
            id,
            content,
            locator,
        }
    }
}

/// Tracking marker `identity:fingerprint:revision`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub identity: ResourceId,
    pub fingerprint: String,
    pub revision: String,
}

impl Marker {
    pub fn new(identity: ResourceId, fingerprint: String, revision: String) -> Self {
        Self {
            identity,
            fingerprint,
            revision,
        }
    }

    /// Whether an existing marker value is exactly this marker.
    pub fn matches(&self, existing: Option<&str>) -> bool {
        existing.is_some_and(|value| value == self.to_string())
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.identity, self.fingerprint, self.revision)
    }
}

/// Look up a marker inside a structured tag container.
///
/// Static containers are plain objects. Merge calls are searched from the last
/// argument backwards, since later mappings win in a merge.
pub fn marker_in_container<'a>(container: &'a Value, key: &str) -> Option<&'a str> {
    let map = container.as_object()?;
    if let Some(args) = map.get(MERGE_CALL_KEY).and_then(Value::as_array) {
        if map.len() == 1 {
            return args
                .iter()
                .rev()
                .find_map(|arg| marker_in_container(arg, key));
        }
    }
    map.get(key).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn manifest_identity_uses_lowercase_kind() {
        let id = ResourceId::manifest("Deployment", Some("prod"), "web");
        assert_eq!(id.as_str(), "deployment.prod.web");
    }

    #[test]
    fn manifest_identity_defaults_namespace() {
        let id = ResourceId::manifest("Deployment", None, "web");
        assert_eq!(id.as_str(), "deployment.default.web");
    }

    #[test]
    fn block_identity() {
        assert_eq!(
            ResourceId::block("aws_instance", "web").to_string(),
            "aws_instance.web"
        );
    }

    #[test]
    fn marker_display_and_match() {
        let marker = Marker::new(
            ResourceId::block("aws_instance", "web"),
            "ab".repeat(16),
            "deadbeef".to_string(),
        );
        let rendered = marker.to_string();
        assert_eq!(
            rendered,
            format!("aws_instance.web:{}:deadbeef", "ab".repeat(16))
        );
        assert!(marker.matches(Some(rendered.as_str())));
        assert!(!marker.matches(None));
        assert!(!marker.matches(Some("aws_instance.web:00:deadbeef")));
    }

    #[test]
    fn marker_pattern_requires_hex_digest() {
        assert!(is_marker_value(&format!(
            "aws_instance.web:{}:no_git_history",
            "0f".repeat(10)
        )));
        assert!(!is_marker_value("aws_instance.web:short:abc"));
        assert!(!is_marker_value("production"));
        assert!(!is_marker_value("a b:0123456789abcdef0123:rev"));
        assert!(!is_marker_value("a.b:0123456789abcdef0123:"));
    }

    #[test]
    fn marker_pattern_accepts_any_revision_text() {
        let digest = "0123456789abcdef0123";
        assert!(is_marker_value(&format!("a.b:{}:release 1.2", digest)));
        assert!(is_marker_value(&format!("a.b:{}:v1:rc:2", digest)));
    }

    #[test]
    fn finds_marker_in_static_container() {
        let tags = json!({"Env": "prod", "iac_tagger": "x.y:abc:rev"});
        assert_eq!(marker_in_container(&tags, "iac_tagger"), Some("x.y:abc:rev"));
        assert_eq!(marker_in_container(&tags, "missing"), None);
    }

    #[test]
    fn finds_marker_in_last_merge_argument() {
        let tags = json!({
            "fn::merge": [
                {"iac_tagger": "old"},
                "local.common_tags",
                {"iac_tagger": "new"}
            ]
        });
        assert_eq!(marker_in_container(&tags, "iac_tagger"), Some("new"));
    }

    #[test]
    fn tolerates_non_object_container() {
        assert_eq!(marker_in_container(&json!("local.tags"), "iac_tagger"), None);
    }
}
