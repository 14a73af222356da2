//! Content fingerprints that ignore the tracking marker.
//!
//! Structured content is canonicalized as compact JSON with sorted keys after
//! removing marker values, empty tag/label containers and empty dynamic merge
//! arguments. Raw source text goes through the equivalent textual cleanup.
//! Either way, adding or updating a marker never changes the digest.
//!
//! The bundled parsers always produce structured content. Raw text is accepted
//! for library callers that only hold the source of a resource, e.g. a block
//! cut out of a file no HCL parser accepts.

use super::terraform::scanner::Scanner;
use super::resource::{is_marker_value, ResourceContent, CONTAINER_NAMES, MERGE_CALL_KEY};
use regex::Regex;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

/// Length of a full SHA-256 digest in hex.
pub const MAX_FINGERPRINT_LEN: usize = 64;

/// Shortest digest accepted as a fingerprint.
pub const MIN_FINGERPRINT_LEN: usize = 20;

/// Hex digest of the canonical form of `content`, truncated to `length`.
pub fn fingerprint(content: &ResourceContent, length: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_form(content).as_bytes());
    let digest = format!("{:x}", hasher.finalize());

    let length = length.clamp(MIN_FINGERPRINT_LEN, MAX_FINGERPRINT_LEN);
    digest[..length].to_string()
}

/// Canonical text hashed by [`fingerprint`].
pub fn canonical_form(content: &ResourceContent) -> String {
    match content {
        ResourceContent::Structured(value) => {
            serde_json::to_string(&strip_value(value)).unwrap_or_default()
        }
        ResourceContent::Raw(text) => canonical_raw(text),
    }
}

fn strip_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            if let (1, Some(Value::Array(args))) = (map.len(), map.get(MERGE_CALL_KEY)) {
                return strip_merge(args);
            }

            let mut out = serde_json::Map::new();
            for (key, item) in map {
                if item.as_str().is_some_and(is_marker_value) {
                    continue;
                }
                let item = strip_value(item);
                if CONTAINER_NAMES.contains(&key.as_str()) && is_empty_container(&item) {
                    continue;
                }
                out.insert(key.clone(), item);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(strip_value).collect()),
        other => other.clone(),
    }
}

/// Drop empty mapping arguments; a merge of a single mapping is that mapping.
fn strip_merge(args: &[Value]) -> Value {
    let mut kept: Vec<Value> = args
        .iter()
        .map(strip_value)
        .filter(|arg| !is_empty_container(arg))
        .collect();

    match kept.len() {
        0 => Value::Object(serde_json::Map::new()),
        1 => kept.remove(0),
        _ => {
            let mut map = serde_json::Map::new();
            map.insert(MERGE_CALL_KEY.to_string(), Value::Array(kept));
            Value::Object(map)
        }
    }
}

/// Empty mappings and sequences, and `null` (a declared but unset container).
fn is_empty_container(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn marker_pair_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r#""?[A-Za-z0-9_./-]+"?\s*[=:]\s*"[^":\s]+:[0-9a-f]{20,}:(?:[^"\\]|\\.)+"\s*,?"#)
            .unwrap()
    })
}

fn empty_container_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r#""?(?:tags|labels)"?\s*[=:]\s*(?:\{\s*\}|\[\s*\]|null\b)\s*,?"#).unwrap()
    })
}

fn separator_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r",+([}\])])|([{\[(]),+|,{2,}").unwrap())
}

/// Textual canonicalization for source that is not parsed into a mapping.
fn canonical_raw(text: &str) -> String {
    let flattened = flatten_merge_calls(text);
    let without_markers = marker_pair_regex().replace_all(&flattened, "");
    let without_containers = empty_container_regex().replace_all(&without_markers, "");
    let compact: String = without_containers
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    separator_regex()
        .replace_all(&compact, |caps: &regex::Captures<'_>| {
            if let Some(close) = caps.get(1) {
                close.as_str().to_string()
            } else if let Some(open) = caps.get(2) {
                open.as_str().to_string()
            } else {
                ",".to_string()
            }
        })
        .into_owned()
}

/// Replace every `merge(...)` call with an empty mapping placeholder.
fn flatten_merge_calls(text: &str) -> String {
    let scanner = Scanner::new(text);
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut search = 0;

    while let Some(offset) = text[search..].find("merge") {
        let start = search + offset;
        let after = start + "merge".len();
        search = after;

        let preceded_by_ident = start > 0
            && (bytes[start - 1].is_ascii_alphanumeric() || bytes[start - 1] == b'_');
        if preceded_by_ident {
            continue;
        }
        let open = after + (text[after..].len() - text[after..].trim_start().len());
        if bytes.get(open) != Some(&b'(') {
            continue;
        }
        let Some(close) = scanner.matching_close(open) else {
            continue;
        };

        out.push_str(&text[cursor..start]);
        out.push_str("{}");
        cursor = close + 1;
        search = cursor;
    }

    out.push_str(&text[cursor..]);
    out
}
