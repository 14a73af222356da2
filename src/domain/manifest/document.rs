//! Multi-document YAML stream handling

use crate::error::{Result, TaggerError};
use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;
use std::ops::Range;

/// Byte ranges of each document body, separator lines excluded.
///
/// Every separator produces a new entry, so blank leading documents are kept
/// and indices stay stable between parsing and injection.
pub fn split_documents(source: &str) -> Vec<Range<usize>> {
    let mut documents = Vec::new();
    let mut start = 0;
    let mut offset = 0;

    for line in source.split_inclusive('\n') {
        if is_separator(line) {
            documents.push(start..offset);
            start = offset + line.len();
        }
        offset += line.len();
    }
    documents.push(start..source.len());

    documents
}

fn is_separator(line: &str) -> bool {
    let line = line.trim_end_matches(['\n', '\r']);
    line == "---" || line.starts_with("--- ") || line.starts_with("---\t")
}

/// Length of the leading run of blank and comment lines.
pub fn comment_header_len(document: &str) -> usize {
    document
        .split_inclusive('\n')
        .take_while(|line| {
            let trimmed = line.trim();
            trimmed.is_empty() || trimmed.starts_with('#')
        })
        .map(str::len)
        .sum()
}

/// Parse one document; `None` for documents with no content.
pub fn parse_document(document: &str) -> Result<Option<YamlValue>> {
    if comment_header_len(document) == document.len() {
        return Ok(None);
    }

    let value: YamlValue =
        serde_yaml::from_str(document).map_err(|e| TaggerError::parse("YAML", e.to_string()))?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(value))
}

/// Convert a YAML value into its JSON equivalent for fingerprinting.
pub fn yaml_to_json(value: &YamlValue) -> JsonValue {
    match value {
        YamlValue::Null => JsonValue::Null,
        YamlValue::Bool(b) => JsonValue::Bool(*b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                JsonValue::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                JsonValue::Number(u.into())
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(JsonValue::Number)
                    .unwrap_or_else(|| JsonValue::String(n.to_string()))
            }
        }
        YamlValue::String(s) => JsonValue::String(s.clone()),
        YamlValue::Sequence(items) => JsonValue::Array(items.iter().map(yaml_to_json).collect()),
        YamlValue::Mapping(mapping) => {
            let mut map = serde_json::Map::new();
            for (key, value) in mapping {
                map.insert(mapping_key_text(key), yaml_to_json(value));
            }
            JsonValue::Object(map)
        }
        YamlValue::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}

fn mapping_key_text(key: &YamlValue) -> String {
    match key {
        YamlValue::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
