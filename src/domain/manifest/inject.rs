//! Marker injection into manifest documents.
//!
//! Works on the parsed document: the target document's `metadata.labels` is
//! updated and only that document is re-serialized. Other documents keep
//! their original bytes; the rewritten one keeps its leading comment block
//! but loses any other comments and formatting.

use super::document::{comment_header_len, parse_document, split_documents};
use super::parser::LABELS_FIELD;
use crate::error::{Result, TaggerError};
use serde_yaml::{Mapping, Value as YamlValue};

/// Set `metadata.labels.<key>` of document `index` to `marker`.
pub fn inject_marker(source: &str, index: usize, key: &str, marker: &str) -> Result<String> {
    let not_found = || TaggerError::InjectionNotFound(format!("document #{}", index));

    let range = split_documents(source)
        .into_iter()
        .nth(index)
        .ok_or_else(not_found)?;
    let document = &source[range.clone()];
    let mut value = parse_document(document)?.ok_or_else(not_found)?;

    set_label(&mut value, key, marker)?;

    let rendered =
        serde_yaml::to_string(&value).map_err(|e| TaggerError::parse("YAML", e.to_string()))?;
    let header = &document[..comment_header_len(document)];

    let mut out = String::with_capacity(source.len() + marker.len());
    out.push_str(&source[..range.start]);
    out.push_str(header);
    out.push_str(&rendered);
    out.push_str(&source[range.end..]);
    Ok(out)
}

fn set_label(document: &mut YamlValue, key: &str, marker: &str) -> Result<()> {
    let root = document
        .as_mapping_mut()
        .ok_or_else(|| TaggerError::parse("YAML", "document is not a mapping"))?;
    let metadata = child_mapping(root, "metadata")?;
    let labels = child_mapping(metadata, LABELS_FIELD)?;

    labels.insert(
        YamlValue::String(key.to_string()),
        YamlValue::String(marker.to_string()),
    );
    Ok(())
}

/// Get `parent[field]` as a mapping, creating it when absent or null.
fn child_mapping<'m>(parent: &'m mut Mapping, field: &str) -> Result<&'m mut Mapping> {
    let missing = parent.get(field).map_or(true, YamlValue::is_null);
    if missing {
        parent.insert(
            YamlValue::String(field.to_string()),
            YamlValue::Mapping(Mapping::new()),
        );
    }

    parent
        .get_mut(field)
        .and_then(YamlValue::as_mapping_mut)
        .ok_or_else(|| TaggerError::parse("YAML", format!("`{}` is not a mapping", field)))
}
