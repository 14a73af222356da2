//! In-place marker injection into HCL resource blocks.
//!
//! Only bytes inside the target block's braces are rewritten. The `tags`
//! attribute takes one of four shapes:
//! - absent: a new `tags = { ... }` attribute is appended to the block
//! - a static object: the marker entry is updated or added
//! - `merge(base, { ... })`: the marker goes into the last object argument
//! - any other expression: wrapped as `merge(expr, { marker })`

use super::parser::TAGS_ATTRIBUTE;
use super::scanner::{first_item_indent, line_indent, line_start, Scanner};
use crate::error::{Result, TaggerError};
use regex::Regex;
use std::ops::Range;

const INDENT_UNIT: &str = "  ";

/// Byte positions of a resource block: header start, `{` and matching `}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    pub header: usize,
    pub open: usize,
    pub close: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TagShape {
    Static { open: usize, close: usize },
    Merge { open: usize, close: usize },
    Expression(Range<usize>),
}

/// Locate `resource "type" "name" {` and its matching closing brace.
///
/// Headers inside comments or heredocs are ignored. The last matching
/// header wins, mirroring how duplicate identities resolve.
pub fn find_resource_block(source: &str, resource_type: &str, name: &str) -> Option<BlockSpan> {
    let pattern = format!(
        r#"(?m)^[ \t]*resource[ \t]+"?{}"?[ \t]+"?{}"?[ \t]*\{{"#,
        regex::escape(resource_type),
        regex::escape(name)
    );
    let scanner = Scanner::new(source);
    let header = Regex::new(&pattern)
        .ok()?
        .find_iter(source)
        .filter(|m| scanner.is_top_level(m.start()))
        .last()?;
    let open = header.end() - 1;
    let close = scanner.matching_close(open)?;

    Some(BlockSpan {
        header: header.start(),
        open,
        close,
    })
}

/// Write `key = "marker"` into the tags of one resource block.
pub fn inject_marker(
    source: &str,
    resource_type: &str,
    name: &str,
    key: &str,
    marker: &str,
) -> Result<String> {
    let span = find_resource_block(source, resource_type, name).ok_or_else(|| {
        TaggerError::InjectionNotFound(format!("{}.{}", resource_type, name))
    })?;

    let scanner = Scanner::new(source);
    let entry = format!("{} = {}", entry_key(key), quote(marker));

    let Some(tags) = scanner.find_entry(span.open + 1..span.close, TAGS_ATTRIBUTE) else {
        return Ok(insert_container(source, &span, &entry));
    };

    let updated = match classify(&scanner, source, tags.value.clone()) {
        TagShape::Static { open, close } => {
            upsert_entry(source, &scanner, open, close, key, &entry, marker)
        }
        TagShape::Merge { open, close } => {
            let args = scanner.split_args(open, close);
            match args.last() {
                Some(last) if args.len() >= 2 && is_object_literal(&scanner, source, last) => {
                    upsert_entry(source, &scanner, last.start, last.end - 1, key, &entry, marker)
                }
                Some(last) => splice(source, last.end..last.end, &format!(", {{ {} }}", entry)),
                None => splice(source, open + 1..open + 1, &format!("{{ {} }}", entry)),
            }
        }
        TagShape::Expression(range) => {
            let wrapped = format!("merge({}, {{ {} }})", &source[range.clone()], entry);
            splice(source, range, &wrapped)
        }
    };

    Ok(updated)
}

fn classify(scanner: &Scanner<'_>, source: &str, value: Range<usize>) -> TagShape {
    if is_object_literal(scanner, source, &value) {
        return TagShape::Static {
            open: value.start,
            close: value.end - 1,
        };
    }

    if let Some(ident) = scanner.identifier_at(value.start, value.end) {
        if &source[ident.clone()] == "merge" {
            let paren = source[ident.end..value.end]
                .find(|c: char| !c.is_ascii_whitespace())
                .map(|offset| ident.end + offset);
            if let Some(open) = paren.filter(|p| source.as_bytes()[*p] == b'(') {
                if scanner.matching_close(open) == Some(value.end - 1) {
                    return TagShape::Merge {
                        open,
                        close: value.end - 1,
                    };
                }
            }
        }
    }

    TagShape::Expression(value)
}

fn is_object_literal(scanner: &Scanner<'_>, source: &str, range: &Range<usize>) -> bool {
    !range.is_empty()
        && source.as_bytes()[range.start] == b'{'
        && scanner.matching_close(range.start) == Some(range.end - 1)
}

fn upsert_entry(
    source: &str,
    scanner: &Scanner<'_>,
    open: usize,
    close: usize,
    key: &str,
    entry: &str,
    marker: &str,
) -> String {
    match scanner.find_entry(open + 1..close, key) {
        Some(existing) => splice(source, existing.value, &quote(marker)),
        None => insert_entry(source, open, close, entry),
    }
}

/// Add an entry to the object literal delimited by `open` and `close`.
fn insert_entry(source: &str, open: usize, close: usize, entry: &str) -> String {
    let inner = &source[open + 1..close];

    if inner.contains('\n') {
        let indent = first_item_indent(source, open, close)
            .unwrap_or_else(|| format!("{}{}", line_indent(source, open), INDENT_UNIT));
        let close_line = line_start(source, close);
        if close_line > open && source[close_line..close].trim().is_empty() {
            return splice(
                source,
                close_line..close_line,
                &format!("{}{}\n", indent, entry),
            );
        }
        let at = content_end(source, open + 1, close);
        return splice(source, at..at, &format!("\n{}{}", indent, entry));
    }

    if inner.trim().is_empty() {
        return splice(source, open + 1..close, &format!(" {} ", entry));
    }

    let at = content_end(source, open + 1, close);
    let separator = if source[..at].ends_with(',') { " " } else { ", " };
    splice(source, at..at, &format!("{}{}", separator, entry))
}

/// Append a `tags` attribute holding only the marker to a block without one.
fn insert_container(source: &str, span: &BlockSpan, entry: &str) -> String {
    let header_indent = line_indent(source, span.header);
    let indent = first_item_indent(source, span.open, span.close)
        .unwrap_or_else(|| format!("{}{}", header_indent, INDENT_UNIT));
    let container = format!(
        "{indent}{tags} = {{\n{indent}{unit}{entry}\n{indent}}}",
        indent = indent,
        tags = TAGS_ATTRIBUTE,
        unit = INDENT_UNIT,
        entry = entry
    );

    let close_line = line_start(source, span.close);
    if close_line > span.open && source[close_line..span.close].trim().is_empty() {
        return splice(source, close_line..close_line, &format!("{}\n", container));
    }

    let at = content_end(source, span.open + 1, span.close);
    splice(
        source,
        at..span.close,
        &format!("\n{}\n{}", container, header_indent),
    )
}

/// Position just after the last non-whitespace byte in `from..to`.
fn content_end(source: &str, from: usize, to: usize) -> usize {
    from + source[from..to].trim_end().len()
}

fn splice(source: &str, range: Range<usize>, replacement: &str) -> String {
    let mut out = String::with_capacity(source.len() + replacement.len());
    out.push_str(&source[..range.start]);
    out.push_str(replacement);
    out.push_str(&source[range.end..]);
    out
}

fn entry_key(key: &str) -> String {
    let bare = key
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if bare {
        key.to_string()
    } else {
        quote(key)
    }
}

fn quote(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace("${", "$${")
        .replace("%{", "%%{");
    format!("\"{}\"", escaped)
}
