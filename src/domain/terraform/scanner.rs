//! Bracket-aware scanning over HCL source text.
//!
//! The scanner works on bytes. Every structural character it looks at is ASCII,
//! so all returned offsets fall on UTF-8 character boundaries.

use std::ops::Range;

/// A `key = value` (or `key: value`) item found inside a body or object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: Range<usize>,
    pub value: Range<usize>,
}

pub struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
        }
    }

    fn at(&self, i: usize) -> Option<u8> {
        self.bytes.get(i).copied()
    }

    /// Advance past the token starting at `i`, treating strings, comments,
    /// heredocs and bracketed groups as single tokens.
    pub fn step(&self, i: usize) -> usize {
        let len = self.bytes.len();
        match self.bytes[i] {
            b'"' => self.skip_string(i),
            b'#' => self.line_end(i),
            b'/' if self.at(i + 1) == Some(b'/') => self.line_end(i),
            b'/' if self.at(i + 1) == Some(b'*') => self.src[i + 2..]
                .find("*/")
                .map(|offset| i + 2 + offset + 2)
                .unwrap_or(len),
            b'<' if self.at(i + 1) == Some(b'<') => self.skip_heredoc(i),
            b'{' | b'(' | b'[' => self.matching_close(i).map(|c| c + 1).unwrap_or(len),
            _ => i + 1,
        }
    }

    /// Whether `pos` starts a token outside any comment, string, heredoc or
    /// bracketed group.
    pub fn is_top_level(&self, pos: usize) -> bool {
        let mut i = 0;
        while i < pos {
            i = self.step(i);
        }
        i == pos
    }

    /// Index of the bracket closing the one opened at `open`.
    pub fn matching_close(&self, open: usize) -> Option<usize> {
        let close = match self.at(open)? {
            b'{' => b'}',
            b'(' => b')',
            b'[' => b']',
            _ => return None,
        };

        let mut i = open + 1;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b if b == close => return Some(i),
                b'}' | b')' | b']' => return None,
                _ => i = self.step(i),
            }
        }
        None
    }

    fn line_end(&self, i: usize) -> usize {
        self.src[i..]
            .find('\n')
            .map(|offset| i + offset)
            .unwrap_or(self.bytes.len())
    }

    fn skip_string(&self, start: usize) -> usize {
        let len = self.bytes.len();
        let mut i = start + 1;
        while i < len {
            match self.bytes[i] {
                b'\\' => i += 2,
                b'"' => return i + 1,
                b'\n' => return i,
                b'$' if self.at(i + 1) == Some(b'$') => i += 2,
                b'%' if self.at(i + 1) == Some(b'%') => i += 2,
                b'$' | b'%' if self.at(i + 1) == Some(b'{') => {
                    i = self.matching_close(i + 1).map(|c| c + 1).unwrap_or(len);
                }
                _ => i += 1,
            }
        }
        len
    }

    fn skip_heredoc(&self, start: usize) -> usize {
        let mut i = start + 2;
        if self.at(i) == Some(b'-') {
            i += 1;
        }
        let ident_start = i;
        while self
            .at(i)
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_')
        {
            i += 1;
        }
        if i == ident_start {
            return start + 2;
        }
        let marker = &self.src[ident_start..i];

        let mut line_start = self.line_end(i);
        while line_start < self.bytes.len() {
            let content_start = line_start + 1;
            let end = self.line_end(content_start.min(self.bytes.len()));
            if self.src[content_start.min(end)..end].trim() == marker {
                return end;
            }
            line_start = end;
        }
        self.bytes.len()
    }

    /// Skip spaces, tabs, newlines and comments.
    pub fn skip_trivia(&self, mut i: usize, end: usize) -> usize {
        while i < end {
            match self.bytes[i] {
                b if b.is_ascii_whitespace() => i += 1,
                b'#' => i = self.step(i),
                b'/' if matches!(self.at(i + 1), Some(b'/') | Some(b'*')) => i = self.step(i),
                _ => break,
            }
        }
        i.min(end)
    }

    fn skip_inline_space(&self, mut i: usize, end: usize) -> usize {
        while i < end && matches!(self.bytes[i], b' ' | b'\t') {
            i += 1;
        }
        i
    }

    /// Read an identifier or quoted key at `i`, returning the key text range
    /// and the index just past the key.
    fn read_key(&self, i: usize, end: usize) -> Option<(Range<usize>, usize)> {
        let first = self.at(i)?;
        if first == b'"' {
            let after = self.skip_string(i).min(end);
            if after < i + 2 || self.bytes[after - 1] != b'"' {
                return None;
            }
            return Some((i + 1..after - 1, after));
        }
        if !(first.is_ascii_alphabetic() || first == b'_') {
            return None;
        }
        let mut j = i;
        while j < end
            && self
                .at(j)
                .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            j += 1;
        }
        Some((i..j, j))
    }

    /// Read an identifier at `i` (no quotes).
    pub fn identifier_at(&self, i: usize, end: usize) -> Option<Range<usize>> {
        match self.read_key(i, end) {
            Some((range, after)) if range.start == i => Some(range.start..after),
            _ => None,
        }
    }

    /// Find the item assigning `key` at the top nesting level of `range`.
    pub fn find_entry(&self, range: Range<usize>, key: &str) -> Option<Entry> {
        let end = range.end;
        let mut i = range.start;
        let mut item_start = true;

        while i < end {
            let b = self.bytes[i];
            if b == b'\n' || b == b',' {
                item_start = true;
                i += 1;
                continue;
            }
            if b.is_ascii_whitespace() {
                i += 1;
                continue;
            }
            if item_start {
                item_start = false;
                if let Some((key_range, after_key)) = self.read_key(i, end) {
                    let j = self.skip_inline_space(after_key, end);
                    let is_assign = match self.at(j) {
                        Some(b'=') => self.at(j + 1) != Some(b'='),
                        Some(b':') => true,
                        _ => false,
                    };
                    if is_assign && j < end {
                        let value_start = self.skip_inline_space(j + 1, end);
                        let value_end = self.value_end(value_start, end);
                        if &self.src[key_range.clone()] == key {
                            return Some(Entry {
                                key: key_range,
                                value: value_start..value_end,
                            });
                        }
                        i = value_end.max(j + 1);
                        continue;
                    }
                    i = after_key;
                    continue;
                }
            }
            i = self.step(i);
        }
        None
    }

    /// End of the expression starting at `start`, trailing whitespace excluded.
    pub fn value_end(&self, start: usize, end: usize) -> usize {
        let mut i = start;
        while i < end {
            match self.bytes[i] {
                b'\n' | b',' | b'#' | b'}' | b')' | b']' => break,
                b'/' if self.at(i + 1) == Some(b'/') => break,
                _ => i = self.step(i),
            }
        }
        let mut i = i.min(end);
        while i > start && self.bytes[i - 1].is_ascii_whitespace() {
            i -= 1;
        }
        i
    }

    /// Split the arguments of a call whose parentheses sit at `open` and `close`.
    pub fn split_args(&self, open: usize, close: usize) -> Vec<Range<usize>> {
        let mut args = Vec::new();
        let mut i = self.skip_trivia(open + 1, close);
        let mut arg_start = i;

        while i < close {
            if self.bytes[i] == b',' {
                self.push_arg(&mut args, arg_start, i);
                i = self.skip_trivia(i + 1, close);
                arg_start = i;
                continue;
            }
            if matches!(self.bytes[i], b'#')
                || (self.bytes[i] == b'/' && matches!(self.at(i + 1), Some(b'/') | Some(b'*')))
            {
                i = self.skip_trivia(i, close);
                continue;
            }
            i = self.step(i);
        }
        self.push_arg(&mut args, arg_start, close);
        args
    }

    fn push_arg(&self, args: &mut Vec<Range<usize>>, start: usize, end: usize) {
        let mut end = end;
        while end > start && self.bytes[end - 1].is_ascii_whitespace() {
            end -= 1;
        }
        if end > start {
            args.push(start..end);
        }
    }
}

/// Start of the line containing `pos`.
pub fn line_start(text: &str, pos: usize) -> usize {
    text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

/// Leading whitespace of the line containing `pos`.
pub fn line_indent(text: &str, pos: usize) -> &str {
    let start = line_start(text, pos);
    let line = &text[start..];
    let width = line
        .bytes()
        .take_while(|b| *b == b' ' || *b == b'\t')
        .count();
    &line[..width]
}

/// Indentation of the first non-blank line after `open` and before `close`.
pub fn first_item_indent(text: &str, open: usize, close: usize) -> Option<String> {
    text[open + 1..close]
        .split('\n')
        .skip(1)
        .find(|line| !line.trim().is_empty())
        .map(|line| {
            line.chars()
                .take_while(|c| *c == ' ' || *c == '\t')
                .collect()
        })
}
