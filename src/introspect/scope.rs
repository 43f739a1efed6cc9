//! Scope-aware scanning of Rust source text.
//!
//! A `fn` definition is only meaningful together with the `mod`, `impl`,
//! `trait` and `fn` items that enclose it, since those make up the rest of
//! its symbol path. Comments and string or character literals are blanked out
//! first so braces inside them are not counted.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::strip_generics;

/// A `fn` item found in source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Definition {
    /// 1-based line of the `fn` keyword.
    pub line: usize,
    /// Names of the enclosing items, outermost first.
    pub scope: Vec<String>,
}

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:(mod|trait|fn)\s+(?:r#)?([A-Za-z_][A-Za-z0-9_]*)|(impl)\b)|[{}()\[\];]")
        .unwrap()
});

enum Pending {
    Named(String),
    /// Byte offset just past the `impl` keyword.
    Impl(usize),
}

/// Every definition of `fn name` in `source`, with its enclosing scope.
pub(crate) fn definitions(source: &str, name: &str) -> Vec<Definition> {
    let code = strip_non_code(source);
    let mut found = Vec::new();
    let mut stack: Vec<Option<String>> = Vec::new();
    let mut pending = None;
    let mut nesting = 0usize;
    let mut line = 1;
    let mut scanned = 0;

    for caps in TOKEN.captures_iter(&code) {
        let Some(token) = caps.get(0) else { continue };

        if let (Some(keyword), Some(ident)) = (caps.get(1), caps.get(2)) {
            if keyword.as_str() == "fn" && ident.as_str() == name {
                line += code[scanned..keyword.start()].matches('\n').count();
                scanned = keyword.start();
                found.push(Definition {
                    line,
                    scope: stack.iter().flatten().cloned().collect(),
                });
            }
            pending = Some(Pending::Named(ident.as_str().to_string()));
            continue;
        }

        if caps.get(3).is_some() {
            // `impl Trait` in argument or return position is not an item.
            if pending.is_none() && nesting == 0 {
                pending = Some(Pending::Impl(token.end()));
            }
            continue;
        }

        match token.as_str() {
            "(" | "[" => nesting += 1,
            ")" | "]" => nesting = nesting.saturating_sub(1),
            ";" if nesting == 0 => pending = None,
            "{" => {
                let label = match pending.take() {
                    Some(Pending::Named(name)) => Some(name),
                    Some(Pending::Impl(start)) => impl_self_type(&code[start..token.start()]),
                    None => None,
                };
                stack.push(label);
            }
            "}" => {
                stack.pop();
            }
            _ => {}
        }
    }

    found
}

/// The last path segment of the type an `impl` header is for.
///
/// `<T> Stack<T>` and `fmt::Debug for app::Stack<T> where T: Debug` both
/// yield `Stack`.
fn impl_self_type(header: &str) -> Option<String> {
    let header = strip_generics(header);
    let mut tokens: Vec<&str> = header.split_whitespace().collect();
    if let Some(end) = tokens.iter().position(|t| *t == "where") {
        tokens.truncate(end);
    }
    if let Some(start) = tokens.iter().rposition(|t| *t == "for") {
        tokens.drain(..=start);
    }

    tokens
        .into_iter()
        .map(|t| t.trim_start_matches('&'))
        .find(|t| !t.is_empty() && !t.starts_with('\'') && !matches!(*t, "mut" | "dyn" | "unsafe"))
        .and_then(|path| path.rsplit("::").next())
        .map(str::to_string)
}

/// Replace comments and string, byte string, raw string and character
/// literals with spaces, keeping newlines so line numbers are preserved.
pub(crate) fn strip_non_code(source: &str) -> String {
    let bytes = source.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut pos = 0;

    let blank = |b: u8| if b == b'\n' { b'\n' } else { b' ' };

    while pos < bytes.len() {
        let c = bytes[pos];

        if c == b'/' && bytes.get(pos + 1) == Some(&b'/') {
            while pos < bytes.len() && bytes[pos] != b'\n' {
                out.push(b' ');
                pos += 1;
            }
            continue;
        }

        if c == b'/' && bytes.get(pos + 1) == Some(&b'*') {
            let mut depth = 0usize;
            while pos < bytes.len() {
                if bytes[pos] == b'/' && bytes.get(pos + 1) == Some(&b'*') {
                    depth += 1;
                    out.extend_from_slice(b"  ");
                    pos += 2;
                } else if bytes[pos] == b'*' && bytes.get(pos + 1) == Some(&b'/') {
                    depth -= 1;
                    out.extend_from_slice(b"  ");
                    pos += 2;
                    if depth == 0 {
                        break;
                    }
                } else {
                    out.push(blank(bytes[pos]));
                    pos += 1;
                }
            }
            continue;
        }

        if let Some(hashes) = raw_string_hashes(bytes, pos) {
            // `r`, the hashes and the opening quote.
            let open = 1 + hashes + 1;
            out.extend(std::iter::repeat(b' ').take(open));
            pos += open;
            while pos < bytes.len() {
                let closes = bytes[pos] == b'"'
                    && bytes[pos + 1..].iter().take(hashes).filter(|b| **b == b'#').count()
                        == hashes;
                if closes {
                    out.extend(std::iter::repeat(b' ').take(1 + hashes));
                    pos += 1 + hashes;
                    break;
                }
                out.push(blank(bytes[pos]));
                pos += 1;
            }
            continue;
        }

        if c == b'"' {
            out.push(b' ');
            pos += 1;
            let mut escape_next = false;
            while pos < bytes.len() {
                let b = bytes[pos];
                out.push(blank(b));
                pos += 1;
                if escape_next {
                    escape_next = false;
                } else if b == b'\\' {
                    escape_next = true;
                } else if b == b'"' {
                    break;
                }
            }
            continue;
        }

        if c == b'\'' {
            if let Some(len) = char_literal_len(bytes, pos) {
                out.extend(std::iter::repeat(b' ').take(len));
                pos += len;
                continue;
            }
        }

        out.push(c);
        pos += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Number of `#`s when a raw string literal (`r"..."`, `r#"..."#`,
/// `br"..."`) starts at `pos`.
fn raw_string_hashes(bytes: &[u8], pos: usize) -> Option<usize> {
    if bytes[pos] != b'r' {
        return None;
    }
    let is_ident = |b: u8| b.is_ascii_alphanumeric() || b == b'_';
    let starts_token = match pos.checked_sub(1).map(|i| bytes[i]) {
        None => true,
        Some(b'b') => pos < 2 || !is_ident(bytes[pos - 2]),
        Some(b) => !is_ident(b),
    };
    if !starts_token {
        return None;
    }

    let hashes = bytes[pos + 1..].iter().take_while(|b| **b == b'#').count();
    (bytes.get(pos + 1 + hashes) == Some(&b'"')).then_some(hashes)
}

/// Length in bytes of a character literal starting at `pos`, or `None` for a
/// lifetime or label.
fn char_literal_len(bytes: &[u8], pos: usize) -> Option<usize> {
    if bytes.get(pos + 1) == Some(&b'\\') {
        let close = bytes.get(pos + 3..)?.iter().take(10).position(|b| *b == b'\'')?;
        return Some(close + 4);
    }

    // One character of up to four UTF-8 bytes, then the closing quote.
    (2..=5).find(|&len| {
        bytes.get(pos + len) == Some(&b'\'')
            && std::str::from_utf8(&bytes[pos + 1..pos + len])
                .is_ok_and(|s| s.chars().count() == 1)
    })
    .map(|len| len + 1)
}
