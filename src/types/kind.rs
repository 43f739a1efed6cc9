//! Classification and display of reflected type text.
//!
//! Parameter types are captured with `std::any::type_name`, which yields fully
//! qualified text such as `alloc::vec::Vec<alloc::string::String>`. This module
//! shortens that text, classifies it and renders it for usage output.

use std::sync::LazyLock;

use regex::Regex;

/// Broad shape of a parameter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    /// Booleans, characters, numbers and strings.
    Scalar,
    /// Vectors, slices, arrays and variadic slots.
    Sequence,
    /// References, raw pointers and smart pointers.
    PointerLike,
    Other,
}

impl ArgKind {
    /// Classify type text. Accepts both qualified and shortened text.
    pub fn classify(type_text: &str) -> ArgKind {
        let text = shorten_paths(type_text);
        let text = text.trim();

        if is_scalar(text) {
            ArgKind::Scalar
        } else if element_type(text).is_some() {
            ArgKind::Sequence
        } else if is_pointer_like(text) {
            ArgKind::PointerLike
        } else {
            ArgKind::Other
        }
    }
}

static PATH_QUALIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:[A-Za-z_][A-Za-z0-9_]*::)+").unwrap());

/// Remove module qualifiers: `alloc::vec::Vec<alloc::string::String>` becomes
/// `Vec<String>`.
pub fn shorten_paths(type_text: &str) -> String {
    PATH_QUALIFIER.replace_all(type_text, "").into_owned()
}

/// Remove every balanced `<...>` group from a path.
///
/// `app::Stack<u8>::push` becomes `app::Stack::push`, and a trait-qualified
/// `<app::A as app::T>::run` becomes `::run`. The `>` of `->` inside a group
/// does not close it.
pub(crate) fn strip_generics(path: &str) -> String {
    let mut depth = 0usize;
    let mut out = String::with_capacity(path.len());
    let mut previous = None;

    for c in path.chars() {
        match c {
            '<' => depth += 1,
            '>' if previous != Some('-') => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
        previous = Some(c);
    }
    out
}

/// Render type text for usage output.
///
/// Module paths and one level of sequence wrapper are removed, `Box<dyn Any>`
/// becomes `any`, and any remaining bracket characters are dropped.
pub fn display_type(type_text: &str) -> String {
    let text = shorten_paths(type_text);
    let inner = element_type(&text).unwrap_or(&text);
    if is_dynamic(inner) {
        return "any".to_string();
    }
    inner.replace(['[', ']'], "")
}

/// The element type of a sequence wrapper, if `text` is one.
///
/// Handles `Vec<T>`, `VecDeque<T>`, `Variadic<T>`, `[T]`, `&[T]`, `&mut [T]`
/// and `[T; N]`.
pub(crate) fn element_type(text: &str) -> Option<&str> {
    let text = text.trim();

    for wrapper in ["Vec<", "VecDeque<", "Variadic<"] {
        if let Some(rest) = text.strip_prefix(wrapper) {
            return rest.strip_suffix('>').map(str::trim);
        }
    }

    let slice = text
        .strip_prefix("&mut ")
        .or_else(|| text.strip_prefix('&'))
        .unwrap_or(text);
    let inner = slice.strip_prefix('[')?.strip_suffix(']')?;
    match inner.rfind(';') {
        Some(pos) => Some(inner[..pos].trim()),
        None => Some(inner.trim()),
    }
}

/// Whether shortened type text denotes an untyped value.
pub(crate) fn is_dynamic(text: &str) -> bool {
    let text = text.trim();
    let inner = text
        .strip_prefix("Box<")
        .and_then(|t| t.strip_suffix('>'))
        .unwrap_or(text);
    inner.starts_with("dyn Any")
}

fn is_scalar(text: &str) -> bool {
    matches!(
        text,
        "bool"
            | "char"
            | "str"
            | "&str"
            | "String"
            | "i8"
            | "i16"
            | "i32"
            | "i64"
            | "i128"
            | "isize"
            | "u8"
            | "u16"
            | "u32"
            | "u64"
            | "u128"
            | "usize"
            | "f32"
            | "f64"
    )
}

fn is_pointer_like(text: &str) -> bool {
    text.starts_with('&')
        || text.starts_with("*const ")
        || text.starts_with("*mut ")
        || ["Box<", "Rc<", "Arc<"]
            .iter()
            .any(|wrapper| text.starts_with(wrapper))
}
