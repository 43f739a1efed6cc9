//! Source-derived parameter names.
//!
//! Reflection cannot report parameter names, so they are recovered from the
//! source text: the symbol path is mapped to the file and line defining the
//! function, and the names are read out of that line's parameter list.
//!
//! This only works while the crate's source tree is reachable at run time,
//! and only for signatures written on a single line.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::strip_generics;

use super::scope::definitions;
use super::signature::Signature;

/// A 1-based line within a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub path: PathBuf,
    pub line: usize,
}

/// Maps a fully qualified symbol path to where it is defined.
pub trait SymbolTable {
    fn locate(&self, symbol: &str) -> Result<SourceLocation>;
}

/// Symbol table backed by a crate's source directory.
///
/// `krate::a::b::func` is looked up in `src/a/b.rs`, `src/a/b/mod.rs`, then
/// each parent module in turn, down to the crate root files. A root named
/// after the crate (`tests/krate.rs`, `examples/krate.rs`, `benches/krate.rs`,
/// `src/bin/krate.rs`) takes precedence over `src/lib.rs` and `src/main.rs`.
///
/// Within each file only a `fn func` nested in the `mod`, `impl` or `fn`
/// blocks named by the rest of the path counts. Exactly one such definition
/// must exist across all candidates.
#[derive(Debug, Clone)]
pub struct SourceTree {
    root: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Root {
    /// A module file below `src/`.
    Module,
    /// A crate root file carrying the crate's name.
    Named,
    /// `src/lib.rs` or `src/main.rs`.
    Default,
}

#[derive(Debug)]
struct Candidate {
    path: PathBuf,
    /// Path segments between the file and the function.
    scope: Vec<String>,
    root: Root,
}

impl SourceTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Use `CARGO_MANIFEST_DIR` when running under cargo, else the current
    /// directory.
    pub fn from_env() -> Self {
        let root = std::env::var_os("CARGO_MANIFEST_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn candidates(&self, krate: &str, modules: &[&str]) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        let scope = |depth: usize| modules[depth..].iter().map(|m| m.to_string()).collect();
        let src = self.root.join("src");

        for depth in (1..=modules.len()).rev() {
            let module: PathBuf = modules[..depth].iter().collect();
            for path in [src.join(&module).with_extension("rs"), src.join(&module).join("mod.rs")] {
                candidates.push(Candidate {
                    path,
                    scope: scope(depth),
                    root: Root::Module,
                });
            }
        }

        let mut names = vec![krate.to_string()];
        let hyphenated = krate.replace('_', "-");
        if hyphenated != krate {
            names.push(hyphenated);
        }
        let named_dirs = [
            self.root.join("tests"),
            self.root.join("examples"),
            self.root.join("benches"),
            src.join("bin"),
        ];
        for dir in &named_dirs {
            for name in &names {
                candidates.push(Candidate {
                    path: dir.join(name).with_extension("rs"),
                    scope: scope(0),
                    root: Root::Named,
                });
            }
        }
        for file in ["lib.rs", "main.rs"] {
            candidates.push(Candidate {
                path: src.join(file),
                scope: scope(0),
                root: Root::Default,
            });
        }

        candidates
    }
}

impl SymbolTable for SourceTree {
    fn locate(&self, symbol: &str) -> Result<SourceLocation> {
        let unavailable = |reason: String| Error::IntrospectionUnavailable {
            symbol: symbol.to_string(),
            reason,
        };
        if symbol.starts_with('<') {
            return Err(unavailable(
                "trait-qualified symbols cannot be mapped to a file".to_string(),
            ));
        }

        let path = strip_generics(symbol);
        let segments: Vec<&str> = path.split("::").collect();
        let Some((name, rest)) = segments.split_last() else {
            return Err(unavailable("empty symbol path".to_string()));
        };
        let Some((krate, modules)) = rest.split_first() else {
            return Err(unavailable("symbol path has no crate qualifier".to_string()));
        };

        let mut readable = false;
        let mut named_root = false;
        let mut first_failure = None;
        let mut found = Vec::new();

        for candidate in self.candidates(krate, modules) {
            if candidate.root == Root::Default && named_root {
                continue;
            }
            let content = match std::fs::read_to_string(&candidate.path) {
                Ok(content) => content,
                Err(e) => {
                    if first_failure.is_none() {
                        first_failure = Some((candidate.path, e));
                    }
                    continue;
                }
            };
            readable = true;
            named_root |= candidate.root == Root::Named;

            for definition in definitions(&content, name) {
                if definition.scope == candidate.scope {
                    found.push(SourceLocation {
                        path: candidate.path.clone(),
                        line: definition.line,
                    });
                }
            }
        }

        match (found.len(), first_failure) {
            (1, _) => {
                let location = found.remove(0);
                debug!(symbol, path = %location.path.display(), line = location.line, "located definition");
                Ok(location)
            }
            (0, Some((path, source))) if !readable => Err(Error::SourceUnavailable { path, source }),
            (0, _) => Err(unavailable(format!(
                "no definition of `fn {}` under '{}'",
                name,
                self.root.display()
            ))),
            (n, _) => Err(unavailable(format!(
                "{} definitions of `fn {}` match under '{}'",
                n,
                name,
                self.root.display()
            ))),
        }
    }
}

/// Recover parameter names for `signature` through `table`, along with the
/// location they were read from.
///
/// Fails with `ParameterCountMismatch` when the parsed names disagree with the
/// reflected arity, which happens for signatures spanning several lines.
pub fn resolve_parameter_names(
    table: &dyn SymbolTable,
    signature: &Signature,
) -> Result<(Vec<String>, SourceLocation)> {
    let location = table.locate(signature.symbol)?;
    let line = read_line(&location)?;
    let names = parameter_names(&line, &signature.function_name());

    if names.len() != signature.arity() {
        return Err(Error::ParameterCountMismatch {
            symbol: signature.symbol.to_string(),
            expected: signature.arity(),
            found: names.len(),
        });
    }
    debug!(symbol = signature.symbol, ?names, "resolved parameter names");
    Ok((names, location))
}

/// Read the text of one line.
pub fn read_line(location: &SourceLocation) -> Result<String> {
    let unavailable = |source| Error::SourceUnavailable {
        path: location.path.clone(),
        source,
    };
    let content = std::fs::read_to_string(&location.path).map_err(unavailable)?;

    location
        .line
        .checked_sub(1)
        .and_then(|index| content.lines().nth(index))
        .map(str::to_string)
        .ok_or_else(|| {
            unavailable(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("line {} is out of range", location.line),
            ))
        })
}

static PARAMETER_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^()]*)\)").unwrap());

fn definition_pattern(name: &str) -> std::result::Result<Regex, regex::Error> {
    Regex::new(&format!(r"\bfn\s+{}\s*[<(]", regex::escape(name)))
}

/// Extract parameter names from the line defining `fn name`.
///
/// Takes the first parenthesized list after the function name, splits it on
/// top-level commas and keeps each segment's binding name. Returns nothing
/// when the list is not closed on this line.
pub fn parameter_names(line: &str, name: &str) -> Vec<String> {
    let start = definition_pattern(name)
        .ok()
        .and_then(|pattern| pattern.find(line))
        .map(|m| m.start())
        .unwrap_or(0);

    let Some(list) = PARAMETER_LIST
        .captures(&line[start..])
        .and_then(|caps| caps.get(1))
    else {
        return Vec::new();
    };

    split_top_level(list.as_str())
        .into_iter()
        .filter_map(binding_name)
        .collect()
}

/// The bound name of a `name: Type` segment, or `self` for a receiver.
fn binding_name(segment: &str) -> Option<String> {
    segment
        .split(':')
        .next()?
        .split_whitespace()
        .map(|token| token.trim_start_matches('&'))
        .find(|token| !token.is_empty() && *token != "mut" && !token.starts_with('\''))
        .map(str::to_string)
}

/// Split on commas that are not nested inside `<>` or `[]`.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut depth = 0i32;
    let mut start = 0;
    let mut parts = Vec::new();

    for (i, c) in s.char_indices() {
        match c {
            '<' | '[' => depth += 1,
            '>' | ']' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);

    parts.into_iter().filter(|p| !p.trim().is_empty()).collect()
}
