//! Argument and function descriptors.
//!
//! A `FunctionDescriptor` is the introspected shape of a registered command:
//! its normalized display name and one `ArgumentDescriptor` per parameter.
//! Descriptors drive both registry lookup and usage rendering.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::introspect::{Identity, Signature, SourceLocation};

use super::kind::{display_type, strip_generics, ArgKind};

/// Snapshot of one function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentDescriptor {
    /// 0-based parameter position.
    pub position: usize,
    /// Parameter name as written in source or supplied at registration.
    pub name: String,
    /// Fully qualified type text from `type_name`.
    pub declared_type: &'static str,
    /// Type text with qualifiers and container decoration removed.
    pub display_type: String,
    pub kind: ArgKind,
    /// Set only on the trailing `Variadic<T>` parameter.
    pub is_variadic_slot: bool,
}

impl ArgumentDescriptor {
    /// Case-insensitive comparison of the display type against `type_key`.
    pub fn is(&self, type_key: &str) -> bool {
        self.display_type.eq_ignore_ascii_case(type_key)
    }

    /// Whether the parameter accepts untyped values.
    pub fn is_any(&self) -> bool {
        self.is("any")
    }
}

/// Snapshot of a registered function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDescriptor {
    pub identity: Identity,
    /// Fully qualified symbol path, e.g. `app::commands::build`.
    pub symbol: &'static str,
    /// Normalized, lower-case, hyphenated name used as the registry key.
    pub display_name: String,
    pub arity: usize,
    pub is_variadic: bool,
    pub arguments: Vec<ArgumentDescriptor>,
    /// Where parameter names were read from, for source-registered commands.
    pub source: Option<SourceLocation>,
}

impl FunctionDescriptor {
    /// Combine a reflected signature with resolved parameter names.
    ///
    /// Fails with `ParameterCountMismatch` unless exactly one name is given per
    /// parameter, and with `IntrospectionUnavailable` when the symbol has no
    /// usable display name.
    pub fn new(signature: &Signature, names: Vec<String>) -> Result<Self> {
        let display_name = normalize(signature.symbol);
        if display_name.is_empty() {
            return Err(Error::IntrospectionUnavailable {
                symbol: signature.symbol.to_string(),
                reason: "symbol normalizes to an empty name".to_string(),
            });
        }

        let arity = signature.parameters.len();
        if names.len() != arity {
            return Err(Error::ParameterCountMismatch {
                symbol: signature.symbol.to_string(),
                expected: arity,
                found: names.len(),
            });
        }

        let arguments = signature
            .parameters
            .iter()
            .zip(names)
            .enumerate()
            .map(|(position, (param, name))| ArgumentDescriptor {
                position,
                name,
                declared_type: param.declared,
                display_type: display_type(param.declared),
                kind: param.kind,
                is_variadic_slot: signature.is_variadic && position + 1 == arity,
            })
            .collect();

        Ok(Self {
            identity: signature.identity,
            symbol: signature.symbol,
            display_name,
            arity,
            is_variadic: signature.is_variadic,
            arguments,
            source: None,
        })
    }

    /// Record where the parameter names were read from.
    pub fn with_source(mut self, location: SourceLocation) -> Self {
        self.source = Some(location);
        self
    }

    /// The argument at `position`, if in bounds.
    pub fn argument(&self, position: usize) -> Option<&ArgumentDescriptor> {
        self.arguments.get(position)
    }

    /// True when the function takes no parameters.
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    /// Whether the function's only parameter is a variadic slot of untyped
    /// values.
    pub fn is_dispatchable(&self) -> bool {
        self.is_variadic
            && self.arity == 1
            && self
                .argument(0)
                .is_some_and(|arg| arg.is_variadic_slot && arg.is_any())
    }
}

static WORD_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]+[^A-Z]*|[^A-Z]+").unwrap());

/// Normalize a raw symbol path into a display name.
///
/// Generic arguments and everything up to the last `::` or `.` are dropped,
/// underscores and uppercase boundaries become hyphens, and the result is
/// lower-cased: `app::cli::ListAll` and `app::list_all` both become
/// `list-all`. Applying it twice yields the same result as applying it once.
pub fn normalize(symbol: &str) -> String {
    let path = strip_generics(symbol);
    let name = path
        .rsplit("::")
        .next()
        .unwrap_or(&path)
        .rsplit('.')
        .next()
        .unwrap_or(&path)
        .replace('_', "-");

    WORD_BOUNDARY
        .find_iter(&name)
        .map(|m| m.as_str().trim_matches('-'))
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::ParamType;
    use crate::types::{Dynamic, Variadic};

    fn signature(symbol: &'static str, parameters: Vec<ParamType>) -> Signature {
        Signature::from_parts(Identity::of::<()>(), symbol, parameters)
    }

    #[test]
    fn normalize_strips_qualifiers() {
        assert_eq!(normalize("app::commands::build"), "build");
        assert_eq!(normalize("main.Build"), "build");
        assert_eq!(normalize("build"), "build");
    }

    #[test]
    fn normalize_splits_camel_case() {
        assert_eq!(normalize("app::ListAll"), "list-all");
        assert_eq!(normalize("app::GetSubcategories"), "get-subcategories");
        assert_eq!(normalize("app::HTTPServer"), "httpserver");
    }

    #[test]
    fn normalize_treats_underscores_as_boundaries() {
        assert_eq!(normalize("app::list_all"), "list-all");
        assert_eq!(normalize("app::List_All"), "list-all");
        assert_eq!(normalize("app::_private"), "private");
    }

    #[test]
    fn normalize_drops_generic_arguments() {
        assert_eq!(normalize("app::parse<app::Config>"), "parse");
        assert_eq!(normalize("app::Stack<u8>::push_all"), "push-all");
        assert_eq!(normalize("<app::A as app::T>::run"), "run");
    }

    #[test]
    fn descriptor_rejects_empty_display_name() {
        for symbol in ["app::_", "app::__", "<app::A as app::T>::_"] {
            let err = FunctionDescriptor::new(&signature(symbol, vec![]), vec![]).unwrap_err();
            assert!(
                matches!(err, Error::IntrospectionUnavailable { .. }),
                "{symbol}: {err}"
            );
        }
        let desc = FunctionDescriptor::new(&signature("<app::A as app::T>::run", vec![]), vec![])
            .unwrap();
        assert_eq!(desc.display_name, "run");
        assert!(desc.source.is_none());
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in [
            "app::ListAll",
            "app::list_all",
            "main.GetKeywords",
            "app::HTTPServer",
            "a-B",
            "-x-",
            "",
        ] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "input {raw:?}");
        }
    }

    #[test]
    fn descriptor_zips_names_with_types() {
        let sig = signature(
            "app::Build",
            vec![ParamType::of::<String>(), ParamType::of::<bool>()],
        );
        let desc =
            FunctionDescriptor::new(&sig, vec!["target".into(), "force".into()]).unwrap();

        assert_eq!(desc.display_name, "build");
        assert_eq!(desc.arity, 2);
        assert_eq!(desc.arity, desc.arguments.len());
        assert!(!desc.is_variadic);
        assert_eq!(desc.arguments[0].name, "target");
        assert_eq!(desc.arguments[0].display_type, "String");
        assert_eq!(desc.arguments[0].kind, ArgKind::Scalar);
        assert_eq!(desc.arguments[1].position, 1);
        assert!(desc.arguments.iter().all(|a| !a.is_variadic_slot));
    }

    #[test]
    fn only_last_argument_is_variadic_slot() {
        let sig = signature(
            "app::Run",
            vec![ParamType::of::<i64>(), ParamType::of::<Variadic<Dynamic>>()],
        );
        assert!(sig.is_variadic);

        let desc = FunctionDescriptor::new(&sig, vec!["a".into(), "opts".into()]).unwrap();
        assert!(!desc.arguments[0].is_variadic_slot);
        assert!(desc.arguments[1].is_variadic_slot);
        assert!(desc.arguments[1].is_any());
        assert!(!desc.is_dispatchable());
    }

    #[test]
    fn single_any_slot_is_dispatchable() {
        let sig = signature("app::Run", vec![ParamType::of::<Variadic<Dynamic>>()]);
        let desc = FunctionDescriptor::new(&sig, vec!["opts".into()]).unwrap();
        assert!(desc.is_dispatchable());
        assert_eq!(desc.arguments[0].kind, ArgKind::Sequence);
    }

    #[test]
    fn typed_variadic_is_not_dispatchable() {
        let sig = signature("app::Sum", vec![ParamType::of::<Variadic<i64>>()]);
        let desc = FunctionDescriptor::new(&sig, vec!["values".into()]).unwrap();
        assert!(desc.is_variadic);
        assert!(!desc.is_dispatchable());
    }

    #[test]
    fn name_count_must_match_arity() {
        let sig = signature("app::Build", vec![ParamType::of::<String>()]);
        let err = FunctionDescriptor::new(&sig, vec![]).unwrap_err();
        assert!(matches!(
            err,
            Error::ParameterCountMismatch {
                expected: 1,
                found: 0,
                ..
            }
        ));
    }

    #[test]
    fn argument_lookup_is_bounds_checked() {
        let sig = signature("app::Build", vec![ParamType::of::<String>()]);
        let desc = FunctionDescriptor::new(&sig, vec!["target".into()]).unwrap();
        assert!(desc.argument(0).is_some());
        assert!(desc.argument(1).is_none());
        assert!(desc.argument(0).unwrap().is("string"));
    }
}
