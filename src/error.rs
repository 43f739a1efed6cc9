//! Error types for registry construction and lookup.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The function has no nameable symbol, or the symbol has no definition
    /// in the source tree.
    #[error("introspection unavailable for `{symbol}`: {reason}")]
    IntrospectionUnavailable { symbol: String, reason: String },

    /// The file holding a function definition could not be read.
    #[error("cannot read source file '{}': {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The number of names recovered for a function differs from its arity.
    #[error("`{symbol}` takes {expected} parameter(s) but {found} name(s) were resolved")]
    ParameterCountMismatch {
        symbol: String,
        expected: usize,
        found: usize,
    },

    #[error("no command named '{0}'")]
    UnknownKey(String),

    /// The command exists but cannot be invoked through a uniform handler.
    #[error("command '{0}' does not take a single variadic argument of type any")]
    SignatureMismatch(String),

    #[error("failed to parse manifest '{}': {source}", path.display())]
    Manifest {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Error {
    /// Whether the error is an ordinary negative lookup result rather than a
    /// construction failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::UnknownKey(_) | Error::SignatureMismatch(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
