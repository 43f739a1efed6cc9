//! Function introspection.
//!
//! This module provides:
//! - `Introspect` for reflecting symbol paths and parameter types
//! - `SymbolTable` and `SourceTree` for locating a function's definition
//!   within its enclosing modules
//! - Parameter name recovery from the defining source line

mod scope;
mod signature;
mod source;

pub(crate) use signature::ErasedHandler;
pub use signature::{Handler, Identity, Introspect, ParamType, Signature};
pub use source::{
    parameter_names, read_line, resolve_parameter_names, SourceLocation, SourceTree, SymbolTable,
};
