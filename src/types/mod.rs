//! Descriptor types for registered commands.
//!
//! This module provides:
//! - `ArgumentDescriptor` and `FunctionDescriptor`, the introspected shape of a command
//! - `ArgKind` and type text display helpers
//! - `Variadic` and `Dynamic` for trailing variadic parameters

mod function;
mod kind;
mod variadic;

pub use function::{normalize, ArgumentDescriptor, FunctionDescriptor};
pub use kind::{display_type, shorten_paths, ArgKind};
pub use variadic::{Dynamic, Variadic};

pub(crate) use kind::strip_generics;
pub(crate) use variadic::variadic_path;
