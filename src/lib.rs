//! Self-describing command registry.
//!
//! Register plain functions, and the registry works out their names and
//! parameter types, renders a wrapped usage banner, and re-dispatches the
//! commands that take a single `Variadic<Dynamic>` parameter.
//!
//! ```ignore
//! use cmdreg::{Dynamic, Program, Registry, Variadic};
//!
//! fn build(package: String, force: bool) {}
//! fn get(args: Variadic<Dynamic>) {}
//!
//! let mut registry = Registry::new();
//! registry.register_named(build, &["package", "force"])?;
//! registry.register(get)?; // names recovered from source
//!
//! let program = Program::new("emojipedia", "Browse emoji.", &registry);
//! println!("{}", program.usage);
//!
//! let handler = registry.dispatch("get")?;
//! handler(Variadic::<Dynamic>::new().with("categories"));
//! ```

mod error;
mod introspect;
mod registry;
mod settings;
mod types;
pub mod usage;

pub use error::{Error, Result};
pub use introspect::{
    parameter_names, read_line, resolve_parameter_names, Handler, Identity, Introspect, ParamType,
    Signature, SourceLocation, SourceTree, SymbolTable,
};
pub use registry::Registry;
pub use settings::{discover_settings, load_settings, Manifest, Settings};
pub use types::{
    display_type, normalize, shorten_paths, ArgKind, ArgumentDescriptor, Dynamic,
    FunctionDescriptor, Variadic,
};
pub use usage::{render_usage, render_usage_with_width, LINE_LENGTH};

/// A program's name, description and commands, with its rendered usage.
#[derive(Debug, Clone)]
pub struct Program {
    pub name: String,
    pub description: String,
    pub functions: Vec<FunctionDescriptor>,
    /// The rendered usage banner.
    pub usage: String,
}

impl Program {
    pub fn new(name: impl Into<String>, description: impl Into<String>, registry: &Registry) -> Self {
        Self::with_width(name, description, registry, LINE_LENGTH)
    }

    /// Build a program whose usage wraps at `width` columns.
    pub fn with_width(
        name: impl Into<String>,
        description: impl Into<String>,
        registry: &Registry,
        width: usize,
    ) -> Self {
        let name = name.into();
        let description = description.into();
        let functions: Vec<FunctionDescriptor> = registry.descriptors().cloned().collect();
        let usage = render_usage_with_width(&name, &description, &functions, width);
        Self {
            name,
            description,
            functions,
            usage,
        }
    }

    /// Build a program from a loaded manifest.
    pub fn from_manifest(manifest: &Manifest, registry: &Registry, width: usize) -> Self {
        Self::with_width(&manifest.name, &manifest.description, registry, width)
    }
}
