//! Command registry.
//!
//! Maps normalized command names to their descriptors and, for commands that
//! take a single `Variadic<Dynamic>` parameter, to a uniform [`Handler`].
//!
//! Registration takes `&mut self`, so the registry is built once, on one
//! thread, before it is shared. Lookups and dispatch are read-only.

use std::fmt;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::introspect::{
    resolve_parameter_names, ErasedHandler, Handler, Introspect, SourceTree, SymbolTable,
};
use crate::types::FunctionDescriptor;

struct Command {
    descriptor: FunctionDescriptor,
    handler: ErasedHandler,
}

pub struct Registry {
    commands: IndexMap<String, Command>,
    symbols: Box<dyn SymbolTable + Send + Sync>,
}

impl Registry {
    /// Create an empty registry that recovers parameter names from the source
    /// tree at `CARGO_MANIFEST_DIR` (or the current directory).
    pub fn new() -> Self {
        Self::with_symbols(SourceTree::from_env())
    }

    /// Create an empty registry that recovers parameter names through
    /// `symbols`.
    pub fn with_symbols(symbols: impl SymbolTable + Send + Sync + 'static) -> Self {
        Self {
            commands: IndexMap::new(),
            symbols: Box::new(symbols),
        }
    }

    /// Register `f`, recovering its parameter names from source.
    ///
    /// A command whose normalized name is already taken replaces the previous
    /// entry.
    pub fn register<Args, F: Introspect<Args>>(&mut self, f: F) -> Result<FunctionDescriptor> {
        let signature = f.signature()?;
        let (names, location) = resolve_parameter_names(self.symbols.as_ref(), &signature)?;
        let descriptor = FunctionDescriptor::new(&signature, names)?.with_source(location);
        self.insert(f, descriptor)
    }

    /// Register `f` with explicitly supplied parameter names.
    ///
    /// This does not touch the source tree. `names` must hold one entry per
    /// parameter.
    pub fn register_named<Args, F: Introspect<Args>>(
        &mut self,
        f: F,
        names: &[&str],
    ) -> Result<FunctionDescriptor> {
        let signature = f.signature()?;
        let names = names.iter().map(|n| n.to_string()).collect();
        let descriptor = FunctionDescriptor::new(&signature, names)?;
        self.insert(f, descriptor)
    }

    fn insert<Args, F: Introspect<Args>>(
        &mut self,
        f: F,
        descriptor: FunctionDescriptor,
    ) -> Result<FunctionDescriptor> {
        let key = descriptor.display_name.clone();

        debug!(
            name = %key,
            symbol = descriptor.symbol,
            arity = descriptor.arity,
            variadic = descriptor.is_variadic,
            "registered command"
        );
        let previous = self.commands.insert(
            key,
            Command {
                descriptor: descriptor.clone(),
                handler: f.into_handler(),
            },
        );
        if let Some(previous) = previous {
            warn!(
                name = %descriptor.display_name,
                replaced = previous.descriptor.symbol,
                by = descriptor.symbol,
                "command name collision; keeping the latest registration"
            );
        }

        Ok(descriptor)
    }

    /// Case-insensitive lookup by display name.
    pub fn lookup(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.commands
            .get(&name.to_lowercase())
            .map(|c| &c.descriptor)
    }

    /// Whether a command with the same display name is registered.
    pub fn contains(&self, descriptor: &FunctionDescriptor) -> bool {
        self.commands.contains_key(&descriptor.display_name)
    }

    /// Registered descriptors, in the order their names were first
    /// registered. Replacing a command keeps its original position.
    pub fn descriptors(&self) -> impl Iterator<Item = &FunctionDescriptor> + '_ {
        self.commands.values().map(|c| &c.descriptor)
    }

    /// Resolve a command to its uniform handler.
    ///
    /// Returns `UnknownKey` when nothing is registered under `name`, and
    /// `SignatureMismatch` unless the command's only parameter is a
    /// `Variadic<Dynamic>`.
    pub fn dispatch(&self, name: &str) -> Result<Handler> {
        let command = self
            .commands
            .get(&name.to_lowercase())
            .ok_or_else(|| Error::UnknownKey(name.to_string()))?;

        if !command.descriptor.is_dispatchable() {
            return Err(Error::SignatureMismatch(name.to_string()));
        }
        command
            .handler
            .downcast_ref::<Handler>()
            .cloned()
            .ok_or_else(|| Error::SignatureMismatch(name.to_string()))
    }

    /// Remove a command, returning its descriptor.
    pub fn remove(&mut self, name: &str) -> Option<FunctionDescriptor> {
        self.commands
            .shift_remove(&name.to_lowercase())
            .map(|c| c.descriptor)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("commands", &self.commands.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::introspect::read_line;
    use crate::types::{Dynamic, Variadic};

    static TALLIED: AtomicUsize = AtomicUsize::new(0);

    #[allow(unused_variables)]
    fn deploy(target: String, force: bool) {}

    fn list_all() {}

    #[allow(non_snake_case)]
    fn ListAll() {}

    fn run(_opts: Variadic<Dynamic>) {}

    fn tally(args: Variadic<Dynamic>) {
        TALLIED.fetch_add(args.len(), Ordering::SeqCst);
    }

    mod typed {
        use crate::types::{Dynamic, Variadic};

        pub fn run(_a: i64, _opts: Variadic<Dynamic>) {}
    }

    fn source_registry() -> Registry {
        Registry::with_symbols(SourceTree::new(env!("CARGO_MANIFEST_DIR")))
    }

    #[test]
    fn register_recovers_names_from_source() {
        let mut registry = source_registry();
        let desc = registry.register(deploy).unwrap();

        assert_eq!(desc.display_name, "deploy");
        assert_eq!(desc.arity, 2);
        let names: Vec<_> = desc.arguments.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["target", "force"]);
        assert!(registry.contains(&desc));
    }

    #[test]
    fn register_named_skips_source() {
        let mut registry = Registry::with_symbols(SourceTree::new("/nonexistent"));
        let desc = registry.register_named(deploy, &["where", "now"]).unwrap();
        assert_eq!(desc.arguments[0].name, "where");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn register_named_checks_count() {
        let mut registry = source_registry();
        let err = registry.register_named(deploy, &["target"]).unwrap_err();
        assert!(matches!(err, Error::ParameterCountMismatch { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn closures_cannot_be_registered() {
        let mut registry = source_registry();
        let err = registry.register_named(|_x: i32| {}, &["x"]).unwrap_err();
        assert!(matches!(err, Error::IntrospectionUnavailable { .. }));
    }

    #[test]
    fn colliding_names_keep_last_registration() {
        let mut registry = source_registry();
        registry.register(list_all).unwrap();
        let second = registry.register(ListAll).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("list-all"), Some(&second));
        assert!(registry.lookup("list-all").unwrap().symbol.ends_with("::ListAll"));
    }

    #[test]
    fn contains_matches_descriptors_by_display_name() {
        let mut other = source_registry();
        let camel = other.register(ListAll).unwrap();

        let mut registry = source_registry();
        assert!(!registry.contains(&camel));
        registry.register(list_all).unwrap();
        assert!(registry.contains(&camel));
        assert_ne!(registry.lookup("list-all").unwrap().symbol, camel.symbol);
    }

    #[test]
    fn source_registration_records_location() {
        let mut registry = source_registry();
        let desc = registry.register(deploy).unwrap();
        let location = desc.source.as_ref().unwrap();
        assert!(location.path.ends_with("src/registry.rs"), "{}", location.path.display());
        assert!(read_line(location)
            .unwrap()
            .contains("fn deploy(target: String, force: bool)"));

        let named = registry.register_named(tally, &["opts"]).unwrap();
        assert!(named.source.is_none());
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut registry = source_registry();
        registry.register(list_all).unwrap();
        assert!(registry.lookup("LIST-ALL").is_some());
        assert!(registry.lookup("List-All").is_some());
        assert!(registry.lookup("list").is_none());
    }

    #[test]
    fn descriptors_follow_first_registration_order() {
        let mut registry = source_registry();
        registry.register(run).unwrap();
        registry.register(list_all).unwrap();
        registry.register(deploy).unwrap();
        registry.register(ListAll).unwrap();

        let names: Vec<_> = registry
            .descriptors()
            .map(|d| d.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["run", "list-all", "deploy"]);
    }

    #[test]
    fn dispatch_returns_handler_for_any_slot() {
        let mut registry = source_registry();
        registry.register(tally).unwrap();

        let handler = registry.dispatch("TALLY").unwrap();
        handler(Variadic::<Dynamic>::new().with(1u8).with("two"));
        assert_eq!(TALLIED.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn dispatch_rejects_other_shapes() {
        let mut registry = source_registry();
        registry.register_named(typed::run, &["a", "opts"]).unwrap();

        assert!(registry.lookup("run").is_some());
        let err = registry.dispatch("run").err().unwrap();
        assert!(matches!(err, Error::SignatureMismatch(_)));
        assert!(err.is_recoverable());

        registry.register(deploy).unwrap();
        assert!(matches!(
            registry.dispatch("deploy"),
            Err(Error::SignatureMismatch(_))
        ));
    }

    #[test]
    fn dispatch_unknown_key() {
        let registry = source_registry();
        let err = registry.dispatch("missing").err().unwrap();
        assert!(matches!(err, Error::UnknownKey(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn dispatch_after_replacement_uses_new_shape() {
        let mut registry = source_registry();
        registry.register(run).unwrap();
        assert!(registry.dispatch("run").is_ok());

        registry.register_named(typed::run, &["a", "opts"]).unwrap();
        assert!(registry.dispatch("run").is_err());
    }

    #[test]
    fn remove_drops_command() {
        let mut registry = source_registry();
        registry.register(list_all).unwrap();
        let removed = registry.remove("LIST-ALL").unwrap();
        assert_eq!(removed.display_name, "list-all");
        assert!(!registry.contains(&removed));
        assert!(registry.remove("list-all").is_none());
    }
}
