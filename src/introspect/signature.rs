//! Reflected call signatures.
//!
//! `Introspect` is implemented for every `Fn` of up to eight parameters. It
//! reports the function's symbol path and parameter types, and erases the
//! function into a handle the registry can later hand back through
//! [`Handler`].

use std::any::{type_name, Any, TypeId};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::{strip_generics, variadic_path, ArgKind, Dynamic, Variadic};

/// Stable, comparable identity of a function item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity(TypeId);

impl Identity {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self(TypeId::of::<T>())
    }
}

/// Reflected type of one parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamType {
    /// Fully qualified type text.
    pub declared: &'static str,
    pub kind: ArgKind,
}

impl ParamType {
    pub fn of<T: ?Sized>() -> Self {
        let declared = type_name::<T>();
        Self {
            declared,
            kind: ArgKind::classify(declared),
        }
    }

    /// Whether this is a `Variadic<T>` parameter.
    pub fn is_variadic(&self) -> bool {
        self.declared
            .strip_prefix(variadic_path())
            .is_some_and(|rest| rest.starts_with('<'))
    }
}

/// Everything reflection can tell about a function, minus parameter names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub identity: Identity,
    /// Fully qualified symbol path.
    pub symbol: &'static str,
    pub parameters: Vec<ParamType>,
    /// True when the last parameter is a `Variadic<T>`.
    pub is_variadic: bool,
}

impl Signature {
    pub fn from_parts(identity: Identity, symbol: &'static str, parameters: Vec<ParamType>) -> Self {
        let is_variadic = parameters.last().is_some_and(ParamType::is_variadic);
        Self {
            identity,
            symbol,
            parameters,
            is_variadic,
        }
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Unqualified function name, without generic arguments.
    pub fn function_name(&self) -> String {
        let path = strip_generics(self.symbol);
        path.rsplit("::").next().unwrap_or(&path).to_string()
    }
}

/// Uniform calling convention for commands taking only `Variadic<Dynamic>`.
pub type Handler = Arc<dyn Fn(Variadic<Dynamic>) + Send + Sync>;

/// A function erased to `Arc<dyn Fn(..) + Send + Sync>` behind `Any`.
pub(crate) type ErasedHandler = Arc<dyn Any + Send + Sync>;

/// Functions whose call signature can be reflected.
///
/// `Args` is the parameter tuple; it is inferred at the call site and never
/// needs to be written out.
pub trait Introspect<Args>: Send + Sync + 'static {
    /// Reflect the symbol path and parameter types.
    ///
    /// Fails with `IntrospectionUnavailable` for closures and function
    /// pointers, which carry no symbol path.
    fn signature(&self) -> Result<Signature>;

    fn into_handler(self) -> ErasedHandler;
}

fn reflect<F: 'static>(parameters: Vec<ParamType>) -> Result<Signature> {
    let symbol = type_name::<F>();
    if symbol.contains("{{closure}}") || symbol.starts_with("fn(") || !symbol.contains("::") {
        return Err(Error::IntrospectionUnavailable {
            symbol: symbol.to_string(),
            reason: "no symbol path is attached to this value".to_string(),
        });
    }
    Ok(Signature::from_parts(Identity::of::<F>(), symbol, parameters))
}

macro_rules! impl_introspect {
    ($($ty:ident $arg:ident),*) => {
        impl<F, R, $($ty,)*> Introspect<($($ty,)*)> for F
        where
            F: Fn($($ty),*) -> R + Send + Sync + 'static,
            $($ty: 'static,)*
        {
            fn signature(&self) -> Result<Signature> {
                reflect::<F>(vec![$(ParamType::of::<$ty>()),*])
            }

            fn into_handler(self) -> ErasedHandler {
                let f = self;
                let handler: Arc<dyn Fn($($ty),*) + Send + Sync> =
                    Arc::new(move |$($arg),*| {
                        f($($arg),*);
                    });
                Arc::new(handler)
            }
        }
    };
}

impl_introspect!();
impl_introspect!(A a);
impl_introspect!(A a, B b);
impl_introspect!(A a, B b, C c);
impl_introspect!(A a, B b, C c, D d);
impl_introspect!(A a, B b, C c, D d, E e);
impl_introspect!(A a, B b, C c, D d, E e, G g);
impl_introspect!(A a, B b, C c, D d, E e, G g, H h);
impl_introspect!(A a, B b, C c, D d, E e, G g, H h, I i);
