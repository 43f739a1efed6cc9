//! Trailing variadic parameter support.
//!
//! Rust functions have no variadic parameters, so a command marks its final
//! parameter as a variadic slot by taking a `Variadic<T>`. A command whose only
//! parameter is `Variadic<Dynamic>` accepts any number of untyped values and can
//! be re-invoked through the registry's uniform [`Handler`](crate::Handler).

use std::any::Any;
use std::ops::Deref;

/// An untyped argument value.
pub type Dynamic = Box<dyn Any>;

/// The values bound to a trailing variadic parameter.
#[derive(Debug, Default)]
pub struct Variadic<T>(pub Vec<T>);

impl<T> Variadic<T> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

impl Variadic<Dynamic> {
    /// Append a value of any type.
    pub fn with<V: Any>(mut self, value: V) -> Self {
        self.0.push(Box::new(value));
        self
    }

    /// Borrow the value at `index` if it holds a `V`.
    pub fn get<V: Any>(&self, index: usize) -> Option<&V> {
        self.0.get(index)?.downcast_ref::<V>()
    }
}

impl<T> Deref for Variadic<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<T> From<Vec<T>> for Variadic<T> {
    fn from(values: Vec<T>) -> Self {
        Self(values)
    }
}

impl<T> FromIterator<T> for Variadic<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Fully-qualified path prefix of `Variadic<...>` as reported by `type_name`.
pub(crate) fn variadic_path() -> &'static str {
    let name = std::any::type_name::<Variadic<()>>();
    name.strip_suffix("<()>").unwrap_or(name)
}
