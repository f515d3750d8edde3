//! Type-keyed store for per-session test state.
//!
//! `TestContext` stores one value per concrete type, keyed by `TypeId`, so a
//! component can keep its own state for the running session without knowing
//! about any other component's state. Values are owned by the context and
//! dropped with it when the session ends.

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
};

/// Stores session-scoped state values keyed by concrete type.
///
/// # Examples
///
/// ```rust
/// use vividus_status::test_context::TestContext;
///
/// let mut context = TestContext::default();
/// context.update_or_insert_with(|| 0u32, |count| *count += 1);
/// assert_eq!(context.get::<u32>(), Some(&1));
/// ```
#[derive(Default)]
pub struct TestContext {
    values: HashMap<TypeId, Box<dyn Any + Send>>,
}

impl TestContext {
    /// Insert a value of type `T`, returning the value it replaced.
    pub fn put<T>(&mut self, value: T) -> Option<T>
    where
        T: Send + 'static,
    {
        self.values
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    /// Retrieve the value of type `T`, if present.
    #[must_use]
    pub fn get<T>(&self) -> Option<&T>
    where
        T: Send + 'static,
    {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Retrieve the value of type `T` mutably, if present.
    pub fn get_mut<T>(&mut self) -> Option<&mut T>
    where
        T: Send + 'static,
    {
        self.values
            .get_mut(&TypeId::of::<T>())
            .and_then(|value| value.downcast_mut::<T>())
    }

    /// Apply `f` to the value of type `T`, creating it with `factory` first
    /// if it is absent, and return what `f` returns.
    pub fn update_or_insert_with<T, F, R>(&mut self, factory: F, f: impl FnOnce(&mut T) -> R) -> R
    where
        T: Send + 'static,
        F: FnOnce() -> T,
    {
        let mut value = self.remove::<T>().unwrap_or_else(factory);
        let result = f(&mut value);
        self.put(value);
        result
    }

    /// Remove and return the value of type `T`.
    pub fn remove<T>(&mut self) -> Option<T>
    where
        T: Send + 'static,
    {
        self.values
            .remove(&TypeId::of::<T>())
            .and_then(|value| value.downcast::<T>().ok())
            .map(|value| *value)
    }

    /// Drop every stored value.
    pub fn clear(&mut self) { self.values.clear(); }

    #[must_use]
    pub fn len(&self) -> usize { self.values.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.values.is_empty() }
}

impl fmt::Debug for TestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestContext")
            .field("values", &self.values.len())
            .finish()
    }
}
