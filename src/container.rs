use crate::error::Error;
use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Initialization function bound into a container.
///
/// Receives the seed handed to the scope (if any) and produces the value every
/// consumer of that scope will observe.
pub type Initializer<S, V> = Box<dyn Fn(Option<S>) -> Result<V, Error>>;

/// Callback invoked whenever a container scope is provided.
pub type ScopeHandler<V> = Rc<dyn Fn(&V)>;

/// The capability a shared state container must offer to back an accessor.
///
/// Implementations bind an [`Initializer`] once and hand out the value of the
/// current scope to any consumer that holds a clone of the handle.
pub trait StateContainer<S, V>: Clone {
    fn create(initializer: Initializer<S, V>) -> Self;

    /// Reads the value held for the current consumer.
    fn read(&self) -> Result<Rc<V>, Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScopeId(u64);

/// A shareable, scoped holder for a lazily produced value.
///
/// The owning code calls [`provide`](Container::provide) once at the root of a
/// scope, which runs the bound initializer with the supplied seed and installs
/// the result. Every consumer holding a clone of the container then reads that
/// same value through [`read`](Container::read) without re-running the
/// initializer. Scopes nest and the innermost live scope wins, mirroring how a
/// nested provider shadows an outer one.
///
/// Uses `Rc` and interior mutability, so handles stay on the thread that
/// created them.
///
/// # Example
/// ```rust
/// use mockable::prelude::*;
///
/// let container = Container::new(|seed: Option<u32>| seed.ok_or(Error::InvariantViolation));
/// let scope = container.provide(Some(7)).unwrap();
///
/// let consumer = container.clone();
/// assert_eq!(*consumer.read().unwrap(), 7);
/// drop(scope);
/// assert!(!container.is_provided());
/// ```
pub struct Container<S: 'static, V: 'static>(Rc<ContainerInner<S, V>>);

impl<S: 'static, V: 'static> Clone for Container<S, V> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<S: 'static, V: 'static> Container<S, V> {
    pub fn new(initializer: impl Fn(Option<S>) -> Result<V, Error> + 'static) -> Self {
        Self::from_initializer(None, Box::new(initializer))
    }

    /// Creates a container whose name is attached to its log events.
    pub fn named(
        name: impl Into<Cow<'static, str>>,
        initializer: impl Fn(Option<S>) -> Result<V, Error> + 'static,
    ) -> Self {
        Self::from_initializer(Some(name.into()), Box::new(initializer))
    }

    pub(crate) fn from_initializer(
        name: Option<Cow<'static, str>>,
        initializer: Initializer<S, V>,
    ) -> Self {
        Self(Rc::new(ContainerInner {
            name,
            initializer,
            scopes: RefCell::new(Vec::new()),
            handlers: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }))
    }

    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    /// Initializes a new scope with `seed` and makes it the current one.
    ///
    /// The initializer runs exactly once here; its error is returned unchanged
    /// and no scope is installed. The scope stays current until the returned
    /// guard is dropped.
    pub fn provide(&self, seed: Option<S>) -> Result<Scope<S, V>, Error> {
        let value = Rc::new((self.0.initializer)(seed)?);
        let id = ScopeId(self.0.next_id());
        let depth = {
            let mut scopes = self.0.scopes.borrow_mut();
            scopes.push((id, value.clone()));
            scopes.len()
        };
        debug!(container = self.log_name(), depth, "scope provided");

        // owned before notifying so a panicking handler still uninstalls it
        let scope = Scope {
            container: self.clone(),
            id,
            value,
        };

        // handlers may read or subscribe, so release the borrow first
        let handlers: Vec<ScopeHandler<V>> = self
            .0
            .handlers
            .borrow()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();
        for handler in handlers {
            handler(&scope.value);
        }

        Ok(scope)
    }

    /// Runs `f` with a scope seeded by `seed`, tearing the scope down afterwards.
    pub fn scoped<O>(&self, seed: Option<S>, f: impl FnOnce() -> O) -> Result<O, Error> {
        let _scope = self.provide(seed)?;
        Ok(f())
    }

    /// Reads the value of the innermost scope.
    ///
    /// Without any scope the read behaves as if the container had been
    /// initialized with no seed: the initializer runs with `None` and its
    /// result is returned without being cached.
    pub fn read(&self) -> Result<Rc<V>, Error> {
        let current = self
            .0
            .scopes
            .borrow()
            .last()
            .map(|(_, value)| value.clone());
        match current {
            Some(value) => Ok(value),
            None => {
                debug!(container = self.log_name(), "read without a provided scope");
                (self.0.initializer)(None).map(Rc::new)
            }
        }
    }

    pub fn is_provided(&self) -> bool {
        !self.0.scopes.borrow().is_empty()
    }

    /// Number of scopes currently installed.
    pub fn depth(&self) -> usize {
        self.0.scopes.borrow().len()
    }

    /// Registers a handler called with the value of every scope provided from
    /// now on.
    pub fn subscribe(&self, handler: impl Fn(&V) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.0.next_id());
        self.0.handlers.borrow_mut().push((id, Rc::new(handler)));
        id
    }

    /// Removes a handler. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.0
            .handlers
            .borrow_mut()
            .retain(|(handler_id, _)| *handler_id != id);
    }

    fn remove_scope(&self, id: ScopeId) {
        let depth = {
            let mut scopes = self.0.scopes.borrow_mut();
            scopes.retain(|(scope_id, _)| *scope_id != id);
            scopes.len()
        };
        debug!(container = self.log_name(), depth, "scope dropped");
    }

    fn log_name(&self) -> &str {
        self.name().unwrap_or("anonymous")
    }
}

impl<S: 'static, V: 'static> StateContainer<S, V> for Container<S, V> {
    fn create(initializer: Initializer<S, V>) -> Self {
        Self::from_initializer(None, initializer)
    }

    fn read(&self) -> Result<Rc<V>, Error> {
        Container::read(self)
    }
}

impl<S: 'static, V: 'static> fmt::Debug for Container<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("name", &self.0.name)
            .field("depth", &self.depth())
            .field("subscribers", &self.0.handlers.borrow().len())
            .finish()
    }
}

struct ContainerInner<S: 'static, V: 'static> {
    name: Option<Cow<'static, str>>,
    initializer: Initializer<S, V>,
    /// Installed scopes, innermost last.
    scopes: RefCell<Vec<(ScopeId, Rc<V>)>>,
    handlers: RefCell<Vec<(SubscriptionId, ScopeHandler<V>)>>,
    next_id: Cell<u64>,
}

impl<S: 'static, V: 'static> ContainerInner<S, V> {
    fn next_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

/// Guard for a provided container scope. Dropping it uninstalls the scope.
#[must_use = "dropping a scope immediately uninstalls it"]
pub struct Scope<S: 'static, V: 'static> {
    container: Container<S, V>,
    id: ScopeId,
    value: Rc<V>,
}

impl<S: 'static, V: 'static> Scope<S, V> {
    /// The value this scope was initialized with.
    pub fn value(&self) -> Rc<V> {
        self.value.clone()
    }

    pub fn container(&self) -> &Container<S, V> {
        &self.container
    }
}

impl<S: 'static, V: 'static> Drop for Scope<S, V> {
    fn drop(&mut self) {
        self.container.remove_scope(self.id);
    }
}

impl<S: 'static, V: fmt::Debug + 'static> fmt::Debug for Scope<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.id.0)
            .field("value", &self.value)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Container<u32, u32> {
        Container::new(|seed: Option<u32>| seed.ok_or(Error::InvariantViolation))
    }

    #[test]
    fn provide_then_read() {
        let container = seeded();
        let _scope = container.provide(Some(3)).unwrap();
        assert!(container.is_provided());
        assert_eq!(*container.read().unwrap(), 3);
    }

    #[test]
    fn consumers_share_one_value() {
        let calls = Rc::new(Cell::new(0));
        let calls_c = calls.clone();
        let container = Container::new(move |seed: Option<u32>| {
            calls_c.set(calls_c.get() + 1);
            seed.ok_or(Error::InvariantViolation)
        });

        let _scope = container.provide(Some(5)).unwrap();
        let a = container.clone().read().unwrap();
        let b = container.clone().read().unwrap();

        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn provide_propagates_initializer_error() {
        let container = seeded();
        assert_eq!(
            container.provide(None).unwrap_err(),
            Error::InvariantViolation
        );
        assert!(!container.is_provided());
    }

    #[test]
    fn read_without_scope_runs_initializer_unseeded() {
        let container = seeded();
        assert_eq!(container.read().unwrap_err(), Error::InvariantViolation);

        let fallback = Container::new(|seed: Option<u32>| Ok(seed.unwrap_or(11)));
        assert_eq!(*fallback.read().unwrap(), 11);
    }

    #[test]
    fn inner_scope_shadows_outer() {
        let container = seeded();
        let outer = container.provide(Some(1)).unwrap();
        {
            let _inner = container.provide(Some(2)).unwrap();
            assert_eq!(container.depth(), 2);
            assert_eq!(*container.read().unwrap(), 2);
        }
        assert_eq!(*container.read().unwrap(), 1);
        drop(outer);
        assert_eq!(container.depth(), 0);
    }

    #[test]
    fn scopes_can_drop_out_of_order() {
        let container = seeded();
        let outer = container.provide(Some(1)).unwrap();
        let inner = container.provide(Some(2)).unwrap();

        drop(outer);
        assert_eq!(*container.read().unwrap(), 2);
        assert_eq!(*inner.value(), 2);
        drop(inner);
        assert!(!container.is_provided());
    }

    #[test]
    fn scoped_tears_down() {
        let container = seeded();
        let seen = container
            .scoped(Some(9), || *container.read().unwrap())
            .unwrap();
        assert_eq!(seen, 9);
        assert!(!container.is_provided());
    }

    #[test]
    fn subscribers_see_provided_values() {
        let container = seeded();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_c = seen.clone();
        let id = container.subscribe(move |value| seen_c.borrow_mut().push(*value));

        drop(container.provide(Some(1)).unwrap());
        drop(container.provide(Some(2)).unwrap());
        container.unsubscribe(id);
        drop(container.provide(Some(3)).unwrap());

        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn subscriber_can_read_inside_notification() {
        let container = seeded();
        let reader = container.clone();
        let seen = Rc::new(Cell::new(0));
        let seen_c = seen.clone();
        container.subscribe(move |_| seen_c.set(*reader.read().unwrap()));

        let _scope = container.provide(Some(4)).unwrap();
        assert_eq!(seen.get(), 4);
    }

    #[test]
    fn panicking_subscriber_leaves_no_scope() {
        let container = seeded();
        let id = container.subscribe(|_| panic!("handler failed"));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            container.provide(Some(1)).map(drop)
        }));
        assert!(result.is_err());
        container.unsubscribe(id);

        assert!(!container.is_provided());
        assert_eq!(container.depth(), 0);
        assert_eq!(container.read().unwrap_err(), Error::InvariantViolation);
    }

    #[test]
    fn unsubscribe_unknown_is_noop() {
        let container = seeded();
        container.unsubscribe(SubscriptionId(999));
    }

    #[test]
    fn named_container() {
        let container = Container::named("profile", |seed: Option<u32>| {
            seed.ok_or(Error::InvariantViolation)
        });
        assert_eq!(container.name(), Some("profile"));
        assert_eq!(seeded().name(), None);
    }
}
