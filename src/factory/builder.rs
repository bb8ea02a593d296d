use crate::container::{Container, Initializer, StateContainer};
use crate::factory::{Accessor, Resolver};
use crate::mode::ModeSource;
use std::borrow::Cow;
use std::rc::Rc;

/// Configures a mockable accessor/container pair.
///
/// Starts with identity middleware, so `R` is `T` until
/// [`with_middleware`](MockableBuilder::with_middleware) is called. The mode
/// defaults to [`ModeSource::default`], which reads `MOCKABLE_ENV` on every
/// resolution; pin it with [`with_mode`](MockableBuilder::with_mode) to avoid
/// depending on the environment.
///
/// # Example
/// ```rust
/// use mockable::prelude::*;
///
/// let (get_total, totals) = MockableBuilder::new(|| vec![1, 2, 3])
///     .with_middleware(|items: Vec<i32>| items.iter().sum::<i32>())
///     .with_mode(Mode::Test)
///     .with_name("totals")
///     .build();
///
/// let _scope = totals.provide(Some(vec![10, 20])).unwrap();
/// assert_eq!(*get_total.get().unwrap(), 30);
/// ```
pub struct MockableBuilder<T: 'static, R: 'static> {
    producer: Box<dyn Fn() -> T>,
    middleware: Box<dyn Fn(T) -> R>,
    mode: ModeSource,
    name: Option<Cow<'static, str>>,
}

impl<T: 'static> MockableBuilder<T, T> {
    pub fn new(producer: impl Fn() -> T + 'static) -> Self {
        Self {
            producer: Box::new(producer),
            middleware: Box::new(|value: T| value),
            mode: ModeSource::default(),
            name: None,
        }
    }
}

impl<T: 'static, R: 'static> MockableBuilder<T, R> {
    /// Attaches a transform applied to every resolved value.
    ///
    /// Runs after any middleware already attached.
    pub fn with_middleware<U: 'static>(
        self,
        middleware: impl Fn(R) -> U + 'static,
    ) -> MockableBuilder<T, U> {
        let previous = self.middleware;
        MockableBuilder {
            producer: self.producer,
            middleware: Box::new(move |value: T| middleware(previous(value))),
            mode: self.mode,
            name: self.name,
        }
    }

    pub fn with_mode(mut self, mode: impl Into<ModeSource>) -> Self {
        self.mode = mode.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builds the pair backed by the default [`Container`].
    pub fn build(self) -> (Accessor<T, R>, Container<T, R>) {
        let name = self.name.clone();
        let resolver = Rc::new(self.into_resolver());
        let container = Container::from_initializer(name, bind(&resolver));
        (Accessor::new(resolver, container.clone()), container)
    }

    /// Builds the pair backed by any [`StateContainer`] implementation.
    pub fn build_in<C: StateContainer<T, R>>(self) -> (Accessor<T, R, C>, C) {
        let resolver = Rc::new(self.into_resolver());
        let container = C::create(bind(&resolver));
        (Accessor::new(resolver, container.clone()), container)
    }

    fn into_resolver(self) -> Resolver<T, R> {
        Resolver::new(self.producer, self.middleware, self.mode, self.name)
    }
}

/// Installs the resolver verbatim as the container's initializer.
fn bind<T: 'static, R: 'static>(resolver: &Rc<Resolver<T, R>>) -> Initializer<T, R> {
    let resolver = resolver.clone();
    Box::new(move |seed: Option<T>| resolver.resolve(seed))
}
