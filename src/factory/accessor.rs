use crate::container::{Container, StateContainer};
use crate::error::Error;
use crate::factory::Resolver;
use crate::mode::Mode;
use std::rc::Rc;

/// The consumer-facing half of a mockable pair.
///
/// Call [`get`](Accessor::get) wherever the data is needed. In live mode every
/// call resolves directly through the producer and never touches the container.
/// In test mode the accessor reads whatever value the container currently holds,
/// so the seed must have been handed to the container by the owning scope
/// beforehand; seeds passed to the accessor itself are ignored.
///
/// Both modes return `Rc<R>`, so consuming code never branches on the mode.
pub struct Accessor<T: 'static, R: 'static, C = Container<T, R>> {
    resolver: Rc<Resolver<T, R>>,
    container: C,
}

impl<T: 'static, R: 'static, C: Clone> Clone for Accessor<T, R, C> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            container: self.container.clone(),
        }
    }
}

impl<T: 'static, R: 'static, C: StateContainer<T, R>> Accessor<T, R, C> {
    pub(crate) fn new(resolver: Rc<Resolver<T, R>>, container: C) -> Self {
        Self {
            resolver,
            container,
        }
    }

    pub fn get(&self) -> Result<Rc<R>, Error> {
        self.get_with(None)
    }

    /// Like [`get`](Accessor::get), passing a seed along.
    ///
    /// Neither mode consumes the seed here: live mode ignores it and test mode
    /// reads the container instead.
    pub fn get_with(&self, seed: Option<T>) -> Result<Rc<R>, Error> {
        match self.resolver.mode() {
            Mode::Test => self.container.read(),
            Mode::Live => self.resolver.resolve_in(Mode::Live, seed).map(Rc::new),
        }
    }

    pub fn mode(&self) -> Mode {
        self.resolver.mode()
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    pub fn resolver(&self) -> &Resolver<T, R> {
        &self.resolver
    }
}
