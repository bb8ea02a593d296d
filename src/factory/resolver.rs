use crate::error::Error;
use crate::mode::{Mode, ModeSource};
use std::borrow::Cow;
use tracing::{trace, warn};

/// The single derivation path from a seed or a production call to the exposed
/// value.
///
/// Both the accessor (live mode) and the container initializer (test mode)
/// resolve through the same `Resolver`, so a given input always yields the same
/// shape regardless of which path asked for it.
pub struct Resolver<T: 'static, R: 'static> {
    producer: Box<dyn Fn() -> T>,
    middleware: Box<dyn Fn(T) -> R>,
    mode: ModeSource,
    name: Option<Cow<'static, str>>,
}

impl<T: 'static, R: 'static> Resolver<T, R> {
    pub(crate) fn new(
        producer: Box<dyn Fn() -> T>,
        middleware: Box<dyn Fn(T) -> R>,
        mode: ModeSource,
        name: Option<Cow<'static, str>>,
    ) -> Self {
        Self {
            producer,
            middleware,
            mode,
            name,
        }
    }

    /// The mode the next resolution will run in.
    pub fn mode(&self) -> Mode {
        self.mode.current()
    }

    pub fn mode_source(&self) -> &ModeSource {
        &self.mode
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Produces the exposed value.
    ///
    /// In test mode the seed is required and passed through the middleware;
    /// a missing seed is an [`Error::InvariantViolation`]. In live mode the seed
    /// is ignored and the producer is called exactly once.
    pub fn resolve(&self, seed: Option<T>) -> Result<R, Error> {
        self.resolve_in(self.mode(), seed)
    }

    pub(crate) fn resolve_in(&self, mode: Mode, seed: Option<T>) -> Result<R, Error> {
        let name = self.name().unwrap_or("anonymous");
        match mode {
            Mode::Test => {
                let Some(seed) = seed else {
                    warn!(accessor = name, "test resolution without a seed");
                    return Err(Error::InvariantViolation);
                };
                trace!(accessor = name, %mode, "resolving from seed");
                Ok((self.middleware)(seed))
            }
            Mode::Live => {
                trace!(accessor = name, %mode, "resolving from producer");
                let value = (self.producer)();
                Ok((self.middleware)(value))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn resolver(mode: Mode, calls: Rc<Cell<usize>>) -> Resolver<i32, i32> {
        Resolver::new(
            Box::new(move || {
                calls.set(calls.get() + 1);
                42
            }),
            Box::new(|x| x * 2),
            mode.into(),
            Some("answer".into()),
        )
    }

    #[test]
    fn live_ignores_seed() {
        let calls = Rc::new(Cell::new(0));
        let resolver = resolver(Mode::Live, calls.clone());

        assert_eq!(resolver.resolve(Some(1)).unwrap(), 84);
        assert_eq!(resolver.resolve(None).unwrap(), 84);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_mode_uses_seed_only() {
        let calls = Rc::new(Cell::new(0));
        let resolver = resolver(Mode::Test, calls.clone());

        assert_eq!(resolver.resolve(Some(5)).unwrap(), 10);
        assert_eq!(resolver.resolve(None).unwrap_err(), Error::InvariantViolation);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn reports_mode_and_name() {
        let resolver = resolver(Mode::Test, Rc::new(Cell::new(0)));
        assert_eq!(resolver.mode(), Mode::Test);
        assert!(resolver.mode_source().is_fixed());
        assert_eq!(resolver.name(), Some("answer"));
    }
}
