//! Factories that pair a data accessor with a shared, seedable container.
//!
//! # The Problem
//!
//! Code that reads live data (a query, a service call, a sensor) is awkward to
//! exercise deterministically. Threading a "use fake data" switch through every
//! call site couples consumers to the test setup, and a second code path for
//! fake data tends to drift from the real one.
//!
//! # The Solution
//!
//! A factory is invoked once per logical data source and returns two handles:
//!
//! - an [`Accessor`], which consumers call to obtain the value
//! - a [`Container`], which the owner of a scope seeds once and every consumer
//!   in that scope reads from
//!
//! Both handles resolve through the same [`Resolver`]: in live mode the
//! producer is called and its result passed through the middleware, in test mode
//! the seed is passed through the same middleware. Consumers call
//! `accessor.get()` either way and never branch on the mode.
//!
//! ```rust
//! use mockable::prelude::*;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Profile {
//!     id: String,
//! }
//!
//! fn fetch_profile() -> Profile {
//!     Profile { id: "live".to_string() }
//! }
//!
//! // Live: the producer runs on every call.
//! let (profile, _) = mockable(fetch_profile, Mode::Live);
//! assert_eq!(profile.get().unwrap().id, "live");
//!
//! // Test: seed the container at the root of the scope, read it anywhere.
//! let (profile, profiles) = mockable(fetch_profile, Mode::Test);
//! let _scope = profiles.provide(Some(Profile { id: "abc".to_string() })).unwrap();
//! assert_eq!(profile.get().unwrap().id, "abc");
//! ```
//!
//! # Lifecycle
//!
//! 1. **Define**: call [`mockable`] or [`mockable_with`] once, at definition time
//! 2. **Provide** (test mode): [`Container::provide`] runs the resolver with the
//!    seed and installs the result for the life of the returned guard
//! 3. **Read**: every [`Accessor::get`] returns the provided value in test mode,
//!    or a freshly produced value in live mode
//!
//! Resolution is synchronous. If the producer returns a future or a `Result`,
//! that is simply the value type; nothing here awaits or unwraps it.

use crate::container::Container;
use crate::mode::ModeSource;

pub use accessor::*;
pub use builder::*;
pub use resolver::*;
mod accessor;
mod builder;
mod resolver;

/// Creates a pair whose exposed value is the produced value itself.
///
/// `mode` is the explicit configuration value deciding each resolution; pass a
/// [`Mode`](crate::mode::Mode) to pin it or [`ModeSource::default`] to follow
/// the environment. Use [`MockableBuilder`] for names or a custom container.
pub fn mockable<T: 'static>(
    producer: impl Fn() -> T + 'static,
    mode: impl Into<ModeSource>,
) -> (Accessor<T, T>, Container<T, T>) {
    MockableBuilder::new(producer).with_mode(mode).build()
}

/// Creates a pair that transforms every resolved value with `middleware`.
///
/// The middleware runs exactly once per resolution in both modes and must
/// accept any value the producer or a seed can supply.
pub fn mockable_with<T: 'static, R: 'static>(
    producer: impl Fn() -> T + 'static,
    middleware: impl Fn(T) -> R + 'static,
    mode: impl Into<ModeSource>,
) -> (Accessor<T, R>, Container<T, R>) {
    MockableBuilder::new(producer)
        .with_middleware(middleware)
        .with_mode(mode)
        .build()
}
