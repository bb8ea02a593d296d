//! Accessor/container pairs that serve live data in production and seeded data
//! under test, through one interface.
//!
//! A data source is declared once with [`mockable`](factory::mockable) or
//! [`mockable_with`](factory::mockable_with). The returned
//! [`Accessor`](factory::Accessor) is what consumers call; the returned
//! [`Container`](container::Container) is what a test scope seeds. Which of the
//! two supplies the value is decided per resolution by a
//! [`ModeSource`](mode::ModeSource), so consuming code never branches on it.
//!
//! ```rust
//! use mockable::prelude::*;
//!
//! let (answer, answers) = mockable_with(|| 42, |x: i32| x * 2, Mode::Test);
//!
//! let _scope = answers.provide(Some(5)).unwrap();
//! assert_eq!(*answer.get().unwrap(), 10);
//! ```

pub mod container;
pub mod error;
pub mod factory;
pub mod mode;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::Error;

pub mod prelude {
    pub use crate::Error;
    pub use crate::container::{Container, Initializer, Scope, StateContainer, SubscriptionId};
    pub use crate::factory::*;
    pub use crate::mode::{Mode, ModeSource};
}
