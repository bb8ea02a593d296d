//! Helpers for asserting how often producers run.

use std::cell::Cell;
use std::rc::Rc;

/// Counts calls made through the producers it wraps.
///
/// Clones share the same count.
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Rc<Cell<usize>>);

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.0.get()
    }

    pub fn reset(&self) {
        self.0.set(0);
    }

    /// Wraps `producer` so every call bumps this counter.
    pub fn wrap<T: 'static>(
        &self,
        producer: impl Fn() -> T + 'static,
    ) -> impl Fn() -> T + 'static {
        let counter = self.0.clone();
        move || {
            counter.set(counter.get() + 1);
            producer()
        }
    }
}

/// Producer yielding `values` in order, wrapping around at the end.
///
/// Useful for telling one live resolution apart from the next.
///
/// # Panics
/// Panics if `values` is empty.
pub fn sequence<T: Clone + 'static>(
    values: impl IntoIterator<Item = T>,
) -> impl Fn() -> T + 'static {
    let values: Vec<T> = values.into_iter().collect();
    assert!(!values.is_empty(), "sequence needs at least one value");
    let next = Cell::new(0usize);
    move || {
        let idx = next.get();
        next.set((idx + 1) % values.len());
        values[idx].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    #[test]
    fn counter_counts_live_resolutions() {
        let counter = CallCounter::new();
        let (get, _) = mockable(counter.wrap(|| 1), Mode::Live);

        get.get().unwrap();
        get.get().unwrap();
        assert_eq!(counter.count(), 2);

        counter.reset();
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn counter_untouched_in_test_mode() {
        let counter = CallCounter::new();
        let (get, container) = mockable(counter.wrap(|| 1), Mode::Test);

        let _scope = container.provide(Some(2)).unwrap();
        get.get().unwrap();
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn sequence_wraps_around() {
        let next = sequence(["a", "b"]);
        assert_eq!(next(), "a");
        assert_eq!(next(), "b");
        assert_eq!(next(), "a");
    }

    #[test]
    #[should_panic(expected = "sequence needs at least one value")]
    fn empty_sequence_panics() {
        let _ = sequence(Vec::<u8>::new());
    }
}
