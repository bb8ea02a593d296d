/// Errors raised by accessors and containers.
///
/// Failures inside the producer or middleware are not represented here; those
/// closures are infallible and any fallibility lives in the value type itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A resolution ran in test mode without a seed.
    ///
    /// This is a setup defect: the container was never provided with the
    /// initial state the test needs.
    #[error("Context must have an initialState")]
    InvariantViolation,
}
