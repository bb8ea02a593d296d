use enum_as_inner::EnumAsInner;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Environment variable consulted by [`ModeSource::default`].
///
/// This replaces a `NODE_ENV === "test"` check. Unlike that exact comparison,
/// the value is trimmed and compared case-insensitively, so ` TEST ` also
/// selects [`Mode::Test`]. Pass `ModeSource::env("NODE_ENV")` to keep reading
/// the old variable.
pub const DEFAULT_MODE_VAR: &str = "MOCKABLE_ENV";

/// Selects where resolved data comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumAsInner)]
pub enum Mode {
    /// Call the production function on every resolution.
    #[default]
    Live,

    /// Substitute the seed supplied to the container.
    Test,
}

impl Mode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Mode::Live => "live",
            Mode::Test => "test",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode {0:?}, expected \"live\" or \"test\"")]
pub struct ParseModeError(String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(Mode::Live),
            "test" => Ok(Mode::Test),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

/// Decides the [`Mode`] of each resolution.
///
/// `Fixed` pins the mode when the factory is built, which keeps call sites free
/// of hidden global state. `Env` keeps the process-wide switch available for
/// harnesses that flip an environment variable: the variable is read on every
/// resolution and never cached. A value of `test` selects [`Mode::Test`];
/// anything else, including an unset variable, selects [`Mode::Live`].
#[derive(Debug, Clone, PartialEq, Eq, EnumAsInner)]
pub enum ModeSource {
    Fixed(Mode),
    Env(Cow<'static, str>),
}

impl ModeSource {
    pub fn env(var: impl Into<Cow<'static, str>>) -> Self {
        ModeSource::Env(var.into())
    }

    /// Reads the mode for the resolution about to happen.
    pub fn current(&self) -> Mode {
        match self {
            ModeSource::Fixed(mode) => *mode,
            ModeSource::Env(var) => match std::env::var(&**var) {
                Ok(value) if value.trim().eq_ignore_ascii_case("test") => Mode::Test,
                _ => Mode::Live,
            },
        }
    }
}

impl Default for ModeSource {
    fn default() -> Self {
        ModeSource::Env(Cow::Borrowed(DEFAULT_MODE_VAR))
    }
}

impl From<Mode> for ModeSource {
    fn from(mode: Mode) -> Self {
        ModeSource::Fixed(mode)
    }
}
