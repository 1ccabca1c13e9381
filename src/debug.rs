//! Category based debug output. With the `debug` feature disabled [`DebugLogger`] compiles down
//! to a no-op with the same interface, so call sites don't need any `#[cfg]` attributes.

use std::fmt::Display;
use std::str::FromStr;

#[cfg(feature = "debug")]
mod enabled;
#[cfg(not(feature = "debug"))]
mod disabled;

#[cfg(feature = "debug")]
pub use enabled::DebugLogger;
#[cfg(not(feature = "debug"))]
pub use disabled::DebugLogger;

/// The keyword that activates every registered debug id.
pub const ALL_IDS: &str = "ALL";

/// Identifies a category of debug messages.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DebugId {
    Num(u32),
    Name(String),
}

impl Display for DebugId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DebugId::Num(id) => write!(f, "{id}"),
            DebugId::Name(id) => write!(f, "{id}"),
        }
    }
}

impl From<u32> for DebugId {
    fn from(value: u32) -> Self {
        DebugId::Num(value)
    }
}

impl From<&str> for DebugId {
    fn from(value: &str) -> Self {
        DebugId::Name(value.to_owned())
    }
}

impl From<String> for DebugId {
    fn from(value: String) -> Self {
        DebugId::Name(value)
    }
}

impl FromStr for DebugId {
    type Err = std::convert::Infallible;

    /// Numeric strings become [`DebugId::Num`], everything else a [`DebugId::Name`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<u32>() {
            Ok(id) => DebugId::Num(id),
            Err(_) => DebugId::Name(s.to_owned()),
        })
    }
}

/// Additional information prepended to every debug message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugMetric {
    /// The local wall clock time.
    AscTime,
    /// Seconds elapsed since the previous debug message and since the logger was created.
    RelTime,
    /// The process id.
    Pid,
}

impl FromStr for DebugMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("asctime") {
            Ok(DebugMetric::AscTime)
        } else if s.eq_ignore_ascii_case("reltime") {
            Ok(DebugMetric::RelTime)
        } else if s.eq_ignore_ascii_case("pid") {
            Ok(DebugMetric::Pid)
        } else {
            Err(s.to_owned())
        }
    }
}
