//! Resource availability flag shared by the locator and the record loaders.

use std::str::FromStr;

use crate::CoreError;

/// Whether a resource can currently be dispatched.
///
/// Only [`Availability::Available`] resources are ever selected by the
/// locator; `Unknown` is treated like `Unavailable`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Availability {
    Available,
    Unavailable,
    #[default]
    Unknown,
}

impl Availability {
    #[inline]
    pub fn is_available(self) -> bool {
        matches!(self, Availability::Available)
    }

    /// Human-readable label, useful for CSV column values.
    pub fn as_str(self) -> &'static str {
        match self {
            Availability::Available   => "available",
            Availability::Unavailable => "unavailable",
            Availability::Unknown     => "unknown",
        }
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Availability {
    type Err = CoreError;

    /// Accepts the canonical labels plus the boolean spellings record stores
    /// tend to emit (`true`/`false`, `yes`/`no`, `1`/`0`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" | "true" | "yes" | "1"    => Ok(Availability::Available),
            "unavailable" | "false" | "no" | "0"  => Ok(Availability::Unavailable),
            "unknown" | ""                        => Ok(Availability::Unknown),
            other => Err(CoreError::Parse(format!(
                "invalid availability {other:?}: expected \"available\", \"unavailable\" or \"unknown\""
            ))),
        }
    }
}
