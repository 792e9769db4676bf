//! Global system phase.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The plenary's global mode.
///
/// During [`Phase::Axes`] voting is restricted to voters whose thematic axis
/// matches the active proposal's axis; during [`Phase::Plenary`] (the final
/// round) every authenticated voter is eligible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Axes,
    Plenary,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Axes => "axes",
            Self::Plenary => "plenary",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
