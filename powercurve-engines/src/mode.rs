use std::fmt;

use serde::{Deserialize, Serialize};

/// Throttle setting a curve or matrix belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ThrottleMode {
    /// Rated power without boost.
    #[serde(rename = "military")]
    Military,
    /// War emergency power.
    #[serde(rename = "WEP")]
    Wep,
}

impl ThrottleMode {
    pub const ALL: [ThrottleMode; 2] = [ThrottleMode::Military, ThrottleMode::Wep];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ThrottleMode::Military => "military",
            ThrottleMode::Wep => "WEP",
        }
    }
}

impl fmt::Display for ThrottleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
