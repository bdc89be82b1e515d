//! Canonical vehicle identifiers used as merge keys between sources.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A normalized vehicle identification number.
///
/// Always trimmed, uppercase and non-empty. The only way to obtain one is
/// [`Vin::normalize`], so two `Vin`s compare equal exactly when their raw
/// spellings normalize to the same string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Vin(String);

impl Vin {
    /// Trims and uppercases `raw`. Returns `None` for absent or blank input.
    pub fn normalize(raw: Option<&str>) -> Option<Self> {
        let normalized = raw?.trim().to_uppercase();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Vin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Vin {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
