//! License plate normalization

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::CheckInError;

/// Maximum plate length accepted by the plate input (Mercosul and legacy formats)
pub const PLATE_MAX_LENGTH: usize = 7;

/// Trim surrounding whitespace and upper-case the plate.
///
/// Idempotent: normalizing an already normalized plate returns it unchanged.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// A non-empty, normalized license plate
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Plate(String);

impl Plate {
    /// Normalize free text into a plate, rejecting empty input
    pub fn parse(raw: &str) -> Result<Self, CheckInError> {
        let normalized = normalize(raw);
        if normalized.is_empty() {
            return Err(CheckInError::EmptyPlate);
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Plate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Plate {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
