//! Inventory categories.
//!
//! Records arriving from forms or legacy data carry free-form category text
//! ("medicine", "Consumable", "equipments"). Canonicalization happens once,
//! at the parse boundary; everything past that point works with the enum.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Canonical inventory category.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Consumables,
    Medicines,
    Equipment,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Consumables => "consumables",
            Category::Medicines => "medicines",
            Category::Equipment => "equipment",
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    /// Canonicalize a free-form category label.
    ///
    /// Accepts singular/plural aliases, case- and whitespace-insensitive.
    /// Unknown labels are a validation error, never a silent default.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "consumable" | "consumables" => Ok(Category::Consumables),
            "medicine" | "medicines" => Ok(Category::Medicines),
            "equipment" | "equipments" => Ok(Category::Equipment),
            other => Err(DomainError::validation(format!(
                "unknown category: '{other}'"
            ))),
        }
    }
}
