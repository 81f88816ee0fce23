//! Unit cost value object.
//!
//! Compared by value, immutable once created. Stored in minor units (e.g.
//! centavos) to keep arithmetic exact; display formatting belongs to the
//! presentation layer, not here.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Non-negative currency amount in minor units.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitCost(i64);

impl UnitCost {
    pub const ZERO: UnitCost = UnitCost(0);

    pub fn from_minor_units(minor_units: i64) -> Result<Self, DomainError> {
        if minor_units < 0 {
            return Err(DomainError::validation(format!(
                "unit cost cannot be negative ({minor_units})"
            )));
        }
        Ok(Self(minor_units))
    }

    pub fn minor_units(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_amounts() {
        assert!(UnitCost::from_minor_units(-1).is_err());
        assert_eq!(
            UnitCost::from_minor_units(0).unwrap(),
            UnitCost::ZERO
        );
    }

    #[test]
    fn compares_by_value() {
        let a = UnitCost::from_minor_units(2500).unwrap();
        let b = UnitCost::from_minor_units(2500).unwrap();
        assert_eq!(a, b);
        assert!(UnitCost::ZERO < a);
    }
}
