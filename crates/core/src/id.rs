//! Strongly-typed record identifiers used across the domain.
//!
//! Identifiers are opaque strings: they come from the ID allocator (sequential
//! or patterned, e.g. `"ORD-0007"` or `"22-2232"`) or from the backing store's
//! auto-id generator. The newtypes only reject empty values; format is the
//! allocator's concern.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of an inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

/// Identifier of an order record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

/// Identifier of a stock-log entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogEntryId(String);

macro_rules! impl_record_id {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Wrap an allocated identifier. Empty ids are rejected.
            pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(DomainError::invalid_id(concat!($name, ": empty")));
                }
                Ok(Self(id))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }
    };
}

impl_record_id!(ItemId, "ItemId");
impl_record_id!(OrderId, "OrderId");
impl_record_id!(LogEntryId, "LogEntryId");
