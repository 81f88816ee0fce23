use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of an authenticated principal (clinic staff member, service
/// account, etc).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(Uuid);

impl PrincipalId {
    /// Mint a fresh principal identity (UUIDv7, time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for PrincipalId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for PrincipalId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// The acting principal, as supplied by the session layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub display_name: String,
}

/// Boundary trait: who is performing the current operation.
///
/// Used only for attribution (`created_by` on stock-log entries and orders),
/// never for authorization decisions inside the engine.
pub trait IdentityProvider: Send + Sync {
    fn current(&self) -> Principal;
}

/// Fixed identity, for tests and single-operator deployments.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    principal: Principal,
}

impl StaticIdentity {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            principal: Principal {
                id: PrincipalId::new(),
                display_name: display_name.into(),
            },
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current(&self) -> Principal {
        self.principal.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_identity_is_stable_across_calls() {
        let identity = StaticIdentity::new("front desk");
        assert_eq!(identity.current().id, identity.current().id);
        assert_eq!(identity.current().display_name, "front desk");
    }
}
