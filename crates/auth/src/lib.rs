//! `clinistock-auth` — actor identity for attribution.
//!
//! The authentication collaborator itself is out of scope; this crate only
//! defines who the current actor is so mutations (stock-log entries, order
//! creation) can be attributed. No authorization logic lives here.

pub mod principal;

pub use principal::{IdentityProvider, Principal, PrincipalId, StaticIdentity};
