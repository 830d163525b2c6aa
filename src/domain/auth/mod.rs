//! Authentication domain
//!
//! Claim sets carried by tokens, the failure taxonomy shared by issuance and
//! verification, and the clock both are measured against.

mod claims;
mod clock;
mod error;

pub use claims::{TokenClaims, UncheckedClaims};
pub use clock::{Clock, SystemClock};
pub use error::{AuthError, AuthErrorKind};

#[cfg(test)]
pub use clock::ManualClock;
