//! Token issuance and verification backed by a user directory

use chrono::{DateTime, Duration, Utc};
use std::fmt::Debug;
use std::sync::Arc;

use super::jwt::{JwtCodec, JwtConfig, MAX_TOKEN_LIFETIME_HOURS, SigningAlgorithm};
use crate::domain::auth::{AuthError, Clock, SystemClock, TokenClaims};
use crate::domain::user::{User, UserDirectory, UserId};
use crate::domain::DomainError;

/// A freshly signed token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    /// The user the credentials resolved to
    pub user: User,
}

impl IssuedToken {
    pub fn as_str(&self) -> &str {
        &self.token
    }
}

/// Issues tokens for valid credentials and resolves presented tokens back
/// to users.
///
/// Holds only immutable configuration, so one instance can be shared behind
/// an `Arc` by any number of concurrent callers. It never logs; failures are
/// returned as [`AuthError`] for the caller to report.
pub struct Authenticator {
    codec: JwtCodec,
    token_lifetime: Duration,
    directory: Arc<dyn UserDirectory>,
    clock: Arc<dyn Clock>,
}

impl Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("codec", &self.codec)
            .field("token_lifetime", &self.token_lifetime)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    /// Create an authenticator from validated signing configuration
    pub fn new(config: &JwtConfig, directory: Arc<dyn UserDirectory>) -> Result<Self, DomainError> {
        if config.token_lifetime <= Duration::zero() {
            return Err(DomainError::configuration(
                "Token lifetime must be positive",
            ));
        }

        if config.token_lifetime > Duration::hours(MAX_TOKEN_LIFETIME_HOURS as i64) {
            return Err(DomainError::configuration(format!(
                "Token lifetime must not exceed {} hours",
                MAX_TOKEN_LIFETIME_HOURS
            )));
        }

        let codec = JwtCodec::new(config.secret.as_bytes(), config.algorithm)?;

        Ok(Self {
            codec,
            token_lifetime: config.token_lifetime,
            directory,
            clock: Arc::new(SystemClock),
        })
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn token_lifetime(&self) -> Duration {
        self.token_lifetime
    }

    pub fn algorithm(&self) -> SigningAlgorithm {
        self.codec.algorithm()
    }

    /// Issue a token for the user matching the credentials.
    ///
    /// An unknown email and a wrong password both yield
    /// [`AuthError::InvalidCredentials`].
    pub async fn issue_token(&self, email: &str, password: &str) -> Result<IssuedToken, AuthError> {
        let user = self
            .directory
            .find_by_credentials(email, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let claims = TokenClaims::new(user.id(), self.clock.now(), self.token_lifetime)
            .ok_or_else(|| AuthError::signing("expiry timestamp out of range"))?;
        let expires_at = claims
            .expires_at()
            .ok_or_else(|| AuthError::signing("expiry timestamp out of range"))?;
        let token = self.codec.encode(&claims)?;

        Ok(IssuedToken {
            token,
            expires_at,
            user,
        })
    }

    /// Check a token's structure, algorithm, signature, expiry and claims,
    /// in that order, without consulting the directory
    pub fn validate(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let unchecked = self.codec.decode(token)?;

        if unchecked.is_expired_at(self.clock.now())? {
            return Err(AuthError::TokenExpired);
        }

        unchecked.into_claims()
    }

    /// Verify a token and resolve its subject to a current user
    pub async fn verify(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.validate(token)?;
        let subject = claims.subject();

        self.directory
            .find_by_id(subject)
            .await?
            .ok_or(AuthError::UnknownSubject { subject })
    }
}
