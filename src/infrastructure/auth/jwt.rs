//! JWT encoding and staged verification for HMAC-signed tokens

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Duration;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, encode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::str::FromStr;

use crate::domain::auth::{AuthError, TokenClaims, UncheckedClaims};
use crate::domain::DomainError;

/// Default token lifetime in hours
pub const DEFAULT_TOKEN_LIFETIME_HOURS: u64 = 48;

/// Upper bound on token lifetime (ten years)
pub const MAX_TOKEN_LIFETIME_HOURS: u64 = 24 * 365 * 10;

/// Symmetric signing algorithms the service can be configured with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SigningAlgorithm {
    #[default]
    HS256,
    HS384,
    HS512,
}

impl SigningAlgorithm {
    /// Name as it appears in the token header `alg` field
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HS256 => "HS256",
            Self::HS384 => "HS384",
            Self::HS512 => "HS512",
        }
    }
}

impl From<SigningAlgorithm> for Algorithm {
    fn from(alg: SigningAlgorithm) -> Self {
        match alg {
            SigningAlgorithm::HS256 => Algorithm::HS256,
            SigningAlgorithm::HS384 => Algorithm::HS384,
            SigningAlgorithm::HS512 => Algorithm::HS512,
        }
    }
}

impl FromStr for SigningAlgorithm {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HS256" => Ok(Self::HS256),
            "HS384" => Ok(Self::HS384),
            "HS512" => Ok(Self::HS512),
            other => Err(DomainError::configuration(format!(
                "Unsupported signing algorithm: {}. Use HS256, HS384 or HS512.",
                other
            ))),
        }
    }
}

impl std::fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for token signing
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// How long an issued token stays valid
    pub token_lifetime: Duration,
    pub algorithm: SigningAlgorithm,
}

impl JwtConfig {
    /// Create new JWT configuration using HS256
    pub fn new(secret: impl Into<String>, token_lifetime: Duration) -> Self {
        Self {
            secret: secret.into(),
            token_lifetime,
            algorithm: SigningAlgorithm::default(),
        }
    }

    pub fn with_algorithm(mut self, algorithm: SigningAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}

impl Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[hidden]")
            .field("token_lifetime", &self.token_lifetime)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

/// Protected header of a presented token. Only `alg` is consulted.
#[derive(Debug, Deserialize)]
struct JoseHeader {
    alg: String,
}

/// Signs claim sets and checks presented tokens against one secret and one
/// algorithm
#[derive(Clone)]
pub struct JwtCodec {
    algorithm: SigningAlgorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Debug for JwtCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtCodec")
            .field("algorithm", &self.algorithm)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtCodec {
    pub fn new(secret: &[u8], algorithm: SigningAlgorithm) -> Result<Self, DomainError> {
        if secret.is_empty() {
            return Err(DomainError::configuration("Signing secret must not be empty"));
        }

        Ok(Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        })
    }

    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    /// Sign a claim set into a compact token
    pub fn encode(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        encode(&Header::new(self.algorithm.into()), claims, &self.encoding_key)
            .map_err(|e| AuthError::signing(e.to_string()))
    }

    /// Parse a token, check its declared algorithm, then its signature.
    ///
    /// The header is never trusted to select the verification algorithm: a
    /// mismatch is rejected before any cryptographic work. Claims are
    /// returned unchecked; expiry and subject are validated by the caller.
    pub fn decode(&self, token: &str) -> Result<UncheckedClaims, AuthError> {
        let mut segments = token.split('.');
        let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(AuthError::malformed_token(
                "expected three dot-separated segments",
            ));
        };

        let header: JoseHeader = decode_segment(header_b64, "header")?;
        let claims: UncheckedClaims = decode_segment(payload_b64, "payload")?;

        if header.alg != self.algorithm.as_str() {
            return Err(AuthError::unexpected_algorithm(header.alg));
        }

        let signing_input = &token[..header_b64.len() + 1 + payload_b64.len()];
        let valid = jsonwebtoken::crypto::verify(
            signature_b64,
            signing_input.as_bytes(),
            &self.decoding_key,
            self.algorithm.into(),
        )
        .unwrap_or(false);

        if !valid {
            return Err(AuthError::InvalidSignature);
        }

        Ok(claims)
    }
}

/// Decode a base64url JSON segment
fn decode_segment<T: DeserializeOwned>(segment: &str, name: &str) -> Result<T, AuthError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| AuthError::malformed_token(format!("invalid base64url in {}: {}", name, e)))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::malformed_token(format!("invalid JSON in {}: {}", name, e)))
}
