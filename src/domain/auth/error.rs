//! Authentication failure taxonomy

use thiserror::Error;

use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Errors returned by token issuance and verification.
///
/// Every variant is a permanent rejection of the request. Callers decide how
/// much of the detail reaches the client.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Malformed token: {reason}")]
    MalformedToken { reason: String },

    #[error("Unexpected signing algorithm: {found}")]
    UnexpectedAlgorithm { found: String },

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    TokenExpired,

    #[error("Malformed claims: {reason}")]
    MalformedClaims { reason: String },

    #[error("Unknown subject: {subject}")]
    UnknownSubject { subject: UserId },

    #[error("Failed to sign token: {message}")]
    Signing { message: String },

    #[error("User directory error: {0}")]
    Directory(#[from] DomainError),
}

impl AuthError {
    pub fn malformed_token(reason: impl Into<String>) -> Self {
        Self::MalformedToken {
            reason: reason.into(),
        }
    }

    pub fn unexpected_algorithm(found: impl Into<String>) -> Self {
        Self::UnexpectedAlgorithm {
            found: found.into(),
        }
    }

    pub fn malformed_claims(reason: impl Into<String>) -> Self {
        Self::MalformedClaims {
            reason: reason.into(),
        }
    }

    pub fn signing(message: impl Into<String>) -> Self {
        Self::Signing {
            message: message.into(),
        }
    }

    /// Discriminant without the attached detail
    pub fn kind(&self) -> AuthErrorKind {
        match self {
            Self::InvalidCredentials => AuthErrorKind::InvalidCredentials,
            Self::MalformedToken { .. } => AuthErrorKind::MalformedToken,
            Self::UnexpectedAlgorithm { .. } => AuthErrorKind::UnexpectedAlgorithm,
            Self::InvalidSignature => AuthErrorKind::InvalidSignature,
            Self::TokenExpired => AuthErrorKind::TokenExpired,
            Self::MalformedClaims { .. } => AuthErrorKind::MalformedClaims,
            Self::UnknownSubject { .. } => AuthErrorKind::UnknownSubject,
            Self::Signing { .. } => AuthErrorKind::Signing,
            Self::Directory(_) => AuthErrorKind::Directory,
        }
    }

    /// True when the request itself was rejected, as opposed to an
    /// infrastructure failure while handling it
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Signing { .. } | Self::Directory(_))
    }
}

/// Stable labels for each failure kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthErrorKind {
    InvalidCredentials,
    MalformedToken,
    UnexpectedAlgorithm,
    InvalidSignature,
    TokenExpired,
    MalformedClaims,
    UnknownSubject,
    Signing,
    Directory,
}

impl AuthErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::MalformedToken => "malformed_token",
            Self::UnexpectedAlgorithm => "unexpected_algorithm",
            Self::InvalidSignature => "invalid_signature",
            Self::TokenExpired => "token_expired",
            Self::MalformedClaims => "malformed_claims",
            Self::UnknownSubject => "unknown_subject",
            Self::Signing => "signing_failed",
            Self::Directory => "directory_error",
        }
    }
}

impl std::fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
