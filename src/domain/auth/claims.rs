//! Token claim sets

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::AuthError;
use crate::domain::user::UserId;

/// Claims embedded in an issued token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: UserId,
    /// Issued at timestamp (Unix epoch seconds)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch seconds)
    pub exp: i64,
}

impl TokenClaims {
    /// Create claims for a subject issued at `issued_at`.
    ///
    /// Returns `None` when the expiry falls outside the representable range.
    pub fn new(subject: UserId, issued_at: DateTime<Utc>, lifetime: Duration) -> Option<Self> {
        let expires_at = issued_at.checked_add_signed(lifetime)?;

        Some(Self {
            sub: subject,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        })
    }

    pub fn subject(&self) -> UserId {
        self.sub
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Claims as they arrive in a presented token, before any field is trusted.
///
/// Each field is checked individually so a bad `sub` is reported as such
/// rather than failing the whole payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UncheckedClaims {
    #[serde(default)]
    sub: Option<Value>,
    #[serde(default)]
    iat: Option<Value>,
    #[serde(default)]
    exp: Option<Value>,
}

impl UncheckedClaims {
    /// Expiration timestamp, which must be an integer number of seconds
    pub fn expiration(&self) -> Result<i64, AuthError> {
        match &self.exp {
            None => Err(AuthError::malformed_claims("missing 'exp' claim")),
            Some(value) => value
                .as_i64()
                .ok_or_else(|| AuthError::malformed_claims("'exp' claim is not an integer")),
        }
    }

    /// A token is valid only while `exp` is strictly in the future
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> Result<bool, AuthError> {
        Ok(now.timestamp() >= self.expiration()?)
    }

    /// Subject, which must be a non-negative integer user ID
    pub fn subject(&self) -> Result<UserId, AuthError> {
        match &self.sub {
            None => Err(AuthError::malformed_claims("missing 'sub' claim")),
            Some(value) => value.as_u64().map(UserId::new).ok_or_else(|| {
                AuthError::malformed_claims("'sub' claim is not a numeric user id")
            }),
        }
    }

    /// Issued-at is optional; a present but non-integer value is rejected
    pub fn issued_at(&self) -> Result<Option<i64>, AuthError> {
        match &self.iat {
            None => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| AuthError::malformed_claims("'iat' claim is not an integer")),
        }
    }

    /// Validate every field into a typed claim set
    pub fn into_claims(self) -> Result<TokenClaims, AuthError> {
        let exp = self.expiration()?;
        let sub = self.subject()?;
        let iat = self.issued_at()?.unwrap_or(exp);

        Ok(TokenClaims { sub, iat, exp })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::AuthErrorKind;
    use chrono::TimeZone;

    fn unchecked(json: &str) -> UncheckedClaims {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_new_claims() {
        let issued = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let claims = TokenClaims::new(UserId::new(42), issued, Duration::hours(48)).unwrap();

        assert_eq!(claims.subject(), UserId::new(42));
        assert_eq!(claims.iat, issued.timestamp());
        assert_eq!(claims.exp - claims.iat, 48 * 3600);
        assert_eq!(claims.expires_at(), Some(issued + Duration::hours(48)));
    }

    #[test]
    fn test_expiry_out_of_range() {
        let issued = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let huge = Duration::try_hours(10_000_000_000).unwrap();

        assert!(TokenClaims::new(UserId::new(42), issued, huge).is_none());
        assert!(
            TokenClaims::new(UserId::new(42), DateTime::<Utc>::MAX_UTC, Duration::seconds(1))
                .is_none()
        );
    }

    #[test]
    fn test_expiry_boundary() {
        let issued = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let exp = (issued + Duration::seconds(60)).timestamp();
        let claims = unchecked(&format!(r#"{{"sub":42,"exp":{exp}}}"#));

        assert!(!claims.is_expired_at(issued).unwrap());
        assert!(!claims.is_expired_at(issued + Duration::seconds(59)).unwrap());
        assert!(claims.is_expired_at(issued + Duration::seconds(60)).unwrap());
        assert!(claims.is_expired_at(issued + Duration::hours(1)).unwrap());
    }

    #[test]
    fn test_expiry_requires_exp_claim() {
        let err = unchecked(r#"{"sub":42}"#).is_expired_at(Utc::now()).unwrap_err();
        assert_eq!(err.kind(), AuthErrorKind::MalformedClaims);
    }

    #[test]
    fn test_claims_serialize_numeric_subject() {
        let claims = TokenClaims {
            sub: UserId::new(42),
            iat: 1,
            exp: 2,
        };
        let json = serde_json::to_string(&claims).unwrap();
        assert_eq!(json, r#"{"sub":42,"iat":1,"exp":2}"#);
    }

    #[test]
    fn test_unchecked_valid() {
        let claims = unchecked(r#"{"sub":42,"iat":10,"exp":20,"extra":"ignored"}"#)
            .into_claims()
            .unwrap();
        assert_eq!(
            claims,
            TokenClaims {
                sub: UserId::new(42),
                iat: 10,
                exp: 20
            }
        );
    }

    #[test]
    fn test_unchecked_missing_subject() {
        let err = unchecked(r#"{"exp":20}"#).subject().unwrap_err();
        assert_eq!(err.kind(), AuthErrorKind::MalformedClaims);
    }

    #[test]
    fn test_unchecked_wrong_subject_types() {
        for payload in [
            r#"{"sub":"42","exp":20}"#,
            r#"{"sub":42.5,"exp":20}"#,
            r#"{"sub":-1,"exp":20}"#,
            r#"{"sub":null,"exp":20}"#,
            r#"{"sub":{"id":42},"exp":20}"#,
        ] {
            let err = unchecked(payload).subject().unwrap_err();
            assert_eq!(err.kind(), AuthErrorKind::MalformedClaims, "{payload}");
        }
    }

    #[test]
    fn test_unchecked_bad_expiration() {
        assert!(unchecked(r#"{"sub":42}"#).expiration().is_err());
        assert!(unchecked(r#"{"sub":42,"exp":"tomorrow"}"#).expiration().is_err());
        assert!(unchecked(r#"{"sub":42,"exp":1.5}"#).expiration().is_err());
    }

    #[test]
    fn test_unchecked_optional_issued_at() {
        let claims = unchecked(r#"{"sub":42,"exp":20}"#).into_claims().unwrap();
        assert_eq!(claims.iat, 20);

        let err = unchecked(r#"{"sub":42,"exp":20,"iat":"now"}"#)
            .into_claims()
            .unwrap_err();
        assert_eq!(err.kind(), AuthErrorKind::MalformedClaims);
    }
}
