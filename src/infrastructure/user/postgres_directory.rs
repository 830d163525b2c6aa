//! PostgreSQL user directory implementation

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::user::{User, UserDirectory, UserId, UserRole};
use crate::domain::DomainError;

/// Well-formed hash that no password matches, verified against when the
/// email is unknown so both misses cost one Argon2 run
const DUMMY_PASSWORD_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$dG9rZW4tYXV0aC1kdW1teQ$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// PostgreSQL implementation of UserDirectory.
///
/// Reads the `users` table; passwords are stored as Argon2 PHC strings.
#[derive(Debug, Clone)]
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    /// Create a new directory with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Ensures the users table exists
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGINT PRIMARY KEY CHECK (id >= 0),
                email TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'user',
                password_hash TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create users table: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn find_by_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, name, role, password_hash
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get user by email: {}", e)))?;

        let Some(row) = row else {
            verify_password(password, DUMMY_PASSWORD_HASH);
            return Ok(None);
        };

        let user = UserRow::from_row(&row)?.into_user()?;

        if verify_password(password, user.password()) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DomainError> {
        // Ids beyond BIGINT cannot be stored
        let Ok(id) = i64::try_from(id.value()) else {
            return Ok(None);
        };

        let row = sqlx::query(
            r#"
            SELECT id, email, name, role, password_hash
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get user: {}", e)))?;

        match row {
            Some(row) => Ok(Some(UserRow::from_row(&row)?.into_user()?)),
            None => Ok(None),
        }
    }
}

/// Columns of the users table
#[derive(Debug, Clone)]
struct UserRow {
    id: i64,
    email: String,
    name: String,
    role: String,
    password_hash: String,
}

impl UserRow {
    fn from_row(row: &PgRow) -> Result<Self, DomainError> {
        let read = |e: sqlx::Error| DomainError::storage(format!("Failed to read user row: {}", e));

        Ok(Self {
            id: row.try_get("id").map_err(read)?,
            email: row.try_get("email").map_err(read)?,
            name: row.try_get("name").map_err(read)?,
            role: row.try_get("role").map_err(read)?,
            password_hash: row.try_get("password_hash").map_err(read)?,
        })
    }

    fn into_user(self) -> Result<User, DomainError> {
        let id = u64::try_from(self.id).map_err(|_| {
            DomainError::storage(format!("Invalid user ID in database: {}", self.id))
        })?;

        Ok(User::new(
            UserId::new(id),
            self.email,
            self.name,
            str_to_role(&self.role),
            self.password_hash,
        ))
    }
}

fn str_to_role(s: &str) -> UserRole {
    match s {
        "admin" => UserRole::Admin,
        _ => UserRole::User,
    }
}

fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};

    fn hash(password: &str) -> String {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .unwrap()
            .to_string()
    }

    fn row(id: i64, role: &str) -> UserRow {
        UserRow {
            id,
            email: "user1@gmail.com".to_string(),
            name: "User Friendly".to_string(),
            role: role.to_string(),
            password_hash: hash("user1"),
        }
    }

    #[test]
    fn test_row_to_user() {
        let user = row(42, "user").into_user().unwrap();

        assert_eq!(user.id(), UserId::new(42));
        assert_eq!(user.email(), "user1@gmail.com");
        assert_eq!(user.name(), "User Friendly");
        assert_eq!(user.role(), UserRole::User);
        assert!(verify_password("user1", user.password()));
    }

    #[test]
    fn test_negative_id_rejected() {
        let err = row(-1, "user").into_user().unwrap_err();
        assert!(matches!(err, DomainError::Storage { .. }));
    }

    #[test]
    fn test_role_conversion() {
        assert_eq!(str_to_role("admin"), UserRole::Admin);
        assert_eq!(str_to_role("user"), UserRole::User);
        assert_eq!(str_to_role("unknown"), UserRole::User);
    }

    #[test]
    fn test_verify_password() {
        let stored = hash("12345qwerty");

        assert!(verify_password("12345qwerty", &stored));
        assert!(!verify_password("12345qwertY", &stored));
        assert!(!verify_password("12345qwerty", "plaintext"));
    }

    #[test]
    fn test_dummy_hash_matches_nothing() {
        assert!(PasswordHash::new(DUMMY_PASSWORD_HASH).is_ok());
        assert!(!verify_password("", DUMMY_PASSWORD_HASH));
        assert!(!verify_password("user1", DUMMY_PASSWORD_HASH));
    }
}
