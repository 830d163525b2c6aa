//! In-memory user directory

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{User, UserDirectory, UserId, UserRole};
use crate::domain::DomainError;

/// In-memory implementation of UserDirectory.
///
/// Passwords are held in plaintext; this is a placeholder until a
/// persistent directory with proper password storage is wired in.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserDirectory {
    /// Create a new empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory with initial users
    pub fn with_users(users: Vec<User>) -> Self {
        let users = users.into_iter().map(|u| (u.id(), u)).collect();

        Self {
            users: Arc::new(RwLock::new(users)),
        }
    }

    /// Directory holding the two built-in development accounts
    pub fn seeded() -> Self {
        Self::with_users(vec![
            User::new(
                UserId::new(42),
                "user1@gmail.com",
                "User Friendly",
                UserRole::User,
                "user1",
            ),
            User::new(
                UserId::new(45),
                "user2@gmail.com",
                "John Walker",
                UserRole::User,
                "12345qwerty",
            ),
        ])
    }

    /// Add or replace a user
    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id(), user);
    }

    /// Remove a user, returning whether it existed
    pub async fn remove(&self, id: UserId) -> bool {
        self.users.write().await.remove(&id).is_some()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        let presented = digest(password);

        // Every entry is compared so the scan does not stop early on a match
        let mut found = None;
        for user in users.values() {
            let email_matches = constant_time_compare(&digest(user.email()), &digest(email));
            let password_matches = constant_time_compare(&digest(user.password()), &presented);

            if email_matches & password_matches {
                found = Some(user.clone());
            }
        }

        Ok(found)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

/// Constant-time comparison of equal-length digests
fn constant_time_compare(a: &[u8; 32], b: &[u8; 32]) -> bool {
    let mut result = 0u8;

    for i in 0..a.len() {
        result |= a[i] ^ b[i];
    }

    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeded_users() {
        let directory = InMemoryUserDirectory::seeded();

        let user = directory.find_by_id(UserId::new(42)).await.unwrap().unwrap();
        assert_eq!(user.email(), "user1@gmail.com");
        assert_eq!(user.name(), "User Friendly");
        assert_eq!(user.role(), UserRole::User);

        let user = directory.find_by_id(UserId::new(45)).await.unwrap().unwrap();
        assert_eq!(user.name(), "John Walker");
    }

    #[tokio::test]
    async fn test_find_by_credentials() {
        let directory = InMemoryUserDirectory::seeded();

        let user = directory
            .find_by_credentials("user2@gmail.com", "12345qwerty")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.id(), UserId::new(45));
    }

    #[tokio::test]
    async fn test_credentials_must_both_match() {
        let directory = InMemoryUserDirectory::seeded();

        for (email, password) in [
            ("user1@gmail.com", "12345qwerty"),
            ("user2@gmail.com", "user1"),
            ("user1@gmail.com", ""),
            ("unknown@gmail.com", "user1"),
            ("USER1@gmail.com", "user1"),
        ] {
            let found = directory.find_by_credentials(email, password).await.unwrap();
            assert!(found.is_none(), "{email} / {password}");
        }
    }

    #[tokio::test]
    async fn test_find_by_unknown_id() {
        let directory = InMemoryUserDirectory::seeded();
        assert!(directory.find_by_id(UserId::new(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_and_remove() {
        let directory = InMemoryUserDirectory::new();
        assert!(directory.find_by_id(UserId::new(7)).await.unwrap().is_none());

        directory
            .insert(User::new(
                UserId::new(7),
                "admin@example.com",
                "Admin",
                UserRole::Admin,
                "pw",
            ))
            .await;
        assert!(directory.find_by_id(UserId::new(7)).await.unwrap().is_some());

        assert!(directory.remove(UserId::new(7)).await);
        assert!(!directory.remove(UserId::new(7)).await);
        assert!(directory.find_by_id(UserId::new(7)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let directory = InMemoryUserDirectory::seeded();
        let other = directory.clone();

        other.remove(UserId::new(42)).await;
        assert!(directory.find_by_id(UserId::new(42)).await.unwrap().is_none());
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare(&digest("hello"), &digest("hello")));
        assert!(!constant_time_compare(&digest("hello"), &digest("world")));
    }
}
