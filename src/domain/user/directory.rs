//! User directory trait

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::entity::{User, UserId};
use crate::domain::DomainError;

/// Resolves credentials and identifiers to user records.
///
/// `Ok(None)` means no such user. `Err` is reserved for backend failures
/// and is never used to signal a credential mismatch.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find the user matching both email and password
    async fn find_by_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError>;

    /// Find a user by identifier
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserRole;

    #[tokio::test]
    async fn test_mock_directory() {
        let mut mock = MockUserDirectory::new();
        mock.expect_find_by_id().returning(|id| {
            Ok(Some(User::new(
                id,
                "user1@gmail.com",
                "User Friendly",
                UserRole::User,
                "user1",
            )))
        });
        mock.expect_find_by_credentials()
            .returning(|_, _| Ok(None));

        let user = mock.find_by_id(UserId::new(42)).await.unwrap().unwrap();
        assert_eq!(user.id(), UserId::new(42));

        let missing = mock.find_by_credentials("a", "b").await.unwrap();
        assert!(missing.is_none());
    }
}
