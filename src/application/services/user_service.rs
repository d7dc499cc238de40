//! User management service.

use serde_json::json;
use std::sync::Arc;

use crate::domain::entities::{NewUser, User};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;

pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the user does not exist.
    pub async fn get_user(&self, id: i64) -> Result<User, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found", json!({ "id": id })))
    }

    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the trimmed name is empty.
    pub async fn create_user(&self, name: String) -> Result<User, AppError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::bad_request(
                "User name must not be empty",
                json!({ "field": "name" }),
            ));
        }

        self.repository.create(NewUser { name }).await
    }

    /// Deletes a user together with their ratings.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the user does not exist.
    pub async fn delete_user(&self, id: i64) -> Result<(), AppError> {
        if self.repository.delete(id).await? {
            Ok(())
        } else {
            Err(AppError::not_found("User not found", json!({ "id": id })))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockUserRepository;
    use chrono::Utc;

    #[tokio::test]
    async fn test_create_user_trims_name() {
        let mut repo = MockUserRepository::new();
        repo.expect_create()
            .withf(|new| new.name == "Dana")
            .returning(|new| {
                Ok(User {
                    id: 1,
                    name: new.name,
                    last_fetch_time: None,
                    created_at: Utc::now(),
                })
            });
        let service = UserService::new(Arc::new(repo));

        let user = service.create_user(" Dana ".to_string()).await.unwrap();

        assert_eq!(user.name, "Dana");
        assert!(user.last_fetch_time.is_none());
    }

    #[tokio::test]
    async fn test_get_missing_user() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        let service = UserService::new(Arc::new(repo));

        assert!(matches!(
            service.get_user(5).await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_user() {
        let mut repo = MockUserRepository::new();
        repo.expect_delete().returning(|_| Ok(false));
        let service = UserService::new(Arc::new(repo));

        assert!(matches!(
            service.delete_user(5).await,
            Err(AppError::NotFound { .. })
        ));
    }
}
