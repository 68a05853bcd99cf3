//! User service - Handles user-related business logic.
//!
//! In this service the business layer is a pass-through that adds uniform
//! error-kind mapping, so handlers never depend on repository-specific
//! shapes. Transient store failures are surfaced, never retried here.

use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::domain::User;
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UserRepository;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get a user by id; `NotFound` when the id does not exist
    async fn get_user(&self, ctx: CancellationToken, id: Uuid) -> AppResult<User>;

    /// Create a user from an already-validated payload; `Conflict` when
    /// the email is taken
    async fn create_user(
        &self,
        ctx: CancellationToken,
        name: String,
        email: String,
    ) -> AppResult<User>;

    /// Hard-delete a user by id; `NotFound` when the id does not exist,
    /// including on repeat deletes
    async fn delete_user(&self, ctx: CancellationToken, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of UserService over a repository.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
}

impl UserManager {
    /// Create new user service instance with an injected repository
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn get_user(&self, ctx: CancellationToken, id: Uuid) -> AppResult<User> {
        self.repo.find_by_id(ctx, id).await?.ok_or_not_found()
    }

    async fn create_user(
        &self,
        ctx: CancellationToken,
        name: String,
        email: String,
    ) -> AppResult<User> {
        self.repo.insert(ctx, name, email).await
    }

    async fn delete_user(&self, ctx: CancellationToken, id: Uuid) -> AppResult<()> {
        if self.repo.delete(ctx, id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }
}
