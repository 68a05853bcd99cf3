//! User repository - SeaORM-backed persistence for users.
//!
//! Every operation is a single statement against the store and races the
//! query against the caller's cancellation token. Driver errors are
//! classified into the application taxonomy exactly once, here.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set, SqlErr};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use crate::domain::User;
use crate::errors::{AppError, AppResult};

use super::entities::user;

/// Persistence operations for users.
///
/// All operations take a request-scoped cancellation token; an operation
/// cancelled before the store responds reports `Unavailable`.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by id. `None` when no row matches.
    async fn find_by_id(&self, ctx: CancellationToken, id: Uuid) -> AppResult<Option<User>>;

    /// Insert a new user. The store generates `id` and `created_at`;
    /// a duplicate email fails with `Conflict`.
    async fn insert(&self, ctx: CancellationToken, name: String, email: String) -> AppResult<User>;

    /// Delete a user by id. Returns `false` when no row was deleted.
    async fn delete(&self, ctx: CancellationToken, id: Uuid) -> AppResult<bool>;
}

/// SeaORM implementation of [`UserRepository`].
///
/// Holds an injected pooled connection; connection lifecycle is owned by
/// [`crate::infra::Database`], never by the repository.
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    /// Create a repository over an existing connection pool
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, ctx: CancellationToken, id: Uuid) -> AppResult<Option<User>> {
        let query = user::Entity::find_by_id(id).one(&self.db);

        tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(cancelled()),
            result = query => Ok(result.map_err(classify)?.map(User::from)),
        }
    }

    async fn insert(&self, ctx: CancellationToken, name: String, email: String) -> AppResult<User> {
        // id and created_at stay NotSet so the column defaults apply
        let row = user::ActiveModel {
            name: Set(name),
            email: Set(email),
            ..Default::default()
        };
        let insert = row.insert(&self.db);

        tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(cancelled()),
            result = insert => Ok(result.map_err(classify)?.into()),
        }
    }

    async fn delete(&self, ctx: CancellationToken, id: Uuid) -> AppResult<bool> {
        let delete = user::Entity::delete_by_id(id).exec(&self.db);

        tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(cancelled()),
            result = delete => Ok(result.map_err(classify)?.rows_affected > 0),
        }
    }
}

impl From<user::Model> for User {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            created_at: model.created_at,
        }
    }
}

fn cancelled() -> AppError {
    AppError::unavailable("operation cancelled before the store responded")
}

/// Map a SeaORM error into the application taxonomy.
///
/// Connectivity and pool-acquire failures are `Unavailable`; a violated
/// uniqueness constraint (the email column) is `Conflict`; anything else
/// stays an unclassified database error.
fn classify(err: DbErr) -> AppError {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return AppError::conflict("user with this email");
    }

    match err {
        DbErr::Conn(e) => AppError::unavailable(e.to_string()),
        DbErr::ConnectionAcquire(e) => AppError::unavailable(e.to_string()),
        other => AppError::Database(other),
    }
}
