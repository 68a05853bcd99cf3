//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connection and migrations
//! - Repositories backed by the store

pub mod db;
pub mod repositories;

pub use db::{Database, Migrator};
pub use repositories::{PgUserRepository, UserRepository};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::MockUserRepository;
