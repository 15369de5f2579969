//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Provides the user repository backed by `diesel-async` with `bb8`
//! connection pooling, plus the embedded schema migrations.
//!
//! Diesel row structs (`models.rs`) and table definitions (`schema.rs`) are
//! internal; only domain types cross this boundary.
//!
//! # Example
//!
//! ```ignore
//! use user_accounts::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/users")).await?;
//! let repo = DieselUserRepository::new(pool);
//! ```

mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
