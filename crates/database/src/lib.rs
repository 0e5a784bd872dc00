//! SQLite persistence layer for the tourism site backend.
//!
//! This crate provides async database operations for users, sites, guide
//! requests, payments, reports, and notifications using SQLx with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{Database, status::Role, models::NewUser, user};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:tourism.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Create a user
//!     let user = NewUser {
//!         first_name: "Abebe".to_string(),
//!         last_name: "Bekele".to_string(),
//!         email: "abebe@example.com".to_string(),
//!         password_hash: "$argon2id$...".to_string(),
//!         role: Role::Visitor,
//!     };
//!     user::create_user(db.pool(), &user).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod activity;
pub mod error;
pub mod guide_request;
pub mod lookup;
pub mod models;
pub mod notification;
pub mod payment;
pub mod report;
pub mod site;
pub mod site_image;
pub mod status;
pub mod user;
pub mod validation;

pub use error::{DatabaseError, Result};
pub use models::{
    GuideRequest, NewNotification, NewUser, Notification, Payment, Report,
    ReportListing, RequestListing, ResearcherActivity, Site, SiteListing, User,
};
pub use status::{PaymentStatus, RequestStatus, Role, SiteStatus};
pub use validation::ValidationError;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `sqlite::memory:` for tests.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{seed_user, test_db};
    use super::*;

    #[tokio::test]
    async fn test_user_crud() {
        let db = test_db().await;

        let user = seed_user(&db, "alice@example.com", Role::Visitor).await;
        assert_eq!(user.first_name, "Test");
        assert!(user.is_active);

        // Update profile
        let mut changes = user::ProfileChanges::default();
        changes.first_name = Some("Alice".to_string());
        user::update_profile(db.pool(), user.user_id, &changes)
            .await
            .unwrap();
        let fetched = user::get_user(db.pool(), user.user_id).await.unwrap();
        assert_eq!(fetched.first_name, "Alice");

        // List
        let users = user::list_users(db.pool()).await.unwrap();
        assert_eq!(users.len(), 1);

        // Delete
        user::delete_user(db.pool(), user.user_id).await.unwrap();
        let result = user::get_user(db.pool(), user.user_id).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }
}
