//! Storage collaborator: the `EmployeeRepository` seam plus its adapters.

mod memory;
mod postgres;

pub use memory::InMemoryEmployeeRepository;
pub use postgres::PgEmployeeRepository;

use async_trait::async_trait;
use log::info;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::models::employee::{Employee, EmployeeChanges, NewEmployee};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("email {email} is already in use")]
    DuplicateEmail { email: String },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Persistence operations for employee records.
///
/// The store owns id and timestamp generation and enforces email uniqueness.
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn insert(&self, employee: NewEmployee) -> Result<Employee, StoreError>;

    /// All employees in insertion order, optionally restricted to an exact
    /// department match.
    async fn find(&self, department: Option<&str>) -> Result<Vec<Employee>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Employee>, StoreError>;

    /// Returns `None` when no employee has `id`.
    async fn update(&self, id: Uuid, changes: EmployeeChanges) -> Result<Option<Employee>, StoreError>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
}

/// Creates the employees table if it does not exist yet.
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS employees (
            id UUID PRIMARY KEY,
            full_name TEXT NOT NULL,
            position TEXT NOT NULL,
            department TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            image_url TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS employees_department_idx ON employees (department)")
        .execute(pool)
        .await?;

    info!("Employee schema ready");
    Ok(())
}
