use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{EmployeeRepository, StoreError};
use crate::models::employee::{Employee, EmployeeChanges, NewEmployee};

#[derive(Clone)]
pub struct PgEmployeeRepository {
    pool: PgPool,
}

impl PgEmployeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    log::error!("Database error: {:?}", err);
    StoreError::Unavailable(err.to_string())
}

// Writes can trip the unique index on email.
fn map_write_error(err: sqlx::Error, email: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::DuplicateEmail {
            email: email.to_owned(),
        },
        _ => map_sqlx_error(err),
    }
}

#[async_trait]
impl EmployeeRepository for PgEmployeeRepository {
    async fn insert(&self, employee: NewEmployee) -> Result<Employee, StoreError> {
        let fields = &employee.fields;
        sqlx::query_as::<_, Employee>(
            "INSERT INTO employees (id, full_name, position, department, email, image_url) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&fields.full_name)
        .bind(&fields.position)
        .bind(&fields.department)
        .bind(&fields.email)
        .bind(&employee.image_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| map_write_error(err, &fields.email))
    }

    async fn find(&self, department: Option<&str>) -> Result<Vec<Employee>, StoreError> {
        let mut query: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT * FROM employees");

        if let Some(department) = department {
            query.push(" WHERE department = ");
            query.push_bind(department);
        }

        query.push(" ORDER BY created_at ASC, id ASC");

        query
            .build_query_as::<Employee>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Employee>, StoreError> {
        sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn update(&self, id: Uuid, changes: EmployeeChanges) -> Result<Option<Employee>, StoreError> {
        let fields = &changes.fields;
        let mut query: QueryBuilder<'_, Postgres> = QueryBuilder::new("UPDATE employees SET ");
        let mut separated = query.separated(", ");

        separated.push("full_name = ");
        separated.push_bind_unseparated(&fields.full_name);
        separated.push("position = ");
        separated.push_bind_unseparated(&fields.position);
        separated.push("department = ");
        separated.push_bind_unseparated(&fields.department);
        separated.push("email = ");
        separated.push_bind_unseparated(&fields.email);
        if let Some(image_url) = &changes.image_url {
            separated.push("image_url = ");
            separated.push_bind_unseparated(image_url);
        }
        separated.push("updated_at = now()");

        query.push(" WHERE id = ");
        query.push_bind(id);
        query.push(" RETURNING *");

        query
            .build_query_as::<Employee>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| map_write_error(err, &fields.email))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
