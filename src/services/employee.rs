use std::sync::Arc;

use log::{debug, info};
use thiserror::Error;
use uuid::Uuid;

use crate::db::{EmployeeRepository, StoreError};
use crate::models::employee::{Employee, EmployeeChanges, EmployeeFields, NewEmployee, UploadedFile};
use crate::utils::validation::validate_payload;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Storage(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail { email } => {
                ServiceError::Validation(format!("An employee with email {} already exists", email))
            }
            StoreError::Unavailable(msg) => ServiceError::Storage(msg),
        }
    }
}

fn not_found(id: &str) -> ServiceError {
    ServiceError::NotFound(format!("Employee {} not found", id))
}

// Anything that is not a well-formed id cannot name a stored record.
fn parse_id(id: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(id).map_err(|_| not_found(id))
}

/// The employee record lifecycle: create, list, fetch, update, delete.
#[derive(Clone)]
pub struct EmployeeService {
    repo: Arc<dyn EmployeeRepository>,
}

impl EmployeeService {
    pub fn new(repo: Arc<dyn EmployeeRepository>) -> Self {
        Self { repo }
    }

    /// Stores a new employee. `image_url` is only set when a file was uploaded.
    pub async fn create(
        &self,
        fields: EmployeeFields,
        image: Option<UploadedFile>,
    ) -> Result<Employee, ServiceError> {
        let fields = fields.normalized();
        validate_payload(&fields).map_err(ServiceError::Validation)?;

        let employee = self
            .repo
            .insert(NewEmployee {
                fields,
                image_url: image.map(|file| file.public_path()),
            })
            .await?;

        info!("Created employee {}", employee.id);
        Ok(employee)
    }

    /// Lists employees, optionally those whose department matches exactly.
    /// An empty filter is the same as no filter.
    pub async fn list(&self, department: Option<&str>) -> Result<Vec<Employee>, ServiceError> {
        let department = department.filter(|department| !department.is_empty());
        let employees = self.repo.find(department).await?;
        debug!("Listed {} employees (department filter: {:?})", employees.len(), department);
        Ok(employees)
    }

    pub async fn get(&self, id: &str) -> Result<Employee, ServiceError> {
        let uuid = parse_id(id)?;
        self.repo.find_by_id(uuid).await?.ok_or_else(|| not_found(id))
    }

    /// Overwrites the four text fields wholesale. The stored image changes only
    /// when `image` is given.
    pub async fn update(
        &self,
        id: &str,
        fields: EmployeeFields,
        image: Option<UploadedFile>,
    ) -> Result<Employee, ServiceError> {
        let uuid = parse_id(id)?;
        let changes = EmployeeChanges {
            fields: fields.normalized(),
            image_url: image.map(|file| file.public_path()),
        };

        let employee = self.repo.update(uuid, changes).await?.ok_or_else(|| not_found(id))?;
        info!("Updated employee {}", employee.id);
        Ok(employee)
    }

    /// Deleting an id that is not stored is a `NotFound` error.
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let uuid = parse_id(id)?;
        if !self.repo.delete(uuid).await? {
            return Err(not_found(id));
        }
        info!("Deleted employee {}", uuid);
        Ok(())
    }
}
