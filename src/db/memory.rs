use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{EmployeeRepository, StoreError};
use crate::models::employee::{Employee, EmployeeChanges, NewEmployee};

/// Process-local store. Records are kept in insertion order.
#[derive(Default)]
pub struct InMemoryEmployeeRepository {
    employees: RwLock<Vec<Employee>>,
}

impl InMemoryEmployeeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.employees.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.employees.read().await.is_empty()
    }
}

fn email_taken(employees: &[Employee], email: &str, except: Option<Uuid>) -> bool {
    employees
        .iter()
        .any(|employee| employee.email == email && Some(employee.id) != except)
}

#[async_trait]
impl EmployeeRepository for InMemoryEmployeeRepository {
    async fn insert(&self, employee: NewEmployee) -> Result<Employee, StoreError> {
        let mut employees = self.employees.write().await;
        if email_taken(&employees, &employee.fields.email, None) {
            return Err(StoreError::DuplicateEmail {
                email: employee.fields.email,
            });
        }

        let now = Utc::now();
        let stored = Employee {
            id: Uuid::new_v4(),
            full_name: employee.fields.full_name,
            position: employee.fields.position,
            department: employee.fields.department,
            email: employee.fields.email,
            image_url: employee.image_url,
            created_at: now,
            updated_at: now,
        };
        employees.push(stored.clone());
        Ok(stored)
    }

    async fn find(&self, department: Option<&str>) -> Result<Vec<Employee>, StoreError> {
        let employees = self.employees.read().await;
        Ok(employees
            .iter()
            .filter(|employee| department.map_or(true, |wanted| employee.department == wanted))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Employee>, StoreError> {
        let employees = self.employees.read().await;
        Ok(employees.iter().find(|employee| employee.id == id).cloned())
    }

    async fn update(&self, id: Uuid, changes: EmployeeChanges) -> Result<Option<Employee>, StoreError> {
        let mut employees = self.employees.write().await;
        if !employees.iter().any(|employee| employee.id == id) {
            return Ok(None);
        }
        if email_taken(&employees, &changes.fields.email, Some(id)) {
            return Err(StoreError::DuplicateEmail {
                email: changes.fields.email,
            });
        }

        let Some(employee) = employees.iter_mut().find(|employee| employee.id == id) else {
            return Ok(None);
        };
        employee.full_name = changes.fields.full_name;
        employee.position = changes.fields.position;
        employee.department = changes.fields.department;
        employee.email = changes.fields.email;
        if let Some(image_url) = changes.image_url {
            employee.image_url = Some(image_url);
        }
        employee.updated_at = Utc::now();
        Ok(Some(employee.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut employees = self.employees.write().await;
        let before = employees.len();
        employees.retain(|employee| employee.id != id);
        Ok(employees.len() < before)
    }
}
