use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use validator::Validate;

/// Public prefix under which uploaded images are served.
pub const UPLOADS_PREFIX: &str = "/uploads";

/// Departments the clients offer as suggestions. The server accepts any text.
pub const SUGGESTED_DEPARTMENTS: [&str; 4] = ["HR", "IT", "Finance", "Marketing"];

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "Full_name")]
    pub full_name: String,
    pub position: String,
    pub department: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// The caller-controllable fields of an employee, shared by create and update.
///
/// Anything else in a payload (`_id`, timestamps, `image_url` text) is dropped
/// on deserialization. Missing fields come through as empty strings.
#[derive(Deserialize, Serialize, Validate, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct EmployeeFields {
    #[serde(rename = "Full_name")]
    #[validate(length(min = 1, message = "Full_name is required"))]
    pub full_name: String,
    #[validate(length(min = 1, message = "position is required"))]
    pub position: String,
    #[validate(length(min = 1, message = "department is required"))]
    pub department: String,
    #[validate(email(message = "a valid email is required"))]
    pub email: String,
}

impl EmployeeFields {
    pub fn new(
        full_name: impl Into<String>,
        position: impl Into<String>,
        department: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            position: position.into(),
            department: department.into(),
            email: email.into(),
        }
    }

    /// Applies the storage-side normalization: email trimmed and lower-cased.
    pub fn normalized(mut self) -> Self {
        self.email = self.email.trim().to_lowercase();
        self
    }
}

/// A file the upload layer has already written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>) -> Self {
        Self { filename: filename.into() }
    }

    /// Path stored on the employee record, e.g. `/uploads/<filename>`.
    pub fn public_path(&self) -> String {
        format!("{}/{}", UPLOADS_PREFIX, self.filename)
    }
}

/// Row handed to the store on create.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub fields: EmployeeFields,
    pub image_url: Option<String>,
}

/// Replacement set handed to the store on update. `image_url: None` leaves the
/// stored image untouched.
#[derive(Debug, Clone)]
pub struct EmployeeChanges {
    pub fields: EmployeeFields,
    pub image_url: Option<String>,
}
