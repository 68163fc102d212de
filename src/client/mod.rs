//! HTTP client for the directory API, doing what the web and mobile front ends
//! do: the five employee calls, department filtering and image URL resolution.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::models::employee::{Employee, EmployeeFields, SUGGESTED_DEPARTMENTS};
use crate::utils::image_url::resolve_image_url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const ALL_DEPARTMENTS: &str = "All";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid backend origin: {0}")]
    InvalidOrigin(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },
}

/// The department selector shown above the employee list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DepartmentFilter {
    #[default]
    All,
    Only(String),
}

impl DepartmentFilter {
    /// "All" followed by the suggested departments.
    pub fn options() -> Vec<DepartmentFilter> {
        std::iter::once(DepartmentFilter::All)
            .chain(SUGGESTED_DEPARTMENTS.iter().map(|d| DepartmentFilter::Only(d.to_string())))
            .collect()
    }

    pub fn from_label(label: &str) -> Self {
        match label {
            "" | ALL_DEPARTMENTS => DepartmentFilter::All,
            department => DepartmentFilter::Only(department.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            DepartmentFilter::All => ALL_DEPARTMENTS,
            DepartmentFilter::Only(department) => department.as_str(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// What the create and edit screens submit.
#[derive(Debug, Clone)]
pub struct EmployeeForm {
    pub fields: EmployeeFields,
    pub image: Option<ImageAttachment>,
}

impl EmployeeForm {
    pub fn new(fields: EmployeeFields) -> Self {
        Self { fields, image: None }
    }

    pub fn with_image(mut self, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.image = Some(ImageAttachment {
            file_name: file_name.into(),
            bytes,
        });
        self
    }

    fn into_multipart(self) -> Form {
        let form = Form::new()
            .text("Full_name", self.fields.full_name)
            .text("position", self.fields.position)
            .text("department", self.fields.department)
            .text("email", self.fields.email);
        match self.image {
            Some(image) => form.part("image_url", Part::bytes(image.bytes).file_name(image.file_name)),
            None => form,
        }
    }
}

#[derive(Deserialize)]
struct MessageBody {
    message: String,
}

pub struct DirectoryClient {
    http: reqwest::Client,
    origin: Url,
    employees: Url,
}

impl DirectoryClient {
    /// `origin` is the backend root, e.g. `http://localhost:5000`.
    pub fn new(origin: &str) -> Result<Self, ClientError> {
        let origin = Url::parse(origin)?;
        let employees = origin.join("/api/employees/")?;
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http, origin, employees })
    }

    fn employee_url(&self, id: &str) -> Result<Url, ClientError> {
        Ok(self.employees.join(id)?)
    }

    pub async fn list(&self, filter: &DepartmentFilter) -> Result<Vec<Employee>, ClientError> {
        let mut url = self.employees.clone();
        if let DepartmentFilter::Only(department) = filter {
            url.query_pairs_mut().append_pair("department", department);
        }
        parse(self.http.get(url).send().await?).await
    }

    pub async fn get(&self, id: &str) -> Result<Employee, ClientError> {
        parse(self.http.get(self.employee_url(id)?).send().await?).await
    }

    pub async fn create(&self, form: EmployeeForm) -> Result<Employee, ClientError> {
        let request = self.http.post(self.employees.clone()).multipart(form.into_multipart());
        parse(request.send().await?).await
    }

    pub async fn update(&self, id: &str, form: EmployeeForm) -> Result<Employee, ClientError> {
        let request = self.http.put(self.employee_url(id)?).multipart(form.into_multipart());
        parse(request.send().await?).await
    }

    /// Returns the server's confirmation message.
    pub async fn delete(&self, id: &str) -> Result<String, ClientError> {
        let body: MessageBody = parse(self.http.delete(self.employee_url(id)?).send().await?).await?;
        Ok(body.message)
    }

    /// Absolute URL for the employee's picture, or the placeholder.
    pub fn image_url(&self, employee: &Employee) -> String {
        resolve_image_url(self.origin.as_str(), employee.image_url.as_deref())
    }
}

async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let message = match response.json::<MessageBody>().await {
        Ok(body) => body.message,
        Err(_) => status.to_string(),
    };
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
