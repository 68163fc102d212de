//! Reads create/update bodies: multipart forms with an optional image, or JSON.

use actix_multipart::{Multipart, MultipartError};
use actix_web::{mime, web, HttpMessage, HttpRequest};
use futures_util::{StreamExt, TryStreamExt};
use log::debug;

use crate::errors::AppError;
use crate::models::employee::{EmployeeFields, UploadedFile};
use crate::utils::upload::UploadStore;

/// Multipart field carrying the profile image.
pub const IMAGE_FIELD: &str = "image_url";

pub(crate) const MAX_JSON_BYTES: usize = 64 * 1024;
const MAX_TEXT_FIELD_BYTES: usize = 16 * 1024;

pub struct Submission {
    pub fields: EmployeeFields,
    pub image: Option<UploadedFile>,
}

/// Parses the request body. Any uploaded image is already on disk when this
/// returns.
pub async fn read_submission(
    req: &HttpRequest,
    payload: web::Payload,
    uploads: &UploadStore,
) -> Result<Submission, AppError> {
    let is_multipart = req.mime_type().ok().flatten().map_or(false, |mime_type| {
        mime_type.type_() == mime::MULTIPART && mime_type.subtype() == mime::FORM_DATA
    });

    if is_multipart {
        read_multipart(Multipart::new(req.headers(), payload), uploads).await
    } else {
        let fields = read_json(payload).await?;
        Ok(Submission { fields, image: None })
    }
}

fn multipart_error(err: MultipartError) -> AppError {
    AppError::BadRequest(format!("Invalid multipart body: {}", err))
}

async fn read_json(mut payload: web::Payload) -> Result<EmployeeFields, AppError> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|err| AppError::BadRequest(err.to_string()))?;
        if body.len() + chunk.len() > MAX_JSON_BYTES {
            return Err(AppError::BadRequest("Request body too large".to_string()));
        }
        body.extend_from_slice(&chunk);
    }

    if body.is_empty() {
        return Ok(EmployeeFields::default());
    }
    serde_json::from_slice(&body).map_err(|err| AppError::BadRequest(format!("Invalid JSON body: {}", err)))
}

async fn read_multipart(mut multipart: Multipart, uploads: &UploadStore) -> Result<Submission, AppError> {
    let mut fields = EmployeeFields::default();
    let mut image = None;

    while let Some(mut field) = multipart.try_next().await.map_err(multipart_error)? {
        let disposition = field.content_disposition();
        let name = disposition.get_name().unwrap_or_default().to_owned();
        let is_file = disposition.get_filename().is_some();

        let mut data = web::BytesMut::new();
        while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
            let len = data.len() + chunk.len();
            if is_file {
                uploads.check_size(len)?;
            } else if len > MAX_TEXT_FIELD_BYTES {
                return Err(AppError::BadRequest(format!("Field {} is too large", name)));
            }
            data.extend_from_slice(&chunk);
        }

        match name.as_str() {
            // An empty file part means nothing was chosen.
            IMAGE_FIELD if is_file => {
                if !data.is_empty() {
                    image = Some(data.freeze());
                }
            }
            "Full_name" => fields.full_name = text(&name, data)?,
            "position" => fields.position = text(&name, data)?,
            "department" => fields.department = text(&name, data)?,
            "email" => fields.email = text(&name, data)?,
            other => debug!("Ignoring form field {:?}", other),
        }
    }

    let image = match image {
        Some(bytes) => Some(uploads.save_image(&bytes).await?),
        None => None,
    };
    Ok(Submission { fields, image })
}

fn text(name: &str, data: web::BytesMut) -> Result<String, AppError> {
    String::from_utf8(data.to_vec()).map_err(|_| AppError::BadRequest(format!("Field {} is not valid UTF-8", name)))
}
