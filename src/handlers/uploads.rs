use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::utils::upload::UploadStore;

pub async fn serve_upload(
    uploads: web::Data<UploadStore>,
    filename: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    match uploads.read(&filename).await? {
        Some(image) => Ok(HttpResponse::Ok().content_type(image.content_type).body(image.bytes)),
        None => Err(AppError::NotFound("File not found".to_string())),
    }
}
