pub mod image_url;
pub mod upload;
pub mod validation;
