use crate::models::employee::UPLOADS_PREFIX;

/// Shown when an employee has no usable image.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/150";

/// Turns a stored `image_url` into an absolute URL against the backend origin.
///
/// Accepts `/uploads/x`, `uploads/x`, a bare filename, or an absolute URL.
/// Anything else, including a missing value, falls back to the placeholder.
pub fn resolve_image_url(origin: &str, image_url: Option<&str>) -> String {
    let origin = origin.trim_end_matches('/');
    let Some(path) = image_url.map(str::trim).filter(|path| !path.is_empty()) else {
        return PLACEHOLDER_IMAGE.to_string();
    };

    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else if path.strip_prefix(UPLOADS_PREFIX).is_some_and(|rest| rest.starts_with('/')) {
        format!("{}{}", origin, path)
    } else if let Some(rest) = path.strip_prefix("uploads/") {
        format!("{}{}/{}", origin, UPLOADS_PREFIX, rest)
    } else if !path.contains('/') {
        format!("{}{}/{}", origin, UPLOADS_PREFIX, path)
    } else {
        PLACEHOLDER_IMAGE.to_string()
    }
}
