use validator::{Validate, ValidationErrors};

/// Flattens validator output into one line, fields sorted by name.
pub fn describe_errors(err: &ValidationErrors) -> String {
    let mut details = err
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let errors = errs
                .iter()
                .map(|e| e.message.as_deref().map(str::to_owned).unwrap_or_else(|| e.code.to_string()))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}: {}", field, errors)
        })
        .collect::<Vec<_>>();
    details.sort();
    format!("Validation failed: {}", details.join("; "))
}

pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), String> {
    payload.validate().map_err(|err| describe_errors(&err))
}
