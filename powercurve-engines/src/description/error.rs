use thiserror::Error;

/// Errors raised while reading a flight-model description.
///
/// Absent fields are never errors; they fall back to documented defaults.
/// A field that is present with an unexpected JSON type is rejected.
#[derive(Debug, Error)]
pub enum DescriptionError {
    #[error("description is not valid JSON")]
    Json(#[from] serde_json::Error),

    #[error("top level of the description must be an object")]
    NotAnObject,

    #[error("field `{field}` should be {expected}, found {found}")]
    WrongType {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
}
