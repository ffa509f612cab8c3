use thiserror::Error;

/// Coercion failures raised when a string value is read as a typed quantity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("'{value}' is not an integer")]
    NotInteger { value: String },
    #[error("'{value}' is not a number")]
    NotNumber { value: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
