use thiserror::Error;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl From<serde_json::Error> for JournalError {
    fn from(e: serde_json::Error) -> Self {
        JournalError::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for JournalError {
    fn from(e: std::io::Error) -> Self {
        JournalError::Persistence(e.to_string())
    }
}

impl JournalError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        JournalError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn out_of_range(field: &str) -> Self {
        Self::invalid(field, "Result does not fit in a 96-bit decimal")
    }
}
