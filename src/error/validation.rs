use thiserror::Error as ThisError;

/// Field-level rejection of a submitted review form.
///
/// Always recovered locally: the form is shown again with the message and nothing is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum ValidationError {
    #[error("All fields are required!")]
    MissingField,

    #[error("Rating must be a whole number from 1 to 5.")]
    InvalidRating,
}

impl ValidationError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingField => "MISSING_FIELD",
            ValidationError::InvalidRating => "INVALID_RATING",
        }
    }
}
