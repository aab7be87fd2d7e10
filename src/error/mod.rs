mod cinelog;
mod validation;

pub use cinelog::{ApiErrorBody, ApiErrorObject, CinelogError};
pub use validation::ValidationError;
