pub mod config;
pub mod db;
pub mod error;
pub mod review;
pub mod server;
pub mod utils;

pub use error::{CinelogError, ValidationError};
