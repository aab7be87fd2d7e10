pub mod flash;
pub mod router;
pub mod routes;
pub mod views;
