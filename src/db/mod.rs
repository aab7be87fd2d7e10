//! Database module: the review store and its query engine.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and listing results
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `query.rs`: filter/sort/paginate SQL composition shared by every listing query
//! - `actor.rs`: the `DbActor` owning the pool, and its cloneable handle

pub mod actor;
pub mod models;
pub mod schema;

mod query;

pub use models::{DbReview, ReviewPage, ReviewStats};
pub use schema::SQLITE_INIT;

pub use actor::{DbActorHandle, spawn};
