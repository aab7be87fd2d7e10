//! Parse-and-validate layer between string-typed HTTP input and the review store.

pub mod criteria;
pub mod form;

pub use criteria::{ListCriteria, ListQuery, PER_PAGE, ReviewFilter, SortOrder, total_pages};
pub use form::{Rating, ReviewDraft, ReviewForm};
