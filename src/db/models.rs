use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, PartialEq, FromRow)]
pub struct DbReview {
    pub id: i64,
    pub name: String,
    pub review: String,
    pub rating: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregates over the filtered (unpaginated) set of one listing.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReviewStats {
    pub total: u64,
    /// Mean rating rounded to 2 decimals; `0.0` for an empty set.
    pub average_rating: f64,
    /// Highest rating in the set, lowest id among ties.
    pub highest_rated: Option<DbReview>,
    pub total_pages: u64,
}

/// One page of a listing together with the stats of the whole filtered set.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReviewPage {
    pub page: u32,
    pub reviews: Vec<DbReview>,
    pub stats: ReviewStats,
}
