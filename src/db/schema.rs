//! SQL DDL for initializing the database schema.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema includes:
/// - `reviews` table (one movie review per row; `AUTOINCREMENT` so ids are never reused)
/// - indexes backing the rating filters and the default newest-first order
pub const SQLITE_INIT: &str = r#"
-- ---------------------------------------------------------------------------
-- Movie reviews
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS reviews (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    name_folded TEXT NOT NULL, -- lowercased `name`, folded in Rust for search
    review TEXT NOT NULL CHECK (length(trim(review)) > 0),
    rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_reviews_rating ON reviews(rating);

CREATE INDEX IF NOT EXISTS idx_reviews_created_at ON reviews(created_at);
"#;
