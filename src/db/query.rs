//! ReviewFilter / SortOrder -> SQL.
//!
//! This sits in the `db` module because it contains SQL/table knowledge. Every listing query
//! (stats, top pick, page) starts from `select_filtered`, so they cannot disagree on which rows
//! belong to the filtered set.

use sqlx::{QueryBuilder, Sqlite};

use crate::review::{ReviewFilter, SortOrder};

pub(crate) const REVIEW_COLUMNS: &str = "id, name, review, rating, created_at, updated_at";

impl ReviewFilter {
    /// Appends ` WHERE ...` (or nothing) for the active predicates, joined with `AND`.
    pub(crate) fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        let mut sep = " WHERE ";

        if let Some(search) = &self.search {
            // instr() keeps `%` and `_` literal.
            qb.push(sep)
                .push("instr(name_folded, ")
                .push_bind(fold_name(search))
                .push(") > 0");
            sep = " AND ";
        }
        if let Some(min) = self.min_rating {
            qb.push(sep).push("rating >= ").push_bind(min);
            sep = " AND ";
        }
        if let Some(max) = self.max_rating {
            qb.push(sep).push("rating <= ").push_bind(max);
        }
    }
}

impl SortOrder {
    /// Total order: every variant ends on `id` so page boundaries are stable.
    pub(crate) fn order_by(self) -> &'static str {
        match self {
            SortOrder::Newest => " ORDER BY created_at DESC, id DESC",
            SortOrder::RatingHigh => " ORDER BY rating DESC, created_at DESC, id DESC",
            SortOrder::RatingLow => " ORDER BY rating ASC, created_at DESC, id DESC",
        }
    }
}

/// Case folding used for the `name_folded` column and for search terms.
/// Rust's `to_lowercase` is Unicode-aware, unlike SQLite's ASCII-only `lower()`.
pub(crate) fn fold_name(name: &str) -> String {
    name.to_lowercase()
}

/// `SELECT <projection> FROM reviews WHERE <filter>`.
pub(crate) fn select_filtered<'args>(
    projection: &str,
    filter: &ReviewFilter,
) -> QueryBuilder<'args, Sqlite> {
    let mut qb = QueryBuilder::new(format!("SELECT {projection} FROM reviews"));
    filter.push_where(&mut qb);
    qb
}

/// Count and mean rating of the filtered set.
pub(crate) fn stats_query<'args>(filter: &ReviewFilter) -> QueryBuilder<'args, Sqlite> {
    select_filtered("COUNT(*), AVG(rating)", filter)
}

/// The single best-rated row of the filtered set, lowest id on ties.
pub(crate) fn top_rated_query<'args>(filter: &ReviewFilter) -> QueryBuilder<'args, Sqlite> {
    let mut qb = select_filtered(REVIEW_COLUMNS, filter);
    qb.push(" ORDER BY rating DESC, id ASC LIMIT 1");
    qb
}

/// One page of the filtered set in `sort` order.
pub(crate) fn page_query<'args>(
    filter: &ReviewFilter,
    sort: SortOrder,
    limit: i64,
    offset: i64,
) -> QueryBuilder<'args, Sqlite> {
    let mut qb = select_filtered(REVIEW_COLUMNS, filter);
    qb.push(sort.order_by());
    qb.push(" LIMIT ").push_bind(limit);
    qb.push(" OFFSET ").push_bind(offset);
    qb
}

/// Rounds half away from zero to 2 decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_predicates_no_where() {
        let qb = stats_query(&ReviewFilter::default());
        assert_eq!(qb.sql(), "SELECT COUNT(*), AVG(rating) FROM reviews");
    }

    #[test]
    fn predicates_are_conjoined() {
        let filter = ReviewFilter {
            search: Some("up".to_string()),
            min_rating: Some(2),
            max_rating: Some(4),
        };
        let qb = select_filtered("id", &filter);
        assert_eq!(
            qb.sql(),
            "SELECT id FROM reviews WHERE instr(name_folded, ?) > 0 AND rating >= ? AND rating <= ?"
        );
    }

    #[test]
    fn only_max_bound() {
        let filter = ReviewFilter {
            max_rating: Some(3),
            ..Default::default()
        };
        let qb = select_filtered("id", &filter);
        assert_eq!(qb.sql(), "SELECT id FROM reviews WHERE rating <= ?");
    }

    #[test]
    fn page_query_orders_then_limits() {
        let qb = page_query(&ReviewFilter::default(), SortOrder::RatingLow, 5, 10);
        assert_eq!(
            qb.sql(),
            format!(
                "SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY rating ASC, created_at DESC, id DESC LIMIT ? OFFSET ?"
            )
        );
    }

    #[test]
    fn folding_is_unicode_aware() {
        assert_eq!(fold_name("AMÉLIE"), "amélie");
        assert_eq!(fold_name("Ötzi"), fold_name("öTZI"));
    }

    #[test]
    fn rounding() {
        assert!((round2(4.0) - 4.0).abs() < f64::EPSILON);
        assert!((round2(10.0 / 3.0) - 3.33).abs() < 1e-9);
        assert!((round2(11.0 / 3.0) - 3.67).abs() < 1e-9);
    }
}
