//! Listing criteria: string query parameters in, typed criteria out.
//!
//! `ListQuery` is what the browser sends. `ListCriteria::from` is total: anything that does not
//! parse is dropped back to its default instead of failing the request.

use serde::{Deserialize, Serialize};

/// Fixed page size of the home listing.
pub const PER_PAGE: u32 = 5;

/// Raw listing query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub min_rating: Option<String>,
    pub max_rating: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// `created_at` descending.
    #[default]
    Newest,
    /// Rating descending.
    RatingHigh,
    /// Rating ascending.
    RatingLow,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "high" => SortOrder::RatingHigh,
            "low" => SortOrder::RatingLow,
            _ => SortOrder::Newest,
        }
    }

    /// Query-string form; empty for the default order.
    pub fn as_param(self) -> &'static str {
        match self {
            SortOrder::Newest => "",
            SortOrder::RatingHigh => "high",
            SortOrder::RatingLow => "low",
        }
    }
}

/// The predicate half of the criteria: which rows belong to the filtered set.
///
/// Counting, aggregation, the top pick and page slicing all render their `WHERE` clause from
/// this one value (see `db::query`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReviewFilter {
    /// Case-insensitive literal substring of `name`.
    pub search: Option<String>,
    pub min_rating: Option<i64>,
    pub max_rating: Option<i64>,
}

/// Validated listing criteria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListCriteria {
    pub filter: ReviewFilter,
    pub sort: SortOrder,
    /// 1-based.
    pub page: u32,
}

impl Default for ListCriteria {
    fn default() -> Self {
        Self {
            filter: ReviewFilter::default(),
            sort: SortOrder::default(),
            page: 1,
        }
    }
}

impl From<ListQuery> for ListCriteria {
    fn from(query: ListQuery) -> Self {
        let search = query
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let page = query
            .page
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);

        Self {
            filter: ReviewFilter {
                search,
                min_rating: parse_bound(query.min_rating.as_deref()),
                max_rating: parse_bound(query.max_rating.as_deref()),
            },
            sort: query
                .sort
                .as_deref()
                .map(SortOrder::parse)
                .unwrap_or_default(),
            page,
        }
    }
}

fn parse_bound(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
}

impl ListCriteria {
    pub fn filter(&self) -> &ReviewFilter {
        &self.filter
    }

    /// Row offset of the first record on the requested page.
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(PER_PAGE)
    }

    /// Query string (with leading `?`) for `page`, carrying over every active filter and sort.
    pub fn to_query_string(&self, page: u32) -> String {
        let mut ser = url::form_urlencoded::Serializer::new(String::new());
        if let Some(search) = &self.filter.search {
            ser.append_pair("search", search);
        }
        if self.sort != SortOrder::Newest {
            ser.append_pair("sort", self.sort.as_param());
        }
        if let Some(min) = self.filter.min_rating {
            ser.append_pair("min_rating", &min.to_string());
        }
        if let Some(max) = self.filter.max_rating {
            ser.append_pair("max_rating", &max.to_string());
        }
        ser.append_pair("page", &page.to_string());
        format!("?{}", ser.finish())
    }
}

/// Number of pages needed for `total` rows; zero rows need zero pages.
pub fn total_pages(total: u64) -> u64 {
    total.div_ceil(u64::from(PER_PAGE))
}
