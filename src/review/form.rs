use serde::Deserialize;
use std::str::FromStr;

use crate::error::ValidationError;

/// A star rating, always within `Rating::MIN..=Rating::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Rating)
            .ok_or(ValidationError::InvalidRating)
    }
}

impl FromStr for Rating {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidRating)?;
        Rating::try_from(value)
    }
}

/// Raw add/edit form body, exactly as submitted.
///
/// Absent fields deserialize to empty strings so that a missing field and a blank one are
/// rejected the same way.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub review: String,
    #[serde(default)]
    pub rating: String,
}

/// A validated review payload, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    pub name: String,
    pub review: String,
    pub rating: Rating,
}

impl ReviewForm {
    /// Trims every field, then checks presence before the rating range.
    pub fn validate(&self) -> Result<ReviewDraft, ValidationError> {
        let name = self.name.trim();
        let review = self.review.trim();
        let rating = self.rating.trim();

        if name.is_empty() || review.is_empty() || rating.is_empty() {
            return Err(ValidationError::MissingField);
        }

        Ok(ReviewDraft {
            name: name.to_string(),
            review: review.to_string(),
            rating: rating.parse()?,
        })
    }
}

impl ReviewDraft {
    pub fn new(name: &str, review: &str, rating: &str) -> Result<Self, ValidationError> {
        ReviewForm {
            name: name.to_string(),
            review: review.to_string(),
            rating: rating.to_string(),
        }
        .validate()
    }
}
