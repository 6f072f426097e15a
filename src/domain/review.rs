//! Peer reviews members leave on each other's profiles.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{MemberId, ReviewId};
use crate::error::ClubError;

/// Lowest accepted star rating.
pub const MIN_RATING: u8 = 1;
/// Highest accepted star rating.
pub const MAX_RATING: u8 = 5;

/// A stored review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Review {
    /// Review identifier.
    pub id: ReviewId,
    /// Member being reviewed.
    pub target_id: MemberId,
    /// Member who wrote the review.
    pub reviewer_id: MemberId,
    /// Star rating in `1..=5`.
    pub rating: u8,
    /// Required comment.
    pub comment: String,
    /// Submission time.
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Validates and builds a new review.
    ///
    /// # Errors
    ///
    /// Returns [`ClubError::Validation`] for a self-review, a rating outside
    /// `1..=5`, or a blank comment.
    pub fn new(
        reviewer_id: MemberId,
        target_id: MemberId,
        rating: u8,
        comment: &str,
    ) -> Result<Self, ClubError> {
        if reviewer_id == target_id {
            return Err(ClubError::validation("you cannot review yourself"));
        }
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(ClubError::validation(format!(
                "rating must be between {MIN_RATING} and {MAX_RATING}"
            )));
        }
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(ClubError::validation("a review comment is required"));
        }
        Ok(Self {
            id: ReviewId::new(),
            target_id,
            reviewer_id,
            rating,
            comment: comment.to_string(),
            created_at: Utc::now(),
        })
    }
}

/// Review with the reviewer's display name resolved.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReviewView {
    /// The stored review.
    #[serde(flatten)]
    pub review: Review,
    /// Reviewer display name, or the raw id if the reviewer was removed.
    pub reviewer_name: String,
}

/// Aggregate rating for a member.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct ReviewSummary {
    /// Number of reviews.
    pub count: usize,
    /// Mean rating, `None` when there are no reviews.
    pub average_rating: Option<f64>,
}

impl ReviewSummary {
    /// Summarises a set of reviews.
    #[must_use]
    pub fn of(reviews: &[Review]) -> Self {
        let count = reviews.len();
        let average_rating = if count == 0 {
            None
        } else {
            let sum: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
            #[allow(clippy::cast_precision_loss)]
            let mean = f64::from(sum) / count as f64;
            Some(mean)
        };
        Self {
            count,
            average_rating,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn self_review_is_rejected() {
        let id = MemberId::new();
        let result = Review::new(id, id, 5, "great");
        assert!(matches!(result, Err(ClubError::Validation(_))));
    }

    #[test]
    fn rating_bounds_are_enforced() {
        let (a, b) = (MemberId::new(), MemberId::new());
        assert!(Review::new(a, b, 0, "meh").is_err());
        assert!(Review::new(a, b, 6, "wow").is_err());
        assert!(Review::new(a, b, 1, "ok").is_ok());
    }

    #[test]
    fn comment_is_required() {
        let result = Review::new(MemberId::new(), MemberId::new(), 4, "  \n ");
        assert!(matches!(result, Err(ClubError::Validation(_))));
    }

    #[test]
    fn summary_averages_ratings() {
        let target = MemberId::new();
        let reviews: Vec<Review> = [5u8, 4, 3]
            .iter()
            .filter_map(|r| Review::new(MemberId::new(), target, *r, "fine").ok())
            .collect();
        let summary = ReviewSummary::of(&reviews);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.average_rating, Some(4.0));
        assert_eq!(ReviewSummary::of(&[]).average_rating, None);
    }
}
