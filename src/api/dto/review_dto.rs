//! Review DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ReviewSummary, ReviewView};

/// Request body for `POST /members/{id}/reviews`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubmitReviewRequest {
    /// Star rating in `1..=5`. Defaults to 5.
    #[serde(default = "default_rating")]
    pub rating: u8,
    /// Required comment.
    #[serde(default)]
    pub comment: String,
}

fn default_rating() -> u8 {
    crate::domain::review::MAX_RATING
}

/// Response body for `GET /members/{id}/reviews`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewListResponse {
    /// Count and mean rating.
    pub summary: ReviewSummary,
    /// Reviews, newest first.
    pub data: Vec<ReviewView>,
}
