//! Points and ledger DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::PaginationMeta;
use crate::domain::{ActivityRecord, ActivityView};
use crate::service::AppliedChange;

/// Request body for `POST /members/{id}/points`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ApplyPointsRequest {
    /// Signed, non-zero delta.
    pub delta: i64,
    /// Reason for the change. Required.
    #[serde(default)]
    pub description: String,
}

/// Response body for `POST /members/{id}/points` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct ApplyPointsResponse {
    /// The ledger entry written, carrying the requested delta.
    pub activity: ActivityRecord,
    /// Member total after the zero floor, as committed with `activity`.
    pub total_points: i64,
}

impl From<AppliedChange> for ApplyPointsResponse {
    fn from(applied: AppliedChange) -> Self {
        Self {
            activity: applied.record,
            total_points: applied.total_points,
        }
    }
}

/// Paginated response for `GET /members/{id}/activities`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityListResponse {
    /// Entries, newest first.
    pub data: Vec<ActivityView>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
