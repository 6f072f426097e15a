//! Role DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{MemberId, Role};

/// Request body for `PUT /members/{id}/role`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetRoleRequest {
    /// Requested role. Legacy names (`admin1`, `admin2`) are accepted.
    pub role: Role,
}

/// Response body for the role endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoleResponse {
    /// Member the role belongs to.
    pub member_id: MemberId,
    /// Effective role.
    pub role: Role,
}
