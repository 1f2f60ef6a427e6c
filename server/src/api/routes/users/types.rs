//! User API types

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::constants::MAX_AVATAR_PATH_LENGTH;
use crate::data::types::{RoleAction, RoleRow};

/// Role DTO for API responses
#[derive(Debug, Serialize)]
pub struct RoleDto {
    pub id: i64,
    pub name: String,
}

impl From<RoleRow> for RoleDto {
    fn from(row: RoleRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

/// Requested role mutation
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleActionDto {
    Add,
    Remove,
}

impl From<RoleActionDto> for RoleAction {
    fn from(action: RoleActionDto) -> Self {
        match action {
            RoleActionDto::Add => Self::Add,
            RoleActionDto::Remove => Self::Remove,
        }
    }
}

/// Request body for PUT /users/{id}/roles
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRolesRequest {
    #[validate(length(min = 1, message = "roles should not be empty"))]
    pub roles: Vec<String>,
    pub action: RoleActionDto,
}

/// Request body for PUT /users/{id}/avatar. A missing or blank path restores
/// the default avatar.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAvatarRequest {
    #[validate(length(
        max = MAX_AVATAR_PATH_LENGTH,
        message = "avatarPath must be at most 255 characters"
    ))]
    pub avatar_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_roles_request_parses() {
        let req: UpdateRolesRequest =
            serde_json::from_str(r#"{"roles":["admin"],"action":"remove"}"#).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(RoleAction::from(req.action), RoleAction::Remove);
    }

    #[test]
    fn test_unknown_action_rejected() {
        let result =
            serde_json::from_str::<UpdateRolesRequest>(r#"{"roles":["admin"],"action":"toggle"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_roles_invalid() {
        let req: UpdateRolesRequest =
            serde_json::from_str(r#"{"roles":[],"action":"add"}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_update_avatar_request() {
        let req: UpdateAvatarRequest =
            serde_json::from_str(r#"{"avatarPath":"avatars/7.png"}"#).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.avatar_path.as_deref(), Some("avatars/7.png"));

        let req: UpdateAvatarRequest = serde_json::from_str("{}").unwrap();
        assert!(req.avatar_path.is_none());

        let req = UpdateAvatarRequest {
            avatar_path: Some("a".repeat(256)),
        };
        assert!(req.validate().is_err());
    }
}
