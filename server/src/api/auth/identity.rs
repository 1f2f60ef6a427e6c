//! Identity projection
//!
//! Maps a stored user (with roles and optional profile) to the payload that is
//! embedded in tokens and handed to handlers. The mapping is total and
//! idempotent: the password hash is always dropped, roles are flattened to
//! unique names in storage order, and a missing avatar becomes
//! [`DEFAULT_AVATAR_PATH`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::types::timestamp;
use crate::core::constants::{DEFAULT_AVATAR_PATH, ROLE_ADMIN};
use crate::data::types::UserRecord;

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub user_roles: Vec<String>,
    pub profile: Profile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub avatar_path: String,
}

impl Identity {
    pub fn has_role(&self, role: &str) -> bool {
        self.user_roles.iter().any(|r| r == role)
    }

    /// Only the exact `admin` role counts; `read_only_admin` does not.
    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }
}

/// Public user view used by the user listing endpoints
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    #[serde(flatten)]
    pub identity: Identity,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_following: Option<bool>,
}

/// Project a stored user into an [`Identity`]
pub fn project(record: &UserRecord) -> Identity {
    let mut user_roles: Vec<String> = Vec::with_capacity(record.roles.len());
    for role in &record.roles {
        if !user_roles.contains(&role.name) {
            user_roles.push(role.name.clone());
        }
    }

    let avatar_path = record
        .avatar_path
        .as_deref()
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_AVATAR_PATH)
        .to_string();

    Identity {
        id: record.user.id,
        name: record.user.name.clone(),
        email: record.user.email.clone(),
        user_roles,
        profile: Profile { avatar_path },
    }
}

/// Project a stored user into [`UserDetails`], with follow status relative to a caller
pub fn details(record: &UserRecord, is_following: Option<bool>) -> UserDetails {
    UserDetails {
        identity: project(record),
        created_at: timestamp(record.user.created_at),
        updated_at: timestamp(record.user.updated_at),
        is_following,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::{RoleRow, UserRow};

    fn record(roles: &[&str], avatar_path: Option<&str>) -> UserRecord {
        UserRecord {
            user: UserRow {
                id: 7,
                name: "Test User".to_string(),
                email: "test@example.com".to_string(),
                password_hash: "$2b$10$secret".to_string(),
                created_at: 1_700_000_000,
                updated_at: 1_700_000_100,
            },
            roles: roles
                .iter()
                .enumerate()
                .map(|(i, name)| RoleRow {
                    id: i as i64 + 1,
                    name: name.to_string(),
                })
                .collect(),
            avatar_path: avatar_path.map(String::from),
        }
    }

    #[test]
    fn test_project_defaults_avatar() {
        let identity = project(&record(&["general"], None));
        assert_eq!(identity.id, 7);
        assert_eq!(identity.user_roles, vec!["general"]);
        assert_eq!(identity.profile.avatar_path, DEFAULT_AVATAR_PATH);

        let identity = project(&record(&["general"], Some("")));
        assert_eq!(identity.profile.avatar_path, DEFAULT_AVATAR_PATH);
    }

    #[test]
    fn test_project_keeps_avatar() {
        let identity = project(&record(&["general"], Some("me.png")));
        assert_eq!(identity.profile.avatar_path, "me.png");
    }

    #[test]
    fn test_project_drops_password_hash() {
        let json = serde_json::to_string(&project(&record(&["general"], None))).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.to_lowercase().contains("password"));
    }

    #[test]
    fn test_project_dedups_roles() {
        let identity = project(&record(&["general", "admin", "general"], None));
        assert_eq!(identity.user_roles, vec!["general", "admin"]);
    }

    #[test]
    fn test_project_is_idempotent() {
        let rec = record(&["general", "admin"], Some("a.png"));
        let first = serde_json::to_vec(&project(&rec)).unwrap();
        let second = serde_json::to_vec(&project(&rec)).unwrap();
        assert_eq!(first, second);

        let first = serde_json::to_vec(&details(&rec, Some(true))).unwrap();
        let second = serde_json::to_vec(&details(&rec, Some(true))).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_admin_check_is_exact() {
        assert!(project(&record(&["general", "admin"], None)).is_admin());
        assert!(!project(&record(&["read_only_admin"], None)).is_admin());
        assert!(!project(&record(&["general"], None)).is_admin());
    }

    #[test]
    fn test_identity_json_shape() {
        let value = serde_json::to_value(project(&record(&["general"], None))).unwrap();
        assert_eq!(value["userRoles"], serde_json::json!(["general"]));
        assert_eq!(value["profile"]["avatarPath"], DEFAULT_AVATAR_PATH);
    }

    #[test]
    fn test_details_json_shape() {
        let value = serde_json::to_value(details(&record(&["general"], None), None)).unwrap();
        assert_eq!(value["name"], "Test User");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("isFollowing").is_none());

        let value =
            serde_json::to_value(details(&record(&["general"], None), Some(false))).unwrap();
        assert_eq!(value["isFollowing"], false);
    }
}
