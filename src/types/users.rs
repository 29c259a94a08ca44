//! Request/response bodies for the user API.

use crate::db::models::{RoleRecord, UserRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email, length(max = 100))]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(max = 100))]
    pub full_name: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub is_superuser: bool,
}

/// Partial update. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email, length(max = 100))]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
    #[validate(length(max = 100))]
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.password.is_none()
            && self.full_name.is_none()
            && self.bio.is_none()
            && self.is_active.is_none()
            && self.is_superuser.is_none()
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Public view of a user; the password hash never crosses the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub bio: Option<String>,
}

impl From<UserRecord> for UserProfile {
    fn from(r: UserRecord) -> Self {
        Self {
            id: r.id,
            username: r.username,
            email: r.email,
            full_name: r.full_name,
            is_active: r.is_active,
            is_superuser: r.is_superuser,
            created_at: r.created_at,
            updated_at: r.updated_at,
            bio: r.bio,
        }
    }
}

pub const DEFAULT_PER_PAGE: u32 = 25;
pub const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ListParams {
    pub page: u32,
    pub per_page: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl ListParams {
    /// Clamped (limit, offset) pair for the storage layer.
    pub fn limit_offset(&self) -> (i64, i64) {
        let per_page = self.per_page.clamp(1, MAX_PER_PAGE) as i64;
        let page = self.page.max(1) as i64;
        (per_page, (page - 1) * per_page)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserPage {
    pub items: Vec<UserProfile>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

#[derive(Debug, Deserialize)]
pub struct RoleBody {
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoleProfile {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

impl From<RoleRecord> for RoleProfile {
    fn from(r: RoleRecord) -> Self {
        Self {
            id: r.id,
            name: r.name,
            description: r.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_params_clamp_to_sane_bounds() {
        let p = ListParams::default();
        assert_eq!(p.limit_offset(), (25, 0));

        let p = ListParams {
            page: 3,
            per_page: 10,
        };
        assert_eq!(p.limit_offset(), (10, 20));

        let p = ListParams {
            page: 0,
            per_page: 10_000,
        };
        assert_eq!(p.limit_offset(), (MAX_PER_PAGE as i64, 0));
    }

    #[test]
    fn create_request_rejects_bad_email() {
        let req = CreateUserRequest {
            username: "alice".to_string(),
            email: "not-an-email".to_string(),
            password: "correct horse".to_string(),
            full_name: None,
            bio: None,
            is_superuser: false,
        };
        assert!(validator::Validate::validate(&req).is_err());
    }

    #[test]
    fn create_request_rejects_short_password() {
        let req = CreateUserRequest {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "short".to_string(),
            full_name: None,
            bio: None,
            is_superuser: false,
        };
        assert!(validator::Validate::validate(&req).is_err());
    }
}
