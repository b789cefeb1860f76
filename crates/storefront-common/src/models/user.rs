use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use super::auth::Role;
use crate::validation::{trimmed, trimmed_opt};

pub const STATE_DISABLED: i16 = 0;
pub const STATE_ENABLED: i16 = 1;

/// User model (safe for client responses -- no password_hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub gender: Option<String>,
    pub telephone: Option<String>,
    pub introduce: Option<String>,
    pub role: String,
    pub state: i16,
    pub regist_time: DateTime<Utc>,
}

/// PUT /users/me -- only the fields present are changed
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(
        email(message = "email must be a valid email address"),
        length(max = 100, message = "email must be at most 100 characters")
    )]
    pub email: Option<String>,
    #[validate(length(max = 10, message = "gender must be at most 10 characters"))]
    pub gender: Option<String>,
    #[validate(length(max = 20, message = "telephone must be at most 20 characters"))]
    pub telephone: Option<String>,
    #[validate(length(max = 255, message = "introduce must be at most 255 characters"))]
    pub introduce: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateRoleRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(custom(function = "known_role"))]
    pub role: String,
}

impl UpdateRoleRequest {
    /// The requested role, once validated.
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

fn known_role(role: &str) -> Result<(), ValidationError> {
    if Role::parse(role).is_some() {
        return Ok(());
    }
    let mut error = ValidationError::new("role");
    error.message = Some(Cow::from(if role.is_empty() {
        "role must not be blank"
    } else {
        "role must be one of customer, admin, super_admin"
    }));
    Err(error)
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateStateRequest {
    #[validate(
        required(message = "state must be 0 or 1"),
        range(min = 0, max = 1, message = "state must be 0 or 1")
    )]
    pub state: Option<i64>,
}

impl UpdateStateRequest {
    /// The requested state, once validated.
    pub fn state(&self) -> Option<i16> {
        self.state
            .and_then(|s| i16::try_from(s).ok())
            .filter(|s| *s == STATE_DISABLED || *s == STATE_ENABLED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_request_rejects_unknown_role() {
        let req = UpdateRoleRequest {
            role: "root".to_string(),
        };
        assert!(req.validate().is_err());
        assert!(req.role().is_none());
    }

    #[test]
    fn test_role_request_trims_before_matching() {
        let req: UpdateRoleRequest =
            serde_json::from_value(serde_json::json!({"role": " admin "})).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.role(), Some(Role::Admin));
    }

    #[test]
    fn test_role_request_accepts_known_role() {
        let req = UpdateRoleRequest {
            role: "admin".to_string(),
        };
        assert!(req.validate().is_ok());
        assert_eq!(req.role(), Some(Role::Admin));
    }

    #[test]
    fn test_state_request_bounds() {
        assert!(UpdateStateRequest { state: Some(0) }.validate().is_ok());
        assert!(UpdateStateRequest { state: Some(1) }.validate().is_ok());
        assert!(UpdateStateRequest { state: Some(2) }.validate().is_err());
        assert!(UpdateStateRequest { state: Some(-1) }.validate().is_err());
        assert!(UpdateStateRequest { state: None }.validate().is_err());
        assert_eq!(UpdateStateRequest { state: Some(1) }.state(), Some(STATE_ENABLED));
        assert_eq!(UpdateStateRequest { state: Some(7) }.state(), None);
    }

    #[test]
    fn test_profile_update_with_no_fields_is_valid() {
        assert!(UpdateProfileRequest::default().validate().is_ok());
    }
}
