use serde::{Deserialize, Serialize};

use super::user::User;
use validator::Validate;

use crate::validation::trimmed;

/// Recognised account roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Admin,
    SuperAdmin,
}

/// Roles allowed to perform back-office operations
pub const ADMIN_ROLES: &[Role] = &[Role::Admin, Role::SuperAdmin];

impl Role {
    pub const ALL: [Role; 3] = [Role::Customer, Role::Admin, Role::SuperAdmin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    /// Parse a stored role name. Unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == s)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a decimal string
    pub sub: String,
    pub username: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// The subject as a user id, if it is one
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 20, message = "username must be 1 to 20 characters"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 128, message = "password must be 1 to 128 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 20, message = "username must be 1 to 20 characters"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 6, max = 128, message = "password must be 6 to 128 characters"))]
    pub password: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(
        email(message = "email must be a valid email address"),
        length(max = 100, message = "email must be at most 100 characters")
    )]
    pub email: String,
    #[validate(length(max = 10, message = "gender must be at most 10 characters"))]
    pub gender: Option<String>,
    #[validate(length(max = 20, message = "telephone must be at most 20 characters"))]
    pub telephone: Option<String>,
    #[validate(length(max = 255, message = "introduce must be at most 255 characters"))]
    pub introduce: Option<String>,
}

/// Returned by login and registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrors;

    #[test]
    fn test_role_parse_round_trips_names() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("root"), None);
        assert_eq!(Role::parse("Admin"), None);
    }

    #[test]
    fn test_admin_roles() {
        assert!(!ADMIN_ROLES.contains(&Role::Customer));
        assert!(ADMIN_ROLES.contains(&Role::Admin));
        assert!(ADMIN_ROLES.contains(&Role::SuperAdmin));
    }

    #[test]
    fn test_role_serde_matches_as_str() {
        let json = serde_json::to_string(&Role::SuperAdmin).unwrap();
        assert_eq!(json, "\"super_admin\"");
    }

    #[test]
    fn test_register_request_collects_all_errors() {
        let req = RegisterRequest {
            username: String::new(),
            password: "abc".to_string(),
            email: "not-an-email".to_string(),
            gender: None,
            telephone: None,
            introduce: None,
        };
        let errors = ValidationErrors::from(req.validate().unwrap_err());
        let fields: Vec<&str> = errors.fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "password", "username"]);
    }

    #[test]
    fn test_username_length_applies_to_trimmed_value() {
        let padded = format!("  {}  ", "u".repeat(20));
        let req: RegisterRequest = serde_json::from_value(serde_json::json!({
            "username": padded,
            "password": "secret1",
            "email": " dev@example.com "
        }))
        .unwrap();
        assert_eq!(req.username, "u".repeat(20));
        assert_eq!(req.email, "dev@example.com");
        assert!(req.validate().is_ok());

        let req: LoginRequest =
            serde_json::from_value(serde_json::json!({"username": "   ", "password": "x"}))
                .unwrap();
        assert!(req.validate().is_err());
    }
}
