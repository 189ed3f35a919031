//! User Model

use super::status::UserRole;
use serde::{Deserialize, Serialize};

/// Staff user
///
/// `password_hash` is an argon2 PHC string and never leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub tenant_id: i64,
    pub username: String,
    #[serde(skip)]
    pub password_hash: String,
    pub full_name: String,
    pub role: UserRole,
    pub is_active: bool,
}

/// Register / create user payload (plaintext password, hashed server-side)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreate {
    pub tenant_id: i64,
    pub username: String,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub role: UserRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: 1,
            tenant_id: 1,
            username: "admin".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            full_name: "Admin".into(),
            role: UserRole::Admin,
            is_active: true,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(!json.to_string().contains("argon2"));
        assert_eq!(json["tenantId"], 1);
        assert_eq!(json["role"], "admin");
    }

    #[test]
    fn test_user_create_default_role() {
        let req: UserCreate = serde_json::from_str(
            r#"{"tenantId":1,"username":"ali","password":"pw","fullName":"Ali"}"#,
        )
        .unwrap();
        assert_eq!(req.role, UserRole::Waiter);
    }
}
