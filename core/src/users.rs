use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An account. `password_hash` is an Argon2id PHC string and never leaves the
/// server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    /// Server-assigned when absent
    pub id: Option<String>,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

impl NewUser {
    pub fn into_user(self, generated_id: String) -> User {
        User {
            id: self.id.unwrap_or(generated_id),
            username: self.username,
            password_hash: self.password_hash,
            email: self.email,
            name: self.name,
            role: self.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_never_serialized() {
        let user = NewUser {
            id: Some("demo-user-id".into()),
            username: "demo".into(),
            password_hash: "$argon2id$v=19$...".into(),
            email: "demo@sovereign.local".into(),
            name: "Demo Founder".into(),
            role: "owner".into(),
        }
        .into_user("ignored".into());
        assert_eq!(user.id, "demo-user-id");

        let json = serde_json::to_value(&user).expect("user serializes");
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["username"], "demo");
    }
}
