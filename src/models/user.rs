use serde::{Deserialize, Serialize};

use crate::types::Role;

/// Console user account. Ids are opaque strings, unlike catalog ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

/// Partial update; the password is only sent when it changes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

fn default_role() -> Role {
    Role::Vendedor
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_user_defaults_to_seller() {
        let user: NewUser = serde_json::from_value(json!({ "email": "a@b.c", "password": "x" })).unwrap();
        assert_eq!(user.role, Role::Vendedor);
    }

    #[test]
    fn test_update_omits_blank_fields() {
        let update = UserUpdate {
            role: Some(Role::Almacenista),
            ..UserUpdate::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({ "role": "ALMACENISTA" }));
    }
}
