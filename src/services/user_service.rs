use serde_json::{json, Value};

use crate::error::ClientError;
use crate::gateway::{Gateway, Operation};
use crate::models::{NewUser, User, UserUpdate};

pub const USERS: Operation = Operation::query("GetUsers", "users", "query GetUsers {\n  users { id email role }\n}");

pub const USER: Operation = Operation::query(
    "GetUser",
    "user",
    "query GetUser($id: String!) {\n  user(id: $id) { id email role }\n}",
);

pub const CREATE_USER: Operation = Operation::mutation(
    "CreateUser",
    "createUser",
    "mutation CreateUser($createUserInput: CreateUserInput!) {\n  createUser(createUserInput: $createUserInput) { id email role }\n}",
);

pub const UPDATE_USER: Operation = Operation::mutation(
    "UpdateUser",
    "updateUser",
    "mutation UpdateUser($updateUserInput: UpdateUserInput!) {\n  updateUser(updateUserInput: $updateUserInput) { id email role }\n}",
);

pub const REMOVE_USER: Operation = Operation::mutation(
    "RemoveUser",
    "removeUser",
    "mutation RemoveUser($id: String!) {\n  removeUser(id: $id)\n}",
);

pub struct UserService {
    gateway: Gateway,
}

impl UserService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<User>, ClientError> {
        let users: Option<Vec<User>> = self.gateway.execute(&USERS, json!({})).await?;
        Ok(users.unwrap_or_default())
    }

    pub async fn get(&self, id: &str) -> Result<Option<User>, ClientError> {
        self.gateway.execute(&USER, json!({ "id": id })).await
    }

    pub async fn create(&self, user: &NewUser) -> Result<User, ClientError> {
        if user.email.trim().is_empty() || user.password.is_empty() {
            return Err(ClientError::InvalidInput("email and password are required".into()));
        }
        self.gateway
            .execute(&CREATE_USER, json!({ "createUserInput": user }))
            .await
    }

    pub async fn update(&self, id: &str, update: &UserUpdate) -> Result<User, ClientError> {
        let mut fields = match serde_json::to_value(update)? {
            Value::Object(fields) => fields,
            _ => serde_json::Map::new(),
        };
        // A blank password means "keep the current one"
        if matches!(fields.get("password"), Some(Value::String(p)) if p.is_empty()) {
            fields.remove("password");
        }
        fields.insert("id".into(), json!(id));
        self.gateway
            .execute(&UPDATE_USER, json!({ "updateUserInput": fields }))
            .await
    }

    pub async fn remove(&self, id: &str) -> Result<bool, ClientError> {
        let result: Value = self.gateway.execute(&REMOVE_USER, json!({ "id": id })).await?;
        Ok(!matches!(result, Value::Bool(false) | Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{gateway_as, ScriptedTransport};
    use crate::types::Role;

    #[tokio::test]
    async fn test_update_drops_blank_password() {
        let transport = ScriptedTransport::new();
        transport.data(
            "UpdateUser",
            json!({ "updateUser": { "id": "u-9", "email": "v@f.bo", "role": "ALMACENISTA" } }),
        );
        let users = UserService::new(gateway_as(Role::Admin, transport.clone()));

        let update = UserUpdate {
            email: None,
            password: Some(String::new()),
            role: Some(Role::Almacenista),
        };
        let user = users.update("u-9", &update).await.unwrap();
        assert_eq!(user.role, Role::Almacenista);
        assert_eq!(
            transport.variables("UpdateUser")[0],
            json!({ "updateUserInput": { "id": "u-9", "role": "ALMACENISTA" } })
        );
    }
}
