//! User CRUD handlers.
//!
//! Nothing is persisted: create and update echo the validated payload back,
//! delete echoes the id, and the listing is a fixed fixture.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use tracing::debug;

use crate::context::Context;
use crate::validation::{Validate, ValidationError, require_non_empty};
use crate::{Response, StatusCode};

/// User payload accepted by `POST /users` and `PUT /users/:id`.
///
/// `name` is required and must be non-empty; `age` defaults to `0` when absent
/// or `null` and is not range-checked. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub age: i64,
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or_default())
}

impl User {
    pub fn new(name: impl Into<String>, age: i64) -> Self {
        Self {
            name: name.into(),
            age,
        }
    }
}

impl Validate for User {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("name", &self.name)
    }
}

/// `POST /users`
pub async fn create_user(_ctx: Context, user: User) -> Response {
    debug!(name = %user.name, "create user");
    Response::json(
        StatusCode::Ok,
        &json!({
            "message": "User created successfully",
            "data": user,
        }),
    )
}

/// `PUT /users/:id`
pub async fn update_user(ctx: Context, user: User) -> Response {
    let id = ctx.param("id");
    debug!(%id, name = %user.name, "update user");
    Response::json(
        StatusCode::Ok,
        &json!({
            "message": "User updated successfully",
            "id": id,
            "data": user,
        }),
    )
}

/// `DELETE /users/:id`. The id is echoed verbatim, numeric or not.
pub async fn delete_user(ctx: Context) -> Response {
    let id = ctx.param("id");
    debug!(%id, "delete user");
    Response::json(
        StatusCode::Ok,
        &json!({
            "message": "User deleted successfully",
            "id": id,
        }),
    )
}

/// `GET /v1/users`
pub async fn list_users(_ctx: Context) -> Response {
    let users = [
        User::new("Alice", 30),
        User::new("Bob", 25),
        User::new("Charlie", 40),
    ];
    Response::json(StatusCode::Ok, &users)
}
