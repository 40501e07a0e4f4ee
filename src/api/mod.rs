//! The service's route table.
//!
//! | Method | Path          | Handler                  |
//! |--------|---------------|--------------------------|
//! | GET    | `/sample`     | [`sample::sample`]       |
//! | POST   | `/users`      | [`users::create_user`]   |
//! | PUT    | `/users/:id`  | [`users::update_user`]   |
//! | DELETE | `/users/:id`  | [`users::delete_user`]   |
//! | GET    | `/v1/users`   | [`users::list_users`]    |
//! | GET    | `/goods`      | [`sample::goods`]        |
//! | GET    | `/about`      | [`sample::about`]        |

pub mod sample;
pub mod users;

pub use users::User;

use crate::Router;
use crate::middleware::{LoggerMiddleware, RecoveryMiddleware};
use crate::router::validated;

/// Build the route table without any middleware.
pub fn routes() -> Router {
    let mut router = Router::new();

    router.get("/sample", sample::sample);

    router.post("/users", validated(users::create_user));
    router.put("/users/:id", validated(users::update_user));
    router.delete("/users/:id", users::delete_user);

    let mut v1 = router.group("/v1");
    v1.get("/users", users::list_users);

    router.get("/goods", sample::goods);
    router.get("/about", sample::about);

    router
}

/// Build the route table wrapped in request logging and panic recovery.
pub fn router() -> Router {
    let mut router = routes();
    router.layer(LoggerMiddleware);
    router.layer(RecoveryMiddleware);
    router
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_every_route() {
        assert_eq!(routes().len(), 7);
    }
}
