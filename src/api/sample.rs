//! Static sample data, query echo and redirect handlers.

use serde_json::json;

use crate::context::Context;
use crate::{Response, StatusCode};

/// `GET /sample`
pub async fn sample(_ctx: Context) -> Response {
    Response::json(
        StatusCode::Ok,
        &json!({
            "message": "サンプルAPI",
            "status": 200,
            "int": 1,
            "map": {
                "key1": 100,
                "key2": 200,
            },
        }),
    )
}

/// `GET /goods?category=..&price=..`
///
/// `category` defaults to `""` and `price` to `"all"`.
pub async fn goods(ctx: Context) -> Response {
    Response::json(
        StatusCode::Ok,
        &json!({
            "category": ctx.query_or("category", ""),
            "price": ctx.query_or("price", "all"),
        }),
    )
}

/// `GET /about`: permanent redirect to `/sample`.
pub async fn about(_ctx: Context) -> Response {
    Response::redirect(StatusCode::MovedPermanently, "/sample")
}
