//! Request routing — map URL patterns and HTTP methods to handler functions.
//!
//! This module provides [`Router`], which dispatches incoming HTTP requests to handler
//! functions based on the request method and URL path. Two pattern styles are supported:
//!
//! | Pattern              | Example match              | Captured params              |
//! |----------------------|----------------------------|------------------------------|
//! | `/users`             | `/users`                   | *(none)*                     |
//! | `/users/:id`         | `/users/42`                | `id → "42"`                  |
//!
//! A parameter segment matches exactly one non-empty path segment and binds its
//! percent-decoded text, so `/users/a%20b` binds `id → "a b"`. Trailing slashes are
//! normalized on both patterns and incoming paths, so `/users/` and `/users` are treated
//! as equivalent.
//!
//! Routes are matched in registration order; the first route whose method and pattern both
//! match the incoming request wins. Registering the same method and pattern twice replaces
//! the earlier handler in place, so the last registration is the one that serves.
//!
//! Routes can be registered under a shared prefix with [`Router::group`], and a handler can
//! declare a typed JSON body with [`validated`].

use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use percent_encoding::percent_decode_str;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use crate::context::{Context, PathParams};
use crate::middleware::{Middleware, MiddlewareHandler, Next, from_middleware};
use crate::validation::Validate;
use crate::{Method, Request, Response, StatusCode};

/// Boxed, sendable future resolving to a [`Response`].
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// Type-erased, heap-allocated async handler that processes a [`Context`] and returns a
/// [`Response`].
///
/// Handlers are stored behind `Arc<dyn Fn(…)>` so they can be cloned and shared across
/// threads without copying the underlying closure. In practice you never construct this
/// type directly; use [`Router::get`], [`Router::post`], and the other method-specific
/// helpers instead.
pub type Handler = Arc<dyn Fn(Context) -> BoxFuture + Send + Sync + 'static>;

/// Conversion trait for async handler functions.
///
/// Any `Fn(Context) -> impl Future<Output = Response> + Send` that is also
/// `Send + Sync + 'static` implements this trait automatically via the blanket impl
/// below. Router methods accept `impl IntoHandler` so the two-type-parameter where-bound
/// does not need to be repeated at every call site.
pub trait IntoHandler: Send + Sync + 'static {
    /// Call the handler with the given context, boxing the returned future.
    fn call(&self, ctx: Context) -> BoxFuture;
}

impl<T, F> IntoHandler for T
where
    T: Fn(Context) -> F + Send + Sync + 'static,
    F: Future<Output = Response> + Send + 'static,
{
    fn call(&self, ctx: Context) -> BoxFuture {
        Box::pin((self)(ctx))
    }
}

/// Wrap a handler that takes a typed JSON body.
///
/// The request body is decoded into `T` and validated before `handler` runs. On failure
/// the route answers `400 Bad Request` with `{"error": "<message>"}` and `handler` is
/// never called.
///
/// # Examples
///
/// ```rust,no_run
/// use sample_api::{Response, Router, StatusCode};
/// use sample_api::api::User;
/// use sample_api::router::validated;
///
/// let mut router = Router::new();
/// router.post(
///     "/users",
///     validated(|_ctx, user: User| async move { Response::json(StatusCode::Ok, &user) }),
/// );
/// ```
pub fn validated<T, H, F>(handler: H) -> impl IntoHandler
where
    T: DeserializeOwned + Validate + Send + 'static,
    H: Fn(Context, T) -> F + Send + Sync + 'static,
    F: Future<Output = Response> + Send + 'static,
{
    move |ctx: Context| -> BoxFuture {
        match ctx.json::<T>() {
            Ok(body) => Box::pin(handler(ctx, body)),
            Err(e) => {
                debug!(
                    method = %ctx.request().method(),
                    path = %ctx.request().path(),
                    error = %e,
                    "request body rejected"
                );
                Box::pin(std::future::ready(e.into_response()))
            }
        }
    }
}

/// Body of the `404` answer for unmatched requests.
pub const NOT_FOUND_MESSAGE: &str = "404 page not found";

// A single path segment, either a literal string or a named capture (`:name`).
#[derive(Debug, Clone)]
enum Segment {
    Static(String),
    Parameter(String),
}

// Compiled representation of a route pattern string.
#[derive(Debug, Clone)]
enum Pattern {
    // Matches one exact path string, e.g. `/users`.
    Exact(String),
    // Matches a fixed number of segments where some may be named captures, e.g. `/users/:id`.
    Parameterized { segments: Vec<Segment> },
}

impl Pattern {
    /// Parse a route pattern string into a `Pattern`.
    ///
    /// A pattern containing `:` compiles to [`Pattern::Parameterized`]; anything else is a
    /// literal [`Pattern::Exact`] match. A trailing slash (other than on the root `/`) is
    /// stripped first so that `/users/` and `/users` compile to identical patterns.
    fn parse(pattern: &str) -> Self {
        let pattern = trim_trailing_slash(pattern);

        if pattern.contains(':') {
            let segments = pattern
                .split('/')
                .filter(|s| !s.is_empty())
                .map(|s| match s.strip_prefix(':') {
                    Some(p) => Segment::Parameter(p.to_string()),
                    None => Segment::Static(s.to_string()),
                })
                .collect();

            return Pattern::Parameterized { segments };
        }

        Pattern::Exact(pattern.to_string())
    }

    // Try to match `path` against this pattern, returning extracted [`PathParams`] on success.
    fn matches(&self, path: &str) -> Option<PathParams> {
        let path = trim_trailing_slash(path);

        match self {
            Pattern::Exact(p) => (p == path).then(PathParams::new),
            Pattern::Parameterized { segments } => {
                // Leading slash yields one empty segment; any other empty segment
                // (`/users//`) makes the segment count disagree.
                let path_segments: Vec<&str> = path.strip_prefix('/')?.split('/').collect();

                if segments.len() != path_segments.len() {
                    return None;
                }

                let mut params = PathParams::new();
                for (seg, path_seg) in segments.iter().zip(path_segments) {
                    match seg {
                        Segment::Static(s) if s != path_seg => return None,
                        Segment::Static(_) => {}
                        Segment::Parameter(_) if path_seg.is_empty() => return None,
                        Segment::Parameter(name) => {
                            let value = percent_decode_str(path_seg).decode_utf8_lossy();
                            params.insert(name.clone(), value.into_owned());
                        }
                    }
                }

                Some(params)
            }
        }
    }
}

fn trim_trailing_slash(path: &str) -> &str {
    if path != "/" && path.ends_with('/') {
        &path[..path.len() - 1]
    } else {
        path
    }
}

/// Join a group prefix and a route pattern into one absolute pattern.
///
/// `("/v1", "/users")`, `("/v1/", "users")` and `("v1", "/users")` all give `/v1/users`;
/// an empty or `/` pattern gives the prefix itself.
fn join_paths(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_matches('/');
    let path = path.trim_start_matches('/');

    match (prefix.is_empty(), path.is_empty()) {
        (true, true) => "/".to_owned(),
        (true, false) => format!("/{path}"),
        (false, true) => format!("/{prefix}"),
        (false, false) => format!("/{prefix}/{path}"),
    }
}

// A single registered route binding a method + pattern to a handler.
struct Route {
    method: Method,
    source: String,
    pattern: Pattern,
    handler: Handler,
}

impl Route {
    fn new(method: Method, source: String, handler: Handler) -> Self {
        Self {
            method,
            pattern: Pattern::parse(&source),
            source,
            handler,
        }
    }

    // Returns `Some(params)` when both the HTTP method and path pattern match, `None` otherwise.
    fn matches(&self, method: &Method, path: &str) -> Option<PathParams> {
        if &self.method == method {
            self.pattern.matches(path)
        } else {
            None
        }
    }
}

/// HTTP request router that dispatches requests to registered handler functions.
///
/// Routes are evaluated in registration order; the first route whose HTTP method and path
/// pattern both match the incoming request is used. When no route matches, a
/// `404 Not Found` response with `{"error": "404 page not found"}` is returned and no
/// registered handler runs.
///
/// Middleware added with [`Router::layer`] wraps every dispatch, including the `404`.
///
/// # Examples
///
/// ```rust,no_run
/// use sample_api::context::Context;
/// use sample_api::{Response, Router, StatusCode};
///
/// let mut router = Router::new();
///
/// router.get("/users/:id", |ctx: Context| async move {
///     Response::json(StatusCode::Ok, &serde_json::json!({ "id": ctx.param("id") }))
/// });
///
/// let mut v1 = router.group("/v1");
/// v1.get("/ping", |_ctx: Context| async { Response::new(StatusCode::Ok) });
/// ```
pub struct Router {
    routes: Vec<Route>,
    middlewares: Vec<MiddlewareHandler>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Create a new, empty `Router` with no registered routes or middleware.
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            middlewares: Vec::new(),
        }
    }

    /// Append a middleware layer. Layers run in the order they were added, outermost first.
    pub fn layer<M>(&mut self, middleware: M)
    where
        M: Middleware + 'static,
    {
        self.middlewares.push(from_middleware(Arc::new(middleware)));
    }

    /// Register `handler` for `method` requests matching `path`.
    pub fn register(&mut self, method: Method, path: &str, handler: impl IntoHandler) {
        let handler: Handler = Arc::new(move |ctx| handler.call(ctx));
        let source = join_paths("", trim_trailing_slash(path));

        if let Some(existing) = self
            .routes
            .iter_mut()
            .find(|r| r.method == method && r.source == source)
        {
            warn!(%method, pattern = %source, "route registered twice, replacing handler");
            existing.handler = handler;
            return;
        }

        debug!(%method, pattern = %source, "route registered");
        self.routes.push(Route::new(method, source, handler));
    }

    /// Register a handler for `GET` requests matching `path`.
    pub fn get(&mut self, path: &str, handler: impl IntoHandler) {
        self.register(Method::Get, path, handler);
    }

    /// Register a handler for `POST` requests matching `path`.
    pub fn post(&mut self, path: &str, handler: impl IntoHandler) {
        self.register(Method::Post, path, handler);
    }

    /// Register a handler for `PUT` requests matching `path`.
    pub fn put(&mut self, path: &str, handler: impl IntoHandler) {
        self.register(Method::Put, path, handler);
    }

    /// Register a handler for `DELETE` requests matching `path`.
    pub fn delete(&mut self, path: &str, handler: impl IntoHandler) {
        self.register(Method::Delete, path, handler);
    }

    /// Register a handler for `PATCH` requests matching `path`.
    pub fn patch(&mut self, path: &str, handler: impl IntoHandler) {
        self.register(Method::Patch, path, handler);
    }

    /// Register a handler for `OPTIONS` requests matching `path`.
    pub fn options(&mut self, path: &str, handler: impl IntoHandler) {
        self.register(Method::Options, path, handler);
    }

    /// Start a group of routes sharing `prefix`.
    ///
    /// The group has no identity of its own: `group("/v1").get("/users", h)` is exactly
    /// `get("/v1/users", h)`.
    pub fn group(&mut self, prefix: &str) -> Group<'_> {
        Group {
            router: self,
            prefix: join_paths("", prefix),
        }
    }

    /// Return the number of routes registered in this router.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Return `true` if no routes have been registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    // First route matching `method` and `path`, with its bound parameters.
    fn find(&self, method: &Method, path: &str) -> Option<(&Route, PathParams)> {
        self.routes
            .iter()
            .find_map(|route| route.matches(method, path).map(|params| (route, params)))
    }

    /// Dispatch a request given as its raw parts.
    ///
    /// `query` is the raw query string without the leading `?`.
    pub async fn dispatch(
        &self,
        method: Method,
        path: &str,
        query: Option<&str>,
        body: impl Into<Bytes>,
    ) -> Response {
        self.route(Request::from_parts(method, path, query, body))
            .await
    }

    /// Dispatch `request` to the first matching route and return its response.
    ///
    /// The matched handler (or the `404` fallback) runs as the innermost layer of the
    /// middleware stack.
    pub async fn route(&self, request: Request) -> Response {
        let (handler, ctx) = match self.find(request.method(), request.path()) {
            Some((route, params)) => (
                Arc::clone(&route.handler),
                Context::with_params(request, params),
            ),
            None => {
                debug!(
                    method = %request.method(),
                    path = %request.path(),
                    "no route matched"
                );
                (not_found_handler(), Context::new(request))
            }
        };

        if self.middlewares.is_empty() {
            return handler(ctx).await;
        }

        let terminal: MiddlewareHandler = Arc::new(move |ctx: Context, _next: Next| handler(ctx));
        let mut chain = self.middlewares.clone();
        chain.push(terminal);
        Next::new(chain).run(ctx).await
    }
}

fn not_found_handler() -> Handler {
    Arc::new(|_ctx: Context| -> BoxFuture {
        Box::pin(std::future::ready(Response::json(
            StatusCode::NotFound,
            &json!({ "error": NOT_FOUND_MESSAGE }),
        )))
    })
}

/// Registrar for routes sharing a path prefix. Created by [`Router::group`].
pub struct Group<'r> {
    router: &'r mut Router,
    prefix: String,
}

impl Group<'_> {
    /// The absolute prefix applied to every route in this group.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Register `handler` for `method` requests matching `prefix + path`.
    pub fn register(&mut self, method: Method, path: &str, handler: impl IntoHandler) {
        let full = join_paths(&self.prefix, path);
        self.router.register(method, &full, handler);
    }

    pub fn get(&mut self, path: &str, handler: impl IntoHandler) {
        self.register(Method::Get, path, handler);
    }

    pub fn post(&mut self, path: &str, handler: impl IntoHandler) {
        self.register(Method::Post, path, handler);
    }

    pub fn put(&mut self, path: &str, handler: impl IntoHandler) {
        self.register(Method::Put, path, handler);
    }

    pub fn delete(&mut self, path: &str, handler: impl IntoHandler) {
        self.register(Method::Delete, path, handler);
    }

    pub fn patch(&mut self, path: &str, handler: impl IntoHandler) {
        self.register(Method::Patch, path, handler);
    }

    pub fn options(&mut self, path: &str, handler: impl IntoHandler) {
        self.register(Method::Options, path, handler);
    }

    /// Nest a further prefix under this group.
    pub fn group(&mut self, prefix: &str) -> Group<'_> {
        Group {
            prefix: join_paths(&self.prefix, prefix),
            router: &mut *self.router,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde::Deserialize;

    use super::*;
    use crate::validation::{ValidationError, require_non_empty};

    fn make_request(method: &str, path: &str) -> Request {
        let raw = format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\n\r\n");
        let (req, _) = Request::parse(raw.as_bytes()).unwrap();
        req
    }

    fn ok() -> impl IntoHandler {
        |_ctx: Context| async { Response::new(StatusCode::Ok) }
    }

    // ── Pattern::parse ────────────────────────────────────────────────────────

    #[test]
    fn pattern_parse_root() {
        assert!(matches!(Pattern::parse("/"), Pattern::Exact(s) if s == "/"));
    }

    #[test]
    fn pattern_parse_trailing_slash_stripped() {
        assert!(matches!(Pattern::parse("/users/"), Pattern::Exact(s) if s == "/users"));
    }

    #[test]
    fn pattern_parse_parameterized_single() {
        match Pattern::parse("/users/:id") {
            Pattern::Parameterized { segments } => {
                assert_eq!(segments.len(), 2);
                assert!(matches!(&segments[0], Segment::Static(s) if s == "users"));
                assert!(matches!(&segments[1], Segment::Parameter(s) if s == "id"));
            }
            other => panic!("expected Parameterized, got {other:?}"),
        }
    }

    // ── Pattern::matches ──────────────────────────────────────────────────────

    #[test]
    fn pattern_exact_match() {
        let pat = Pattern::parse("/users");
        assert!(pat.matches("/users").is_some());
        assert!(pat.matches("/users/").is_some());
        assert!(pat.matches("/posts").is_none());
    }

    #[test]
    fn pattern_param_extracts_value() {
        let pat = Pattern::parse("/users/:id");
        let params = pat.matches("/users/42").unwrap();
        assert_eq!(params.get("id"), Some("42"));
    }

    #[test]
    fn pattern_param_accepts_non_numeric() {
        let pat = Pattern::parse("/users/:id");
        let params = pat.matches("/users/abc-def").unwrap();
        assert_eq!(params.get("id"), Some("abc-def"));
    }

    #[test]
    fn pattern_param_multi_extracts_values() {
        let pat = Pattern::parse("/users/:id/posts/:post_id");
        let params = pat.matches("/users/7/posts/99").unwrap();
        assert_eq!(params.get("id"), Some("7"));
        assert_eq!(params.get("post_id"), Some("99"));
    }

    #[test]
    fn pattern_param_is_percent_decoded() {
        let pat = Pattern::parse("/users/:id");
        let params = pat.matches("/users/a%20b").unwrap();
        assert_eq!(params.get("id"), Some("a b"));
        let params = pat.matches("/users/%E3%83%A6").unwrap();
        assert_eq!(params.get("id"), Some("ユ"));
        let params = pat.matches("/users/a+b").unwrap();
        assert_eq!(params.get("id"), Some("a+b"));
    }

    #[test]
    fn pattern_param_wrong_segment_count() {
        let pat = Pattern::parse("/users/:id");
        assert!(pat.matches("/users").is_none());
        assert!(pat.matches("/users/").is_none());
        assert!(pat.matches("/users/42/extra").is_none());
    }

    #[test]
    fn pattern_param_rejects_empty_segment() {
        let pat = Pattern::parse("/users/:id/posts");
        assert!(pat.matches("/users//posts").is_none());
    }

    #[test]
    fn pattern_param_wrong_static_segment() {
        let pat = Pattern::parse("/users/:id");
        assert!(pat.matches("/posts/42").is_none());
    }

    // ── join_paths ────────────────────────────────────────────────────────────

    #[test]
    fn join_paths_normalizes_slashes() {
        assert_eq!(join_paths("/v1", "/users"), "/v1/users");
        assert_eq!(join_paths("/v1/", "users"), "/v1/users");
        assert_eq!(join_paths("v1", "/users"), "/v1/users");
        assert_eq!(join_paths("/v1", "/"), "/v1");
        assert_eq!(join_paths("", ""), "/");
        assert_eq!(join_paths("", "sample"), "/sample");
    }

    // ── Router ────────────────────────────────────────────────────────────────

    #[test]
    fn router_starts_empty() {
        let router = Router::default();
        assert!(router.is_empty());
        assert_eq!(router.len(), 0);
    }

    #[tokio::test]
    async fn router_empty_returns_404_json() {
        let router = Router::new();
        let res = router.route(make_request("GET", "/")).await;
        assert_eq!(res.status(), StatusCode::NotFound);
        let body: serde_json::Value = serde_json::from_slice(res.content()).unwrap();
        assert_eq!(body["error"], NOT_FOUND_MESSAGE);
    }

    #[tokio::test]
    async fn router_method_mismatch_is_404() {
        let mut router = Router::new();
        router.get("/hello", ok());
        let res = router.route(make_request("POST", "/hello")).await;
        assert_eq!(res.status(), StatusCode::NotFound);
    }

    #[tokio::test]
    async fn unmatched_request_never_invokes_handlers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut router = Router::new();
        for path in ["/a", "/b/:id"] {
            let calls = Arc::clone(&calls);
            router.get(path, move |_ctx: Context| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Response::new(StatusCode::Ok) }
            });
        }

        for (method, path) in [("GET", "/c"), ("POST", "/a"), ("GET", "/b"), ("DELETE", "/b/1")] {
            let res = router.route(make_request(method, path)).await;
            assert_eq!(res.status(), StatusCode::NotFound);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn duplicate_registration_last_wins() {
        let mut router = Router::new();
        router.get("/path", ok());
        router.get("/path/", |_ctx: Context| async { Response::new(StatusCode::BadRequest) });

        assert_eq!(router.len(), 1);
        let res = router.route(make_request("GET", "/path")).await;
        assert_eq!(res.status(), StatusCode::BadRequest);
    }

    #[tokio::test]
    async fn same_pattern_different_methods_coexist() {
        let mut router = Router::new();
        router.put("/r/:id", ok());
        router.delete("/r/:id", |_ctx: Context| async { Response::new(StatusCode::Found) });
        assert_eq!(router.len(), 2);
        assert_eq!(
            router.route(make_request("PUT", "/r/1")).await.status(),
            StatusCode::Ok
        );
        assert_eq!(
            router.route(make_request("DELETE", "/r/1")).await.status(),
            StatusCode::Found
        );
    }

    #[tokio::test]
    async fn patch_and_options_shorthands() {
        let mut router = Router::new();
        router.patch("/r/:id", ok());
        router.options("/r", |_ctx: Context| async { Response::new(StatusCode::Found) });
        {
            let mut v2 = router.group("/v2");
            v2.patch("/r/:id", ok());
            v2.options("/r", ok());
        }
        assert_eq!(router.len(), 4);

        for (method, path, status) in [
            ("PATCH", "/r/1", StatusCode::Ok),
            ("OPTIONS", "/r", StatusCode::Found),
            ("PATCH", "/v2/r/1", StatusCode::Ok),
            ("OPTIONS", "/v2/r", StatusCode::Ok),
            ("GET", "/r/1", StatusCode::NotFound),
            ("PATCH", "/r", StatusCode::NotFound),
        ] {
            let res = router.route(make_request(method, path)).await;
            assert_eq!(res.status(), status, "{method} {path}");
        }
    }

    #[tokio::test]
    async fn router_parameterized_route_receives_params() {
        let mut router = Router::new();
        router.get("/users/:id", |ctx: Context| async move {
            Response::new(StatusCode::Ok).body(ctx.param("id").to_owned())
        });
        let res = router.route(make_request("GET", "/users/42")).await;
        assert_eq!(res.status(), StatusCode::Ok);
        assert_eq!(res.content(), b"42");
    }

    #[tokio::test]
    async fn group_prefixes_routes() {
        let mut router = Router::new();
        {
            let mut v1 = router.group("/v1");
            assert_eq!(v1.prefix(), "/v1");
            v1.get("/users", ok());
            v1.group("admin").get("/stats", ok());
        }
        assert_eq!(router.len(), 2);
        assert_eq!(
            router.route(make_request("GET", "/v1/users")).await.status(),
            StatusCode::Ok
        );
        assert_eq!(
            router.route(make_request("GET", "/v1/admin/stats")).await.status(),
            StatusCode::Ok
        );
        assert_eq!(
            router.route(make_request("GET", "/users")).await.status(),
            StatusCode::NotFound
        );
    }

    #[tokio::test]
    async fn dispatch_binds_query() {
        let mut router = Router::new();
        router.get("/echo", |ctx: Context| async move {
            Response::new(StatusCode::Ok).body(ctx.query_or("q", "none").to_owned())
        });
        let res = router.dispatch(Method::Get, "/echo", Some("q=a%2Bb"), "").await;
        assert_eq!(res.content(), b"a+b");
        let res = router.dispatch(Method::Get, "/echo", None, "").await;
        assert_eq!(res.content(), b"none");
    }

    #[derive(Debug, Deserialize)]
    struct Named {
        #[serde(default)]
        name: String,
    }

    impl Validate for Named {
        fn validate(&self) -> Result<(), ValidationError> {
            require_non_empty("name", &self.name)
        }
    }

    #[tokio::test]
    async fn validated_handler_receives_body() {
        let mut router = Router::new();
        router.post(
            "/named",
            validated(|_ctx, named: Named| async move { Response::new(StatusCode::Ok).body(named.name) }),
        );
        let res = router
            .dispatch(Method::Post, "/named", None, r#"{"name":"x"}"#)
            .await;
        assert_eq!(res.status(), StatusCode::Ok);
        assert_eq!(res.content(), b"x");
    }

    #[tokio::test]
    async fn validated_handler_skipped_on_bad_body() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut router = Router::new();
        let counter = Arc::clone(&calls);
        router.post(
            "/named",
            validated(move |_ctx, _named: Named| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Response::new(StatusCode::Ok) }
            }),
        );

        for body in ["", "{", r#"{"name":""}"#, r#"{"name":5}"#, "{}"] {
            let res = router.dispatch(Method::Post, "/named", None, body).await;
            assert_eq!(res.status(), StatusCode::BadRequest, "body {body:?}");
            let json: serde_json::Value = serde_json::from_slice(res.content()).unwrap();
            assert!(!json["error"].as_str().unwrap().is_empty());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    struct Tag;

    impl Middleware for Tag {
        fn handle(&self, ctx: Context, next: Next) -> BoxFuture {
            Box::pin(async move { next.run(ctx).await.header("X-Tag", "1") })
        }
    }

    #[tokio::test]
    async fn middleware_wraps_matches_and_404() {
        let mut router = Router::new();
        router.layer(Tag);
        router.get("/hello", ok());

        let hit = router.route(make_request("GET", "/hello")).await;
        assert_eq!(hit.status(), StatusCode::Ok);
        assert_eq!(hit.headers().get("x-tag"), Some("1"));

        let miss = router.route(make_request("GET", "/nope")).await;
        assert_eq!(miss.status(), StatusCode::NotFound);
        assert_eq!(miss.headers().get("x-tag"), Some("1"));
    }
}
