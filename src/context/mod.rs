//! Per-request context handed to route handlers.
//!
//! A [`Context`] pairs the parsed [`Request`] with the path parameters bound
//! by the router, and offers typed accessors for path, query and body data.

use std::collections::HashMap;

use serde::de::DeserializeOwned;

use crate::Request;
use crate::validation::{Validate, ValidationError, decode_json};

/// Path parameters extracted from the matched route.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct PathParams {
    map: HashMap<String, String>,
}

impl PathParams {
    /// Create a new empty parameters map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value into the parameters map
    pub fn insert(&mut self, key: String, value: String) {
        self.map.insert(key, value);
    }

    /// Get a value from the parameters map
    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    /// Number of bound parameters
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether no parameters were bound
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Per-request state: the request plus router-bound path parameters.
#[derive(Debug)]
pub struct Context {
    request: Request,
    params: PathParams,
}

impl Context {
    /// Create a context with no path parameters.
    pub fn new(request: Request) -> Self {
        Self::with_params(request, PathParams::new())
    }

    /// Create a context carrying the parameters bound by a route match.
    pub fn with_params(request: Request, params: PathParams) -> Self {
        Self { request, params }
    }

    /// The parsed request.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Parameters bound by the matched route.
    pub fn params(&self) -> &PathParams {
        &self.params
    }

    /// Path parameter `name`, or `""` when the route declares no such segment.
    pub fn param(&self, name: &str) -> &str {
        self.params.get(name).unwrap_or_default()
    }

    /// Decoded query parameter `key`, if present.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.request.query_param(key)
    }

    /// Decoded query parameter `key`, or `default` when absent.
    ///
    /// A key present with an empty value (`?price=`) yields `""`, not `default`.
    pub fn query_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.query(key).unwrap_or(default)
    }

    /// Decode and validate the JSON request body as `T`.
    pub fn json<T>(&self) -> Result<T, ValidationError>
    where
        T: DeserializeOwned + Validate,
    {
        decode_json(self.request.body())
    }
}
