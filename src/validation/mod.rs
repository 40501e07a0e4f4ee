//! Typed request-body decoding.
//!
//! Decoding is two explicit steps: `serde_json` turns the raw body into a
//! value of the declared shape, then [`Validate::validate`] checks the
//! constraints serde cannot express (e.g. a required string must be
//! non-empty). Either step failing yields a [`ValidationError`], which renders
//! as `400 Bad Request` with `{"error": "<message>"}`.

use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;

use crate::{Response, StatusCode};

/// A request body did not satisfy its declared shape.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The body is not valid JSON, or a field has the wrong type.
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    /// A required field is absent or empty.
    #[error("field '{field}' is required")]
    Required { field: &'static str },
}

impl ValidationError {
    /// Render this error as a `400` JSON response.
    pub fn into_response(self) -> Response {
        Response::json(StatusCode::BadRequest, &json!({ "error": self.to_string() }))
    }
}

/// Post-deserialization constraints on a request body type.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Fails with [`ValidationError::Required`] when `value` is empty.
pub fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(ValidationError::Required { field })
    } else {
        Ok(())
    }
}

/// Decode `body` as JSON into `T`, then validate it.
pub fn decode_json<T>(body: &[u8]) -> Result<T, ValidationError>
where
    T: DeserializeOwned + Validate,
{
    let value: T = serde_json::from_slice(body)?;
    value.validate()?;
    Ok(value)
}
