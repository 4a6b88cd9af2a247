//! Response envelopes and the JSON-to-domain boundary.
//!
//! A response body is either decoded JSON (when the server declared it) or a
//! raw text wrapper. Domain types are only ever produced from the JSON arm,
//! through `normalize`, so a shape mismatch is reported at the boundary
//! instead of leaking `Value`s into callers.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::HttpResponse;

/// Parsed body of an HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEnvelope {
    Json(Value),
    Raw(String),
}

impl ResponseEnvelope {
    /// Decode by declared content type. A body declared as JSON that fails
    /// to decode is an error regardless of status.
    pub fn parse(response: &HttpResponse) -> Result<Self, ApiError> {
        if !response.is_json() {
            return Ok(ResponseEnvelope::Raw(response.body.clone()));
        }
        serde_json::from_str(&response.body)
            .map(ResponseEnvelope::Json)
            .map_err(|_| ApiError::MalformedJson {
                status: response.status,
                raw: response.body.clone(),
            })
    }

    /// The `message` field of a JSON body, if it is a string.
    pub fn message(&self) -> Option<String> {
        match self {
            ResponseEnvelope::Json(value) => value.get("message").and_then(Value::as_str).map(str::to_string),
            ResponseEnvelope::Raw(_) => None,
        }
    }

    pub fn raw(&self) -> Option<&str> {
        match self {
            ResponseEnvelope::Raw(raw) => Some(raw),
            ResponseEnvelope::Json(_) => None,
        }
    }
}

/// Convert a decoded JSON value into the caller's domain type.
pub fn normalize<T: DeserializeOwned>(status: u16, value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::SchemaMismatch {
        status,
        message: e.to_string(),
    })
}
