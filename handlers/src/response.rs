//! The status-plus-JSON value every handler returns.

use serde::Serialize;
use serde_json::{json, Value};
use stonks_core::{CoreError, ErrorExt};
use tracing::info;

/// What every handler returns: an HTTP-style status and a JSON body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    pub body: Value,
}

impl HandlerResponse {
    pub fn new(status_code: u16, body: Value) -> Self {
        Self { status_code, body }
    }

    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    pub fn failure(status_code: u16, error: impl Into<String>, message: Option<String>) -> Self {
        let mut body = json!({
            "success": false,
            "error": error.into(),
        });
        if let Some(message) = message {
            body["message"] = Value::String(message);
        }
        Self::new(status_code, body)
    }

    pub fn server_error(error: impl Into<String>) -> Self {
        Self::failure(500, error, None)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// The body as a JSON string, as serverless gateways expect it.
    pub fn body_string(&self) -> String {
        self.body.to_string()
    }
}

/// Logs a handler failure with its stable code and user-facing message.
pub(crate) fn report(err: &CoreError) {
    err.log_error();
    info!("Error code: {}", err.error_code());
    info!("User message: {}", err.user_friendly_message());
}
