use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use service::auth::errors::AuthError;
use service::errors::ServiceError;
use tower_http::catch_panic::ResponseForPanic;
use tracing::error;

/// API-facing error: an HTTP status plus an `{error, details?}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), details: None }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 400 with field-level details, for payloads that fail to parse.
    pub fn validation(message: impl Into<String>, details: Value) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into(), details: Some(details) }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "Forbidden")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn too_many_requests() -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, "Too many requests")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.message, "request failed");
        }
        let mut body = json!({ "error": self.message });
        if let Some(details) = self.details {
            body["details"] = details;
        }
        (self.status, Json(body)).into_response()
    }
}

/// Final catch-all: a panicking handler becomes a 500 with no internal
/// detail in the body.
#[derive(Clone, Copy, Debug)]
pub struct JsonPanic;

impl ResponseForPanic for JsonPanic {
    type ResponseBody = axum::body::Body;

    fn response_for_panic(
        &mut self,
        _err: Box<dyn std::any::Any + Send + 'static>,
    ) -> axum::http::Response<Self::ResponseBody> {
        error!("handler panicked");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "Internal server error" })))
            .into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => ApiError::bad_request(msg),
            ServiceError::NotFound(msg) => ApiError::not_found(msg),
            ServiceError::Conflict(msg) => ApiError::new(StatusCode::CONFLICT, msg),
            // store messages pass through; the catch-all panic handler is the
            // only layer that suppresses detail
            ServiceError::Db(msg) => ApiError::internal(msg),
            ServiceError::Model(e) => match e {
                models::errors::ModelError::Validation(msg) => ApiError::bad_request(msg),
                models::errors::ModelError::Db(msg) => ApiError::internal(msg),
            },
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(msg) => ApiError::bad_request(msg),
            AuthError::Conflict => ApiError::new(StatusCode::CONFLICT, err.to_string()),
            AuthError::Unauthorized => ApiError::unauthorized("Invalid credentials"),
            AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Repository(_) => {
                ApiError::internal(err.to_string())
            }
        }
    }
}

/// Deserialize a JSON body that already parsed as a `Value`, shaping failures
/// into the uniform `{error: "Invalid payload", details}` response.
pub fn parse_payload<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::validation("Invalid payload", Value::String(e.to_string())))
}
