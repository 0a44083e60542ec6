// HTTP API error types shared by the gateway and all services
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 405 Method Not Allowed (gateway only forwards GET/POST/PUT/DELETE)
    MethodNotAllowed(String),

    // 409 Conflict
    Conflict(String),

    // 422 Unprocessable Entity (well-formed JSON, semantically invalid)
    UnprocessableEntity {
        message: String,
        field_errors: HashMap<String, String>,
    },

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError { .. } => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::MethodNotAllowed(_) => 405,
            ApiError::Conflict(_) => 409,
            ApiError::UnprocessableEntity { .. } => 422,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::MethodNotAllowed(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::UnprocessableEntity { message, .. } => message,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::UnprocessableEntity { .. } => "UNPROCESSABLE_ENTITY",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::ValidationError {
                message,
                field_errors,
            } => {
                let mut response = json!({
                    "error": true,
                    "message": message,
                    "code": "VALIDATION_ERROR"
                });
                if let Some(field_errors) = field_errors {
                    response["field_errors"] = json!(field_errors);
                }
                response
            }
            ApiError::UnprocessableEntity {
                message,
                field_errors,
            } => {
                json!({
                    "error": true,
                    "message": message,
                    "code": "UNPROCESSABLE_ENTITY",
                    "field_errors": field_errors
                })
            }
            _ => {
                json!({
                    "error": true,
                    "message": self.message(),
                    "code": self.error_code()
                })
            }
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        ApiError::MethodNotAllowed(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn unprocessable_entity(
        message: impl Into<String>,
        field_errors: HashMap<String, String>,
    ) -> Self {
        ApiError::UnprocessableEntity {
            message: message.into(),
            field_errors,
        }
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

/// Map low-level sqlx failures: pool/connect problems read as 503, everything
/// else is logged and returned as a generic 500.
fn from_sqlx(err: sqlx::Error) -> ApiError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            tracing::error!("database unavailable: {}", err);
            ApiError::service_unavailable("Database temporarily unavailable")
        }
        other => {
            tracing::error!("database error: {}", other);
            ApiError::internal_server_error("An error occurred while processing your request")
        }
    }
}

impl From<crate::services::user_service::UserError> for ApiError {
    fn from(err: crate::services::user_service::UserError) -> Self {
        use crate::services::user_service::UserError;
        match err {
            UserError::NotFound => ApiError::not_found("User not found"),
            UserError::InvalidCredentials => {
                ApiError::unauthorized("Invalid username or password")
            }
            UserError::Inactive => ApiError::unauthorized("Account is disabled"),
            UserError::Duplicate(field, value) => {
                ApiError::conflict(format!("{} '{}' is already taken", field, value))
            }
            UserError::Hash(e) => {
                tracing::error!("password hashing error: {}", e);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            UserError::Sqlx(e) => from_sqlx(e),
        }
    }
}

impl From<crate::services::ContentError> for ApiError {
    fn from(err: crate::services::ContentError) -> Self {
        use crate::services::ContentError;
        match err {
            ContentError::NotFound(what) => ApiError::not_found(format!("{} not found", what)),
            ContentError::Sqlx(e) => from_sqlx(e),
        }
    }
}

impl From<crate::services::assignment_service::AssignmentError> for ApiError {
    fn from(err: crate::services::assignment_service::AssignmentError) -> Self {
        use crate::services::assignment_service::AssignmentError;
        match err {
            AssignmentError::NotFound => ApiError::not_found("Assignment not found"),
            AssignmentError::ProgressNotFound(id) => {
                ApiError::not_found(format!("No progress recorded for assignment {}", id))
            }
            AssignmentError::SessionNotFound => ApiError::not_found("Study session not found"),
            AssignmentError::SessionClosed => {
                ApiError::conflict("Study session has already ended")
            }
            AssignmentError::InvalidTransition { from, to } => {
                let mut field_errors = HashMap::new();
                field_errors.insert(
                    "status".to_string(),
                    format!("cannot change status from '{}' to '{}'", from, to),
                );
                ApiError::unprocessable_entity("Invalid status transition", field_errors)
            }
            AssignmentError::Sqlx(e) => from_sqlx(e),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(ApiError::bad_request("x").status_code(), 400);
        assert_eq!(ApiError::not_found("x").status_code(), 404);
        assert_eq!(ApiError::method_not_allowed("x").status_code(), 405);
        assert_eq!(ApiError::conflict("x").status_code(), 409);
        assert_eq!(ApiError::service_unavailable("x").status_code(), 503);
    }

    #[test]
    fn validation_error_carries_field_errors() {
        let mut fields = HashMap::new();
        fields.insert("title".to_string(), "This field is required".to_string());
        let err = ApiError::validation_error("Missing required fields", Some(fields));
        let body = err.to_json();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["field_errors"]["title"], "This field is required");
    }

    #[test]
    fn generic_errors_omit_field_errors() {
        let body = ApiError::not_found("Assignment not found").to_json();
        assert_eq!(body["error"], true);
        assert_eq!(body["code"], "NOT_FOUND");
        assert!(body.get("field_errors").is_none());
    }
}
