use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

mod lifecycle;

pub use lifecycle::LifecycleError;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
}

#[derive(Debug)]
pub enum AppError {
    /// No or invalid credentials.
    Unauthorized(String),
    Validation(Vec<String>),
    BadRequest(String),
    Lifecycle(LifecycleError),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, code, details) = match self {
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                msg,
                "UNAUTHORIZED".to_string(),
                None,
            ),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                msg,
                "BAD_REQUEST".to_string(),
                None,
            ),
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                "VALIDATION_ERROR".to_string(),
                Some(serde_json::json!({ "errors": errors })),
            ),
            AppError::Lifecycle(err) => lifecycle_parts(err),
            AppError::InternalServerError(err) => {
                tracing::error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "INTERNAL_SERVER_ERROR".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
            code,
            details,
        });

        (status, body).into_response()
    }
}

fn lifecycle_parts(err: LifecycleError) -> (StatusCode, String, String, Option<Value>) {
    let code = err.code().to_string();
    match err {
        LifecycleError::IllegalTransition {
            action,
            state,
            is_active,
        } => (
            StatusCode::CONFLICT,
            "Action unavailable".to_string(),
            code,
            Some(serde_json::json!({
                "action": action,
                "lifecycle_state": state,
                "is_active": is_active,
            })),
        ),
        LifecycleError::MissingReason(action) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("A reason is required to {}", action),
            code,
            Some(serde_json::json!({ "field": "reason", "action": action })),
        ),
        LifecycleError::ReasonTooLong { max } => (
            StatusCode::BAD_REQUEST,
            format!("reason must be between 1 and {} characters", max),
            code,
            Some(serde_json::json!({ "field": "reason", "max": max })),
        ),
        LifecycleError::Unauthorized => (
            StatusCode::FORBIDDEN,
            "Forbidden".to_string(),
            code,
            None,
        ),
        LifecycleError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            format!("Account {} not found", id),
            code,
            None,
        ),
        LifecycleError::Conflict(id) => (
            StatusCode::CONFLICT,
            "State changed, please refresh and retry".to_string(),
            code,
            Some(serde_json::json!({ "account_id": id })),
        ),
        LifecycleError::Storage(err) => {
            tracing::error!("Storage failure: {:?}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                code,
                None,
            )
        }
    }
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        AppError::Lifecycle(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalServerError(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Lifecycle(err.into())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages = Vec::new();
        collect_validation_messages(&errors, &mut messages);
        messages.sort();
        AppError::Validation(messages)
    }
}

/// Payloads flatten their nested structs on the wire, so errors are reported
/// by leaf field name.
fn collect_validation_messages(errors: &validator::ValidationErrors, out: &mut Vec<String>) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(errs) => {
                out.extend(errs.iter().map(|e| format!("{}: {}", field, e.code)));
            }
            ValidationErrorsKind::Struct(inner) => collect_validation_messages(inner, out),
            ValidationErrorsKind::List(items) => {
                for inner in items.values() {
                    collect_validation_messages(inner, out);
                }
            }
        }
    }
}
