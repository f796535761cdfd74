//! HTTP error responses.
//!
//! Every handler returns `Result<_, ApiError>`; the status code and body are
//! decided here from the [`AppError`] kind.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::AppError;
use crate::validation::ValidationErrors;

const SERVER_ERROR: &str = "The server encountered an error.";
const BAD_REQUEST: &str = "Invalid request body.";

/// `{"message": ..., "status": ...}`, used for 400 and 500.
#[derive(Debug, Serialize)]
struct StatusMessage {
    message: &'static str,
    status: u16,
}

/// `{"message": ..., "status_code": ...}`, used for "already exists".
#[derive(Debug, Serialize)]
struct ResponseMessage {
    message: String,
    status_code: u16,
}

/// Error returned by HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The body could not be decoded as the expected JSON.
    BadRequest(String),
    App(AppError),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::App(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = match self {
            ApiError::BadRequest(detail) => {
                tracing::debug!(%detail, "Rejected request body");
                return status_message(StatusCode::BAD_REQUEST, BAD_REQUEST);
            }
            ApiError::App(err) => err,
        };

        match err {
            AppError::Validation(errors) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response()
            }
            AppError::NotFound { .. } => StatusCode::NOT_FOUND.into_response(),
            AppError::AlreadyExists(resource) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ResponseMessage {
                    message: format!("{} already exists.", resource.label()),
                    status_code: StatusCode::UNPROCESSABLE_ENTITY.as_u16(),
                }),
            )
                .into_response(),
            AppError::ReferenceNotFound {
                field,
                resource,
                ids,
            } => {
                // Single references read "House not found."; id lists name the misses.
                let message = if field.ends_with("_id") {
                    format!("{} not found.", resource.label())
                } else {
                    format!("{} not found: {}", resource, ids.join(", "))
                };
                let errors = ValidationErrors::single(field, message);
                (StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response()
            }
            err => {
                tracing::error!(error = %err, details = ?err, "Request failed");
                status_message(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR)
            }
        }
    }
}

fn status_message(status: StatusCode, message: &'static str) -> Response {
    (
        status,
        Json(StatusMessage {
            message,
            status: status.as_u16(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConstraintKind, Resource};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = ApiError::from(err).into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_validation_is_422_with_field_errors() {
        let (status, body) =
            render(AppError::Validation(ValidationErrors::single("name", "The name field is required."))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"]["name"][0], "The name field is required.");
    }

    #[tokio::test]
    async fn test_not_found_is_empty_404() {
        let (status, body) = render(AppError::not_found(Resource::House, "x")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn test_already_exists_message() {
        let (status, body) = render(AppError::AlreadyExists(Resource::NoteGroup)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body, json!({"message": "Note group already exists.", "status_code": 422}));
    }

    #[tokio::test]
    async fn test_reference_not_found_bodies() {
        let (status, body) = render(AppError::ReferenceNotFound {
            field: "house_id",
            resource: Resource::House,
            ids: vec!["h9".into()],
        })
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"]["house_id"][0], "House not found.");

        let (_, body) = render(AppError::ReferenceNotFound {
            field: "perfumers",
            resource: Resource::Perfumer,
            ids: vec!["a".into(), "b".into()],
        })
        .await;
        assert_eq!(body["errors"]["perfumers"][0], "perfumer not found: a, b");
    }

    #[tokio::test]
    async fn test_internal_errors_are_opaque() {
        for err in [
            AppError::Query {
                message: "relation \"houses\" does not exist".into(),
                query: "SELECT 1".into(),
            },
            AppError::Constraint {
                kind: ConstraintKind::Unique,
                constraint: None,
                message: "duplicate".into(),
            },
            AppError::Integrity("unknown note category 'heart'".into()),
        ] {
            let (status, body) = render(err).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, json!({"message": SERVER_ERROR, "status": 500}));
        }
    }
}
