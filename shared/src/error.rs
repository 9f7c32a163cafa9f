use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    UnprocessableEntity(String),
    #[error("{0}")]
    EntityNotFound(String),
    #[error("item ({0}) is not available for booking")]
    ItemNotAvailable(String),
    #[error("{0}")]
    ValidationError(#[from] garde::Report),
    #[error("{0}")]
    ConflictError(String),
    #[error("transaction error")]
    TransactionError(#[source] sqlx::Error),
    #[error("database operation error")]
    SpecificOperationError(#[source] sqlx::Error),
    #[error("no rows affected: {0}")]
    NoRowsAffectedError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = match &self {
            AppError::UnprocessableEntity(_)
            | AppError::ItemNotAvailable(_)
            | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::EntityNotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConflictError(_) => StatusCode::CONFLICT,
            e @ (AppError::TransactionError(_)
            | AppError::SpecificOperationError(_)
            | AppError::NoRowsAffectedError(_)) => {
                tracing::error!(
                    error.cause_chain = ?e, error.message = %e,
                    "Unexpected error happened"
                );
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status_code.is_client_error() {
            tracing::warn!("{}", self);
        }

        // エラーレスポンスは {"error": "<message>"} の形に統一する
        (status_code, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let res = AppError::EntityNotFound("user (42) not found".into()).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unprocessable_entity_maps_to_400() {
        let res = AppError::UnprocessableEntity("bad".into()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_available_maps_to_400() {
        let res = AppError::ItemNotAvailable("x".into()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn conflict_maps_to_409() {
        let res = AppError::ConflictError("email is already in use".into()).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }
}
