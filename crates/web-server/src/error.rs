use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use core_types::CoreError;
use database::DbError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Database(#[from] DbError),
    #[error(transparent)]
    Validation(#[from] CoreError),
    #[error("{0}")]
    NotFound(String),
}

/// Converts our custom `AppError` into an HTTP response.
///
/// Every error body carries a single `mensagem` field: 404 for the
/// distinguished not-found cases, 400 for validation and processing
/// failures, with the infrastructure details kept out of the response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, mensagem) = match self {
            AppError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::NotFound(mensagem) => (StatusCode::NOT_FOUND, mensagem),
            AppError::Database(DbError::NotFound) => {
                (StatusCode::NOT_FOUND, DbError::NotFound.to_string())
            }
            AppError::Database(
                err @ (DbError::Conflict(_)
                | DbError::AddressProcessing(_)
                | DbError::StudentCreation(_)
                | DbError::InvalidCourseReference(_)),
            ) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::Database(err) => {
                tracing::error!(error = ?err, "Database error.");
                (
                    StatusCode::BAD_REQUEST,
                    "Erro ao acessar o banco de dados".to_string(),
                )
            }
        };

        let body = Json(json!({ "mensagem": mensagem }));
        (status, body).into_response()
    }
}
