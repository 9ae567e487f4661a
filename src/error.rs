use crate::db::StoreError;
use crate::paralympics::schema::SchemaError;
use thiserror::Error;

/// Errors surfaced by the HTTP handlers of both apps.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Prediction error: {0}")]
    Prediction(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    #[cfg(feature = "server")]
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;

        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Prediction(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Prediction(_) => "PREDICTION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Server-side failures keep their detail in the log only.
    fn public_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Prediction(_) | AppError::Internal(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

#[cfg(feature = "server")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if status.is_server_error() {
            tracing::error!(
                error_code = error_code,
                status_code = status.as_u16(),
                message = %self,
                "Request failed"
            );
        } else {
            tracing::debug!(
                error_code = error_code,
                status_code = status.as_u16(),
                message = %self,
                "Request rejected"
            );
        }

        let body = axum::Json(serde_json::json!({
            "error": {
                "code": error_code,
                "message": self.public_message(),
                "status": status.as_u16(),
            }
        }));

        (status, body).into_response()
    }
}

/// Store errors keep their meaning; anything else from the persistence
/// layer is a database failure.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<StoreError>() {
            Some(StoreError::Duplicate { .. }) => AppError::Conflict(err.to_string()),
            Some(StoreError::NotFound { .. }) => AppError::NotFound(err.to_string()),
            None => AppError::Database(format!("{:#}", err)),
        }
    }
}

/// Bodies axum could not read as JSON at all get the same error shape as
/// bodies that fail validation.
#[cfg(feature = "server")]
impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<SchemaError> for AppError {
    fn from(err: SchemaError) -> Self {
        AppError::Validation(err.to_string())
    }
}
