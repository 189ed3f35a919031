//! Service-layer error type
//!
//! `ServiceError` bridges DB-layer errors (`sqlx::Error`) and the API-layer
//! error (`AppError`) so handlers and the live channel can use `?`.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// - `Db`: database/infrastructure errors (auto-logged, mapped to InternalError)
/// - `App`: business-rule errors (passed through to the client)
#[derive(Debug)]
pub enum ServiceError {
    Db(BoxError),
    App(AppError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Db(e) => write!(f, "database error: {e}"),
            ServiceError::App(e) => write!(f, "{} ({})", e.message, e.code),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Map a missing row to a 404 with the given error code
pub fn require<T>(value: Option<T>, code: ErrorCode) -> ServiceResult<T> {
    value.ok_or_else(|| ServiceError::App(AppError::new(code)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_db_error_hidden_from_client() {
        let err = ServiceError::Db("connection reset".into());
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::InternalError);
        assert!(!app.message.contains("connection reset"));
    }

    #[test]
    fn test_require() {
        let err = require::<i64>(None, ErrorCode::TableNotFound).unwrap_err();
        let app: AppError = err.into();
        assert_eq!(app.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(require(Some(3), ErrorCode::TableNotFound).unwrap(), 3);
    }
}
