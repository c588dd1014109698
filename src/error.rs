use actix_web::{http::StatusCode, ResponseError};
use log::error;
use sea_orm::{DbErr, SqlErr, TransactionError};
use thiserror::Error;

use crate::response::response_from_error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    ConstraintViolation(String),
    #[error("database error: {0}")]
    Database(DbErr),
}

impl AppError {
    pub fn param_error(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(entity: &'static str, id: i32) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::ConstraintViolation(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::Validation(_) => 1,
            Self::ConstraintViolation(_) => 2,
            Self::NotFound { .. } => 5,
            Self::Database(_) => 99,
        }
    }

    pub fn msg(&self) -> String {
        match self {
            Self::Database(_) => "system_exception".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            return Self::ConstraintViolation(detail);
        }
        error!("database failure: {}", err);
        Self::Database(err)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::ConstraintViolation(_) => StatusCode::CONFLICT,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        response_from_error(self)
    }
}

pub fn map_tx_error(err: TransactionError<AppError>) -> AppError {
    match err {
        TransactionError::Connection(e) => e.into(),
        TransactionError::Transaction(app) => app,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_errors_hide_driver_text() {
        let err = AppError::Database(DbErr::Custom("disk I/O error".to_string()));
        assert_eq!(err.msg(), "system_exception");
        assert_eq!(err.code(), 99);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_is_distinguishable() {
        let err = AppError::not_found("post", 7);
        assert!(err.is_not_found());
        assert_eq!(err.msg(), "post 7 not found");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(!AppError::constraint("dup").is_not_found());
    }
}
