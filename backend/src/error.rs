//! Error handling for the Warehouse Management Platform
//!
//! Provides consistent error responses in English and Indonesian

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_id: String,
    },

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Insufficient stock of {product} at {warehouse}")]
    InsufficientStock { product: String, warehouse: String },

    /// A storage invariant was violated (e.g., a stock row that should
    /// have been provisioned does not exist). Not user-recoverable.
    #[error("Integrity error: {0}")]
    Integrity(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "TOKEN_EXPIRED".to_string(),
                    message_en: "Token has expired".to_string(),
                    message_id: "Token sudah kedaluwarsa".to_string(),
                    field: None,
                },
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "INVALID_TOKEN".to_string(),
                    message_en: "Invalid token".to_string(),
                    message_id: "Token tidak valid".to_string(),
                    field: None,
                },
            ),
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "UNAUTHORIZED".to_string(),
                    message_en: msg.clone(),
                    message_id: "Tidak memiliki akses".to_string(),
                    field: None,
                },
            ),
            AppError::Validation {
                field,
                message,
                message_id,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_id: message_id.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::DuplicateEntry(field) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "DUPLICATE_ENTRY".to_string(),
                    message_en: format!("A record with this {} already exists", field),
                    message_id: format!("Data dengan {} ini sudah ada", field),
                    field: Some(field.clone()),
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message_en: format!("{} not found", resource),
                    message_id: format!("{} tidak ditemukan", resource),
                    field: None,
                },
            ),
            AppError::InvalidStateTransition(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INVALID_STATE_TRANSITION".to_string(),
                    message_en: msg.clone(),
                    message_id: format!("Perubahan status tidak valid: {}", msg),
                    field: None,
                },
            ),
            AppError::InsufficientStock { product, warehouse } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INSUFFICIENT_STOCK".to_string(),
                    message_en: format!(
                        "Insufficient stock of {} at warehouse {}",
                        product, warehouse
                    ),
                    message_id: format!(
                        "Stok {} di gudang {} tidak mencukupi",
                        product, warehouse
                    ),
                    field: None,
                },
            ),
            AppError::Integrity(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTEGRITY_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_id: "Terjadi pelanggaran integritas data".to_string(),
                    field: None,
                },
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "CONFIGURATION_ERROR".to_string(),
                    message_en: format!("Configuration error: {}", msg),
                    message_id: format!("Terjadi kesalahan konfigurasi: {}", msg),
                    field: None,
                },
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message_en: "A database error occurred".to_string(),
                    message_id: "Terjadi kesalahan pada basis data".to_string(),
                    field: None,
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: "An internal server error occurred".to_string(),
                    message_id: "Terjadi kesalahan internal pada server".to_string(),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Map unique-constraint violations to `DuplicateEntry` so callers
    /// see a conflict instead of a generic database failure.
    pub fn from_unique_violation(err: sqlx::Error, field: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return AppError::DuplicateEntry(field.to_string());
            }
        }
        AppError::DatabaseError(err)
    }

    /// Convenience constructor for a bilingual field validation error.
    pub fn validation(field: &str, message_en: &str, message_id: &str) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message_en.to_string(),
            message_id: message_id.to_string(),
        }
    }

    /// Validation error for a missing conditionally-required field.
    pub fn required_field(field: &str) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: format!("This field is required: {}", field),
            message_id: format!("Kolom ini wajib diisi: {}", field),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_payload_carries_both_languages_and_field() {
        let AppError::Validation { field, message, message_id } =
            AppError::validation("name", "Name is required", "Nama wajib diisi")
        else {
            panic!("expected a validation error");
        };
        let body = serde_json::to_value(ErrorResponse {
            error: ErrorDetail {
                code: "VALIDATION_ERROR".to_string(),
                message_en: message,
                message_id,
                field: Some(field),
            },
        })
        .unwrap();

        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message_en"], "Name is required");
        assert_eq!(body["error"]["message_id"], "Nama wajib diisi");
        assert_eq!(body["error"]["field"], "name");
    }

    #[test]
    fn absent_field_is_omitted_from_payload() {
        let body = serde_json::to_value(ErrorResponse {
            error: ErrorDetail {
                code: "NOT_FOUND".to_string(),
                message_en: "Product not found".to_string(),
                message_id: "Product tidak ditemukan".to_string(),
                field: None,
            },
        })
        .unwrap();

        assert!(body["error"].get("field").is_none());
    }
}
