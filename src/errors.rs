//! # Error Handling for CRUD Operations
//!
//! Every operation in this crate returns [`CrudError`]. The variants follow the failure
//! taxonomy of the engine:
//!
//! - **Validation** - malformed filter, cursor, field selection or body (422)
//! - **`NotFound`** - the addressed record does not exist (404)
//! - **Conflict** - constraint violations, upserting a soft-deleted record,
//!   resources without a usable primary key or soft-delete marker (409)
//! - **Database** - any other storage failure (500, details logged, never sent)
//!
//! ## Logging
//!
//! Internal errors are logged using the `tracing` crate when the error is turned into an
//! HTTP response. Install a subscriber in your application to see them:
//!
//! ```rust,ignore
//! tracing_subscriber::fmt().with_target(false).compact().init();
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use std::fmt;

/// Error returned by every CRUD operation
#[derive(Debug)]
pub enum CrudError {
    /// 422 Unprocessable Entity - the request does not describe a valid query or payload
    Validation {
        /// User-facing validation messages
        errors: Vec<String>,
    },

    /// 404 Not Found - no record matches the primary key
    NotFound {
        /// Resource name (e.g. "post")
        resource: String,
        /// Rendered primary key that was looked up
        key: Option<String>,
    },

    /// 409 Conflict - the request clashes with stored state or the resource definition
    Conflict {
        /// User-facing error message
        message: String,
    },

    /// 500 Internal Server Error - storage failure (details logged, not exposed)
    Database {
        /// User-facing generic message
        message: String,
        /// Internal error (logged, not sent to user)
        internal: DbErr,
    },
}

impl CrudError {
    /// Create a 422 error with a single message
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            errors: vec![message.into()],
        }
    }

    /// Create a 422 error carrying several messages
    pub fn validation_many(errors: Vec<String>) -> Self {
        Self::Validation { errors }
    }

    /// Create a 404 error
    pub fn not_found(resource: impl Into<String>, key: Option<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            key,
        }
    }

    /// Create a 409 error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Wrap a storage error without inspecting it
    ///
    /// Use [`From<DbErr>`] instead when constraint violations should surface as conflicts.
    pub fn database(err: DbErr) -> Self {
        Self::Database {
            message: "A database error occurred".to_string(),
            internal: err,
        }
    }

    /// Convert a storage error raised while persisting a record.
    ///
    /// A rejected statement means the record broke a storage constraint (NOT NULL, CHECK,
    /// unique, foreign key) and becomes a 409. Connection and mapping failures stay 500.
    pub fn from_write(err: DbErr) -> Self {
        match Self::from(err) {
            Self::Database {
                internal: internal @ (DbErr::Exec(_) | DbErr::Query(_)),
                ..
            } => {
                tracing::warn!(error = ?internal, "write rejected by storage");
                Self::conflict("record violates a storage constraint")
            }
            other => other,
        }
    }

    /// HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this is a [`CrudError::Validation`]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Whether this is a [`CrudError::NotFound`]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether this is a [`CrudError::Conflict`]
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// The user-facing error message (sanitized)
    fn user_message(&self) -> String {
        match self {
            Self::Validation { errors } => {
                if errors.len() == 1 {
                    errors[0].clone()
                } else {
                    format!("Validation failed: {}", errors.join(", "))
                }
            }
            Self::NotFound { resource, key } => match key {
                Some(key) => format!("{resource} with key {key} not found"),
                None => format!("{resource} not found"),
            },
            Self::Conflict { message } | Self::Database { message, .. } => message.clone(),
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Database { internal, .. } => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "CRUD error"
                );
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<String>>,
}

impl IntoResponse for CrudError {
    fn into_response(self) -> Response {
        self.log_internal();

        let status = self.status_code();
        let response = match &self {
            Self::Validation { errors } => ErrorResponse {
                error: "Validation failed".to_string(),
                details: Some(errors.clone()),
            },
            _ => ErrorResponse {
                error: self.user_message(),
                details: None,
            },
        };

        (status, Json(response)).into_response()
    }
}

impl fmt::Display for CrudError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for CrudError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database { internal, .. } => Some(internal),
            _ => None,
        }
    }
}

/// Convert a Sea-ORM error
///
/// - `DbErr::RecordNotFound` → 404
/// - unique / foreign key violations → 409
/// - everything else → 500
impl From<DbErr> for CrudError {
    fn from(err: DbErr) -> Self {
        if let DbErr::RecordNotFound(msg) = &err {
            let resource = msg.split_whitespace().next().unwrap_or("Resource");
            return Self::not_found(resource, None);
        }
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                Self::conflict(format!("Conflict: {detail}"))
            }
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                Self::conflict(format!("Conflict: {detail}"))
            }
            _ => Self::database(err),
        }
    }
}
