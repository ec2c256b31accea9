// HTTP API error taxonomy and response mapping
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::store::StoreError;

/// Request-level failure with a stable machine reason and a localized
/// user-facing message. The reason string is part of the wire contract;
/// the message is not.
#[derive(Debug)]
pub enum ApiError {
    // 401 - no or invalid session credential
    Unauthenticated(String),

    // 403 - valid session, wrong tenant or insufficient tier. Deliberately
    // carries no detail: the response is identical for every cause so the
    // tenant namespace cannot be probed.
    Forbidden,

    // 404 - requested practice is soft-deleted or does not exist
    TenantUnavailable,

    // 404 - record absent within the authorized practice
    NotFound(String),

    // 400 - malformed request payload or path
    Invalid(String),

    // 500 - database/cache/third-party failure; detail is logged, not sent
    Upstream(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::TenantUnavailable => StatusCode::NOT_FOUND,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Invalid(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable reason code for client handling
    pub fn reason(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated(_) => "Unauthenticated",
            ApiError::Forbidden => "Forbidden",
            ApiError::TenantUnavailable => "TenantUnavailable",
            ApiError::NotFound(_) => "NotFound",
            ApiError::Invalid(_) => "Invalid",
            ApiError::Upstream(_) => "Upstream",
        }
    }

    /// User-facing message (German UI copy, never internal detail)
    pub fn message(&self) -> String {
        match self {
            ApiError::Unauthenticated(_) => "Anmeldung erforderlich".to_string(),
            ApiError::Forbidden => "Nicht autorisiert".to_string(),
            ApiError::TenantUnavailable | ApiError::NotFound(_) => "Nicht gefunden".to_string(),
            ApiError::Invalid(msg) => format!("Ungültige Anfrage: {}", msg),
            ApiError::Upstream(_) => "Ein interner Fehler ist aufgetreten".to_string(),
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "reason": self.reason(),
            "message": self.message(),
        })
    }

    pub fn unauthenticated(detail: impl Into<String>) -> Self {
        ApiError::Unauthenticated(detail.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        ApiError::NotFound(what.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        ApiError::Invalid(msg.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ApiError::NotFound(what),
            StoreError::Connection(msg) => {
                tracing::error!("store connection error: {}", msg);
                ApiError::Upstream(msg)
            }
            StoreError::Query(msg) => {
                tracing::error!("store query error: {}", msg);
                ApiError::Upstream(msg)
            }
            StoreError::Sqlx(e) => {
                tracing::error!("sqlx error: {}", e);
                ApiError::Upstream(e.to_string())
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Unauthenticated(detail) => write!(f, "unauthenticated: {}", detail),
            ApiError::Forbidden => write!(f, "forbidden"),
            ApiError::TenantUnavailable => write!(f, "tenant unavailable"),
            ApiError::NotFound(what) => write!(f, "not found: {}", what),
            ApiError::Invalid(msg) => write!(f, "invalid request: {}", msg),
            ApiError::Upstream(msg) => write!(f, "upstream failure: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            ApiError::unauthenticated("x").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::TenantUnavailable.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::invalid("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Upstream("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn forbidden_is_uniform() {
        // Same body no matter why authorization failed
        let body = ApiError::Forbidden.to_json();
        assert_eq!(body["reason"], "Forbidden");
        assert_eq!(body["message"], "Nicht autorisiert");
    }

    #[test]
    fn upstream_detail_is_not_leaked() {
        let body = ApiError::Upstream("connection refused to db-host:5432".into()).to_json();
        assert_eq!(body["reason"], "Upstream");
        assert!(!body["message"]
            .as_str()
            .unwrap()
            .contains("db-host"));
    }
}
