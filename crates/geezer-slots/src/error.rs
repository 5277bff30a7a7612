use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::ledger::LedgerError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {key}: {detail}")]
    InvalidEnvVar { key: String, detail: String },

    #[error("invalid DISCORD_PUBLIC_KEY: {0}")]
    InvalidPublicKey(String),

    #[error("malformed interaction: {0}")]
    BadInteraction(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadInteraction(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "interaction failed");
        } else {
            tracing::warn!(error = %self, "interaction rejected");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
