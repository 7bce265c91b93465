use serde::{Deserialize, Serialize};

/// Body of `GET /health`. `status` is `healthy` when the store answers a
/// ping and `degraded` otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Body of every failed request.
///
/// `error` is a stable machine code (`not_found`, `conflict`,
/// `content_rejected`, ...), `message` is safe to show to a client and
/// `status_code` repeats the HTTP status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
