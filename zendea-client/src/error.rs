use reqwest::{Response, StatusCode};
use thiserror::Error;

/// Client-side error taxonomy. Server responses fold into one of four
/// actionable buckets so callers can decide between telling the user,
/// re-authenticating, or retrying.
#[derive(Debug, Error)]
pub enum ZendeaClientError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("service unavailable: {0}")]
    Transient(String),
    #[error("request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("token storage error: {0}")]
    TokenStorage(#[from] std::io::Error),
}

impl ZendeaClientError {
    /// Maps a non-success response to the taxonomy. Consumes the body to
    /// surface the server's error message where one exists.
    pub async fn from_http_response(resp: Response) -> Self {
        let status = resp.status();
        let detail = resp
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_owned))
            .unwrap_or_else(|| status.to_string());

        match status {
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT => Self::InvalidRequest(detail),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized,
            StatusCode::NOT_FOUND => Self::NotFound,
            s if s.is_server_error() => Self::Transient(detail),
            _ => Self::InvalidRequest(detail),
        }
    }

    /// Transient failures are worth retrying; everything else is not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transient(_) => true,
            Self::RequestError(err) => err.is_timeout() || err.is_connect(),
            _ => false,
        }
    }
}
