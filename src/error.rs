use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

/// Reasons an init-data string is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthFailure {
    #[error("init data carries no hash")]
    MissingSignature,

    #[error("init data hash does not match")]
    SignatureMismatch,

    #[error("init data hash is not a hex encoded digest")]
    MalformedPayload,
}

/// Reasons an invoice cannot be issued for a verified caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IssueFailure {
    #[error("amount is not an integer")]
    InvalidAmount,

    #[error("amount is not one of the allowed prices")]
    UnsupportedAmount,

    #[error("bot platform unavailable: {0}")]
    UpstreamUnavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthFailure),

    #[error("Invoice rejected: {0}")]
    Issue(#[from] IssueFailure),

    #[error("Telegram API error {code:?}: {description}")]
    Telegram {
        code: Option<i32>,
        description: String,
    },

    /// Always stored without its URL: Bot API URLs embed the bot token.
    #[error("HTTP error: {0}")]
    Reqwest(reqwest::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Reqwest(err.without_url())
    }
}

impl Error {
    /// Stable code placed in the JSON error body.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Auth(_) => "invalid_init_data",
            Error::Issue(IssueFailure::InvalidAmount) => "invalid_amount",
            Error::Issue(IssueFailure::UnsupportedAmount) => "unsupported_amount",
            Error::Issue(IssueFailure::UpstreamUnavailable(_))
            | Error::Telegram { .. }
            | Error::Reqwest(_) => "upstream_unavailable",
            _ => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::Auth(_) => StatusCode::UNAUTHORIZED,
            Error::Issue(IssueFailure::InvalidAmount)
            | Error::Issue(IssueFailure::UnsupportedAmount) => StatusCode::BAD_REQUEST,
            Error::Issue(IssueFailure::UpstreamUnavailable(_))
            | Error::Telegram { .. }
            | Error::Reqwest(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let body = Json(json!({ "error": self.code() }));
        (status, body).into_response()
    }
}
