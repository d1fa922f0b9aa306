use axum::http::StatusCode;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

/// Failures talking to the spreadsheet endpoint.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("sheet request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("sheet endpoint answered {0}")]
    Status(reqwest::StatusCode),
    #[error("sheet response is not JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failures from the text generation service.
#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    #[error("no API key configured for the text service")]
    MissingApiKey,
    #[error("text service request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("text service answered {status}: {message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },
}
