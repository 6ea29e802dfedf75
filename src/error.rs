use actix_multipart::MultipartError;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

/// Everything that can end an upload request early. The `Display` text is for
/// logs; callers only ever see [`RelayError::public_message`].
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("malformed multipart body: {0}")]
    Parse(#[from] MultipartError),

    #[error("failed to spool file part to disk: {0}")]
    Spool(#[source] std::io::Error),

    #[error("file part exceeds the {limit} byte limit")]
    FileTooLarge { limit: usize },

    #[error("request contained no file parts")]
    NoFiles,

    #[error("temporary file i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode webhook payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("webhook request failed: {0}")]
    Webhook(#[from] reqwest::Error),
}

impl RelayError {
    pub fn public_message(&self) -> &'static str {
        match self {
            RelayError::Parse(_) | RelayError::Spool(_) => "Error during form parsing",
            RelayError::FileTooLarge { .. } => "File too large",
            RelayError::NoFiles => "No files uploaded",
            RelayError::Io(_) | RelayError::Encode(_) | RelayError::Webhook(_) => {
                "Error sending to Discord"
            }
        }
    }
}

impl ResponseError for RelayError {
    fn status_code(&self) -> StatusCode {
        match self {
            RelayError::NoFiles => StatusCode::BAD_REQUEST,
            RelayError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::Parse(_)
            | RelayError::Spool(_)
            | RelayError::Io(_)
            | RelayError::Encode(_)
            | RelayError::Webhook(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(self.public_message())
    }
}
