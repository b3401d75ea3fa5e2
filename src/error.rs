use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::path::PathBuf;

use crate::index::ToolError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid genomic region: {0}")]
    Parse(String),

    #[error("invalid interval: {0}")]
    Construction(String),

    #[error("{}: {message}", path.display())]
    Format { path: PathBuf, message: String },

    #[error("indexing {} failed: {source}", path.display())]
    IndexTool {
        path: PathBuf,
        #[source]
        source: ToolError,
    },

    #[error("indexing {} failed, and sorting it did not help", .0.display())]
    SortRetryExhausted(PathBuf),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub(crate) fn format(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Format {
            path: path.into(),
            message: message.into(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Error::Parse(_) => "ParseError",
            Error::Construction(_) => "ConstructionError",
            Error::Format { .. } => "FormatError",
            Error::IndexTool { .. } => "IndexToolError",
            Error::SortRetryExhausted(_) => "SortRetryExhausted",
            Error::NotFound(_) => "NotFound",
            Error::InvalidInput(_) => "InvalidInput",
            Error::InvalidRange(_) => "InvalidRange",
            Error::Io(_) | Error::Json(_) | Error::Internal(_) => "InternalError",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Parse(_) | Error::Construction(_) | Error::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::InvalidRange(_) => StatusCode::RANGE_NOT_SATISFIABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                kind: self.kind(),
                message: self.to_string(),
            },
        };
        (self.status_code(), axum::Json(body)).into_response()
    }
}
