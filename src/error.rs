//! Request-level error and its mapping onto HTTP responses.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::charts::ChartError;
use crate::processor::ProcessError;
use crate::results::ResultsError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No file part")]
    MissingFile,

    #[error("No selected file")]
    EmptyFilename,

    #[error("Unsupported file type '{0}': please upload a .csv file")]
    UnsupportedFileType(String),

    #[error("Invalid upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Results(#[from] ResultsError),

    #[error("No reviews to chart: the uploaded file has no rows")]
    NoRecords,

    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingFile
            | AppError::EmptyFilename
            | AppError::UnsupportedFileType(_) => StatusCode::BAD_REQUEST,
            // 413 for an oversized upload, 400 for a malformed one
            AppError::Multipart(e) => e.status(),
            AppError::Process(ProcessError::Csv(_)) => StatusCode::BAD_REQUEST,
            AppError::Process(ProcessError::Classification { .. }) => StatusCode::BAD_GATEWAY,
            AppError::Results(ResultsError::MissingColumn(_)) | AppError::NoRecords => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Results(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ChartError> for AppError {
    fn from(err: ChartError) -> Self {
        match err {
            ChartError::Results(e) => AppError::Results(e),
            ChartError::NoRecords => AppError::NoRecords,
            ChartError::Encode(e) => AppError::Internal(e.into()),
            ChartError::Font(e) => AppError::Internal(e.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("🔥 Request failed: {}", self);
        }
        (status, self.to_string()).into_response()
    }
}
