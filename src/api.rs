//! HTTP handlers: the upload page and the JSON analysis endpoint.

use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, services::ServeDir};
use tracing::info;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::page;
use crate::pipeline::{Pipeline, PipelineOutput};

pub struct AppState {
    pub pipeline: Pipeline,
}

/// Multipart form accepted by both upload routes.
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct UploadForm {
    /// CSV file, reviews in the first column
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnalysisResponse {
    pub request_id: String,
    pub record_count: usize,
    /// Object key of the results CSV in the bucket
    pub results_key: String,
    /// False when the results CSV could not be uploaded
    pub uploaded: bool,
    pub bar_image: String,
    pub pie_image: String,
    pub word_frequency_image: String,
}

impl From<PipelineOutput> for AnalysisResponse {
    fn from(output: PipelineOutput) -> Self {
        Self {
            request_id: output.request_id,
            record_count: output.record_count,
            results_key: output.results_key,
            uploaded: output.uploaded,
            bar_image: output.charts.bar,
            pie_image: output.charts.pie,
            word_frequency_image: output.charts.word_frequency,
        }
    }
}

pub fn router(state: Arc<AppState>, static_dir: &Path, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index).post(upload))
        .route("/api/analyze", post(analyze))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn index() -> Html<String> {
    Html(page::render_index(None))
}

/// Form upload: runs the pipeline and re-renders the page with the charts.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Html<String>, AppError> {
    let data = read_csv_upload(multipart).await?;
    let output = state.pipeline.run(&data).await?;
    Ok(Html(page::render_index(Some(&output.charts))))
}

#[utoipa::path(
    post,
    path = "/api/analyze",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Reviews classified and charts rendered", body = AnalysisResponse),
        (status = 400, description = "No file, empty file name, or not a .csv file"),
        (status = 413, description = "Upload larger than the configured limit"),
        (status = 422, description = "Nothing to chart"),
        (status = 502, description = "Text analysis service failed")
    ),
    tag = "sentiment"
)]
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let data = read_csv_upload(multipart).await?;
    let output = state.pipeline.run(&data).await?;
    Ok(Json(output.into()))
}

/// Pulls the `file` field out of the form and checks it is a CSV upload.
async fn read_csv_upload(multipart: Result<Multipart, MultipartRejection>) -> Result<Bytes, AppError> {
    let mut multipart = multipart.map_err(|_| AppError::MissingFile)?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        // a part without a filename is a plain form value, not a file
        let Some(file_name) = field.file_name().map(str::to_string) else {
            return Err(AppError::MissingFile);
        };
        if file_name.is_empty() {
            return Err(AppError::EmptyFilename);
        }
        if !file_name.ends_with(".csv") {
            return Err(AppError::UnsupportedFileType(file_name));
        }

        let data = field.bytes().await?;
        info!("📥 Received {} ({} bytes)", file_name, data.len());
        return Ok(data);
    }

    Err(AppError::MissingFile)
}
