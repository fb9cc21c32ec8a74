mod api;
mod charts;
mod classifier;
mod config;
mod error;
mod page;
mod pipeline;
mod processor;
mod results;
mod storage;

use std::sync::Arc;

use aws_config::{BehaviorVersion, Region};
use dotenv::dotenv;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::classifier::ComprehendClassifier;
use crate::config::Config;
use crate::pipeline::Pipeline;
use crate::storage::S3Store;

#[derive(OpenApi)]
#[openapi(
    paths(api::analyze),
    components(schemas(api::UploadForm, api::AnalysisResponse)),
    tags(
        (name = "sentiment", description = "Review sentiment analysis")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    info!(
        "Region {}, bucket {}, static dir {}",
        config.aws_region,
        config.bucket_name,
        config.static_dir.display()
    );

    // Credentials come from the default chain (AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY, profile, ...)
    let aws = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()))
        .load()
        .await;

    let classifier = Arc::new(ComprehendClassifier::new(aws_sdk_comprehend::Client::new(&aws)));
    let store = Arc::new(S3Store::new(aws_sdk_s3::Client::new(&aws), config.bucket_name.clone()));
    let pipeline = Pipeline::new(&config, classifier, store);

    tokio::fs::create_dir_all(&config.static_dir).await?;
    let state = Arc::new(api::AppState { pipeline });

    let app = api::router(state, &config.static_dir, config.max_upload_bytes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
