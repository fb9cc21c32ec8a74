//! Process configuration, read once from the environment at startup.

use anyhow::{Context, Result};
use std::path::PathBuf;

const DEFAULT_REGION: &str = "ap-south-1";
const DEFAULT_BUCKET: &str = "cccpbucket1";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_CONCURRENCY: usize = 8;
const DEFAULT_MAX_UPLOAD_MB: usize = 16;

#[derive(Debug, Clone)]
pub struct Config {
    /// Region for both S3 and Comprehend clients
    pub aws_region: String,
    /// Bucket receiving the results CSV
    pub bucket_name: String,
    pub port: u16,
    /// Directory served under `/static`, charts are written here
    pub static_dir: PathBuf,
    /// Where the intermediate results CSV is written before upload
    pub results_dir: PathBuf,
    /// Max in-flight classification calls per request
    pub classify_concurrency: usize,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Builds the config from process environment variables.
    ///
    /// Credentials (`AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`) are left to the
    /// AWS default credential chain and never stored here.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got '{}'", raw))?,
            None => DEFAULT_PORT,
        };

        let classify_concurrency = match var("CLASSIFY_CONCURRENCY") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("CLASSIFY_CONCURRENCY must be an integer, got '{}'", raw))?
                .max(1),
            None => DEFAULT_CONCURRENCY,
        };

        let max_upload_mb = match var("MAX_UPLOAD_MB") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("MAX_UPLOAD_MB must be an integer, got '{}'", raw))?,
            None => DEFAULT_MAX_UPLOAD_MB,
        };

        Ok(Self {
            aws_region: var("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            bucket_name: var("BUCKET_NAME").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            port,
            static_dir: var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static")),
            results_dir: var("RESULTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            classify_concurrency,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        })
    }
}
