//! Results CSV: writing it, uploading it, and reading it back for charting.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::storage::ObjectStore;

pub const RESULTS_FILE_NAME: &str = "sentiment_analysis_results.csv";
pub const REVIEW_COLUMN: &str = "Review";
pub const SENTIMENT_COLUMN: &str = "Sentiment";

/// One classified review, in upload order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(rename = "Review")]
    pub review: String,
    #[serde(rename = "Sentiment")]
    pub sentiment: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ResultsError {
    #[error("results file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("results CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV must contain '{0}' column.")]
    MissingColumn(&'static str),
}

/// Writes the records with a `Review,Sentiment` header.
pub fn write_results(path: &Path, records: &[ResultRecord]) -> Result<(), ResultsError> {
    // headers are written by hand so an empty set still gets them
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record([REVIEW_COLUMN, SENTIMENT_COLUMN])?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads a results CSV back. Columns are located by header name, so extra
/// columns or a different order are fine; a missing column is not.
pub fn read_results(path: &Path) -> Result<Vec<ResultRecord>, ResultsError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.clone();

    let sentiment_idx = column_index(&headers, SENTIMENT_COLUMN)?;
    let review_idx = column_index(&headers, REVIEW_COLUMN)?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        records.push(ResultRecord {
            review: row.get(review_idx).unwrap_or_default().to_string(),
            sentiment: row.get(sentiment_idx).unwrap_or_default().to_string(),
        });
    }
    Ok(records)
}

fn column_index(headers: &csv::StringRecord, name: &'static str) -> Result<usize, ResultsError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or(ResultsError::MissingColumn(name))
}

/// Where the results of one request ended up.
#[derive(Debug, Clone)]
pub struct PersistedResults {
    pub local_path: PathBuf,
    pub remote_key: String,
    /// False when the upload failed; the local file is still valid
    pub uploaded: bool,
}

pub struct ResultPersister {
    store: Arc<dyn ObjectStore>,
    results_dir: PathBuf,
}

impl ResultPersister {
    pub fn new(store: Arc<dyn ObjectStore>, results_dir: PathBuf) -> Self {
        Self { store, results_dir }
    }

    /// Writes `<request_id>_sentiment_analysis_results.csv` locally and
    /// uploads it under the same name.
    ///
    /// The local write must succeed. Upload failures are logged and only
    /// reflected in `uploaded`.
    pub async fn persist(
        &self,
        request_id: &str,
        records: Vec<ResultRecord>,
    ) -> Result<PersistedResults, ResultsError> {
        let file_name = format!("{}_{}", request_id, RESULTS_FILE_NAME);
        let local_path = self.results_dir.join(&file_name);

        tokio::fs::create_dir_all(&self.results_dir).await?;
        let write_path = local_path.clone();
        tokio::task::spawn_blocking(move || write_results(&write_path, &records))
            .await
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))??;

        let uploaded = match self.store.put_object(&local_path, &file_name).await {
            Ok(()) => {
                info!("💾 Local file {} uploaded as {}", local_path.display(), file_name);
                true
            }
            Err(e) => {
                error!("Error uploading local file {}: {:#}", local_path.display(), e);
                false
            }
        };

        Ok(PersistedResults {
            local_path,
            remote_key: file_name,
            uploaded,
        })
    }
}
