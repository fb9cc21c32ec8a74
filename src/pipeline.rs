use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::charts::{self, ChartArtifact, ChartSet};
use crate::classifier::TextClassifier;
use crate::config::Config;
use crate::error::AppError;
use crate::processor::RowProcessor;
use crate::results::ResultPersister;
use crate::storage::ObjectStore;

/// Public URLs of the three charts of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartUrls {
    pub bar: String,
    pub pie: String,
    pub word_frequency: String,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub request_id: String,
    pub record_count: usize,
    pub results_path: PathBuf,
    pub results_key: String,
    pub uploaded: bool,
    pub charts: ChartUrls,
}

/// upload -> classify -> persist/upload CSV -> read back -> render -> save PNGs
pub struct Pipeline {
    processor: RowProcessor,
    persister: ResultPersister,
    static_dir: PathBuf,
}

impl Pipeline {
    pub fn new(config: &Config, classifier: Arc<dyn TextClassifier>, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            processor: RowProcessor::new(classifier, config.classify_concurrency),
            persister: ResultPersister::new(store, config.results_dir.clone()),
            static_dir: config.static_dir.clone(),
        }
    }

    pub async fn run(&self, upload: &[u8]) -> Result<PipelineOutput, AppError> {
        let request_id = Uuid::new_v4().to_string();
        info!("🚀 [{}] Processing upload of {} bytes", request_id, upload.len());

        // 1. Classify every row
        let records = self.processor.process(upload).await?;
        let record_count = records.len();

        // 2. Persist locally, upload best-effort
        let persisted = self.persister.persist(&request_id, records).await?;
        if !persisted.uploaded {
            warn!("[{}] Continuing without remote copy of {}", request_id, persisted.remote_key);
        }

        // 3. Charts are built from the file on disk, not the in-memory rows
        let csv_path = persisted.local_path.clone();
        let charts = tokio::task::spawn_blocking(move || charts::render(&csv_path))
            .await
            .map_err(|e| AppError::Internal(e.into()))??;

        // 4. Save the PNGs where /static serves them
        let charts = self.save_charts(&request_id, &charts).await?;

        info!(
            "✅ [{}] {} reviews analysed, results at {}",
            request_id,
            record_count,
            persisted.local_path.display()
        );
        Ok(PipelineOutput {
            request_id,
            record_count,
            results_path: persisted.local_path,
            results_key: persisted.remote_key,
            uploaded: persisted.uploaded,
            charts,
        })
    }

    async fn save_charts(&self, request_id: &str, charts: &ChartSet) -> Result<ChartUrls, AppError> {
        tokio::fs::create_dir_all(&self.static_dir)
            .await
            .map_err(|e| AppError::Internal(e.into()))?;

        Ok(ChartUrls {
            bar: self.save_chart(request_id, &charts.bar).await?,
            pie: self.save_chart(request_id, &charts.pie).await?,
            word_frequency: self.save_chart(request_id, &charts.word_frequency).await?,
        })
    }

    async fn save_chart(&self, request_id: &str, artifact: &ChartArtifact) -> Result<String, AppError> {
        let file_name = format!("{}_{}", request_id, artifact.kind.file_name());
        tokio::fs::write(self.static_dir.join(&file_name), &artifact.png)
            .await
            .map_err(|e| AppError::Internal(e.into()))?;
        Ok(format!("/static/{}", file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::fakes::KeywordClassifier;
    use crate::results::read_results;
    use crate::storage::fakes::{FailingStore, MemoryStore};

    fn config(dir: &std::path::Path) -> Config {
        let mut config = Config::from_lookup(|_| None).unwrap();
        config.static_dir = dir.join("static");
        config.results_dir = dir.join("results");
        config
    }

    #[tokio::test]
    async fn test_run_writes_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let store = Arc::new(MemoryStore::default());
        let pipeline = Pipeline::new(&config, Arc::new(KeywordClassifier::default()), store.clone());

        let output = pipeline
            .run(b"good phone\nbad case\ngood screen\n")
            .await
            .unwrap();

        assert_eq!(output.record_count, 3);
        assert!(output.uploaded);
        assert!(store.get(&output.results_key).is_some());
        assert_eq!(read_results(&output.results_path).unwrap().len(), 3);

        let prefix = format!("/static/{}_", output.request_id);
        for url in [&output.charts.bar, &output.charts.pie, &output.charts.word_frequency] {
            assert!(url.starts_with(&prefix), "{}", url);
            let file = config.static_dir.join(url.trim_start_matches("/static/"));
            let png = std::fs::read(file).unwrap();
            assert!(image::load_from_memory(&png).is_ok());
        }
        assert!(output.charts.bar.ends_with("sentiment_bar.png"));
    }

    #[tokio::test]
    async fn test_requests_do_not_share_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let pipeline = Pipeline::new(
            &config,
            Arc::new(KeywordClassifier::default()),
            Arc::new(MemoryStore::default()),
        );

        let first = pipeline.run(b"good\n").await.unwrap();
        let second = pipeline.run(b"bad\n").await.unwrap();
        assert_ne!(first.results_path, second.results_path);
        assert_ne!(first.charts, second.charts);
    }

    #[tokio::test]
    async fn test_upload_failure_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(
            &config(dir.path()),
            Arc::new(KeywordClassifier::default()),
            Arc::new(FailingStore),
        );

        let output = pipeline.run(b"great\n").await.unwrap();
        assert!(!output.uploaded);
        assert!(output.results_path.exists());
    }

    #[tokio::test]
    async fn test_classification_failure_aborts_without_results() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let pipeline = Pipeline::new(
            &config,
            Arc::new(KeywordClassifier::default()),
            Arc::new(MemoryStore::default()),
        );

        let err = pipeline.run(b"good\nfail here\n").await.unwrap_err();
        assert!(matches!(err, AppError::Process(_)));
        assert!(!config.results_dir.exists());
    }

    #[tokio::test]
    async fn test_empty_upload_reports_no_records() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let pipeline = Pipeline::new(
            &config,
            Arc::new(KeywordClassifier::default()),
            Arc::new(MemoryStore::default()),
        );

        let err = pipeline.run(b"").await.unwrap_err();
        assert!(matches!(err, AppError::NoRecords));

        // the header-only CSV was still written
        let written: Vec<_> = std::fs::read_dir(&config.results_dir).unwrap().collect();
        assert_eq!(written.len(), 1);
    }
}
