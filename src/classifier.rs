//! Sentiment / key-phrase classification backed by AWS Comprehend.
//!
//! Every call uses the fixed language code `en`; there is no language
//! detection. Errors are returned to the caller untouched, the pipeline
//! treats any of them as fatal for the request.

use async_trait::async_trait;
use aws_sdk_comprehend::error::DisplayErrorContext;
use aws_sdk_comprehend::types::LanguageCode;
use aws_sdk_comprehend::Client;
use serde::{Deserialize, Serialize};

/// Combined result of the sentiment and key-phrase calls for one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Label as emitted by the service: POSITIVE, NEGATIVE, NEUTRAL or MIXED
    pub sentiment: String,
    /// Collected for completeness, nothing downstream reads them yet
    pub key_phrases: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("sentiment detection failed: {0}")]
    Sentiment(String),

    #[error("key phrase detection failed: {0}")]
    KeyPhrases(String),

    #[error("sentiment response carried no label")]
    MissingLabel,
}

#[async_trait]
pub trait TextClassifier: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<AnalysisResult, ClassifierError>;
}

pub struct ComprehendClassifier {
    client: Client,
}

impl ComprehendClassifier {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TextClassifier for ComprehendClassifier {
    async fn analyze(&self, text: &str) -> Result<AnalysisResult, ClassifierError> {
        let sentiment = self
            .client
            .detect_sentiment()
            .text(text)
            .language_code(LanguageCode::En)
            .send()
            .await
            .map_err(|e| ClassifierError::Sentiment(DisplayErrorContext(e).to_string()))?;

        let label = sentiment
            .sentiment()
            .map(|s| s.as_str().to_string())
            .ok_or(ClassifierError::MissingLabel)?;

        let phrases = self
            .client
            .detect_key_phrases()
            .text(text)
            .language_code(LanguageCode::En)
            .send()
            .await
            .map_err(|e| ClassifierError::KeyPhrases(DisplayErrorContext(e).to_string()))?;

        let key_phrases = phrases
            .key_phrases()
            .iter()
            .filter_map(|p| p.text().map(str::to_string))
            .collect();

        Ok(AnalysisResult {
            sentiment: label,
            key_phrases,
        })
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Keyword classifier used in tests in place of Comprehend.
    ///
    /// Texts containing "fail" produce an error, "good"/"great" are POSITIVE,
    /// "bad"/"awful" NEGATIVE, everything else NEUTRAL.
    #[derive(Default)]
    pub struct KeywordClassifier {
        pub calls: AtomicUsize,
    }

    #[async_trait]
    impl TextClassifier for KeywordClassifier {
        async fn analyze(&self, text: &str) -> Result<AnalysisResult, ClassifierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let lower = text.to_lowercase();
            if lower.contains("fail") {
                return Err(ClassifierError::Sentiment("throttled".to_string()));
            }
            let sentiment = if lower.contains("good") || lower.contains("great") {
                "POSITIVE"
            } else if lower.contains("bad") || lower.contains("awful") {
                "NEGATIVE"
            } else {
                "NEUTRAL"
            };
            Ok(AnalysisResult {
                sentiment: sentiment.to_string(),
                key_phrases: text.split_whitespace().take(1).map(str::to_string).collect(),
            })
        }
    }
}
