//! Turns an uploaded CSV into classified result records.

use std::borrow::Cow;
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, error, info};

use crate::classifier::{ClassifierError, TextClassifier};
use crate::results::ResultRecord;

/// Decodes the upload as UTF-8, falling back to Latin-1.
///
/// Latin-1 maps every byte to a code point so the fallback cannot fail.
pub fn decode_upload(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            debug!("Upload is not valid UTF-8, decoding as Latin-1");
            encoding_rs::mem::decode_latin1(bytes)
        }
    }
}

/// First field of every CSV row. There is no header row: the first line is data.
pub fn review_texts(text: &str) -> Result<Vec<String>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut texts = Vec::new();
    for record in reader.records() {
        let record = record?;
        match record.get(0) {
            Some(first) if !first.is_empty() => texts.push(first.to_string()),
            _ => {}
        }
    }
    Ok(texts)
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("could not parse upload as CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("classification failed for row {row}: {source}")]
    Classification {
        row: usize,
        #[source]
        source: ClassifierError,
    },
}

pub struct RowProcessor {
    classifier: Arc<dyn TextClassifier>,
    concurrency: usize,
}

impl RowProcessor {
    pub fn new(classifier: Arc<dyn TextClassifier>, concurrency: usize) -> Self {
        Self {
            classifier,
            concurrency: concurrency.max(1),
        }
    }

    /// Classifies every review, at most `concurrency` calls in flight.
    ///
    /// Calls complete in any order and are put back in input order at the
    /// end. The first failure to complete aborts the batch and drops the
    /// calls still in flight.
    pub async fn process(&self, bytes: &[u8]) -> Result<Vec<ResultRecord>, ProcessError> {
        let texts = review_texts(&decode_upload(bytes))?;
        info!("Classifying {} reviews ({} concurrent)", texts.len(), self.concurrency);

        let classifier = self.classifier.as_ref();
        let mut indexed = stream::iter(texts.into_iter().enumerate())
            .map(|(row, text)| async move {
                match classifier.analyze(&text).await {
                    Ok(result) => {
                        debug!(row, key_phrases = result.key_phrases.len(), "Row classified as {}", result.sentiment);
                        Ok((
                            row,
                            ResultRecord {
                                review: text,
                                sentiment: result.sentiment,
                            },
                        ))
                    }
                    Err(source) => {
                        error!(row, "Classification failed: {}", source);
                        Err(ProcessError::Classification { row, source })
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .try_collect::<Vec<_>>()
            .await?;

        indexed.sort_unstable_by_key(|(row, _)| *row);
        Ok(indexed.into_iter().map(|(_, record)| record).collect())
    }
}
