use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

/// Durable storage for result artifacts.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Uploads the file at `local_path` unmodified under `key`.
    async fn put_object(&self, local_path: &Path, key: &str) -> Result<()>;
}

pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_object(&self, local_path: &Path, key: &str) -> Result<()> {
        let body = ByteStream::from_path(local_path)
            .await
            .with_context(|| format!("reading {}", local_path.display()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("text/csv")
            .body(body)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("S3 upload to {}/{} failed: {}", self.bucket, key, DisplayErrorContext(e)))?;

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MemoryStore {
        objects: Mutex<HashMap<String, Vec<u8>>>,
    }

    impl MemoryStore {
        pub fn get(&self, key: &str) -> Option<Vec<u8>> {
            self.objects.lock().unwrap().get(key).cloned()
        }
    }

    #[async_trait]
    impl ObjectStore for MemoryStore {
        async fn put_object(&self, local_path: &Path, key: &str) -> Result<()> {
            let data = tokio::fs::read(local_path).await?;
            self.objects.lock().unwrap().insert(key.to_string(), data);
            Ok(())
        }
    }

    pub struct FailingStore;

    #[async_trait]
    impl ObjectStore for FailingStore {
        async fn put_object(&self, _local_path: &Path, key: &str) -> Result<()> {
            anyhow::bail!("access denied for {}", key)
        }
    }
}
