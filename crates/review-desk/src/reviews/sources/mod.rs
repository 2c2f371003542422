pub mod google;
mod hostaway;

pub use hostaway::{HostawaySource, HOSTAWAY_BASE_URL};

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// Raw provider payload. Providers wrap their review list in an envelope
/// whose `result` key may be missing or null; both read as empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReviewBatch {
    #[serde(default, deserialize_with = "list_or_empty")]
    pub result: Vec<Value>,
}

fn list_or_empty<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    })
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("review source unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("review source returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("review fixture unreadable: {0}")]
    Io(#[from] std::io::Error),
    #[error("review payload undecodable: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Upstream handing back raw review payloads. All I/O in the pipeline lives
/// behind this trait; normalization, aggregation, and filtering stay pure.
#[async_trait]
pub trait RawReviewSource: Send + Sync {
    async fn fetch(&self) -> Result<RawReviewBatch, SourceError>;
}

/// Reads a JSON fixture from disk; a missing file is an empty batch.
pub struct MockFileSource {
    path: PathBuf,
}

impl MockFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RawReviewSource for MockFileSource {
    async fn fetch(&self) -> Result<RawReviewBatch, SourceError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(RawReviewBatch::default()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Answers from the primary source and falls back on any failure instead of
/// surfacing the error; the sandbox provider fails or returns nothing often
/// enough that this is the normal path in development.
pub struct FallbackSource {
    primary: Arc<dyn RawReviewSource>,
    fallback: Arc<dyn RawReviewSource>,
}

impl FallbackSource {
    pub fn new(primary: Arc<dyn RawReviewSource>, fallback: Arc<dyn RawReviewSource>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl RawReviewSource for FallbackSource {
    async fn fetch(&self) -> Result<RawReviewBatch, SourceError> {
        match self.primary.fetch().await {
            Ok(batch) => Ok(batch),
            Err(err) => {
                warn!(error = %err, "primary review source failed, serving fallback");
                self.fallback.fetch().await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    struct FailingSource;

    #[async_trait]
    impl RawReviewSource for FailingSource {
        async fn fetch(&self) -> Result<RawReviewBatch, SourceError> {
            Err(SourceError::Api {
                status: 503,
                body: "down".to_string(),
            })
        }
    }

    struct StaticSource(Vec<Value>);

    #[async_trait]
    impl RawReviewSource for StaticSource {
        async fn fetch(&self) -> Result<RawReviewBatch, SourceError> {
            Ok(RawReviewBatch {
                result: self.0.clone(),
            })
        }
    }

    #[test]
    fn batch_tolerates_missing_or_null_result() {
        let batch: RawReviewBatch = serde_json::from_value(json!({ "status": "success" }))
            .expect("missing result decodes");
        assert!(batch.result.is_empty());

        let batch: RawReviewBatch = serde_json::from_value(json!({ "result": null }))
            .expect("null result decodes");
        assert!(batch.result.is_empty());

        let batch: RawReviewBatch = serde_json::from_value(json!({ "result": [{ "id": 1 }] }))
            .expect("list decodes");
        assert_eq!(batch.result.len(), 1);
    }

    #[tokio::test]
    async fn mock_file_source_treats_missing_file_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = MockFileSource::new(dir.path().join("absent.json"));
        let batch = source.fetch().await.expect("missing file is empty");
        assert!(batch.result.is_empty());
    }

    #[tokio::test]
    async fn mock_file_source_reads_the_fixture() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "status": "success", "result": [{{ "id": 1 }}] }}"#)
            .expect("write fixture");

        let source = MockFileSource::new(file.path());
        let batch = source.fetch().await.expect("fixture reads");
        assert_eq!(batch.result.len(), 1);
    }

    #[tokio::test]
    async fn fallback_source_recovers_from_primary_failure() {
        let source = FallbackSource::new(
            Arc::new(FailingSource),
            Arc::new(StaticSource(vec![json!({ "id": 1 })])),
        );
        let batch = source.fetch().await.expect("fallback answers");
        assert_eq!(batch.result.len(), 1);
    }
}
