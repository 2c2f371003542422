use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Utc;
use serde::Deserialize;

use super::domain::ApprovalRecord;

/// Point-in-time view of every moderator decision, keyed by review id.
pub type ApprovalsSnapshot = HashMap<String, ApprovalRecord>;

/// One moderator decision to apply to a review id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalChange {
    pub approved: bool,
    #[serde(default)]
    pub listing_id: Option<String>,
}

/// Durable approval mapping. The store exclusively owns persistence; callers
/// only read snapshots and write single-entry upserts. A missing backing
/// store reads as empty and is created on first write.
pub trait ApprovalStore: Send + Sync {
    fn read_all(&self) -> Result<ApprovalsSnapshot, ApprovalStoreError>;

    /// Upsert one entry: `approved` and `updatedAt` are always replaced,
    /// `listingId` only when supplied (merge-preserve).
    fn upsert(
        &self,
        review_id: &str,
        change: ApprovalChange,
    ) -> Result<ApprovalRecord, ApprovalStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ApprovalStoreError {
    #[error("approval store unreadable: {0}")]
    Io(#[from] std::io::Error),
    #[error("approval store corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

fn merged(existing: Option<ApprovalRecord>, change: ApprovalChange) -> ApprovalRecord {
    let listing_id = change
        .listing_id
        .or_else(|| existing.and_then(|record| record.listing_id));
    ApprovalRecord {
        approved: change.approved,
        listing_id,
        updated_at: Utc::now(),
    }
}

/// Map-backed store for tests and CLI demos.
#[derive(Default)]
pub struct InMemoryApprovalStore {
    records: Mutex<ApprovalsSnapshot>,
}

impl ApprovalStore for InMemoryApprovalStore {
    fn read_all(&self) -> Result<ApprovalsSnapshot, ApprovalStoreError> {
        Ok(self.records.lock().expect("approvals mutex poisoned").clone())
    }

    fn upsert(
        &self,
        review_id: &str,
        change: ApprovalChange,
    ) -> Result<ApprovalRecord, ApprovalStoreError> {
        let mut guard = self.records.lock().expect("approvals mutex poisoned");
        let record = merged(guard.get(review_id).cloned(), change);
        guard.insert(review_id.to_string(), record.clone());
        Ok(record)
    }
}

/// Pretty-printed JSON object on disk, one key per review id. The mutex
/// makes every upsert an atomic read-modify-write within the process;
/// concurrent writers to the same key resolve last-writer-wins.
pub struct JsonFileApprovalStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileApprovalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<ApprovalsSnapshot, ApprovalStoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(ApprovalsSnapshot::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn persist(&self, snapshot: &ApprovalsSnapshot) -> Result<(), ApprovalStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(snapshot)?)?;
        Ok(())
    }
}

impl ApprovalStore for JsonFileApprovalStore {
    fn read_all(&self) -> Result<ApprovalsSnapshot, ApprovalStoreError> {
        let _guard = self.lock.lock().expect("approvals file mutex poisoned");
        self.load()
    }

    fn upsert(
        &self,
        review_id: &str,
        change: ApprovalChange,
    ) -> Result<ApprovalRecord, ApprovalStoreError> {
        let _guard = self.lock.lock().expect("approvals file mutex poisoned");
        let mut snapshot = self.load()?;
        let record = merged(snapshot.remove(review_id), change);
        snapshot.insert(review_id.to_string(), record.clone());
        self.persist(&snapshot)?;
        Ok(record)
    }
}
