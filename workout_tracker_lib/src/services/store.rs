use tokio::sync::Mutex;

use crate::{
    error::TrackerError,
    record::{SessionRecord, StoredSessionId},
};

/// Destination of finished sessions.
///
/// No deduplication happens here: saving the same record twice stores it twice.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    async fn save(&self, record: &SessionRecord) -> Result<StoredSessionId, TrackerError>;
}

/// Keeps saved records in memory, handing out increasing ids from 1.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    records: Mutex<Vec<SessionRecord>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<SessionRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, record: &SessionRecord) -> Result<StoredSessionId, TrackerError> {
        let mut records = self.records.lock().await;
        records.push(record.clone());
        Ok(StoredSessionId {
            id: records.len() as i64,
            document_id: None,
        })
    }
}
