use super::{stage, Collection, CommitOutcome, DocumentStore, Staged, StoreError, WriteBatch};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;

/// Process-local store. The whole map sits behind one lock, so a batch is
/// staged and applied without any other writer interleaving.
#[derive(Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<Collection, BTreeMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
        let docs = self.docs.lock().await;
        Ok(docs.get(&collection).and_then(|c| c.get(id)).cloned())
    }

    async fn find_by(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StoreError> {
        let docs = self.docs.lock().await;
        Ok(docs
            .get(&collection)
            .map(|c| {
                c.values()
                    .filter(|doc| doc.get(field) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<CommitOutcome, StoreError> {
        let mut docs = self.docs.lock().await;
        let staged = stage(batch, |collection, id| {
            Ok(docs.get(&collection).and_then(|c| c.get(id)).cloned())
        })?;
        match staged {
            Staged::GuardFailed(outcome) => Ok(outcome),
            Staged::Ready(writes) => {
                for write in writes {
                    docs.entry(write.collection)
                        .or_default()
                        .insert(write.id, write.doc);
                }
                Ok(CommitOutcome::Committed)
            }
        }
    }
}
