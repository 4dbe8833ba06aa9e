//! Keyed JSON document store.
//!
//! Records live in named collections as JSON documents. Besides the usual
//! get/insert/update calls the store supports numeric increments and
//! [`WriteBatch`] commits: a list of writes applied all-or-nothing, where an
//! increment may carry a ceiling. A batch whose guarded increment would start
//! at or above its ceiling is rejected as a whole with
//! [`CommitOutcome::GuardFailed`], which is how submission caps and card
//! quotas are enforced without a check-then-write race.
//!
//! Two backends share the same staging logic so their semantics cannot drift:
//! - `sqlite`: durable, one row per document, batches run in an immediate
//!   transaction.
//! - `memory`: process-local maps behind a mutex, used for tests and
//!   throwaway runs.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Templates,
    Forms,
    Submissions,
    Companies,
    GeneratedCards,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Templates => "templates",
            Collection::Forms => "forms",
            Collection::Submissions => "submissions",
            Collection::Companies => "companies",
            Collection::GeneratedCards => "generatedCards",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {0}/{1} already exists")]
    AlreadyExists(Collection, String),

    #[error("document {0}/{1} does not exist")]
    Missing(Collection, String),

    #[error("field '{2}' of {0}/{1} is not an integer")]
    NotNumeric(Collection, String, String),

    #[error("malformed document: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("{0}")]
    Backend(String),
}

/// A single write inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Create-only; fails with [`StoreError::AlreadyExists`].
    Insert {
        collection: Collection,
        id: String,
        doc: Value,
    },
    /// Field-level merge. Keys may be dotted paths (`subscription.cardsUsed`).
    Update {
        collection: Collection,
        id: String,
        fields: Map<String, Value>,
    },
    /// Adds `by` to an integer field (absent counts as 0). With a ceiling the
    /// whole batch is rejected unless the current value is below it.
    Increment {
        collection: Collection,
        id: String,
        field: String,
        by: i64,
        ceiling: Option<i64>,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(mut self, collection: Collection, id: &str, doc: Value) -> Self {
        self.ops.push(WriteOp::Insert {
            collection,
            id: id.to_string(),
            doc,
        });
        self
    }

    pub fn update(mut self, collection: Collection, id: &str, fields: Map<String, Value>) -> Self {
        self.ops.push(WriteOp::Update {
            collection,
            id: id.to_string(),
            fields,
        });
        self
    }

    pub fn increment(self, collection: Collection, id: &str, field: &str, by: i64) -> Self {
        self.push_increment(collection, id, field, by, None)
    }

    /// Increment only while the current value is below `ceiling`.
    pub fn increment_below(
        self,
        collection: Collection,
        id: &str,
        field: &str,
        by: i64,
        ceiling: i64,
    ) -> Self {
        self.push_increment(collection, id, field, by, Some(ceiling))
    }

    fn push_increment(
        mut self,
        collection: Collection,
        id: &str,
        field: &str,
        by: i64,
        ceiling: Option<i64>,
    ) -> Self {
        self.ops.push(WriteOp::Increment {
            collection,
            id: id.to_string(),
            field: field.to_string(),
            by,
            ceiling,
        });
        self
    }

}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// A guarded increment was already at its ceiling; nothing was written.
    GuardFailed {
        collection: Collection,
        id: String,
        field: String,
    },
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError>;

    /// Every document whose top-level `field` equals `value`.
    async fn find_by(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StoreError>;

    async fn commit(&self, batch: WriteBatch) -> Result<CommitOutcome, StoreError>;

    async fn insert(&self, collection: Collection, id: &str, doc: Value) -> Result<(), StoreError> {
        self.commit(WriteBatch::new().insert(collection, id, doc))
            .await
            .map(|_| ())
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        self.commit(WriteBatch::new().update(collection, id, fields))
            .await
            .map(|_| ())
    }

    async fn increment(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
        by: i64,
    ) -> Result<(), StoreError> {
        self.commit(WriteBatch::new().increment(collection, id, field, by))
            .await
            .map(|_| ())
    }
}

/// Loads and decodes one document.
pub async fn load<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    id: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(collection, id).await? {
        Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
        None => Ok(None),
    }
}

pub fn to_document<T: Serialize>(value: &T) -> Result<Value, StoreError> {
    Ok(serde_json::to_value(value)?)
}

/// Builds an update map from `(path, value)` pairs.
pub fn fields<I, K>(pairs: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

/// Reads a dotted path out of a document.
pub fn field_value<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |node, key| node.get(key))
}

fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced with an object"),
    }
}

fn set_path(doc: &mut Value, path: &str, value: Value) {
    let (parents, leaf) = match path.rsplit_once('.') {
        Some((parents, leaf)) => (Some(parents), leaf),
        None => (None, path),
    };
    let mut node = doc;
    for key in parents.into_iter().flat_map(|p| p.split('.')) {
        node = ensure_object(node)
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    ensure_object(node).insert(leaf.to_string(), value);
}

pub(crate) struct StagedWrite {
    pub collection: Collection,
    pub id: String,
    pub doc: Value,
}

pub(crate) enum Staged {
    Ready(Vec<StagedWrite>),
    GuardFailed(CommitOutcome),
}

fn staged_doc<'a, F>(
    staged: &'a mut Vec<StagedWrite>,
    load: &mut F,
    collection: Collection,
    id: &str,
) -> Result<Option<&'a mut Value>, StoreError>
where
    F: FnMut(Collection, &str) -> Result<Option<Value>, StoreError>,
{
    if let Some(pos) = staged
        .iter()
        .position(|w| w.collection == collection && w.id == id)
    {
        return Ok(Some(&mut staged[pos].doc));
    }
    match load(collection, id)? {
        Some(doc) => {
            staged.push(StagedWrite {
                collection,
                id: id.to_string(),
                doc,
            });
            Ok(staged.last_mut().map(|w| &mut w.doc))
        }
        None => Ok(None),
    }
}

/// Applies a batch to copies of the affected documents. Nothing is written;
/// the caller persists the returned documents only when staging succeeds.
pub(crate) fn stage<F>(batch: WriteBatch, mut load: F) -> Result<Staged, StoreError>
where
    F: FnMut(Collection, &str) -> Result<Option<Value>, StoreError>,
{
    let mut staged: Vec<StagedWrite> = Vec::new();
    for op in batch.ops {
        match op {
            WriteOp::Insert {
                collection,
                id,
                doc,
            } => {
                if staged_doc(&mut staged, &mut load, collection, &id)?.is_some() {
                    return Err(StoreError::AlreadyExists(collection, id));
                }
                staged.push(StagedWrite {
                    collection,
                    id,
                    doc,
                });
            }
            WriteOp::Update {
                collection,
                id,
                fields,
            } => {
                let doc = staged_doc(&mut staged, &mut load, collection, &id)?
                    .ok_or_else(|| StoreError::Missing(collection, id.clone()))?;
                for (path, value) in fields {
                    set_path(doc, &path, value);
                }
            }
            WriteOp::Increment {
                collection,
                id,
                field,
                by,
                ceiling,
            } => {
                let doc = staged_doc(&mut staged, &mut load, collection, &id)?
                    .ok_or_else(|| StoreError::Missing(collection, id.clone()))?;
                let current = match field_value(doc, &field) {
                    None | Some(Value::Null) => 0,
                    Some(v) => v.as_i64().ok_or_else(|| {
                        StoreError::NotNumeric(collection, id.clone(), field.clone())
                    })?,
                };
                if ceiling.is_some_and(|ceiling| current >= ceiling) {
                    return Ok(Staged::GuardFailed(CommitOutcome::GuardFailed {
                        collection,
                        id,
                        field,
                    }));
                }
                set_path(doc, &field, Value::from(current + by));
            }
        }
    }
    Ok(Staged::Ready(staged))
}
