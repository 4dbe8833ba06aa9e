use super::{stage, Collection, CommitOutcome, DocumentStore, Staged, StoreError, WriteBatch};
use async_trait::async_trait;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    body TEXT NOT NULL,
    PRIMARY KEY (collection, id)
)";

/// SQLite-backed store: one row per document, JSON body as text.
///
/// rusqlite is synchronous, so every call runs on the blocking pool. Batches
/// use an immediate transaction, which takes the database write lock up
/// front and keeps other processes sharing the file from interleaving.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(SCHEMA, [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StoreError::Backend("sqlite connection lock poisoned".to_string()))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| StoreError::Backend(format!("sqlite task join error: {}", e)))?
    }
}

fn read_doc(conn: &Connection, collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
    let body: Option<String> = conn
        .query_row(
            "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection.name(), id],
            |row| row.get(0),
        )
        .optional()?;
    match body {
        Some(body) => Ok(Some(serde_json::from_str(&body)?)),
        None => Ok(None),
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    fn backend_tag(&self) -> &'static str {
        "sqlite"
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
        let id = id.to_string();
        self.with_conn(move |conn| read_doc(conn, collection, &id))
            .await
    }

    async fn find_by(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StoreError> {
        let field = field.to_string();
        let value = value.clone();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare("SELECT body FROM documents WHERE collection = ?1")?;
            let bodies = stmt
                .query_map(params![collection.name()], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            let mut found = Vec::new();
            for body in bodies {
                let doc: Value = serde_json::from_str(&body)?;
                if doc.get(&field) == Some(&value) {
                    found.push(doc);
                }
            }
            Ok(found)
        })
        .await
    }

    async fn commit(&self, batch: WriteBatch) -> Result<CommitOutcome, StoreError> {
        self.with_conn(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let staged = stage(batch, |collection, id| read_doc(&tx, collection, id))?;
            match staged {
                Staged::GuardFailed(outcome) => {
                    debug!("Batch rejected by guard: {:?}", outcome);
                    tx.rollback()?;
                    Ok(outcome)
                }
                Staged::Ready(writes) => {
                    for write in &writes {
                        tx.execute(
                            "INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3)
                             ON CONFLICT(collection, id) DO UPDATE SET body = excluded.body",
                            params![
                                write.collection.name(),
                                &write.id,
                                serde_json::to_string(&write.doc)?
                            ],
                        )?;
                    }
                    tx.commit()?;
                    Ok(CommitOutcome::Committed)
                }
            }
        })
        .await
    }
}
