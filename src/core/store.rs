//! Local record mirror
//!
//! Collections fetched from the backend are mirrored into a single-file
//! SQLite store under `.dpt/`, so queries keep working offline and tests
//! can seed records without a network. Records are kept as raw JSON and
//! deserialized tolerantly at query time; a row that no longer parses is
//! skipped with a warning instead of poisoning the whole collection.

use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::core::remote::RemoteClient;
use crate::core::workspace::Workspace;
use crate::entities::{
    CashMovement, CollectionKind, Order, Purchase, Sale, StockItem, Supplier,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("error en el espejo local: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("no se pudo serializar el registro: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Outcome of replacing one mirrored collection
#[derive(Debug, Clone, Copy)]
pub struct SyncOutcome {
    pub records: usize,
    /// Whether the stored content hash changed
    pub changed: bool,
}

/// Read access to the record collections a query needs
pub trait RecordStore {
    fn stock(&self) -> Result<Vec<StockItem>, StoreError>;
    fn suppliers(&self) -> Result<Vec<Supplier>, StoreError>;
    fn sales(&self) -> Result<Vec<Sale>, StoreError>;
    fn purchases(&self) -> Result<Vec<Purchase>, StoreError>;
    fn orders(&self) -> Result<Vec<Order>, StoreError>;
    fn cash_movements(&self) -> Result<Vec<CashMovement>, StoreError>;

    /// If the collection is empty, attempt one remote re-fetch. Network
    /// failures degrade to the empty collection with a warning; only
    /// local storage failures surface as errors.
    fn ensure_loaded(&self, kind: CollectionKind) -> Result<(), StoreError>;
}

/// SQLite-backed mirror, optionally wired to the remote API
pub struct MirrorStore {
    conn: Connection,
    remote: Option<RemoteClient>,
}

impl MirrorStore {
    pub fn open(workspace: &Workspace, remote: Option<RemoteClient>) -> Result<Self, StoreError> {
        let conn = Connection::open(workspace.mirror_path())?;
        Self::bootstrap(&conn)?;
        Ok(Self { conn, remote })
    }

    /// In-memory mirror for tests and one-off runs
    pub fn open_in_memory(remote: Option<RemoteClient>) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::bootstrap(&conn)?;
        Ok(Self { conn, remote })
    }

    fn bootstrap(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS records (
                collection TEXT NOT NULL,
                seq        INTEGER NOT NULL,
                payload    TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_records_collection
                ON records (collection, seq);
            CREATE TABLE IF NOT EXISTS collections (
                collection   TEXT PRIMARY KEY,
                content_hash TEXT NOT NULL,
                synced_at    TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Replace one collection with freshly fetched records, preserving
    /// backend order
    pub fn replace_collection(
        &self,
        kind: CollectionKind,
        records: &[Value],
    ) -> Result<SyncOutcome, StoreError> {
        let name = kind.to_string();

        let mut hasher = Sha256::new();
        let mut payloads = Vec::with_capacity(records.len());
        for record in records {
            let payload = serde_json::to_string(record)?;
            hasher.update(payload.as_bytes());
            hasher.update(b"\n");
            payloads.push(payload);
        }
        let content_hash = format!("{:x}", hasher.finalize());

        let previous: Option<String> = self
            .conn
            .query_row(
                "SELECT content_hash FROM collections WHERE collection = ?1",
                [&name],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|err| match err {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM records WHERE collection = ?1", [&name])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO records (collection, seq, payload) VALUES (?1, ?2, ?3)",
            )?;
            for (seq, payload) in payloads.iter().enumerate() {
                insert.execute(rusqlite::params![name, seq as i64, payload])?;
            }
        }
        tx.execute(
            "INSERT INTO collections (collection, content_hash, synced_at)
             VALUES (?1, ?2, datetime('now'))
             ON CONFLICT (collection) DO UPDATE
             SET content_hash = excluded.content_hash,
                 synced_at = excluded.synced_at",
            [&name, &content_hash],
        )?;
        tx.commit()?;

        Ok(SyncOutcome {
            records: records.len(),
            changed: previous.as_deref() != Some(content_hash.as_str()),
        })
    }

    pub fn count(&self, kind: CollectionKind) -> Result<usize, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM records WHERE collection = ?1",
            [kind.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn load_collection<T: DeserializeOwned>(
        &self,
        kind: CollectionKind,
    ) -> Result<Vec<T>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT payload FROM records WHERE collection = ?1 ORDER BY seq",
        )?;
        let payloads = stmt
            .query_map([kind.to_string()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut records = Vec::with_capacity(payloads.len());
        for payload in payloads {
            match serde_json::from_str::<T>(&payload) {
                Ok(record) => records.push(record),
                Err(err) => {
                    tracing::warn!(collection = %kind, error = %err, "registro omitido");
                }
            }
        }
        Ok(records)
    }
}

impl RecordStore for MirrorStore {
    fn stock(&self) -> Result<Vec<StockItem>, StoreError> {
        self.load_collection(CollectionKind::Stock)
    }

    fn suppliers(&self) -> Result<Vec<Supplier>, StoreError> {
        self.load_collection(CollectionKind::Suppliers)
    }

    fn sales(&self) -> Result<Vec<Sale>, StoreError> {
        self.load_collection(CollectionKind::Sales)
    }

    fn purchases(&self) -> Result<Vec<Purchase>, StoreError> {
        self.load_collection(CollectionKind::Purchases)
    }

    fn orders(&self) -> Result<Vec<Order>, StoreError> {
        self.load_collection(CollectionKind::Orders)
    }

    fn cash_movements(&self) -> Result<Vec<CashMovement>, StoreError> {
        self.load_collection(CollectionKind::CashMovements)
    }

    fn ensure_loaded(&self, kind: CollectionKind) -> Result<(), StoreError> {
        if self.count(kind)? > 0 {
            return Ok(());
        }
        let Some(remote) = &self.remote else {
            return Ok(());
        };
        match remote.fetch_collection(kind) {
            Ok(records) => {
                self.replace_collection(kind, &records)?;
            }
            Err(err) => {
                tracing::warn!(
                    collection = %kind,
                    error = %err,
                    "no se pudo recargar la colección; se consulta el espejo vacío"
                );
            }
        }
        Ok(())
    }
}

/// In-memory store for unit tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub stock: Vec<StockItem>,
    pub suppliers: Vec<Supplier>,
    pub sales: Vec<Sale>,
    pub purchases: Vec<Purchase>,
    pub orders: Vec<Order>,
    pub cash_movements: Vec<CashMovement>,
}

impl RecordStore for MemoryStore {
    fn stock(&self) -> Result<Vec<StockItem>, StoreError> {
        Ok(self.stock.clone())
    }

    fn suppliers(&self) -> Result<Vec<Supplier>, StoreError> {
        Ok(self.suppliers.clone())
    }

    fn sales(&self) -> Result<Vec<Sale>, StoreError> {
        Ok(self.sales.clone())
    }

    fn purchases(&self) -> Result<Vec<Purchase>, StoreError> {
        Ok(self.purchases.clone())
    }

    fn orders(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self.orders.clone())
    }

    fn cash_movements(&self) -> Result<Vec<CashMovement>, StoreError> {
        Ok(self.cash_movements.clone())
    }

    fn ensure_loaded(&self, _kind: CollectionKind) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MirrorStore {
        MirrorStore::open_in_memory(None).unwrap()
    }

    #[test]
    fn test_replace_and_load_preserves_order() {
        let store = store();
        let records = vec![
            serde_json::json!({"id": 3, "name": "Harina"}),
            serde_json::json!({"id": 1, "name": "Azúcar"}),
            serde_json::json!({"id": 2, "name": "Sal"}),
        ];
        let outcome = store
            .replace_collection(CollectionKind::Stock, &records)
            .unwrap();
        assert_eq!(outcome.records, 3);
        assert!(outcome.changed);

        let items = store.stock().unwrap();
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Harina", "Azúcar", "Sal"]);
    }

    #[test]
    fn test_unchanged_content_hash() {
        let store = store();
        let records = vec![serde_json::json!({"id": 1, "name": "Harina"})];
        assert!(store
            .replace_collection(CollectionKind::Stock, &records)
            .unwrap()
            .changed);
        assert!(!store
            .replace_collection(CollectionKind::Stock, &records)
            .unwrap()
            .changed);
    }

    #[test]
    fn test_unparseable_record_is_skipped() {
        let store = store();
        let records = vec![
            serde_json::json!({"id": 1, "name": "Harina"}),
            serde_json::json!("no soy un objeto"),
        ];
        store
            .replace_collection(CollectionKind::Stock, &records)
            .unwrap();
        assert_eq!(store.count(CollectionKind::Stock).unwrap(), 2);
        assert_eq!(store.stock().unwrap().len(), 1);
    }

    #[test]
    fn test_ensure_loaded_without_remote_is_noop() {
        let store = store();
        store.ensure_loaded(CollectionKind::Sales).unwrap();
        assert!(store.sales().unwrap().is_empty());
    }

    #[test]
    fn test_collections_are_independent() {
        let store = store();
        store
            .replace_collection(
                CollectionKind::Sales,
                &[serde_json::json!({"id": 1, "total": 100})],
            )
            .unwrap();
        assert_eq!(store.count(CollectionKind::Sales).unwrap(), 1);
        assert_eq!(store.count(CollectionKind::Stock).unwrap(), 0);
    }
}
