//! Persistence of schemas keyed by namespace (§4.4).
//!
//! `insert` always creates a new row; it never updates (§3 invariant S1).
//! "Latest" is undefined by the original contract, so this port imposes an
//! explicit order instead of leaving it to chance (resolves spec.md's open
//! question about `schemas[0]` selection): rows are keyed
//! `<namespace>\0<insertion sequence>`, so `get_by_namespace` always
//! returns rows in insertion order and the caller's "first row" is always
//! the oldest registration for that namespace.

use crate::error::StoreError;
use crate::session::Session;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const TREE_BY_NAMESPACE: &str = "schema_registry";
const TREE_BY_ID: &str = "schema_registry_by_id";

/// One registered schema row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchemaRow {
    pub id: String,
    pub namespace: String,
    pub schema_avro: String,
}

pub struct SchemaRegistry;

impl SchemaRegistry {
    /// Open the underlying trees. Idempotent — sled creates trees lazily on
    /// first open, so this is the Rust-native equivalent of running a
    /// migration script.
    pub fn initialize(session: &Session) -> Result<(), StoreError> {
        session.db.open_tree(TREE_BY_NAMESPACE)?;
        session.db.open_tree(TREE_BY_ID)?;
        Ok(())
    }

    /// Insert a new schema row and return its freshly assigned id.
    pub fn insert(
        session: &Session,
        namespace: &str,
        schema_avro: &str,
    ) -> Result<String, StoreError> {
        let by_namespace = session.db.open_tree(TREE_BY_NAMESPACE)?;
        let by_id = session.db.open_tree(TREE_BY_ID)?;

        let id = Uuid::new_v4().to_string();
        let seq = session.db.generate_id()?;
        let row = SchemaRow {
            id: id.clone(),
            namespace: namespace.to_string(),
            schema_avro: schema_avro.to_string(),
        };
        let bytes = serde_json::to_vec(&row)?;

        let key = namespace_key(namespace, seq);
        by_namespace.insert(key, bytes.clone())?;
        by_id.insert(id.as_bytes(), bytes)?;

        Ok(id)
    }

    /// Rows for `namespace`, in insertion order. May be empty.
    pub fn get_by_namespace(session: &Session, namespace: &str) -> Result<Vec<SchemaRow>, StoreError> {
        let tree = session.db.open_tree(TREE_BY_NAMESPACE)?;
        let prefix = format!("{namespace}\0");
        let mut rows = Vec::new();
        for entry in tree.scan_prefix(prefix.as_bytes()) {
            let (_, value) = entry?;
            rows.push(serde_json::from_slice(&value)?);
        }
        Ok(rows)
    }

    /// Delete all rows for `namespace`. Idempotent.
    pub fn delete_by_namespace(session: &Session, namespace: &str) -> Result<(), StoreError> {
        let by_namespace = session.db.open_tree(TREE_BY_NAMESPACE)?;
        let by_id = session.db.open_tree(TREE_BY_ID)?;
        let prefix = format!("{namespace}\0");

        let keys: Vec<sled::IVec> = by_namespace
            .scan_prefix(prefix.as_bytes())
            .keys()
            .collect::<Result<_, _>>()?;

        for key in keys {
            if let Some(value) = by_namespace.remove(&key)? {
                let row: SchemaRow = serde_json::from_slice(&value)?;
                by_id.remove(row.id.as_bytes())?;
            }
        }
        Ok(())
    }

    /// Truncate the entire registry.
    pub fn delete_all(session: &Session) -> Result<(), StoreError> {
        session.db.open_tree(TREE_BY_NAMESPACE)?.clear()?;
        session.db.open_tree(TREE_BY_ID)?.clear()?;
        Ok(())
    }

    /// Every registered row, across every namespace, in storage order.
    pub fn get_all(session: &Session) -> Result<Vec<SchemaRow>, StoreError> {
        let tree = session.db.open_tree(TREE_BY_NAMESPACE)?;
        let mut rows = Vec::new();
        for entry in tree.iter() {
            let (_, value) = entry?;
            rows.push(serde_json::from_slice(&value)?);
        }
        Ok(rows)
    }
}

fn namespace_key(namespace: &str, seq: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(namespace.len() + 1 + 20);
    key.extend_from_slice(namespace.as_bytes());
    key.push(0);
    key.extend_from_slice(format!("{seq:020}").as_bytes());
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::StorageConnection;

    #[test]
    fn p5_registry_is_append_only() {
        let conn = StorageConnection::open_temporary().unwrap();
        let session = conn.session();
        SchemaRegistry::initialize(&session).unwrap();

        for i in 0..5 {
            SchemaRegistry::insert(&session, "rfb.json", &format!("{{\"v\":{i}}}")).unwrap();
        }

        let rows = SchemaRegistry::get_by_namespace(&session, "rfb.json").unwrap();
        assert_eq!(rows.len(), 5);
    }

    #[test]
    fn insert_preserves_order_first_row_is_oldest() {
        let conn = StorageConnection::open_temporary().unwrap();
        let session = conn.session();
        SchemaRegistry::initialize(&session).unwrap();

        let first_id = SchemaRegistry::insert(&session, "ns", "{\"v\":1}").unwrap();
        SchemaRegistry::insert(&session, "ns", "{\"v\":2}").unwrap();

        let rows = SchemaRegistry::get_by_namespace(&session, "ns").unwrap();
        assert_eq!(rows[0].id, first_id);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn delete_by_namespace_is_idempotent() {
        let conn = StorageConnection::open_temporary().unwrap();
        let session = conn.session();
        SchemaRegistry::initialize(&session).unwrap();

        SchemaRegistry::insert(&session, "ns", "{}").unwrap();
        SchemaRegistry::delete_by_namespace(&session, "ns").unwrap();
        SchemaRegistry::delete_by_namespace(&session, "ns").unwrap();

        assert!(SchemaRegistry::get_by_namespace(&session, "ns").unwrap().is_empty());
    }

    #[test]
    fn delete_all_truncates_every_namespace() {
        let conn = StorageConnection::open_temporary().unwrap();
        let session = conn.session();
        SchemaRegistry::initialize(&session).unwrap();

        SchemaRegistry::insert(&session, "a", "{}").unwrap();
        SchemaRegistry::insert(&session, "b", "{}").unwrap();
        SchemaRegistry::delete_all(&session).unwrap();

        assert!(SchemaRegistry::get_all(&session).unwrap().is_empty());
    }

    #[test]
    fn get_all_returns_every_namespace() {
        let conn = StorageConnection::open_temporary().unwrap();
        let session = conn.session();
        SchemaRegistry::initialize(&session).unwrap();

        SchemaRegistry::insert(&session, "a", "{}").unwrap();
        SchemaRegistry::insert(&session, "b", "{}").unwrap();

        assert_eq!(SchemaRegistry::get_all(&session).unwrap().len(), 2);
    }
}
