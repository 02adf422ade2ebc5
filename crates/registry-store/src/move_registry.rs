//! Persistence of per-file audit rows (§4.5).
//!
//! Append-only: every validated/quarantined blob gets exactly one row
//! (§3 invariant S3). `get_metric_view` reproduces the original's SQL
//! `metric` view (grouped count by destination bucket) on read, since sled
//! has no live-view mechanism.

use crate::error::StoreError;
use crate::session::Session;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const TREE_MOVE_REGISTRY: &str = "move_registry";

/// One audit row: the outcome of routing a single blob.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveRow {
    pub schema_fk: String,
    pub old_bucket: String,
    pub new_bucket: String,
    pub namespace: String,
    pub summary: String,
}

/// One row of the `metric` view: a count grouped by destination bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricRow {
    pub new_bucket: String,
    pub total: u64,
}

pub struct MoveRegistry;

impl MoveRegistry {
    pub fn initialize(session: &Session) -> Result<(), StoreError> {
        session.db.open_tree(TREE_MOVE_REGISTRY)?;
        Ok(())
    }

    /// Append one audit row.
    #[allow(clippy::too_many_arguments)]
    pub fn insert_metric(
        session: &Session,
        schema_fk: &str,
        old_bucket: &str,
        new_bucket: &str,
        namespace: &str,
        summary_json: &str,
    ) -> Result<(), StoreError> {
        let tree = session.db.open_tree(TREE_MOVE_REGISTRY)?;
        let seq = session.db.generate_id()?;
        let row = MoveRow {
            schema_fk: schema_fk.to_string(),
            old_bucket: old_bucket.to_string(),
            new_bucket: new_bucket.to_string(),
            namespace: namespace.to_string(),
            summary: summary_json.to_string(),
        };
        tree.insert(format!("{seq:020}"), serde_json::to_vec(&row)?)?;
        Ok(())
    }

    /// The raw aggregated audit rows, in insertion order.
    pub fn get_metrics(session: &Session) -> Result<Vec<MoveRow>, StoreError> {
        let tree = session.db.open_tree(TREE_MOVE_REGISTRY)?;
        let mut rows = Vec::new();
        for entry in tree.iter() {
            let (_, value) = entry?;
            rows.push(serde_json::from_slice(&value)?);
        }
        Ok(rows)
    }

    /// The `metric` view: count of rows grouped by destination bucket.
    pub fn get_metric_view(session: &Session) -> Result<Vec<MetricRow>, StoreError> {
        let rows = Self::get_metrics(session)?;
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for row in rows {
            *counts.entry(row.new_bucket).or_insert(0) += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(new_bucket, total)| MetricRow { new_bucket, total })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::StorageConnection;

    #[test]
    fn insert_metric_is_append_only() {
        let conn = StorageConnection::open_temporary().unwrap();
        let session = conn.session();
        MoveRegistry::initialize(&session).unwrap();

        MoveRegistry::insert_metric(&session, "id-1", "gold", "validated", "rfb.json", "[]").unwrap();
        MoveRegistry::insert_metric(&session, "id-1", "gold", "quarantine", "rfb.json", "[{}]").unwrap();

        assert_eq!(MoveRegistry::get_metrics(&session).unwrap().len(), 2);
    }

    #[test]
    fn metric_view_groups_by_destination() {
        let conn = StorageConnection::open_temporary().unwrap();
        let session = conn.session();
        MoveRegistry::initialize(&session).unwrap();

        for _ in 0..18 {
            MoveRegistry::insert_metric(&session, "id", "gold", "validated", "rfb.json", "[]").unwrap();
        }
        for _ in 0..20 {
            MoveRegistry::insert_metric(&session, "id", "gold", "quarantine", "rfb.json", "[{}]").unwrap();
        }

        let mut view = MoveRegistry::get_metric_view(&session).unwrap();
        view.sort_by(|a, b| a.new_bucket.cmp(&b.new_bucket));

        assert_eq!(
            view,
            vec![
                MetricRow { new_bucket: "quarantine".to_string(), total: 20 },
                MetricRow { new_bucket: "validated".to_string(), total: 18 },
            ]
        );
    }
}
