//! The `EvaluateJob` use-case (§4.8): validate every staged blob under a
//! namespace's prefix and route it to `validated` or `quarantine`.
//!
//! The schema lookup happens inside the per-blob loop, exactly where the
//! source puts it, rather than hoisted above the loop as a precondition.
//! This is deliberate (see O1 in the design ledger): a namespace with zero
//! staged blobs never even checks whether a schema is registered, and a
//! namespace whose first blob fails to parse defers the schema check past
//! that blob. Fixing this would mean failing the job before iteration,
//! which changes observable behaviour for the empty-prefix case — so it is
//! preserved, with a dedicated test (`schema_not_found_aborts_whole_job`)
//! calling it out explicitly instead of silently "fixing" it.
//!
//! A blob's own conversion can yield more than one record (§4.3: a
//! top-level JSON array is validated element-by-element). Every record in
//! the blob is validated — none are silently dropped — and their findings
//! are combined into the single summary recorded against that blob, since
//! routing (§2) moves the file as a whole to one destination.

use crate::error::PipelineError;
use object_store_port::ObjectStore;
use registry_store::{MoveRegistry, SchemaRegistry, StorageConnection};
use std::sync::{Arc, Mutex};
use tracing::warn;
use validation_core::ValidatorFactory;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobOutcome {
    pub processed: usize,
    pub validated: usize,
    pub quarantined: usize,
    pub skipped: usize,
}

pub struct EvaluateJob {
    object_store: Arc<dyn ObjectStore>,
    storage: StorageConnection,
    staging_bucket: String,
    validated_bucket: String,
    quarantine_bucket: String,
    factory: Mutex<ValidatorFactory>,
}

impl EvaluateJob {
    pub fn new(
        object_store: Arc<dyn ObjectStore>,
        storage: StorageConnection,
        staging_bucket: impl Into<String>,
        validated_bucket: impl Into<String>,
        quarantine_bucket: impl Into<String>,
    ) -> Self {
        Self {
            object_store,
            storage,
            staging_bucket: staging_bucket.into(),
            validated_bucket: validated_bucket.into(),
            quarantine_bucket: quarantine_bucket.into(),
            factory: Mutex::new(ValidatorFactory::new()),
        }
    }

    pub fn object_store(&self) -> &Arc<dyn ObjectStore> {
        &self.object_store
    }

    /// Run one job for `namespace`. Blocking: every port this calls is
    /// synchronous, so callers on an async runtime should drive this via
    /// `spawn_blocking`.
    pub fn run(&self, namespace: &str) -> Result<JobOutcome, PipelineError> {
        let prefix = namespace.replace('.', "/");
        let mut outcome = JobOutcome::default();

        let entries = self.object_store.iter_by_prefix(&self.staging_bucket, &prefix)?;

        for entry in entries {
            let (filename, blob) = entry?;
            outcome.processed += 1;

            let records = {
                let mut factory = self.factory.lock().expect("validator factory lock poisoned");
                let validator = match factory.resolve(&filename) {
                    Ok(v) => v,
                    Err(err) => {
                        warn!(filename, error = %err, "no validator for this file extension, skipping");
                        outcome.skipped += 1;
                        continue;
                    }
                };
                match validator.convert(&blob) {
                    Ok(records) => records,
                    Err(err) => {
                        warn!(filename, error = %err, "blob failed to parse, skipping");
                        outcome.skipped += 1;
                        continue;
                    }
                }
            };

            if records.is_empty() {
                warn!(filename, "blob converted to zero records, skipping");
                outcome.skipped += 1;
                continue;
            }

            let session = self.storage.session();
            let schemas = SchemaRegistry::get_by_namespace(&session, namespace)?;
            let Some(schema_row) = schemas.first() else {
                return Err(PipelineError::SchemaNotFound(namespace.to_string()));
            };

            let parsed_schema: serde_json::Value = match serde_json::from_str(&schema_row.schema_avro) {
                Ok(v) => v,
                Err(err) => {
                    warn!(filename, error = %err, "stored schema is not valid JSON, skipping record");
                    outcome.skipped += 1;
                    continue;
                }
            };

            // §4.3: a top-level JSON array yields one record per element and
            // each is validated independently. The file as a whole still has
            // exactly one destination, so every record's findings are
            // combined into the one summary recorded against this blob.
            let mut findings = Vec::new();
            for record in &records {
                findings.extend(validation_core::validate(record, &parsed_schema)?);
            }
            let destination = if findings.is_empty() {
                &self.validated_bucket
            } else {
                &self.quarantine_bucket
            };

            let key = format!("{prefix}/{filename}");
            self.object_store
                .put_object(destination, &key, &blob, "application/json")?;
            self.object_store.delete_object(&self.staging_bucket, &key)?;

            let summary = serde_json::to_string(&findings)
                .map_err(|err| PipelineError::Internal(err.to_string()))?;
            let session = self.storage.session();
            MoveRegistry::insert_metric(
                &session,
                &schema_row.id,
                &self.staging_bucket,
                destination,
                namespace,
                &summary,
            )?;

            if findings.is_empty() {
                outcome.validated += 1;
            } else {
                outcome.quarantined += 1;
            }
        }

        Ok(outcome)
    }
}
