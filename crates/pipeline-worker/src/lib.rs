//! The worker loop (§4.10): binds `on_message`/`on_dlq_terminal` closures
//! around `EvaluateJob` to a `Broker`'s `consume_blocking`.
//!
//! Each delivery's body is parsed as a `JobMessage`; `EvaluateJob::run` is
//! synchronous I/O (sled, the object store), so it runs on a blocking
//! thread pool via `spawn_blocking` rather than the async executor.

use broker::{Broker, Delivery, HandlerFuture, MessageHandler};
use pipeline_orchestrator::{EvaluateJob, JobMessage};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Wires one `EvaluateJob` to a broker's consume loop.
pub struct Worker {
    job: Arc<EvaluateJob>,
    broker: Arc<dyn Broker>,
}

impl Worker {
    pub fn new(job: Arc<EvaluateJob>, broker: Arc<dyn Broker>) -> Self {
        Self { job, broker }
    }

    /// Run the long-lived consume loop. Returns when `duration` elapses
    /// (used by tests) or the broker's channel closes; `None` runs forever.
    pub async fn run(&self, duration: Option<std::time::Duration>) -> Result<(), broker::BrokerError> {
        let on_message = self.on_message_handler();
        let on_terminal = self.on_terminal_handler();
        self.broker.consume_blocking(on_message, on_terminal, duration).await
    }

    fn on_message_handler(&self) -> MessageHandler {
        let job = self.job.clone();
        Arc::new(move |delivery: Delivery| -> HandlerFuture {
            let job = job.clone();
            Box::pin(async move {
                let outcome = process_delivery(&job, &delivery).await;
                match outcome {
                    Ok(outcome) => {
                        info!(
                            processed = outcome.processed,
                            validated = outcome.validated,
                            quarantined = outcome.quarantined,
                            skipped = outcome.skipped,
                            "job completed"
                        );
                        if let Err(err) = delivery.success().await {
                            error!(error = %err, "failed to ack a successfully processed delivery");
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, count = delivery.count, "job failed, requeueing with retry");
                        if let Err(ack_err) = delivery.failure().await {
                            error!(error = %ack_err, "failed to requeue a failed delivery");
                        }
                    }
                }
            })
        })
    }

    /// §4.7: a delivery that has exhausted its retry budget is logged and
    /// acked — dropped, not retried further.
    fn on_terminal_handler(&self) -> MessageHandler {
        Arc::new(move |delivery: Delivery| -> HandlerFuture {
            Box::pin(async move {
                error!(
                    count = delivery.count,
                    body = %String::from_utf8_lossy(&delivery.body),
                    "message exceeded retry budget, dropping to terminal DLQ"
                );
                if let Err(err) = delivery.success().await {
                    error!(error = %err, "failed to ack a terminal delivery");
                }
            })
        })
    }
}

async fn process_delivery(
    job: &Arc<EvaluateJob>,
    delivery: &Delivery,
) -> Result<pipeline_orchestrator::JobOutcome, String> {
    let message = JobMessage::from_bytes(&delivery.body).map_err(|e| format!("malformed job message: {e}"))?;
    let job = job.clone();
    tokio::task::spawn_blocking(move || job.run(&message.namespace))
        .await
        .map_err(|e| format!("worker task panicked: {e}"))?
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use broker::InMemoryBroker;
    use object_store_port::{InMemoryObjectStore, ObjectStore};
    use registry_store::{SchemaRegistry, StorageConnection};
    use std::time::Duration;

    const SCHEMA: &str = r#"{"fields":[{"name":"name","type":"string"}]}"#;

    fn setup() -> (Worker, Arc<dyn Broker>, StorageConnection, Arc<dyn ObjectStore>) {
        let object_store: Arc<dyn ObjectStore> = Arc::new(InMemoryObjectStore::new());
        object_store.create_bucket("gold").unwrap();
        object_store.create_bucket("validated").unwrap();
        object_store.create_bucket("quarantine").unwrap();

        let storage = StorageConnection::open_temporary().unwrap();
        let session = storage.session();
        SchemaRegistry::initialize(&session).unwrap();
        registry_store::MoveRegistry::initialize(&session).unwrap();
        SchemaRegistry::insert(&session, "rfb.json", SCHEMA).unwrap();

        let job = Arc::new(EvaluateJob::new(
            object_store.clone(),
            storage.clone(),
            "gold",
            "validated",
            "quarantine",
        ));
        let broker: Arc<dyn Broker> = Arc::new(InMemoryBroker::new(Duration::from_millis(5)));
        let worker = Worker::new(job, broker.clone());
        (worker, broker, storage, object_store)
    }

    #[tokio::test]
    async fn consumes_one_message_and_routes_the_blob() {
        let (worker, broker, _storage, object_store) = setup();
        object_store
            .put_object("gold", "rfb/json/a.json", br#"{"name":"a"}"#, "application/json")
            .unwrap();

        broker.publish(&JobMessage::new("rfb.json").to_bytes().unwrap()).await.unwrap();

        worker.run(Some(Duration::from_millis(200))).await.unwrap();

        assert!(object_store.read_object("validated", "rfb/json/a.json").is_ok());
    }

    #[tokio::test]
    async fn malformed_message_body_is_requeued_not_panicking() {
        let (worker, broker, _storage, _object_store) = setup();
        broker.publish(b"not json").await.unwrap();

        // Should not panic; the retry budget eventually drops it.
        worker.run(Some(Duration::from_millis(200))).await.unwrap();
    }
}
