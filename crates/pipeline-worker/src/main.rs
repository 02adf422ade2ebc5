//! Worker binary entry point: wires the object store, registry store, and
//! broker into one `EvaluateJob` and drives it from `Worker::run` until an
//! external shutdown signal arrives (§5, "Cancellation").

use clap::Parser;
use object_store_port::{FilesystemObjectStore, ObjectStore};
use pipeline_orchestrator::EvaluateJob;
use registry_store::{MoveRegistry, SchemaRegistry, StorageConnection};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "pipeline-worker", version, about)]
struct Cli {
    /// YAML configuration files, in priority order (last wins).
    #[arg(long = "config", default_value = "etc/config/base.yml")]
    config: Vec<String>,

    /// Root directory backing the object store's buckets.
    #[arg(long, default_value = "./data/buckets")]
    bucket_root: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let raw = pipeline_config::load_env(&cli.config)?;
    let settings = pipeline_config::PipelineSettings::from_merged(raw)?;

    let storage = StorageConnection::open(&settings.storage.path)?;
    let session = storage.session();
    SchemaRegistry::initialize(&session)?;
    MoveRegistry::initialize(&session)?;

    let object_store: Arc<dyn ObjectStore> = Arc::new(FilesystemObjectStore::new(&cli.bucket_root));
    object_store.create_bucket(&settings.app.source_bucket)?;
    object_store.create_bucket(&settings.app.validate_bucket)?;
    object_store.create_bucket(&settings.app.quarantine_bucket)?;

    let broker: Arc<dyn broker::Broker> = match broker::AmqpBroker::connect(broker::AmqpConfig {
        uri: format!(
            "amqp://{}:{}@{}:5672/%2f",
            settings.broker.username, settings.broker.password, settings.broker.host
        ),
        exchange: settings.broker.exchange.clone(),
        queue_name: settings.broker.queue_name.clone(),
        queue_retry: settings.broker.queue_retry.clone(),
        queue_dlq: settings.broker.queue_dlq.clone(),
        queue_ttl_milliseconds: settings.broker.queue_ttl_milliseconds,
        publish_routing_key: settings.app.source_router.clone(),
    })
    .await
    {
        Ok(amqp) => Arc::new(amqp),
        Err(err) => {
            tracing::warn!(error = %err, "could not reach the AMQP broker, falling back to an in-process queue");
            Arc::new(broker::InMemoryBroker::new(Duration::from_millis(
                settings.broker.queue_ttl_milliseconds as u64,
            )))
        }
    };

    let job = Arc::new(EvaluateJob::new(
        object_store,
        storage,
        settings.app.source_bucket.clone(),
        settings.app.validate_bucket.clone(),
        settings.app.quarantine_bucket.clone(),
    ));

    let worker = pipeline_worker::Worker::new(job, broker);

    tracing::info!("worker started, consuming the main queue");
    tokio::select! {
        result = worker.run(None) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received, closing the consume loop");
        }
    }

    Ok(())
}
