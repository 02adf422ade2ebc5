//! Control-plane HTTP server binary: schema CRUD, job enqueue, metrics.
//!
//! Thin glue only — configuration loading lives in `pipeline-config`, the
//! actual handlers live in `pipeline_api::routes`.

use clap::Parser;
use pipeline_api::AppState;
use registry_store::{MoveRegistry, SchemaRegistry, StorageConnection};
use std::sync::Arc;
use std::time::Duration;

/// Schema-driven validation pipeline: control plane.
#[derive(Parser, Debug)]
#[command(name = "pipeline-api", version, about)]
struct Cli {
    /// YAML configuration files, in priority order (last wins).
    #[arg(long = "config", default_value = "etc/config/base.yml")]
    config: Vec<String>,

    /// Address to bind the HTTP server to.
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: String,
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

    let state = AppState::new(storage, broker);
    let app = pipeline_api::router(state);

    tracing::info!(bind = %cli.bind, "control plane listening");
    let listener = tokio::net::TcpListener::bind(&cli.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
