//! AMQP/RabbitMQ-backed broker, built on `lapin`. Topology mirrors the
//! original's `BrokerAdapter`: a durable topic exchange for live traffic, a
//! `.dlx` topic exchange fronting the retry and terminal queues, and a
//! retry queue whose `x-message-ttl` and `x-dead-letter-*` arguments send
//! expired messages back onto the main exchange.
//!
//! One correction versus the original: that implementation's reject path
//! republished retry messages through the *main* exchange under the retry
//! queue's name, which the retry queue is never bound to (it is bound on
//! the `.dlx` exchange) — messages would be silently unroutable. Here the
//! retry publish targets the `.dlx` exchange directly, which is where the
//! retry queue's binding actually lives.

use crate::delivery::{Delivery, DeliveryHandle, MessageHandler};
use crate::error::BrokerError;
use crate::port::{Broker, DLQ_THRESHOLD};
use async_trait::async_trait;
use lapin::options::{
    BasicAckOptions, BasicGetOptions, BasicPublishOptions, ExchangeDeclareOptions, QueueBindOptions,
    QueueDeclareOptions,
};
use lapin::types::{AMQPValue, FieldTable, LongString};
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind};
use std::time::Duration;

const COUNT_HEADER: &str = "count";

#[derive(Debug, Clone)]
pub struct AmqpConfig {
    pub uri: String,
    pub exchange: String,
    pub queue_name: String,
    pub queue_retry: String,
    pub queue_dlq: String,
    pub queue_ttl_milliseconds: u32,
    /// Routing key used for fresh publishes; must match the main queue's
    /// `app.*` binding pattern (e.g. `"app.validate"`).
    pub publish_routing_key: String,
}

fn as_broker_error(err: lapin::Error) -> BrokerError {
    BrokerError::SendError(err.to_string())
}

pub struct AmqpBroker {
    channel: Channel,
    config: AmqpConfig,
}

impl AmqpBroker {
    pub async fn connect(config: AmqpConfig) -> Result<Self, BrokerError> {
        let connection = Connection::connect(&config.uri, ConnectionProperties::default())
            .await
            .map_err(|e| BrokerError::ConnectionRefused(e.to_string()))?;
        let channel = connection
            .create_channel()
            .await
            .map_err(|e| BrokerError::ConnectionRefused(e.to_string()))?;
        let broker = Self { channel, config };
        broker.setup_infrastructure().await?;
        Ok(broker)
    }

    fn dlx_exchange(&self) -> String {
        format!("{}.dlx", self.config.exchange)
    }

    async fn setup_infrastructure(&self) -> Result<(), BrokerError> {
        let dlx = self.dlx_exchange();

        self.channel
            .exchange_declare(
                &self.config.exchange,
                ExchangeKind::Topic,
                ExchangeDeclareOptions { durable: true, ..Default::default() },
                FieldTable::default(),
            )
            .await
            .map_err(as_broker_error)?;

        self.channel
            .exchange_declare(
                &dlx,
                ExchangeKind::Topic,
                ExchangeDeclareOptions { durable: true, ..Default::default() },
                FieldTable::default(),
            )
            .await
            .map_err(as_broker_error)?;

        let mut main_args = FieldTable::default();
        main_args.insert("x-dead-letter-exchange".into(), AMQPValue::LongString(LongString::from(dlx.clone())));
        main_args.insert(
            "x-dead-letter-routing-key".into(),
            AMQPValue::LongString(LongString::from(self.config.queue_dlq.clone())),
        );
        self.channel
            .queue_declare(
                &self.config.queue_name,
                QueueDeclareOptions { durable: true, ..Default::default() },
                main_args,
            )
            .await
            .map_err(as_broker_error)?;

        let mut retry_args = FieldTable::default();
        retry_args.insert(
            "x-dead-letter-exchange".into(),
            AMQPValue::LongString(LongString::from(self.config.exchange.clone())),
        );
        retry_args.insert(
            "x-dead-letter-routing-key".into(),
            AMQPValue::LongString(LongString::from(self.config.queue_name.clone())),
        );
        retry_args.insert(
            "x-message-ttl".into(),
            AMQPValue::LongUInt(self.config.queue_ttl_milliseconds),
        );
        self.channel
            .queue_declare(
                &self.config.queue_retry,
                QueueDeclareOptions { durable: true, ..Default::default() },
                retry_args,
            )
            .await
            .map_err(as_broker_error)?;

        self.channel
            .queue_declare(
                &self.config.queue_dlq,
                QueueDeclareOptions { durable: true, ..Default::default() },
                FieldTable::default(),
            )
            .await
            .map_err(as_broker_error)?;

        self.channel
            .queue_bind(
                &self.config.queue_name,
                &self.config.exchange,
                "app.*",
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(as_broker_error)?;

        self.channel
            .queue_bind(
                &self.config.queue_retry,
                &dlx,
                &self.config.queue_retry,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(as_broker_error)?;

        self.channel
            .queue_bind(
                &self.config.queue_dlq,
                &dlx,
                &self.config.queue_dlq,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(as_broker_error)?;

        Ok(())
    }

    async fn publish_on(
        &self,
        exchange: &str,
        routing_key: &str,
        body: &[u8],
        count: u32,
    ) -> Result<(), BrokerError> {
        let mut headers = FieldTable::default();
        headers.insert(COUNT_HEADER.into(), AMQPValue::LongUInt(count));
        let properties = BasicProperties::default()
            .with_delivery_mode(2)
            .with_content_type("application/json".into())
            .with_headers(headers);

        self.channel
            .basic_publish(exchange, routing_key, BasicPublishOptions::default(), body, properties)
            .await
            .map_err(as_broker_error)?
            .await
            .map_err(as_broker_error)?;
        Ok(())
    }

    fn read_count(headers: Option<&FieldTable>) -> u32 {
        headers
            .and_then(|table| table.inner().get(COUNT_HEADER))
            .and_then(|value| match value {
                AMQPValue::LongUInt(v) => Some(*v),
                AMQPValue::LongInt(v) => Some((*v).max(0) as u32),
                AMQPValue::ShortInt(v) => Some((*v).max(0) as u32),
                AMQPValue::ShortUInt(v) => Some(*v as u32),
                _ => None,
            })
            .unwrap_or(0)
    }
}

struct AmqpDeliveryHandle {
    channel: Channel,
    dlx_exchange: String,
    retry_queue: String,
    delivery_tag: u64,
    body: Vec<u8>,
    count: u32,
}

#[async_trait]
impl DeliveryHandle for AmqpDeliveryHandle {
    async fn ack(&self) -> Result<(), BrokerError> {
        self.channel
            .basic_ack(self.delivery_tag, BasicAckOptions::default())
            .await
            .map_err(as_broker_error)
    }

    async fn reject_with_retry(&self) -> Result<(), BrokerError> {
        let mut headers = FieldTable::default();
        headers.insert(COUNT_HEADER.into(), AMQPValue::LongUInt(self.count + 1));
        let properties = BasicProperties::default()
            .with_delivery_mode(2)
            .with_content_type("application/json".into())
            .with_headers(headers);

        self.channel
            .basic_publish(
                &self.dlx_exchange,
                &self.retry_queue,
                BasicPublishOptions::default(),
                &self.body,
                properties,
            )
            .await
            .map_err(as_broker_error)?
            .await
            .map_err(as_broker_error)?;

        self.channel
            .basic_ack(self.delivery_tag, BasicAckOptions::default())
            .await
            .map_err(as_broker_error)
    }
}

#[async_trait]
impl Broker for AmqpBroker {
    async fn publish(&self, body: &[u8]) -> Result<(), BrokerError> {
        self.publish_on(&self.config.exchange, &self.config.publish_routing_key, body, 0)
            .await
    }

    async fn consume_sync(&self, max: usize) -> Result<Vec<Delivery>, BrokerError> {
        let mut out = Vec::with_capacity(max);
        for _ in 0..max {
            let get = self
                .channel
                .basic_get(&self.config.queue_name, BasicGetOptions { no_ack: false })
                .await
                .map_err(as_broker_error)?;
            let Some(message) = get else { break };
            let count = Self::read_count(message.properties.headers().as_ref());
            let handle = std::sync::Arc::new(AmqpDeliveryHandle {
                channel: self.channel.clone(),
                dlx_exchange: self.dlx_exchange(),
                retry_queue: self.config.queue_retry.clone(),
                delivery_tag: message.delivery_tag,
                body: message.data.clone(),
                count,
            });
            out.push(Delivery::new(message.data, count, handle));
        }
        Ok(out)
    }

    async fn consume_blocking(
        &self,
        on_message: MessageHandler,
        on_terminal: MessageHandler,
        duration: Option<Duration>,
    ) -> Result<(), BrokerError> {
        let deadline = duration.map(|d| std::time::Instant::now() + d);
        loop {
            if let Some(deadline) = deadline {
                if std::time::Instant::now() >= deadline {
                    return Ok(());
                }
            }

            let get = self
                .channel
                .basic_get(&self.config.queue_name, BasicGetOptions { no_ack: false })
                .await
                .map_err(as_broker_error)?;

            let Some(message) = get else {
                tokio::time::sleep(Duration::from_millis(25)).await;
                continue;
            };

            let count = Self::read_count(message.properties.headers().as_ref());
            let handle = std::sync::Arc::new(AmqpDeliveryHandle {
                channel: self.channel.clone(),
                dlx_exchange: self.dlx_exchange(),
                retry_queue: self.config.queue_retry.clone(),
                delivery_tag: message.delivery_tag,
                body: message.data.clone(),
                count,
            });
            let delivery = Delivery::new(message.data, count, handle);

            if count >= DLQ_THRESHOLD {
                on_terminal(delivery).await;
            } else {
                on_message(delivery).await;
            }
        }
    }
}
