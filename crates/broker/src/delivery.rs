//! A delivered message plus the handle that acknowledges or retries it.
//!
//! Mirrors the original's `AmqpDelivery` visitor: the handler never touches
//! delivery tags or channels directly, only `success()`/`failure()`.

use crate::error::BrokerError;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// How a consumer settles one delivery. Implemented once per backend
/// (in-process queues vs. a real AMQP channel).
#[async_trait]
pub trait DeliveryHandle: Send + Sync {
    async fn ack(&self) -> Result<(), BrokerError>;

    /// Republish with `count + 1` to the retry queue, then ack the original
    /// delivery so it leaves the main queue.
    async fn reject_with_retry(&self) -> Result<(), BrokerError>;
}

/// One message off the main queue, together with its retry count (the
/// original's `count` header) and a handle to settle it.
pub struct Delivery {
    pub body: Vec<u8>,
    pub count: u32,
    pub(crate) handle: Arc<dyn DeliveryHandle>,
}

impl Delivery {
    pub fn new(body: Vec<u8>, count: u32, handle: Arc<dyn DeliveryHandle>) -> Self {
        Self { body, count, handle }
    }

    pub async fn success(&self) -> Result<(), BrokerError> {
        self.handle.ack().await
    }

    pub async fn failure(&self) -> Result<(), BrokerError> {
        self.handle.reject_with_retry().await
    }
}

pub type HandlerFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// A callback invoked per delivery. Boxed so in-memory and AMQP consumers
/// can share one `consume_blocking` signature.
pub type MessageHandler = Arc<dyn Fn(Delivery) -> HandlerFuture + Send + Sync>;
