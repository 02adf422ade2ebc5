//! The broker port (§4.7): publish plus two consumption styles, matching
//! the original's `IBrokerAdapter`.

use crate::delivery::{Delivery, MessageHandler};
use crate::error::BrokerError;
use async_trait::async_trait;
use std::time::Duration;

/// Messages with a retry count at or above this are dead: `consume_blocking`
/// routes them straight to the terminal handler instead of the main one.
pub const DLQ_THRESHOLD: u32 = 5;

#[async_trait]
pub trait Broker: Send + Sync {
    /// Publish a new message to the main topic exchange with `count = 0`.
    async fn publish(&self, body: &[u8]) -> Result<(), BrokerError>;

    /// Pop up to `max` messages from the main queue without blocking,
    /// leaving each unacked. Mirrors `consume_sync`.
    async fn consume_sync(&self, max: usize) -> Result<Vec<Delivery>, BrokerError>;

    /// Drive the main queue: messages with `count < DLQ_THRESHOLD` go to
    /// `on_message`, the rest go straight to `on_terminal`. Runs until
    /// `duration` elapses, or forever if `None`.
    async fn consume_blocking(
        &self,
        on_message: MessageHandler,
        on_terminal: MessageHandler,
        duration: Option<Duration>,
    ) -> Result<(), BrokerError>;
}
