//! In-process broker: a `VecDeque` main queue and a delayed retry list
//! swept for expired entries. No exchange routing exists in-process, so
//! `publish` always targets the main queue directly — the topic-exchange
//! and DLX topology only matters once messages cross a process boundary,
//! which is what `AmqpBroker` is for.

use crate::delivery::{Delivery, DeliveryHandle, MessageHandler};
use crate::error::BrokerError;
use crate::port::{Broker, DLQ_THRESHOLD};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct QueuedMessage {
    body: Vec<u8>,
    count: u32,
}

#[derive(Default)]
struct BrokerState {
    main: VecDeque<QueuedMessage>,
    retry: Vec<(Instant, QueuedMessage)>,
}

pub struct InMemoryBroker {
    state: Arc<Mutex<BrokerState>>,
    retry_ttl: Duration,
}

impl InMemoryBroker {
    pub fn new(retry_ttl: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(BrokerState::default())),
            retry_ttl,
        }
    }

    /// Move any retry entries whose TTL has elapsed back onto the main
    /// queue, as the dead-letter exchange's TTL-expiry routing would.
    async fn drain_ready_retries(&self) {
        let mut state = self.state.lock().await;
        let now = Instant::now();
        let (ready, pending): (Vec<_>, Vec<_>) =
            state.retry.drain(..).partition(|(ready_at, _)| *ready_at <= now);
        state.retry = pending;
        state.main.extend(ready.into_iter().map(|(_, msg)| msg));
    }
}

struct InMemoryDeliveryHandle {
    state: Arc<Mutex<BrokerState>>,
    retry_ttl: Duration,
    message: QueuedMessage,
}

#[async_trait]
impl DeliveryHandle for InMemoryDeliveryHandle {
    async fn ack(&self) -> Result<(), BrokerError> {
        Ok(())
    }

    async fn reject_with_retry(&self) -> Result<(), BrokerError> {
        let mut state = self.state.lock().await;
        let ready_at = Instant::now() + self.retry_ttl;
        state.retry.push((
            ready_at,
            QueuedMessage {
                body: self.message.body.clone(),
                count: self.message.count + 1,
            },
        ));
        Ok(())
    }
}

fn to_delivery(state: &Arc<Mutex<BrokerState>>, retry_ttl: Duration, msg: QueuedMessage) -> Delivery {
    let handle = Arc::new(InMemoryDeliveryHandle {
        state: state.clone(),
        retry_ttl,
        message: msg.clone(),
    });
    Delivery::new(msg.body, msg.count, handle)
}

#[async_trait]
impl Broker for InMemoryBroker {
    async fn publish(&self, body: &[u8]) -> Result<(), BrokerError> {
        let mut state = self.state.lock().await;
        state.main.push_back(QueuedMessage { body: body.to_vec(), count: 0 });
        Ok(())
    }

    async fn consume_sync(&self, max: usize) -> Result<Vec<Delivery>, BrokerError> {
        self.drain_ready_retries().await;
        let mut state = self.state.lock().await;
        let mut out = Vec::with_capacity(max.min(state.main.len()));
        for _ in 0..max {
            match state.main.pop_front() {
                Some(msg) => out.push(to_delivery(&self.state, self.retry_ttl, msg)),
                None => break,
            }
        }
        Ok(out)
    }

    async fn consume_blocking(
        &self,
        on_message: MessageHandler,
        on_terminal: MessageHandler,
        duration: Option<Duration>,
    ) -> Result<(), BrokerError> {
        let deadline = duration.map(|d| Instant::now() + d);
        loop {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return Ok(());
                }
            }
            self.drain_ready_retries().await;

            let next = {
                let mut state = self.state.lock().await;
                state.main.pop_front()
            };

            match next {
                Some(msg) => {
                    let delivery = to_delivery(&self.state, self.retry_ttl, msg.clone());
                    if msg.count >= DLQ_THRESHOLD {
                        on_terminal(delivery).await;
                    } else {
                        on_message(delivery).await;
                    }
                }
                None => tokio::time::sleep(Duration::from_millis(5)).await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn publish_then_consume_sync_round_trips() {
        let broker = InMemoryBroker::new(Duration::from_millis(10));
        broker.publish(b"hello").await.unwrap();

        let mut deliveries = broker.consume_sync(10).await.unwrap();
        assert_eq!(deliveries.len(), 1);
        let delivery = deliveries.remove(0);
        assert_eq!(delivery.body, b"hello");
        assert_eq!(delivery.count, 0);
        delivery.success().await.unwrap();
    }

    #[tokio::test]
    async fn consume_sync_stops_at_empty_queue() {
        let broker = InMemoryBroker::new(Duration::from_millis(10));
        broker.publish(b"a").await.unwrap();
        let deliveries = broker.consume_sync(10).await.unwrap();
        assert_eq!(deliveries.len(), 1);
    }

    #[tokio::test]
    async fn always_failing_handler_gets_exactly_five_attempts_then_terminal() {
        let broker = InMemoryBroker::new(Duration::from_millis(5));
        broker.publish(b"poison").await.unwrap();

        let attempts = Arc::new(AtomicUsize::new(0));
        let terminal_hits = Arc::new(AtomicUsize::new(0));

        let attempts_clone = attempts.clone();
        let on_message: MessageHandler = Arc::new(move |delivery: Delivery| {
            let attempts = attempts_clone.clone();
            Box::pin(async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                delivery.failure().await.unwrap();
            })
        });

        let terminal_clone = terminal_hits.clone();
        let on_terminal: MessageHandler = Arc::new(move |delivery: Delivery| {
            let terminal_hits = terminal_clone.clone();
            Box::pin(async move {
                terminal_hits.fetch_add(1, Ordering::SeqCst);
                delivery.success().await.unwrap();
            })
        });

        broker
            .consume_blocking(on_message, on_terminal, Some(Duration::from_millis(500)))
            .await
            .unwrap();

        assert_eq!(attempts.load(Ordering::SeqCst), 5);
        assert_eq!(terminal_hits.load(Ordering::SeqCst), 1);
    }
}
