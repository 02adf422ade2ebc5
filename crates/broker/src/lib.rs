//! At-least-once message delivery (§4.7): a main queue, a TTL-delayed
//! retry queue, and a terminal dead-letter queue. `InMemoryBroker` is the
//! test double; `AmqpBroker` speaks the real RabbitMQ topology.

pub mod amqp;
pub mod delivery;
pub mod error;
pub mod in_memory;
pub mod port;

pub use amqp::{AmqpBroker, AmqpConfig};
pub use delivery::{Delivery, DeliveryHandle, HandlerFuture, MessageHandler};
pub use error::BrokerError;
pub use in_memory::InMemoryBroker;
pub use port::{Broker, DLQ_THRESHOLD};
