use thiserror::Error;

/// Broker failures (§7: `BrokerConnectionRefused` / `BrokerSendError`).
#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("broker connection refused: {0}")]
    ConnectionRefused(String),

    #[error("broker send error: {0}")]
    SendError(String),

    #[error("message body is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}
