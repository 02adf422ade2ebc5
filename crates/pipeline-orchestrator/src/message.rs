//! The job message wire format (§3, §4.8): `{"namespace": "<string>"}`,
//! carried on the application routing key with a `count` retry header
//! managed entirely by the broker layer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMessage {
    pub namespace: String,
}

impl JobMessage {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self { namespace: namespace.into() }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let msg = JobMessage::new("rfb.json");
        let bytes = msg.to_bytes().unwrap();
        let back = JobMessage::from_bytes(&bytes).unwrap();
        assert_eq!(msg, back);
    }

    #[test]
    fn wire_shape_is_a_bare_namespace_object() {
        let msg = JobMessage::new("rfb.json");
        let bytes = msg.to_bytes().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, serde_json::json!({"namespace": "rfb.json"}));
    }
}
