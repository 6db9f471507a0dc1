//! Serialization protocol for checkpoint persistence
//!
//! Durable backends encode checkpoints to bytes through a [`SerializerProtocol`]
//! so the on-disk format can be swapped without touching storage logic. JSON is
//! the built-in format; state values are dynamic JSON, so any alternative
//! format must be self-describing.

use crate::{checkpoint::Checkpoint, error::Result};

/// Encoding and decoding of checkpoints for storage backends
pub trait SerializerProtocol: Send + Sync {
    /// Serialize a checkpoint to bytes
    fn dumps(&self, checkpoint: &Checkpoint) -> Result<Vec<u8>>;

    /// Deserialize a checkpoint from bytes
    fn loads(&self, data: &[u8]) -> Result<Checkpoint>;

    /// Name of the serialization format, for diagnostics
    fn format(&self) -> &str;
}

/// JSON serializer (default)
#[derive(Debug, Clone, Default)]
pub struct JsonSerializer;

impl SerializerProtocol for JsonSerializer {
    fn dumps(&self, checkpoint: &Checkpoint) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(checkpoint)?)
    }

    fn loads(&self, data: &[u8]) -> Result<Checkpoint> {
        Ok(serde_json::from_slice(data)?)
    }

    fn format(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Checkpoint {
        Checkpoint::new(json!({"messages": ["hello"], "count": 2}))
            .with_pending_node("summarize")
            .with_step(4)
    }

    #[test]
    fn test_json_round_trip() {
        let serializer = JsonSerializer;
        let cp = sample();
        let bytes = serializer.dumps(&cp).unwrap();
        let decoded = serializer.loads(&bytes).unwrap();
        assert_eq!(cp, decoded);
    }

    #[test]
    fn test_json_rejects_garbage() {
        let serializer = JsonSerializer;
        assert!(serializer.loads(b"not json").is_err());
    }
}
