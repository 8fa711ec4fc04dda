//! Binary encoding of AST nodes
//!
//! Every node type derives `serde`, so any of them (a whole [`Script`](crate::Script),
//! a single statement, an expression) can be stored and restored with `bincode`.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode node: {0}")]
    Encode(#[source] bincode::Error),

    #[error("failed to decode node: {0}")]
    Decode(#[source] bincode::Error),
}

/// Encode a node into bytes
pub fn encode<T: Serialize>(node: &T) -> Result<Vec<u8>, CodecError> {
    bincode::serialize(node).map_err(CodecError::Encode)
}

/// Decode a node previously produced by [`encode`]
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    bincode::deserialize(bytes).map_err(CodecError::Decode)
}
