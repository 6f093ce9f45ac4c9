//! Defines the [`HostError`] type.

use thiserror::Error;
use tm_light_client::{
    error::{DecodingError, TendermintClientError},
    types::Height,
};

/// Error types that can be returned by host operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub enum HostError {
    /// The light client rejected the operation
    #[error("light client error: {0}")]
    Client(#[from] TendermintClientError),

    /// Malformed envelope or payload
    #[error("decoding failed: {0}")]
    Decoding(#[from] DecodingError),

    /// No client is stored under the identifier
    #[error("client {0} not found")]
    ClientNotFound(String),

    /// The identifier is not of the form `{client_type}-{sequence}`
    #[error("invalid client identifier ({0})")]
    InvalidClientId(String),

    /// No module is registered for the client type or state type url
    #[error("client type ({0}) is not registered")]
    ClientTypeNotRegistered(String),

    /// A module is already registered for the client type
    #[error("client type ({0}) is already registered")]
    ClientTypeAlreadyRegistered(String),

    /// The stored client sequence is malformed or exhausted
    #[error("client sequence is malformed or exhausted")]
    InvalidClientSequence,

    /// No consensus state is stored at the requested height
    #[error("consensus state for client {client_id} not found at height {height}")]
    ConsensusStateNotFound {
        /// Client identifier
        client_id: String,
        /// Requested height
        height: Height,
    },
}
