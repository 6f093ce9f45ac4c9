//! This module defines [`ConsensusState`].

use serde::{Deserialize, Serialize};

use crate::{
    block::BlockHeader,
    error::DecodingError,
    proto,
    types::{hash_from_bytes, Hash, Timestamp},
};

/// The trusted checkpoint at one height
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ConsensusState {
    /// Block time at this height
    pub timestamp: Timestamp,
    /// Application state root
    #[serde(with = "tm_light_client_utils::serde::hex_bytes")]
    pub root: Vec<u8>,
    /// Root of the validator set expected to sign the next block
    #[serde(with = "tm_light_client_utils::serde::hex_array")]
    pub next_validators_hash: Hash,
}

impl From<&BlockHeader> for ConsensusState {
    fn from(header: &BlockHeader) -> Self {
        Self {
            timestamp: header.time,
            root: header.app_hash.clone(),
            next_validators_hash: header.next_validators_hash,
        }
    }
}

impl TryFrom<proto::ConsensusState> for ConsensusState {
    type Error = DecodingError;

    fn try_from(value: proto::ConsensusState) -> Result<Self, Self::Error> {
        Ok(Self {
            timestamp: value
                .timestamp
                .ok_or(DecodingError::MissingField("timestamp"))?
                .try_into()?,
            root: value.root,
            next_validators_hash: hash_from_bytes(
                "next_validators_hash",
                value.next_validators_hash,
            )?,
        })
    }
}

impl From<ConsensusState> for proto::ConsensusState {
    fn from(value: ConsensusState) -> Self {
        Self {
            timestamp: Some(value.timestamp.into()),
            root: value.root,
            next_validators_hash: value.next_validators_hash.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_validators_hash_must_be_32_bytes() {
        let wire = proto::ConsensusState {
            timestamp: Some(proto::Timestamp {
                seconds: 1,
                nanos: 0,
            }),
            root: vec![1; 32],
            next_validators_hash: vec![2; 20],
        };
        assert_eq!(
            ConsensusState::try_from(wire),
            Err(DecodingError::InvalidLength {
                field: "next_validators_hash",
                expected: 32,
                found: 20
            })
        );
    }

    #[test]
    fn json_uses_hex_for_hashes() {
        let consensus_state = ConsensusState {
            timestamp: Timestamp::new(5, 0).unwrap(),
            root: vec![0xab],
            next_validators_hash: [0x01; 32],
        };
        let json = serde_json::to_value(&consensus_state).unwrap();
        assert_eq!(json["root"], "ab");
        assert_eq!(json["next_validators_hash"], "01".repeat(32));
        assert_eq!(json["timestamp"], "1970-01-01T00:00:05Z");
        assert_eq!(
            serde_json::from_value::<ConsensusState>(json).unwrap(),
            consensus_state
        );
    }
}
