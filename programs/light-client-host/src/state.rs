//! Per-client storage layout.
//!
//! Every client owns the keys under `clients/{client_id}/`. Values are
//! protobuf messages wrapped in a `google.protobuf.Any`.

use cosmwasm_std::Storage;
use tm_light_client::{
    client_state::ClientState,
    consensus_state::ConsensusState,
    proto::{self, decode_any, encode_any},
    types::Height,
};

use crate::HostError;

/// Prefix of every per-client key
pub const CLIENTS_PREFIX: &str = "clients";
/// The store key of a client's state
pub const HOST_CLIENT_STATE_KEY: &str = "clientState";
/// The store key prefix of a client's consensus states
pub const HOST_CONSENSUS_STATES_KEY: &str = "consensusStates";
/// The store key of the sequence the next created client is numbered with
pub const NEXT_CLIENT_SEQUENCE_KEY: &str = "nextClientSequence";

/// The key a client's state is stored under
#[must_use]
pub fn client_state_key(client_id: &str) -> Vec<u8> {
    format!("{CLIENTS_PREFIX}/{client_id}/{HOST_CLIENT_STATE_KEY}").into_bytes()
}

/// The key a client's consensus state at `height` is stored under
#[must_use]
pub fn consensus_state_key(client_id: &str, height: Height) -> Vec<u8> {
    format!(
        "{CLIENTS_PREFIX}/{client_id}/{HOST_CONSENSUS_STATES_KEY}/{}-{}",
        height.revision_number, height.revision_height
    )
    .into_bytes()
}

/// Encodes a client state into its stored envelope
/// # Errors
/// Returns an error if a period does not fit its wire encoding
pub fn encode_client_state(client_state: &ClientState) -> Result<Vec<u8>, HostError> {
    Ok(encode_any(&proto::ClientState::try_from(client_state.clone())?))
}

/// Encodes a consensus state into its stored envelope
#[must_use]
pub fn encode_consensus_state(consensus_state: &ConsensusState) -> Vec<u8> {
    encode_any(&proto::ConsensusState::from(consensus_state.clone()))
}

/// Get the client state
/// # Errors
/// Returns [`HostError::ClientNotFound`] if nothing is stored for the client,
/// or a decoding error if the stored value is malformed
pub fn get_client_state(storage: &dyn Storage, client_id: &str) -> Result<ClientState, HostError> {
    let client_state_any_bz = storage
        .get(&client_state_key(client_id))
        .ok_or_else(|| HostError::ClientNotFound(client_id.to_string()))?;
    let client_state = decode_any::<proto::ClientState>(&client_state_any_bz)?;

    Ok(client_state.try_into()?)
}

/// Get the consensus state stored at `height`, if any
/// # Errors
/// Returns a decoding error if the stored value is malformed
pub fn get_consensus_state(
    storage: &dyn Storage,
    client_id: &str,
    height: Height,
) -> Result<Option<ConsensusState>, HostError> {
    let Some(consensus_state_any_bz) = storage.get(&consensus_state_key(client_id, height)) else {
        return Ok(None);
    };
    let consensus_state = decode_any::<proto::ConsensusState>(&consensus_state_any_bz)?;

    Ok(Some(consensus_state.try_into()?))
}

/// Store the client state
/// # Errors
/// Returns an error if the client state cannot be encoded. Nothing is
/// written then.
pub fn store_client_state(
    storage: &mut dyn Storage,
    client_id: &str,
    client_state: &ClientState,
) -> Result<(), HostError> {
    let client_state_bz = encode_client_state(client_state)?;
    storage.set(&client_state_key(client_id), &client_state_bz);
    Ok(())
}

/// Store the consensus state at `height`
pub fn store_consensus_state(
    storage: &mut dyn Storage,
    client_id: &str,
    height: Height,
    consensus_state: &ConsensusState,
) {
    storage.set(
        &consensus_state_key(client_id, height),
        &encode_consensus_state(consensus_state),
    );
}

/// The sequence the next created client is numbered with, starting at zero
/// # Errors
/// Returns [`HostError::InvalidClientSequence`] if the stored value is not a
/// big-endian `u64`
pub fn next_client_sequence(storage: &dyn Storage) -> Result<u64, HostError> {
    let Some(sequence_bz) = storage.get(NEXT_CLIENT_SEQUENCE_KEY.as_bytes()) else {
        return Ok(0);
    };
    let sequence_bz: [u8; 8] = sequence_bz
        .try_into()
        .map_err(|_| HostError::InvalidClientSequence)?;
    Ok(u64::from_be_bytes(sequence_bz))
}

/// Store the sequence the next created client is numbered with
pub fn store_next_client_sequence(storage: &mut dyn Storage, sequence: u64) {
    storage.set(NEXT_CLIENT_SEQUENCE_KEY.as_bytes(), &sequence.to_be_bytes());
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use cosmwasm_std::testing::MockStorage;
    use tm_light_client::{crypto::KeyScheme, error::TendermintClientError, test_utils::TestChain};

    use super::*;

    #[test]
    fn keys_follow_the_client_prefix() {
        assert_eq!(
            client_state_key("07-tendermint-0"),
            b"clients/07-tendermint-0/clientState".to_vec()
        );
        assert_eq!(
            consensus_state_key("07-tendermint-0", Height::new(1, 20)),
            b"clients/07-tendermint-0/consensusStates/1-20".to_vec()
        );
    }

    #[test]
    fn stored_states_read_back() {
        let chain = TestChain::new("test-chain", &[(KeyScheme::Ed25519, 10)]);
        let client_state = chain.client_state(Height::new(0, 5));
        let consensus_state = chain.consensus_state(5, 1_000);
        let mut storage = MockStorage::new();

        assert_eq!(
            get_client_state(&storage, "07-tendermint-0"),
            Err(HostError::ClientNotFound("07-tendermint-0".into()))
        );

        store_client_state(&mut storage, "07-tendermint-0", &client_state).unwrap();
        store_consensus_state(
            &mut storage,
            "07-tendermint-0",
            Height::new(0, 5),
            &consensus_state,
        );

        assert_eq!(
            get_client_state(&storage, "07-tendermint-0"),
            Ok(client_state)
        );
        assert_eq!(
            get_consensus_state(&storage, "07-tendermint-0", Height::new(0, 5)),
            Ok(Some(consensus_state))
        );
        assert_eq!(
            get_consensus_state(&storage, "07-tendermint-0", Height::new(0, 6)),
            Ok(None)
        );
        assert_eq!(
            get_consensus_state(&storage, "07-tendermint-1", Height::new(0, 5)),
            Ok(None)
        );
    }

    #[test]
    fn value_under_wrong_type_url_is_rejected() {
        let chain = TestChain::new("test-chain", &[(KeyScheme::Ed25519, 10)]);
        let mut storage = MockStorage::new();
        storage.set(
            &client_state_key("07-tendermint-0"),
            &encode_consensus_state(&chain.consensus_state(5, 1_000)),
        );

        assert!(matches!(
            get_client_state(&storage, "07-tendermint-0"),
            Err(HostError::Decoding(_))
        ));
    }

    #[test]
    fn unencodable_client_state_is_not_written() {
        let chain = TestChain::new("test-chain", &[(KeyScheme::Ed25519, 10)]);
        let mut client_state = chain.client_state(Height::new(0, 5));
        client_state.unbonding_period = Duration::from_secs(u64::MAX);
        let mut storage = MockStorage::new();

        assert_eq!(
            store_client_state(&mut storage, "07-tendermint-0", &client_state),
            Err(HostError::Client(
                TendermintClientError::EncodingOutOfRange {
                    field: "unbonding_period",
                    value: u64::MAX,
                }
            ))
        );
        assert_eq!(storage.get(&client_state_key("07-tendermint-0")), None);
    }

    #[test]
    fn client_sequence_starts_at_zero_and_persists() {
        let mut storage = MockStorage::new();
        assert_eq!(next_client_sequence(&storage), Ok(0));

        store_next_client_sequence(&mut storage, 7);
        assert_eq!(next_client_sequence(&storage), Ok(7));

        storage.set(NEXT_CLIENT_SEQUENCE_KEY.as_bytes(), &[1, 2, 3]);
        assert_eq!(
            next_client_sequence(&storage),
            Err(HostError::InvalidClientSequence)
        );
    }
}
