//! This module contains the client creation handler

use cosmwasm_std::Storage;
use tm_light_client::{
    client_state::ClientState,
    consensus_state::ConsensusState,
    proto::{self, decode_any},
    types::Height,
};

use crate::{
    state::{client_state_key, encode_client_state, store_consensus_state},
    HostError,
};

/// Validates a new client and stores its state and initial consensus state
/// at the client's latest height
/// # Errors
/// Will return an error if either state cannot be decoded or the client
/// state is invalid. Nothing is stored then.
pub fn client(
    storage: &mut dyn Storage,
    client_id: &str,
    client_state_bz: &[u8],
    consensus_state_bz: &[u8],
) -> Result<Height, HostError> {
    let client_state: ClientState = decode_any::<proto::ClientState>(client_state_bz)?.try_into()?;
    let consensus_state: ConsensusState =
        decode_any::<proto::ConsensusState>(consensus_state_bz)?.try_into()?;

    let height = tm_light_client::create::create_client(&client_state, &consensus_state)?;
    let client_state_any_bz = encode_client_state(&client_state)?;

    storage.set(&client_state_key(client_id), &client_state_any_bz);
    store_consensus_state(storage, client_id, height, &consensus_state);

    Ok(height)
}
