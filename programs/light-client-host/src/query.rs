//! This module contains the query handlers

use cosmwasm_std::{Env, Storage};
use tm_light_client::{consensus_state::ConsensusState, status::Status, types::Height};

use crate::{
    context::host_timestamp,
    state::{get_client_state, get_consensus_state},
    HostError,
};

/// Latest height of the client
/// # Errors
/// Returns [`HostError::ClientNotFound`] if the client does not exist
pub fn latest_height(storage: &dyn Storage, client_id: &str) -> Result<Height, HostError> {
    Ok(get_client_state(storage, client_id)?.latest_height)
}

/// The consensus state stored at `height`
/// # Errors
/// Returns [`HostError::ConsensusStateNotFound`] if nothing is stored there
pub fn consensus_state(
    storage: &dyn Storage,
    client_id: &str,
    height: Height,
) -> Result<ConsensusState, HostError> {
    get_consensus_state(storage, client_id, height)?.ok_or_else(|| {
        HostError::ConsensusStateNotFound {
            client_id: client_id.to_string(),
            height,
        }
    })
}

/// Status of the client against the block time
/// # Errors
/// Returns [`HostError::ClientNotFound`] if the client does not exist
pub fn status(storage: &dyn Storage, env: &Env, client_id: &str) -> Result<Status, HostError> {
    let client_state = get_client_state(storage, client_id)?;
    let latest = get_consensus_state(storage, client_id, client_state.latest_height)?;

    let status =
        tm_light_client::status::status(&client_state, latest.as_ref(), host_timestamp(env)?);
    tracing::debug!(%client_id, %status, "client status");
    Ok(status)
}
