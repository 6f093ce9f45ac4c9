//! This module contains the state-changing handlers: client updates and
//! misbehaviour submission.
//!
//! Each handler reads, verifies and encodes everything it will write before
//! its first write, so a rejected message leaves the store untouched.

use cosmwasm_std::{Env, Storage};
use tm_light_client::{
    consensus_state::ConsensusState,
    error::TendermintClientError,
    header::{Header, Misbehaviour},
    misbehaviour::verify_misbehaviour,
    options::Options,
    proto::{self, decode_any},
    types::Height,
    update::{update_client, UpdateResult},
};

use crate::{
    context::host_timestamp,
    registry::UpdateOutcome,
    state::{
        client_state_key, consensus_state_key, encode_client_state, encode_consensus_state,
        get_client_state, get_consensus_state,
    },
    HostError,
};

/// Verifies an update message against the client and stores the new
/// consensus state, moving the client's latest height forward if needed.
///
/// A conflicting consensus state already stored at the header's height
/// freezes the client instead; an identical one writes nothing.
/// # Errors
/// Returns an error if the message cannot be decoded, the client or its
/// trusted consensus state is missing, or verification fails
pub fn update_state(
    storage: &mut dyn Storage,
    env: &Env,
    client_id: &str,
    client_message: &[u8],
    options: &Options,
) -> Result<UpdateOutcome, HostError> {
    let header: Header = decode_any::<proto::TmHeader>(client_message)?.try_into()?;

    let client_state = get_client_state(storage, client_id)?;
    let trusted = trusted_consensus_state(storage, client_id, header.trusted_height)?;
    let existing_consensus_state = get_consensus_state(storage, client_id, header.height())?;

    let result = update_client(
        &client_state,
        &trusted,
        existing_consensus_state.as_ref(),
        &header,
        host_timestamp(env)?,
        options,
    )?;

    match result {
        UpdateResult::Updated {
            height,
            consensus_state,
            client_state: new_client_state,
        } => {
            let consensus_state_bz = encode_consensus_state(&consensus_state);
            let client_state_bz =
                encode_client_state(new_client_state.as_ref().unwrap_or(&client_state))?;

            storage.set(&consensus_state_key(client_id, height), &consensus_state_bz);
            if new_client_state.is_some() {
                storage.set(&client_state_key(client_id), &client_state_bz);
            }

            Ok(UpdateOutcome::Updated {
                height,
                client_state: client_state_bz,
                consensus_state: consensus_state_bz,
            })
        }
        UpdateResult::AlreadyStored { height } => Ok(UpdateOutcome::AlreadyStored { height }),
        UpdateResult::Misbehaviour {
            client_state: frozen,
        } => {
            let frozen_bz = encode_client_state(&frozen)?;
            tracing::warn!(%client_id, frozen_height = %frozen.frozen_height, "client frozen");
            storage.set(&client_state_key(client_id), &frozen_bz);
            Ok(UpdateOutcome::Frozen {
                frozen_height: frozen.frozen_height,
            })
        }
    }
}

/// Verifies misbehaviour evidence and freezes the client
/// # Errors
/// Returns an error if the evidence cannot be decoded, a trusted consensus
/// state is missing, or the evidence does not prove a fork
pub fn misbehaviour(
    storage: &mut dyn Storage,
    env: &Env,
    client_id: &str,
    misbehaviour: &[u8],
    options: &Options,
) -> Result<Height, HostError> {
    let misbehaviour: Misbehaviour = decode_any::<proto::Misbehaviour>(misbehaviour)?.try_into()?;

    let client_state = get_client_state(storage, client_id)?;
    let trusted_1 =
        trusted_consensus_state(storage, client_id, misbehaviour.header_1.trusted_height)?;
    let trusted_2 =
        trusted_consensus_state(storage, client_id, misbehaviour.header_2.trusted_height)?;

    let frozen = verify_misbehaviour(
        &client_state,
        &misbehaviour,
        &trusted_1,
        &trusted_2,
        host_timestamp(env)?,
        options,
    )?;
    let frozen_bz = encode_client_state(&frozen)?;

    tracing::warn!(%client_id, frozen_height = %frozen.frozen_height, "misbehaviour submitted, client frozen");
    storage.set(&client_state_key(client_id), &frozen_bz);
    Ok(frozen.frozen_height)
}

fn trusted_consensus_state(
    storage: &dyn Storage,
    client_id: &str,
    height: Height,
) -> Result<ConsensusState, HostError> {
    get_consensus_state(storage, client_id, height)?
        .ok_or_else(|| TendermintClientError::UnknownTrustedHeight(height).into())
}
