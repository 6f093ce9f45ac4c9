//! The client-type registry: light client implementations are registered
//! under their client type and every operation is routed to the module that
//! owns the client.

use std::collections::HashMap;

use cosmwasm_std::{Env, Storage};
use ibc_proto::google::protobuf::Any;
use prost::Message;
use tm_light_client::{error::DecodingError, status::Status, types::Height};
use tm_light_client_utils::ensure;

use crate::{
    state::{next_client_sequence, store_next_client_sequence},
    HostError,
};

/// What an accepted client update did to the store
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// A new consensus state was stored
    Updated {
        /// Height of the new consensus state
        height: Height,
        /// The client state after the update, as stored
        client_state: Vec<u8>,
        /// The new consensus state, as stored
        consensus_state: Vec<u8>,
    },
    /// The same consensus state was already stored; nothing was written
    AlreadyStored {
        /// Height of the stored consensus state
        height: Height,
    },
    /// A conflicting consensus state was found and the client was frozen
    Frozen {
        /// Height the client is frozen at
        frozen_height: Height,
    },
}

/// A light client implementation the host can dispatch to.
///
/// Payloads are the [`Any`] encoded messages of the implementation. A failed
/// call must leave the storage untouched.
pub trait LightClientModule {
    /// The client type identifiers are prefixed with, e.g. `07-tendermint`
    fn client_type(&self) -> &str;

    /// Type url of the client states this module creates clients from
    fn client_state_type_url(&self) -> &str;

    /// Validates and stores a new client under `client_id`, returning the
    /// height of its initial consensus state
    /// # Errors
    /// Returns an error if either state fails to decode or validate
    fn create_client(
        &self,
        storage: &mut dyn Storage,
        client_id: &str,
        client_state: &[u8],
        consensus_state: &[u8],
    ) -> Result<Height, HostError>;

    /// Verifies a client message and stores the resulting state
    /// # Errors
    /// Returns an error if the message fails to decode or verify
    fn update_client(
        &self,
        storage: &mut dyn Storage,
        env: &Env,
        client_id: &str,
        client_message: &[u8],
    ) -> Result<UpdateOutcome, HostError>;

    /// Verifies misbehaviour evidence and freezes the client, returning the
    /// frozen height
    /// # Errors
    /// Returns an error if the evidence fails to decode or verify
    fn submit_misbehaviour(
        &self,
        storage: &mut dyn Storage,
        env: &Env,
        client_id: &str,
        misbehaviour: &[u8],
    ) -> Result<Height, HostError>;

    /// Current status of the client
    /// # Errors
    /// Returns an error if the client is not found
    fn status(&self, storage: &dyn Storage, env: &Env, client_id: &str)
        -> Result<Status, HostError>;

    /// Latest height the client has a consensus state for
    /// # Errors
    /// Returns an error if the client is not found
    fn latest_height(&self, storage: &dyn Storage, client_id: &str) -> Result<Height, HostError>;

    /// The encoded consensus state stored at `height`
    /// # Errors
    /// Returns an error if no consensus state is stored at `height`
    fn consensus_state(
        &self,
        storage: &dyn Storage,
        client_id: &str,
        height: Height,
    ) -> Result<Vec<u8>, HostError>;
}

/// Light client modules keyed by client type
#[derive(Default)]
pub struct ClientRegistry {
    modules: HashMap<String, Box<dyn LightClientModule>>,
}

impl ClientRegistry {
    /// Creates an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `module` under its client type
    /// # Errors
    /// Returns [`HostError::ClientTypeAlreadyRegistered`] if the client type
    /// or its client state type url is taken
    pub fn register(&mut self, module: Box<dyn LightClientModule>) -> Result<(), HostError> {
        let client_type = module.client_type().to_string();
        ensure!(
            !self.modules.contains_key(&client_type)
                && !self
                    .modules
                    .values()
                    .any(|m| m.client_state_type_url() == module.client_state_type_url()),
            HostError::ClientTypeAlreadyRegistered(client_type)
        );

        tracing::debug!(%client_type, "light client module registered");
        self.modules.insert(client_type, module);
        Ok(())
    }

    /// Whether a module is registered for `client_type`
    #[must_use]
    pub fn is_registered(&self, client_type: &str) -> bool {
        self.modules.contains_key(client_type)
    }

    /// Creates a client from an encoded client state and consensus state,
    /// routed on the client state's type url. Returns the new identifier,
    /// `{client_type}-{sequence}`.
    /// # Errors
    /// Returns [`HostError::ClientTypeNotRegistered`] if no module creates
    /// clients of that type url, or the module's error
    pub fn create_client(
        &self,
        storage: &mut dyn Storage,
        client_state: &[u8],
        consensus_state: &[u8],
    ) -> Result<String, HostError> {
        let envelope = Any::decode(client_state).map_err(DecodingError::from)?;
        let module = self
            .modules
            .values()
            .find(|m| m.client_state_type_url() == envelope.type_url)
            .ok_or_else(|| HostError::ClientTypeNotRegistered(envelope.type_url.clone()))?;

        let sequence = next_client_sequence(storage)?;
        let next_sequence = sequence
            .checked_add(1)
            .ok_or(HostError::InvalidClientSequence)?;
        let client_id = format!("{}-{sequence}", module.client_type());
        let height = module.create_client(storage, &client_id, client_state, consensus_state)?;
        store_next_client_sequence(storage, next_sequence);

        tracing::info!(%client_id, %height, "client created");
        Ok(client_id)
    }

    /// Updates `client_id` with an encoded client message
    /// # Errors
    /// Returns an error if the client cannot be routed or the update is rejected
    pub fn update_client(
        &self,
        storage: &mut dyn Storage,
        env: &Env,
        client_id: &str,
        client_message: &[u8],
    ) -> Result<UpdateOutcome, HostError> {
        self.module_for(client_id)?
            .update_client(storage, env, client_id, client_message)
            .inspect_err(|err| tracing::info!(%client_id, %err, "client update rejected"))
    }

    /// Submits misbehaviour evidence against `client_id`
    /// # Errors
    /// Returns an error if the client cannot be routed or the evidence is rejected
    pub fn submit_misbehaviour(
        &self,
        storage: &mut dyn Storage,
        env: &Env,
        client_id: &str,
        misbehaviour: &[u8],
    ) -> Result<Height, HostError> {
        self.module_for(client_id)?
            .submit_misbehaviour(storage, env, client_id, misbehaviour)
    }

    /// Status of `client_id`
    /// # Errors
    /// Returns an error if the client cannot be routed or is not found
    pub fn status(
        &self,
        storage: &dyn Storage,
        env: &Env,
        client_id: &str,
    ) -> Result<Status, HostError> {
        self.module_for(client_id)?.status(storage, env, client_id)
    }

    /// Latest height of `client_id`
    /// # Errors
    /// Returns an error if the client cannot be routed or is not found
    pub fn latest_height(
        &self,
        storage: &dyn Storage,
        client_id: &str,
    ) -> Result<Height, HostError> {
        self.module_for(client_id)?.latest_height(storage, client_id)
    }

    /// Encoded consensus state of `client_id` at `height`
    /// # Errors
    /// Returns an error if the client cannot be routed or nothing is stored at `height`
    pub fn consensus_state(
        &self,
        storage: &dyn Storage,
        client_id: &str,
        height: Height,
    ) -> Result<Vec<u8>, HostError> {
        self.module_for(client_id)?
            .consensus_state(storage, client_id, height)
    }

    fn module_for(&self, client_id: &str) -> Result<&dyn LightClientModule, HostError> {
        let invalid = || HostError::InvalidClientId(client_id.to_string());
        let (client_type, sequence) = client_id.rsplit_once('-').ok_or_else(invalid)?;
        ensure!(sequence.parse::<u64>().is_ok(), invalid());

        self.modules
            .get(client_type)
            .map(AsRef::as_ref)
            .ok_or_else(|| HostError::ClientTypeNotRegistered(client_type.to_string()))
    }
}
