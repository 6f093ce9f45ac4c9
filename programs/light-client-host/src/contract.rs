//! The tendermint [`LightClientModule`], routing host calls to the
//! instantiate, sudo and query handlers.

use cosmwasm_std::{Env, Storage};
use tm_light_client::{
    options::Options,
    proto::CLIENT_STATE_TYPE_URL,
    status::Status,
    types::Height,
};

use crate::{
    instantiate, query,
    registry::{LightClientModule, UpdateOutcome},
    state::encode_consensus_state,
    sudo, HostError,
};

/// Tendermint light clients, verified with the configured [`Options`]
#[derive(Clone, Debug, Default)]
pub struct TendermintClientModule {
    options: Options,
}

impl TendermintClientModule {
    /// Creates the module with custom verifier options
    /// # Errors
    /// Returns an error if the options could weaken verification
    pub fn new(options: Options) -> Result<Self, HostError> {
        options.validate()?;
        Ok(Self { options })
    }

    /// The verifier options in use
    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }
}

impl LightClientModule for TendermintClientModule {
    fn client_type(&self) -> &str {
        &self.options.client_type
    }

    fn client_state_type_url(&self) -> &str {
        CLIENT_STATE_TYPE_URL
    }

    fn create_client(
        &self,
        storage: &mut dyn Storage,
        client_id: &str,
        client_state: &[u8],
        consensus_state: &[u8],
    ) -> Result<Height, HostError> {
        instantiate::client(storage, client_id, client_state, consensus_state)
    }

    fn update_client(
        &self,
        storage: &mut dyn Storage,
        env: &Env,
        client_id: &str,
        client_message: &[u8],
    ) -> Result<UpdateOutcome, HostError> {
        sudo::update_state(storage, env, client_id, client_message, &self.options)
    }

    fn submit_misbehaviour(
        &self,
        storage: &mut dyn Storage,
        env: &Env,
        client_id: &str,
        misbehaviour: &[u8],
    ) -> Result<Height, HostError> {
        sudo::misbehaviour(storage, env, client_id, misbehaviour, &self.options)
    }

    fn status(
        &self,
        storage: &dyn Storage,
        env: &Env,
        client_id: &str,
    ) -> Result<Status, HostError> {
        query::status(storage, env, client_id)
    }

    fn latest_height(&self, storage: &dyn Storage, client_id: &str) -> Result<Height, HostError> {
        query::latest_height(storage, client_id)
    }

    fn consensus_state(
        &self,
        storage: &dyn Storage,
        client_id: &str,
        height: Height,
    ) -> Result<Vec<u8>, HostError> {
        query::consensus_state(storage, client_id, height).map(|cs| encode_consensus_state(&cs))
    }
}
