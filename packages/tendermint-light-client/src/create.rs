//! This module provides [`create_client`], the `CreateClient` validation.

use crate::{
    client_state::ClientState, consensus_state::ConsensusState, error::TendermintClientError,
    types::Height,
};

/// Validates a new client and returns the height its initial consensus state
/// is stored at, the client's latest height.
/// # Errors
/// Returns [`TendermintClientError::InvalidClientState`] if the client state
/// violates an invariant.
#[allow(clippy::module_name_repetitions)]
pub fn create_client(
    client_state: &ClientState,
    consensus_state: &ConsensusState,
) -> Result<Height, TendermintClientError> {
    client_state.validate()?;
    tracing::info!(
        chain_id = %client_state.chain_id,
        height = %client_state.latest_height,
        timestamp = %consensus_state.timestamp,
        "client created"
    );
    Ok(client_state.latest_height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{crypto::KeyScheme, test_utils::TestChain, types::TrustThreshold};

    #[test]
    fn initial_state_is_stored_at_latest_height() {
        let chain = TestChain::new("test-chain", &[(KeyScheme::Secp256k1, 10)]);
        let client_state = chain.client_state(Height::new(2, 40));

        assert_eq!(
            create_client(&client_state, &chain.consensus_state(40, 1_000)),
            Ok(Height::new(2, 40))
        );
    }

    #[test]
    fn invalid_trust_level_is_rejected() {
        let chain = TestChain::new("test-chain", &[(KeyScheme::Secp256k1, 10)]);
        let client_state = ClientState {
            trust_level: TrustThreshold::ONE_THIRD,
            ..chain.client_state(Height::new(0, 1))
        };

        assert!(matches!(
            create_client(&client_state, &chain.consensus_state(1, 1_000)),
            Err(TendermintClientError::InvalidClientState { .. })
        ));
    }
}
