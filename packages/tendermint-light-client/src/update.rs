//! This module provides [`update_client`], the `UpdateClient` state transition.

use tm_light_client_utils::ensure;

use crate::{
    client_state::ClientState,
    consensus_state::ConsensusState,
    error::TendermintClientError,
    header::Header,
    options::Options,
    types::{Height, Timestamp},
    verify::verify_header,
};

/// The outcome of an accepted update. Nothing is written until the caller
/// persists it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpdateResult {
    /// A new consensus state to store at `height`, and the client state if
    /// its latest height moved
    Updated {
        /// Height of the new consensus state
        height: Height,
        /// The new consensus state
        consensus_state: ConsensusState,
        /// The new client state, if it changed
        client_state: Option<ClientState>,
    },
    /// The same consensus state is already stored at `height`
    AlreadyStored {
        /// Height of the stored consensus state
        height: Height,
    },
    /// A different consensus state is stored at the header's height; the
    /// returned client state is frozen there
    Misbehaviour {
        /// The frozen client state
        client_state: ClientState,
    },
}

/// Verifies `header` and computes the client's next state.
///
/// `trusted_consensus_state` is the state stored at `header.trusted_height`,
/// `existing_consensus_state` whatever is already stored at the header's own
/// height.
/// # Errors
/// Returns [`TendermintClientError::ClientFrozen`] for a frozen client that
/// does not allow updates after misbehaviour, or any verification error.
#[allow(clippy::module_name_repetitions)]
pub fn update_client(
    client_state: &ClientState,
    trusted_consensus_state: &ConsensusState,
    existing_consensus_state: Option<&ConsensusState>,
    header: &Header,
    now: Timestamp,
    options: &Options,
) -> Result<UpdateResult, TendermintClientError> {
    ensure!(
        !client_state.is_frozen() || client_state.allow_update_after_misbehaviour,
        TendermintClientError::ClientFrozen
    );

    let verified = verify_header(
        client_state,
        trusted_consensus_state,
        header,
        now,
        options,
    )?;
    let height = verified.height;
    let new_consensus_state = ConsensusState::from(&header.signed_header.header);

    match existing_consensus_state {
        Some(existing) if *existing == new_consensus_state => {
            tracing::debug!(%height, "consensus state already stored");
            Ok(UpdateResult::AlreadyStored { height })
        }
        Some(_) => {
            tracing::warn!(%height, "conflicting consensus state, freezing client");
            Ok(UpdateResult::Misbehaviour {
                client_state: client_state.frozen_at(height),
            })
        }
        None => {
            let new_client_state =
                (height > client_state.latest_height).then_some(ClientState {
                    latest_height: height,
                    ..client_state.clone()
                });
            tracing::info!(
                %height,
                trusted_height = %header.trusted_height,
                adjacent = verified.adjacent,
                signed = %verified.signed,
                "client updated"
            );
            Ok(UpdateResult::Updated {
                height,
                consensus_state: new_consensus_state,
                client_state: new_client_state,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        crypto::KeyScheme,
        header::TrustedValidators,
        test_utils::{timestamp, TestChain, TestValidator, TRUSTING_PERIOD},
    };

    const TRUSTED_TIME: i64 = 1_700_000_000;
    const NOW: i64 = TRUSTED_TIME + 60;

    fn chain() -> TestChain {
        TestChain::new(
            "test-chain",
            &[
                (KeyScheme::Ed25519, 10),
                (KeyScheme::Secp256k1, 10),
                (KeyScheme::Ed25519, 10),
                (KeyScheme::Secp256k1, 10),
                (KeyScheme::Ed25519, 10),
            ],
        )
    }

    fn update(
        client_state: &ClientState,
        chain: &TestChain,
        header: &Header,
        existing: Option<&ConsensusState>,
    ) -> Result<UpdateResult, TendermintClientError> {
        update_client(
            client_state,
            &chain.consensus_state(10, TRUSTED_TIME),
            existing,
            header,
            timestamp(NOW),
            &Options::default(),
        )
    }

    #[test]
    fn adjacent_update_stores_app_hash() {
        let chain = chain();
        let client_state = chain.client_state(Height::new(0, 10));
        let header = chain.update_header(Height::new(0, 10), 11, TRUSTED_TIME + 5);

        let UpdateResult::Updated {
            height,
            consensus_state,
            client_state: new_client_state,
        } = update(&client_state, &chain, &header, None).unwrap()
        else {
            panic!("expected an update");
        };

        assert_eq!(height, Height::new(0, 11));
        assert_eq!(consensus_state.root, header.signed_header.header.app_hash);
        assert_eq!(
            consensus_state.timestamp,
            timestamp(TRUSTED_TIME + 5)
        );
        assert_eq!(
            consensus_state.next_validators_hash,
            header.signed_header.header.next_validators_hash
        );
        assert_eq!(new_client_state.unwrap().latest_height, height);
    }

    #[test]
    fn backfilled_height_keeps_latest_height() {
        let chain = chain();
        let client_state = chain.client_state(Height::new(0, 30));
        let header = chain.update_header(Height::new(0, 10), 15, TRUSTED_TIME + 5);

        let result = update(&client_state, &chain, &header, None).unwrap();
        assert!(matches!(
            result,
            UpdateResult::Updated {
                client_state: None,
                ..
            }
        ));
    }

    #[test]
    fn skipping_update_with_twenty_percent_overlap_fails() {
        let trusted_chain = chain();
        let client_state = trusted_chain.client_state(Height::new(0, 10));

        // only trusted validator 1 remains
        let new_chain = TestChain::from_validators(
            "test-chain",
            vec![
                TestValidator::new(1, KeyScheme::Ed25519, 10),
                TestValidator::new(70, KeyScheme::Ed25519, 10),
                TestValidator::new(71, KeyScheme::Secp256k1, 10),
                TestValidator::new(72, KeyScheme::Ed25519, 10),
                TestValidator::new(73, KeyScheme::Secp256k1, 10),
            ],
        );
        let mut header = new_chain.update_header(Height::new(0, 10), 20, TRUSTED_TIME + 5);
        header.trusted_validators = TrustedValidators::Full(trusted_chain.validator_set());

        assert_eq!(
            update(&client_state, &trusted_chain, &header, None),
            Err(TendermintClientError::InsufficientVotingPower {
                tallied: 10,
                total: 50,
                numerator: 1,
                denominator: 2,
            })
        );
    }

    #[test]
    fn header_past_trusting_period_is_rejected() {
        let chain = chain();
        let client_state = chain.client_state(Height::new(0, 10));
        let trusting_secs = i64::try_from(TRUSTING_PERIOD.as_secs()).unwrap();
        let late = TRUSTED_TIME + trusting_secs + 1;
        let header = chain.update_header(Height::new(0, 10), 11, late);

        let result = update_client(
            &client_state,
            &chain.consensus_state(10, TRUSTED_TIME),
            None,
            &header,
            timestamp(late),
            &Options::default(),
        );
        assert!(matches!(
            result,
            Err(TendermintClientError::ExpiredOrFutureHeader { .. })
        ));
    }

    #[test]
    fn frozen_client_rejects_updates() {
        let chain = chain();
        let mut client_state = chain
            .client_state(Height::new(0, 10))
            .frozen_at(Height::new(0, 9));
        let header = chain.update_header(Height::new(0, 10), 11, TRUSTED_TIME + 5);

        assert_eq!(
            update(&client_state, &chain, &header, None),
            Err(TendermintClientError::ClientFrozen)
        );

        client_state.allow_update_after_misbehaviour = true;
        let UpdateResult::Updated {
            client_state: Some(new_client_state),
            ..
        } = update(&client_state, &chain, &header, None).unwrap()
        else {
            panic!("expected an update");
        };
        assert_eq!(new_client_state.frozen_height, Height::new(0, 9));
    }

    #[test]
    fn identical_stored_state_is_a_no_op() {
        let chain = chain();
        let client_state = chain.client_state(Height::new(0, 11));
        let header = chain.update_header(Height::new(0, 10), 11, TRUSTED_TIME + 5);
        let stored = ConsensusState::from(&header.signed_header.header);

        assert_eq!(
            update(&client_state, &chain, &header, Some(&stored)),
            Ok(UpdateResult::AlreadyStored {
                height: Height::new(0, 11)
            })
        );
    }

    #[test]
    fn conflicting_stored_state_freezes() {
        let chain = chain();
        let client_state = chain.client_state(Height::new(0, 11));
        let header = chain.update_header(Height::new(0, 10), 11, TRUSTED_TIME + 5);
        let mut stored = ConsensusState::from(&header.signed_header.header);
        stored.root = vec![0xff; 32];

        let UpdateResult::Misbehaviour {
            client_state: frozen,
        } = update(&client_state, &chain, &header, Some(&stored)).unwrap()
        else {
            panic!("expected misbehaviour");
        };
        assert!(frozen.is_frozen());
        assert_eq!(frozen.frozen_height, Height::new(0, 11));
    }

    #[test]
    fn identical_inputs_give_identical_outcomes() {
        let chain = chain();
        let client_state = chain.client_state(Height::new(0, 10));
        let accepted = chain.update_header(Height::new(0, 10), 11, TRUSTED_TIME + 5);
        let mut rejected = accepted.clone();
        rejected.signed_header = chain.sign(chain.header(11, TRUSTED_TIME + 5), &[0]);

        for header in [&accepted, &rejected] {
            let first = update(&client_state, &chain, header, None);
            let second = update(&client_state, &chain, header, None);
            assert_eq!(first, second);
        }
    }
}
