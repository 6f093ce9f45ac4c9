//! This module provides [`verify_misbehaviour`].

use tm_light_client_utils::ensure;

use crate::{
    client_state::ClientState,
    consensus_state::ConsensusState,
    error::TendermintClientError,
    header::Misbehaviour,
    options::Options,
    types::Timestamp,
    verify::verify_header,
};

/// Verifies that `misbehaviour` proves a fork and returns the client state
/// frozen at the first header's height.
///
/// The headers must either share a height and differ in block hash, or be
/// ordered `header_1` above `header_2` with a time that does not move
/// forward. Each header must independently verify against its own trusted
/// consensus state.
/// # Errors
/// Returns [`TendermintClientError::ClientFrozen`] if the client is already
/// frozen, [`TendermintClientError::InvalidMisbehaviour`] if the headers do
/// not conflict, or the error of whichever header fails to verify.
pub fn verify_misbehaviour(
    client_state: &ClientState,
    misbehaviour: &Misbehaviour,
    trusted_consensus_state_1: &ConsensusState,
    trusted_consensus_state_2: &ConsensusState,
    now: Timestamp,
    options: &Options,
) -> Result<ClientState, TendermintClientError> {
    ensure!(!client_state.is_frozen(), TendermintClientError::ClientFrozen);

    let (header_1, header_2) = (&misbehaviour.header_1, &misbehaviour.header_2);
    let (height_1, height_2) = (header_1.height(), header_2.height());
    ensure!(
        height_1 >= height_2,
        TendermintClientError::InvalidMisbehaviour {
            reason: format!("header_1 height {height_1} is below header_2 height {height_2}"),
        }
    );

    if height_1 == height_2 {
        ensure!(
            header_1.signed_header.hash()? != header_2.signed_header.hash()?,
            TendermintClientError::InvalidMisbehaviour {
                reason: "headers at the same height commit the same block".into(),
            }
        );
    } else {
        let (time_1, time_2) = (
            header_1.signed_header.header.time,
            header_2.signed_header.header.time,
        );
        ensure!(
            time_1 <= time_2,
            TendermintClientError::InvalidMisbehaviour {
                reason: format!(
                    "header_1 time {time_1} is after header_2 time {time_2}, no BFT time violation"
                ),
            }
        );
    }

    verify_header(
        client_state,
        trusted_consensus_state_1,
        header_1,
        now,
        options,
    )?;
    verify_header(
        client_state,
        trusted_consensus_state_2,
        header_2,
        now,
        options,
    )?;

    tracing::warn!(height = %height_1, "misbehaviour verified, freezing client");
    Ok(client_state.frozen_at(height_1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        crypto::KeyScheme,
        header::Header,
        test_utils::{timestamp, TestChain},
        types::Height,
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
            ],
        )
    }

    fn check(
        chain: &TestChain,
        header_1: Header,
        header_2: Header,
    ) -> Result<ClientState, TendermintClientError> {
        let trusted = chain.consensus_state(10, TRUSTED_TIME);
        verify_misbehaviour(
            &chain.client_state(Height::new(0, 12)),
            &Misbehaviour { header_1, header_2 },
            &trusted,
            &trusted,
            timestamp(NOW),
            &Options::default(),
        )
    }

    #[test]
    fn conflicting_blocks_at_one_height_freeze() {
        let chain = chain();
        let header_1 = chain.update_header(Height::new(0, 10), 12, TRUSTED_TIME + 5);
        let mut fork = chain.header(12, TRUSTED_TIME + 5);
        fork.app_hash = vec![0xab; 32];
        let header_2 = Header {
            signed_header: chain.sign_all(fork),
            ..header_1.clone()
        };

        let frozen = check(&chain, header_1, header_2).unwrap();
        assert_eq!(frozen.frozen_height, Height::new(0, 12));
    }

    #[test]
    fn identical_headers_are_not_misbehaviour() {
        let chain = chain();
        let header = chain.update_header(Height::new(0, 10), 12, TRUSTED_TIME + 5);

        assert!(matches!(
            check(&chain, header.clone(), header),
            Err(TendermintClientError::InvalidMisbehaviour { .. })
        ));
    }

    #[test]
    fn time_violation_across_heights_freezes() {
        let chain = chain();
        let header_1 = chain.update_header(Height::new(0, 10), 13, TRUSTED_TIME + 5);
        let header_2 = chain.update_header(Height::new(0, 10), 12, TRUSTED_TIME + 7);

        let frozen = check(&chain, header_1, header_2).unwrap();
        assert_eq!(frozen.frozen_height, Height::new(0, 13));
    }

    #[test]
    fn monotonic_time_across_heights_is_not_misbehaviour() {
        let chain = chain();
        let header_1 = chain.update_header(Height::new(0, 10), 13, TRUSTED_TIME + 9);
        let header_2 = chain.update_header(Height::new(0, 10), 12, TRUSTED_TIME + 7);

        assert!(matches!(
            check(&chain, header_1.clone(), header_2.clone()),
            Err(TendermintClientError::InvalidMisbehaviour { .. })
        ));
        // and the lower header must come second
        assert!(matches!(
            check(&chain, header_2, header_1),
            Err(TendermintClientError::InvalidMisbehaviour { .. })
        ));
    }

    #[test]
    fn each_header_must_verify() {
        let chain = chain();
        let header_1 = chain.update_header(Height::new(0, 10), 12, TRUSTED_TIME + 5);
        let mut fork = chain.header(12, TRUSTED_TIME + 5);
        fork.app_hash = vec![0xab; 32];
        let header_2 = Header {
            signed_header: chain.sign(fork, &[0]),
            ..header_1.clone()
        };

        assert!(matches!(
            check(&chain, header_1, header_2),
            Err(TendermintClientError::InsufficientVotingPower { .. })
        ));
    }

    #[test]
    fn frozen_client_rejects_evidence() {
        let chain = chain();
        let header = chain.update_header(Height::new(0, 10), 12, TRUSTED_TIME + 5);
        let trusted = chain.consensus_state(10, TRUSTED_TIME);
        let client_state = chain
            .client_state(Height::new(0, 12))
            .frozen_at(Height::new(0, 12));

        assert_eq!(
            verify_misbehaviour(
                &client_state,
                &Misbehaviour {
                    header_1: header.clone(),
                    header_2: header,
                },
                &trusted,
                &trusted,
                timestamp(NOW),
                &Options::default(),
            ),
            Err(TendermintClientError::ClientFrozen)
        );
    }
}
