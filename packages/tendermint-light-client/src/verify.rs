//! Header verification against a trusted consensus state.
//!
//! [`verify_header`] is pure: it reads the client state, the trusted
//! consensus state, the submitted header and the host clock, and either
//! accepts the header or names the first rule it breaks.

use std::{collections::HashSet, fmt};

use tm_light_client_utils::ensure;

use crate::{
    block::{CommitSig, SignedHeader},
    client_state::ClientState,
    consensus_state::ConsensusState,
    error::TendermintClientError,
    header::{Header, TrustedValidators},
    options::Options,
    types::{Height, Timestamp, TrustThreshold},
    validator_set::ValidatorSet,
};

/// Voting power that signed a header, out of the total of some set
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VotingPowerTally {
    /// Total voting power of the set
    pub total: u64,
    /// Voting power of members whose signature verified
    pub tallied: u64,
}

impl VotingPowerTally {
    const fn new(total: u64) -> Self {
        Self { total, tallied: 0 }
    }

    fn tally(&mut self, power: u64, bound: u64) -> Result<(), TendermintClientError> {
        self.tallied = self
            .tallied
            .checked_add(power)
            .filter(|sum| *sum <= bound)
            .ok_or(TendermintClientError::Overflow { bound })?;
        Ok(())
    }

    /// `tallied / total >= threshold`, and the set has power at all
    /// # Errors
    /// Returns [`TendermintClientError::InsufficientVotingPower`] otherwise.
    pub fn check_met(&self, threshold: TrustThreshold) -> Result<(), TendermintClientError> {
        ensure!(
            self.total > 0 && threshold.is_met_by(self.tallied, self.total),
            self.insufficient(threshold)
        );
        Ok(())
    }

    /// `tallied / total > threshold`
    /// # Errors
    /// Returns [`TendermintClientError::InsufficientVotingPower`] otherwise.
    pub fn check_exceeded(&self, threshold: TrustThreshold) -> Result<(), TendermintClientError> {
        ensure!(
            self.total > 0 && threshold.is_exceeded_by(self.tallied, self.total),
            self.insufficient(threshold)
        );
        Ok(())
    }

    const fn insufficient(&self, threshold: TrustThreshold) -> TendermintClientError {
        TendermintClientError::InsufficientVotingPower {
            tallied: self.tallied,
            total: self.total,
            numerator: threshold.numerator,
            denominator: threshold.denominator,
        }
    }
}

impl fmt::Display for VotingPowerTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.tallied, self.total)
    }
}

/// What verification established about an accepted header
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VerifiedHeader {
    /// Height of the new header
    pub height: Height,
    /// Whether the header directly follows the trusted height
    pub adjacent: bool,
    /// Signed power of the new validator set
    pub signed: VotingPowerTally,
    /// Signed power of the trusted validator set
    pub trusted: VotingPowerTally,
}

/// Verifies `header` against the trusted consensus state at
/// `header.trusted_height`.
///
/// Adjacent headers must be signed by more than `adjacent_trust_threshold`
/// of the trusted set, which is then the header's own set. Skipping headers
/// must be signed by at least `trust_level` of the trusted set and by more
/// than two thirds of their own set. Both must reach `trust_level` of their
/// own set.
///
/// The frozen check is left to the caller, so misbehaviour evidence can be
/// verified with the same rules.
/// # Errors
/// Returns the first rule the header breaks.
pub fn verify_header(
    client_state: &ClientState,
    trusted_consensus_state: &ConsensusState,
    header: &Header,
    now: Timestamp,
    options: &Options,
) -> Result<VerifiedHeader, TendermintClientError> {
    options.validate()?;

    let trusted_height = header.trusted_height;
    let height = header.height();
    ensure!(
        height > trusted_height,
        TendermintClientError::NonMonotonicHeight {
            trusted: trusted_height,
            new: height,
        }
    );

    let signed_header = &header.signed_header;
    ensure!(
        signed_header.header.chain_id == client_state.chain_id,
        TendermintClientError::ChainIdMismatch {
            expected: client_state.chain_id.clone(),
            found: signed_header.header.chain_id.clone(),
        }
    );

    header.validator_set.validate(options.max_total_voting_power)?;
    ensure!(
        header.validator_set.hash()? == signed_header.header.validators_hash,
        TendermintClientError::SelfInconsistentHeader {
            reason: "validator set does not hash to the header's validators hash".into(),
        }
    );
    signed_header.validate_basic()?;
    ensure!(
        signed_header.commit.signatures.len() == header.validator_set.len(),
        TendermintClientError::InvalidCommit {
            reason: format!(
                "commit has {} signatures for {} validators",
                signed_header.commit.signatures.len(),
                header.validator_set.len()
            ),
        }
    );

    verify_time(
        client_state,
        trusted_consensus_state,
        signed_header.header.time,
        now,
    )?;

    let adjacent = trusted_height.is_adjacent_to(&height);
    if adjacent {
        ensure!(
            signed_header.header.validators_hash == trusted_consensus_state.next_validators_hash,
            TendermintClientError::TrustedSetMismatch
        );
    }
    let trusted_set = resolve_trusted_validators(header, trusted_consensus_state, options)?;

    let (signed, trusted) = tally_commit(
        signed_header,
        &header.validator_set,
        trusted_set,
        options.max_total_voting_power,
    )?;

    signed.check_met(client_state.trust_level)?;
    if adjacent {
        trusted.check_exceeded(options.adjacent_trust_threshold)?;
    } else {
        trusted.check_met(client_state.trust_level)?;
        signed.check_exceeded(TrustThreshold::TWO_THIRDS)?;
    }

    tracing::debug!(
        %height,
        %trusted_height,
        adjacent,
        %signed,
        %trusted,
        "header verified"
    );

    Ok(VerifiedHeader {
        height,
        adjacent,
        signed,
        trusted,
    })
}

/// Checks the header time against the trusted state and the host clock.
/// # Errors
/// Returns [`TendermintClientError::ExpiredOrFutureHeader`] if the header is
/// not after the trusted time, falls outside the trusting period, is too far
/// ahead of `now`, or the trusted state itself has expired. A window end past
/// year 9999 is treated as a violation.
pub fn verify_time(
    client_state: &ClientState,
    trusted_consensus_state: &ConsensusState,
    header_time: Timestamp,
    now: Timestamp,
) -> Result<(), TendermintClientError> {
    let trusted_time = trusted_consensus_state.timestamp;
    ensure!(
        header_time > trusted_time,
        TendermintClientError::ExpiredOrFutureHeader {
            reason: format!("header time {header_time} is not after trusted time {trusted_time}"),
        }
    );

    let expiry = trusted_time
        .checked_add(client_state.trusting_period)
        .ok_or_else(|| TendermintClientError::ExpiredOrFutureHeader {
            reason: format!("trusting period from {trusted_time} ends past the last timestamp"),
        })?;
    ensure!(
        header_time < expiry,
        TendermintClientError::ExpiredOrFutureHeader {
            reason: format!(
                "header time {header_time} is outside the trusting period ending {expiry}"
            ),
        }
    );
    ensure!(
        client_state.allow_update_after_expiry || now < expiry,
        TendermintClientError::ExpiredOrFutureHeader {
            reason: format!("trusted consensus state expired at {expiry}, now is {now}"),
        }
    );

    let latest_allowed = now.checked_add(client_state.max_clock_drift).ok_or_else(|| {
        TendermintClientError::ExpiredOrFutureHeader {
            reason: format!("max clock drift from {now} ends past the last timestamp"),
        }
    })?;
    ensure!(
        header_time < latest_allowed,
        TendermintClientError::ExpiredOrFutureHeader {
            reason: format!("header time {header_time} is beyond the max clock drift from {now}"),
        }
    );
    Ok(())
}

/// Resolves the validator set trusted at the header's trusted height.
///
/// A full set must hash to the trusted `next_validators_hash`. Without a full
/// set the header's own set must hash to it, so the overlap arithmetic still
/// runs over real validators.
fn resolve_trusted_validators<'a>(
    header: &'a Header,
    trusted_consensus_state: &ConsensusState,
    options: &Options,
) -> Result<&'a ValidatorSet, TendermintClientError> {
    let expected = trusted_consensus_state.next_validators_hash;
    match &header.trusted_validators {
        TrustedValidators::Full(set) => {
            ensure!(
                set.hash()? == expected,
                TendermintClientError::TrustedSetMismatch
            );
            set.validate(options.max_total_voting_power)?;
            Ok(set)
        }
        TrustedValidators::HashOnly { hash } => {
            if let Some(hash) = hash {
                ensure!(*hash == expected, TendermintClientError::TrustedSetMismatch);
            }
            ensure!(
                header.validator_set.hash()? == expected,
                TendermintClientError::TrustedSetMismatch
            );
            Ok(&header.validator_set)
        }
    }
}

/// Tallies the commit's verified signatures against the new set and against
/// the trusted set.
///
/// Signatures that are well formed but do not verify are left out. Malformed
/// keys or signatures, unknown signers and repeated signers reject the commit.
fn tally_commit(
    signed_header: &SignedHeader,
    validator_set: &ValidatorSet,
    trusted_set: &ValidatorSet,
    bound: u64,
) -> Result<(VotingPowerTally, VotingPowerTally), TendermintClientError> {
    let mut signed = VotingPowerTally::new(validator_set.total_voting_power_bounded(bound)?);
    let mut trusted = VotingPowerTally::new(trusted_set.total_voting_power_bounded(bound)?);
    let mut seen = HashSet::new();

    let commit = &signed_header.commit;
    for (index, commit_sig) in commit.signatures.iter().enumerate() {
        let CommitSig::Commit {
            validator_address,
            signature,
            ..
        } = commit_sig
        else {
            continue;
        };

        ensure!(
            seen.insert(*validator_address),
            TendermintClientError::InvalidCommit {
                reason: format!("validator {} signed twice", hex::encode(validator_address)),
            }
        );
        let (_, validator) = validator_set.get_by_address(validator_address).ok_or_else(|| {
            TendermintClientError::InvalidCommit {
                reason: format!(
                    "signer {} is not in the validator set",
                    hex::encode(validator_address)
                ),
            }
        })?;

        let sign_bytes = commit.vote_sign_bytes(&signed_header.header.chain_id, index)?;
        if !validator.pub_key.verify(&sign_bytes, signature)? {
            tracing::debug!(
                index,
                validator = %hex::encode(validator_address),
                "excluding signature that does not verify"
            );
            continue;
        }

        signed.tally(validator.voting_power, bound)?;
        if let Some((_, trusted_validator)) = trusted_set.get_by_address(validator_address) {
            if trusted_validator.pub_key == validator.pub_key {
                trusted.tally(trusted_validator.voting_power, bound)?;
            }
        }
    }
    Ok((signed, trusted))
}
