//! This module defines [`Validator`] and [`ValidatorSet`]: address derivation
//! checks, lookup by address, voting-power aggregation and the validator-set
//! Merkle root.

use std::collections::HashSet;

use prost::Message;
use serde::{Deserialize, Serialize};
use tm_light_client_utils::ensure;

use crate::{
    crypto::PublicKey,
    error::{DecodingError, TendermintClientError},
    merkle, proto,
    types::{to_wire_int64, Address, Hash},
};

/// Upper bound on the total voting power of a set, `i64::MAX / 8`, so that
/// threshold arithmetic can never overflow.
#[allow(clippy::cast_sign_loss)]
pub const MAX_TOTAL_VOTING_POWER: u64 = (i64::MAX / 8) as u64;

/// A consensus participant
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Validator {
    /// Address derived from `pub_key`
    #[serde(with = "tm_light_client_utils::serde::hex_array")]
    pub address: Address,
    /// Scheme-tagged public key
    pub pub_key: PublicKey,
    /// Voting power
    pub voting_power: u64,
}

impl Validator {
    /// Creates a validator, deriving its address from `pub_key`.
    /// # Errors
    /// Returns an error if the key is malformed for its scheme.
    pub fn new(pub_key: PublicKey, voting_power: u64) -> Result<Self, TendermintClientError> {
        Ok(Self {
            address: pub_key.derive_address()?,
            pub_key,
            voting_power,
        })
    }

    /// The canonical leaf encoding: `SimpleValidator { pub_key, voting_power }`
    /// # Errors
    /// Returns [`TendermintClientError::EncodingOutOfRange`] if the voting power
    /// does not fit an `int64`.
    pub fn hash_bytes(&self) -> Result<Vec<u8>, TendermintClientError> {
        Ok(proto::SimpleValidator {
            pub_key: Some(self.pub_key.clone().into()),
            voting_power: to_wire_int64("validator.voting_power", self.voting_power)?,
        }
        .encode_to_vec())
    }
}

impl TryFrom<proto::Validator> for Validator {
    type Error = DecodingError;

    fn try_from(value: proto::Validator) -> Result<Self, Self::Error> {
        let found = value.address.len();
        let address = value
            .address
            .try_into()
            .map_err(|_| DecodingError::InvalidLength {
                field: "validator.address",
                expected: 20,
                found,
            })?;
        let pub_key = value
            .pub_key
            .ok_or(DecodingError::MissingField("validator.pub_key"))?
            .try_into()?;
        let voting_power =
            u64::try_from(value.voting_power).map_err(|_| DecodingError::OutOfRange {
                field: "validator.voting_power",
                value: value.voting_power,
            })?;
        Ok(Self {
            address,
            pub_key,
            voting_power,
        })
    }
}

impl TryFrom<Validator> for proto::Validator {
    type Error = TendermintClientError;

    fn try_from(value: Validator) -> Result<Self, Self::Error> {
        Ok(Self {
            address: value.address.to_vec(),
            voting_power: to_wire_int64("validator.voting_power", value.voting_power)?,
            pub_key: Some(value.pub_key.into()),
            proposer_priority: 0,
        })
    }
}

/// An ordered validator set. Order is significant for the Merkle root.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidatorSet {
    /// Validators in canonical order
    pub validators: Vec<Validator>,
}

impl ValidatorSet {
    /// Creates a new validator set
    #[must_use]
    pub const fn new(validators: Vec<Validator>) -> Self {
        Self { validators }
    }

    /// Number of validators
    #[must_use]
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Whether the set has no validators
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Merkle root over the canonical validator leaves
    /// # Errors
    /// Returns [`TendermintClientError::EncodingOutOfRange`] if a voting power
    /// does not fit an `int64`.
    pub fn hash(&self) -> Result<Hash, TendermintClientError> {
        let leaves = self
            .validators
            .iter()
            .map(Validator::hash_bytes)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(merkle::compute_root(&leaves))
    }

    /// Finds a validator by address, returning its index alongside it.
    #[must_use]
    pub fn get_by_address(&self, address: &Address) -> Option<(usize, &Validator)> {
        self.validators
            .iter()
            .enumerate()
            .find(|(_, v)| &v.address == address)
    }

    /// The address of validator `index`, checked against its public key.
    /// # Errors
    /// Returns an error if `index` is out of range, the key is malformed, or the
    /// stored address disagrees with the derived one.
    pub fn get_address(&self, index: usize) -> Result<Address, TendermintClientError> {
        let validator =
            self.validators
                .get(index)
                .ok_or(TendermintClientError::ValidatorIndexOutOfRange {
                    index,
                    len: self.validators.len(),
                })?;
        let derived = validator.pub_key.derive_address()?;
        ensure!(
            derived == validator.address,
            TendermintClientError::AddressMismatch { index }
        );
        Ok(derived)
    }

    /// Total voting power, bounded by [`MAX_TOTAL_VOTING_POWER`].
    /// # Errors
    /// Returns [`TendermintClientError::Overflow`] if the sum exceeds the bound.
    pub fn total_voting_power(&self) -> Result<u64, TendermintClientError> {
        self.total_voting_power_bounded(MAX_TOTAL_VOTING_POWER)
    }

    /// Total voting power, bounded by `bound`.
    /// # Errors
    /// Returns [`TendermintClientError::Overflow`] if the sum exceeds `bound`.
    pub fn total_voting_power_bounded(&self, bound: u64) -> Result<u64, TendermintClientError> {
        self.validators
            .iter()
            .try_fold(0u64, |total, v| {
                total.checked_add(v.voting_power).filter(|sum| *sum <= bound)
            })
            .ok_or(TendermintClientError::Overflow { bound })
    }

    /// Checks the structural invariants of the set: it is non-empty, every
    /// stored address matches its key, no address repeats, and the total power
    /// is within `bound`.
    /// # Errors
    /// Returns the first violated invariant.
    pub fn validate(&self, bound: u64) -> Result<(), TendermintClientError> {
        ensure!(
            !self.is_empty(),
            TendermintClientError::SelfInconsistentHeader {
                reason: "validator set is empty".into(),
            }
        );
        let mut seen = HashSet::with_capacity(self.len());
        for index in 0..self.len() {
            let address = self.get_address(index)?;
            ensure!(
                seen.insert(address),
                TendermintClientError::DuplicateValidator { address }
            );
        }
        let total = self.total_voting_power_bounded(bound)?;
        ensure!(
            total > 0,
            TendermintClientError::SelfInconsistentHeader {
                reason: "validator set has no voting power".into(),
            }
        );
        Ok(())
    }
}

impl TryFrom<proto::ValidatorSet> for ValidatorSet {
    type Error = DecodingError;

    fn try_from(value: proto::ValidatorSet) -> Result<Self, Self::Error> {
        let validators = value
            .validators
            .into_iter()
            .map(Validator::try_from)
            .collect::<Result<_, _>>()?;
        Ok(Self { validators })
    }
}

impl TryFrom<ValidatorSet> for proto::ValidatorSet {
    type Error = TendermintClientError;

    fn try_from(value: ValidatorSet) -> Result<Self, Self::Error> {
        let total_voting_power = to_wire_int64(
            "validator_set.total_voting_power",
            value.total_voting_power_bounded(u64::MAX)?,
        )?;
        Ok(Self {
            validators: value
                .validators
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<_, _>>()?,
            proposer: None,
            total_voting_power,
        })
    }
}
