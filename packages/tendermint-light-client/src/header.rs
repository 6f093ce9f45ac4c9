//! This module defines the update message [`Header`] and the [`Misbehaviour`]
//! evidence built from two of them.

use serde::{Deserialize, Serialize};

use crate::{
    block::SignedHeader,
    error::{DecodingError, TendermintClientError},
    proto,
    types::{hash_from_bytes, Hash, Height},
    validator_set::ValidatorSet,
};

/// How the submitter identifies the validator set trusted at `trusted_height`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrustedValidators {
    /// The full trusted set, checked against the stored hash
    Full(ValidatorSet),
    /// No list is supplied. The new header's own set must hash to the stored
    /// `next_validators_hash`, and `hash`, when present, must equal it too.
    HashOnly {
        /// Optional reference to the trusted set's root
        hash: Option<Hash>,
    },
}

/// The update message: a signed header, the set that signed it, and a
/// reference to the trusted state it is verified against.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Header {
    /// The new header and its commit
    pub signed_header: SignedHeader,
    /// The validator set at the new height
    pub validator_set: ValidatorSet,
    /// Height of the trusted consensus state
    pub trusted_height: Height,
    /// The validators trusted at `trusted_height`
    pub trusted_validators: TrustedValidators,
}

impl Header {
    /// The height of the new header, in the trusted height's revision
    #[must_use]
    pub const fn height(&self) -> Height {
        Height::new(
            self.trusted_height.revision_number,
            self.signed_header.header.height,
        )
    }
}

impl TryFrom<proto::TmHeader> for Header {
    type Error = DecodingError;

    fn try_from(value: proto::TmHeader) -> Result<Self, Self::Error> {
        let trusted_validators = match value.trusted_validators {
            Some(set) if !set.validators.is_empty() => TrustedValidators::Full(set.try_into()?),
            _ if value.trusted_validators_hash.is_empty() => {
                TrustedValidators::HashOnly { hash: None }
            }
            _ => TrustedValidators::HashOnly {
                hash: Some(hash_from_bytes(
                    "trusted_validators_hash",
                    value.trusted_validators_hash,
                )?),
            },
        };

        Ok(Self {
            signed_header: value
                .signed_header
                .ok_or(DecodingError::MissingField("signed_header"))?
                .try_into()?,
            validator_set: value
                .validator_set
                .ok_or(DecodingError::MissingField("validator_set"))?
                .try_into()?,
            trusted_height: value
                .trusted_height
                .ok_or(DecodingError::MissingField("trusted_height"))?
                .into(),
            trusted_validators,
        })
    }
}

impl TryFrom<Header> for proto::TmHeader {
    type Error = TendermintClientError;

    fn try_from(value: Header) -> Result<Self, Self::Error> {
        let (trusted_validators, trusted_validators_hash) = match value.trusted_validators {
            TrustedValidators::Full(set) => (Some(set.try_into()?), Vec::new()),
            TrustedValidators::HashOnly { hash } => {
                (None, hash.map(|h| h.to_vec()).unwrap_or_default())
            }
        };
        Ok(Self {
            signed_header: Some(value.signed_header.try_into()?),
            validator_set: Some(value.validator_set.try_into()?),
            trusted_height: Some(value.trusted_height.into()),
            trusted_validators,
            trusted_validators_hash,
        })
    }
}

/// Two headers that cannot both be honest
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Misbehaviour {
    /// The first header, whose height the client freezes at
    pub header_1: Header,
    /// The conflicting header
    pub header_2: Header,
}

impl TryFrom<proto::Misbehaviour> for Misbehaviour {
    type Error = DecodingError;

    fn try_from(value: proto::Misbehaviour) -> Result<Self, Self::Error> {
        Ok(Self {
            header_1: value
                .header_1
                .ok_or(DecodingError::MissingField("header_1"))?
                .try_into()?,
            header_2: value
                .header_2
                .ok_or(DecodingError::MissingField("header_2"))?
                .try_into()?,
        })
    }
}

impl TryFrom<Misbehaviour> for proto::Misbehaviour {
    type Error = TendermintClientError;

    fn try_from(value: Misbehaviour) -> Result<Self, Self::Error> {
        Ok(Self {
            header_1: Some(value.header_1.try_into()?),
            header_2: Some(value.header_2.try_into()?),
        })
    }
}
