//! This module defines [`TendermintClientError`] and [`DecodingError`].

use thiserror::Error;

use crate::types::Height;

/// Errors raised while turning wire bytes into verified domain types.
///
/// Decoding always happens before any verification logic runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub enum DecodingError {
    /// Protobuf decoding failed
    #[error("protobuf decoding failed: {0}")]
    Protobuf(String),

    /// The envelope carries a type url other than the expected one
    #[error("unexpected type url, expected ({expected}) but found ({found})")]
    UnexpectedTypeUrl {
        /// Expected type url
        expected: String,
        /// Found type url
        found: String,
    },

    /// A required field is absent
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// A fixed size byte field has the wrong length
    #[error("invalid length for `{field}`, expected {expected} but found {found}")]
    InvalidLength {
        /// Field name
        field: &'static str,
        /// Expected length
        expected: usize,
        /// Found length
        found: usize,
    },

    /// A signed integer field holds a value outside its domain
    #[error("field `{field}` is out of range: {value}")]
    OutOfRange {
        /// Field name
        field: &'static str,
        /// Offending value
        value: i64,
    },

    /// A timestamp falls outside years 1 to 9999
    #[error("timestamp {unix_nanos}ns from the unix epoch is outside years 1 to 9999")]
    InvalidTimestamp {
        /// Offending instant in nanoseconds since the unix epoch
        unix_nanos: i128,
    },

    /// A timestamp string is not RFC 3339
    #[error("invalid RFC 3339 timestamp: {0}")]
    InvalidTimestampFormat(String),

    /// The public key variant is not set
    #[error("public key has no key type set")]
    UnknownPublicKeyType,

    /// The block id flag of a commit signature is unknown
    #[error("unknown block id flag {0}")]
    UnknownBlockIdFlag(i32),
}

impl From<prost::DecodeError> for DecodingError {
    fn from(err: prost::DecodeError) -> Self {
        Self::Protobuf(err.to_string())
    }
}

/// Error types for the tendermint light client
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub enum TendermintClientError {
    /// Malformed wire input
    #[error("decoding failed: {0}")]
    Decoding(#[from] DecodingError),

    /// A value does not fit the signed integer of its wire encoding
    #[error("field `{field}` value {value} does not fit in an int64")]
    EncodingOutOfRange {
        /// Field name
        field: &'static str,
        /// Offending value
        value: u64,
    },

    /// The verification options are unsafe or malformed
    #[error("invalid options: {reason}")]
    InvalidOptions {
        /// Reason for error
        reason: String,
    },

    /// The header disagrees with its own validator set or commit
    #[error("header is not self consistent: {reason}")]
    SelfInconsistentHeader {
        /// Reason for error
        reason: String,
    },

    /// The supplied trusted validators do not hash to the trusted state
    #[error("trusted validator set does not match the trusted consensus state")]
    TrustedSetMismatch,

    /// Not enough voting power signed the header
    #[error(
        "insufficient voting power: tallied {tallied} of total {total}, \
        required {numerator}/{denominator}"
    )]
    InsufficientVotingPower {
        /// Voting power of verified signers
        tallied: u64,
        /// Total voting power of the set
        total: u64,
        /// Threshold numerator
        numerator: u64,
        /// Threshold denominator
        denominator: u64,
    },

    /// The header time is outside the window allowed by the client
    #[error("header is expired or in the future: {reason}")]
    ExpiredOrFutureHeader {
        /// Reason for error
        reason: String,
    },

    /// The header does not advance past the trusted height
    #[error("header height {new} must be greater than trusted height {trusted}")]
    NonMonotonicHeight {
        /// Trusted height
        trusted: Height,
        /// New height
        new: Height,
    },

    /// A public key has the wrong length or encoding for its scheme
    #[error("invalid public key format: {reason}")]
    InvalidPublicKeyFormat {
        /// Reason for error
        reason: String,
    },

    /// A signature has the wrong length or encoding for its scheme
    #[error("invalid signature format: {reason}")]
    InvalidSignatureFormat {
        /// Reason for error
        reason: String,
    },

    /// Aggregate voting power exceeds the safety bound
    #[error("voting power overflow, bound is {bound}")]
    Overflow {
        /// The bound that was exceeded
        bound: u64,
    },

    /// The validator set lists the same address twice
    #[error("duplicate validator address {address:02x?}")]
    DuplicateValidator {
        /// Duplicated address
        address: [u8; 20],
    },

    /// A stored validator address does not match its public key
    #[error("validator {index} address does not match its public key")]
    AddressMismatch {
        /// Index of the validator
        index: usize,
    },

    /// Index outside the validator set
    #[error("validator index {index} out of range for a set of {len}")]
    ValidatorIndexOutOfRange {
        /// Requested index
        index: usize,
        /// Set length
        len: usize,
    },

    /// The header belongs to another chain
    #[error("chain id mismatch, expected ({expected}) but found ({found})")]
    ChainIdMismatch {
        /// Client chain id
        expected: String,
        /// Header chain id
        found: String,
    },

    /// The commit is structurally invalid
    #[error("invalid commit: {reason}")]
    InvalidCommit {
        /// Reason for error
        reason: String,
    },

    /// The misbehaviour evidence does not prove a fork
    #[error("invalid misbehaviour: {reason}")]
    InvalidMisbehaviour {
        /// Reason for error
        reason: String,
    },

    /// No consensus state is stored at the trusted height
    #[error("unknown trusted height {0}")]
    UnknownTrustedHeight(Height),

    /// No consensus state is stored at the requested height
    #[error("consensus state not found at height {0}")]
    ConsensusStateNotFound(Height),

    /// The client is frozen
    #[error("client is frozen")]
    ClientFrozen,

    /// The client state violates an invariant
    #[error("invalid client state: {reason}")]
    InvalidClientState {
        /// Reason for error
        reason: String,
    },
}
