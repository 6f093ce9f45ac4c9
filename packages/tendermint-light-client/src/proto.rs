//! Protobuf wire messages for the tendermint light client.
//!
//! These mirror `tendermint.light` and the canonical `tendermint.types`
//! messages. Domain types convert from them with `TryFrom`, validating
//! lengths and ranges on the way in.

#![allow(missing_docs, clippy::derive_partial_eq_without_eq)]

use ibc_proto::google::protobuf::Any;
use prost::{Message, Name};

use crate::error::DecodingError;

const PACKAGE: &str = "tendermint.types";

/// Type url of an encoded [`ClientState`]
pub const CLIENT_STATE_TYPE_URL: &str = "/tendermint.types.ClientState";
/// Type url of an encoded [`ConsensusState`]
pub const CONSENSUS_STATE_TYPE_URL: &str = "/tendermint.types.ConsensusState";
/// Type url of an encoded [`TmHeader`]
pub const HEADER_TYPE_URL: &str = "/tendermint.types.TmHeader";
/// Type url of an encoded [`Misbehaviour`]
pub const MISBEHAVIOUR_TYPE_URL: &str = "/tendermint.types.Misbehaviour";

/// Wraps a message into an encoded `google.protobuf.Any` tagged with its type url.
pub fn encode_any<M: Name>(msg: &M) -> Vec<u8> {
    Any {
        type_url: M::type_url(),
        value: msg.encode_to_vec(),
    }
    .encode_to_vec()
}

/// Decodes an encoded `google.protobuf.Any` and its payload, checking the type url.
/// # Errors
/// Returns an error if either layer fails to decode or the type url differs.
pub fn decode_any<M: Name + Default>(bytes: &[u8]) -> Result<M, DecodingError> {
    let any = Any::decode(bytes)?;
    let expected = M::type_url();
    if any.type_url != expected {
        return Err(DecodingError::UnexpectedTypeUrl {
            expected,
            found: any.type_url,
        });
    }
    Ok(M::decode(any.value.as_slice())?)
}

#[derive(Clone, PartialEq, Message)]
pub struct Fraction {
    #[prost(uint64, tag = "1")]
    pub numerator: u64,
    #[prost(uint64, tag = "2")]
    pub denominator: u64,
}

#[derive(Clone, PartialEq, Message)]
pub struct Duration {
    #[prost(int64, tag = "1")]
    pub seconds: i64,
    #[prost(int32, tag = "2")]
    pub nanos: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct Timestamp {
    #[prost(int64, tag = "1")]
    pub seconds: i64,
    #[prost(int32, tag = "2")]
    pub nanos: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct Height {
    #[prost(uint64, tag = "1")]
    pub revision_number: u64,
    #[prost(uint64, tag = "2")]
    pub revision_height: u64,
}

#[derive(Clone, PartialEq, Message)]
pub struct ClientState {
    #[prost(string, tag = "1")]
    pub chain_id: String,
    #[prost(message, optional, tag = "2")]
    pub trust_level: Option<Fraction>,
    #[prost(message, optional, tag = "3")]
    pub trusting_period: Option<Duration>,
    #[prost(message, optional, tag = "4")]
    pub unbonding_period: Option<Duration>,
    #[prost(message, optional, tag = "5")]
    pub max_clock_drift: Option<Duration>,
    #[prost(message, optional, tag = "6")]
    pub frozen_height: Option<Height>,
    #[prost(message, optional, tag = "7")]
    pub latest_height: Option<Height>,
    #[prost(bool, tag = "8")]
    pub allow_update_after_expiry: bool,
    #[prost(bool, tag = "9")]
    pub allow_update_after_misbehaviour: bool,
}

impl Name for ClientState {
    const NAME: &'static str = "ClientState";
    const PACKAGE: &'static str = PACKAGE;

    fn type_url() -> String {
        CLIENT_STATE_TYPE_URL.to_string()
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct ConsensusState {
    #[prost(message, optional, tag = "1")]
    pub timestamp: Option<Timestamp>,
    #[prost(bytes = "vec", tag = "2")]
    pub root: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub next_validators_hash: Vec<u8>,
}

impl Name for ConsensusState {
    const NAME: &'static str = "ConsensusState";
    const PACKAGE: &'static str = PACKAGE;

    fn type_url() -> String {
        CONSENSUS_STATE_TYPE_URL.to_string()
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct PublicKey {
    #[prost(oneof = "public_key::Sum", tags = "1, 2")]
    pub sum: Option<public_key::Sum>,
}

pub mod public_key {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Sum {
        #[prost(bytes, tag = "1")]
        Ed25519(Vec<u8>),
        #[prost(bytes, tag = "2")]
        Secp256k1(Vec<u8>),
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct Validator {
    #[prost(bytes = "vec", tag = "1")]
    pub address: Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub pub_key: Option<PublicKey>,
    #[prost(int64, tag = "3")]
    pub voting_power: i64,
    #[prost(int64, tag = "4")]
    pub proposer_priority: i64,
}

/// The validator leaf hashed into a validator-set root.
#[derive(Clone, PartialEq, Message)]
pub struct SimpleValidator {
    #[prost(message, optional, tag = "1")]
    pub pub_key: Option<PublicKey>,
    #[prost(int64, tag = "2")]
    pub voting_power: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct ValidatorSet {
    #[prost(message, repeated, tag = "1")]
    pub validators: Vec<Validator>,
    #[prost(message, optional, tag = "2")]
    pub proposer: Option<Validator>,
    #[prost(int64, tag = "3")]
    pub total_voting_power: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct PartSetHeader {
    #[prost(uint32, tag = "1")]
    pub total: u32,
    #[prost(bytes = "vec", tag = "2")]
    pub hash: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct BlockId {
    #[prost(bytes = "vec", tag = "1")]
    pub hash: Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub part_set_header: Option<PartSetHeader>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Consensus {
    #[prost(uint64, tag = "1")]
    pub block: u64,
    #[prost(uint64, tag = "2")]
    pub app: u64,
}

#[derive(Clone, PartialEq, Message)]
pub struct LightHeader {
    #[prost(message, optional, tag = "1")]
    pub version: Option<Consensus>,
    #[prost(string, tag = "2")]
    pub chain_id: String,
    #[prost(int64, tag = "3")]
    pub height: i64,
    #[prost(message, optional, tag = "4")]
    pub time: Option<Timestamp>,
    #[prost(message, optional, tag = "5")]
    pub last_block_id: Option<BlockId>,
    #[prost(bytes = "vec", tag = "6")]
    pub last_commit_hash: Vec<u8>,
    #[prost(bytes = "vec", tag = "7")]
    pub data_hash: Vec<u8>,
    #[prost(bytes = "vec", tag = "8")]
    pub validators_hash: Vec<u8>,
    #[prost(bytes = "vec", tag = "9")]
    pub next_validators_hash: Vec<u8>,
    #[prost(bytes = "vec", tag = "10")]
    pub consensus_hash: Vec<u8>,
    #[prost(bytes = "vec", tag = "11")]
    pub app_hash: Vec<u8>,
    #[prost(bytes = "vec", tag = "12")]
    pub last_results_hash: Vec<u8>,
    #[prost(bytes = "vec", tag = "13")]
    pub evidence_hash: Vec<u8>,
    #[prost(bytes = "vec", tag = "14")]
    pub proposer_address: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum BlockIdFlag {
    Unknown = 0,
    Absent = 1,
    Commit = 2,
    Nil = 3,
}

#[derive(Clone, PartialEq, Message)]
pub struct CommitSig {
    #[prost(enumeration = "BlockIdFlag", tag = "1")]
    pub block_id_flag: i32,
    #[prost(bytes = "vec", tag = "2")]
    pub validator_address: Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub timestamp: Option<Timestamp>,
    #[prost(bytes = "vec", tag = "4")]
    pub signature: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Commit {
    #[prost(int64, tag = "1")]
    pub height: i64,
    #[prost(int32, tag = "2")]
    pub round: i32,
    #[prost(message, optional, tag = "3")]
    pub block_id: Option<BlockId>,
    #[prost(message, repeated, tag = "4")]
    pub signatures: Vec<CommitSig>,
}

#[derive(Clone, PartialEq, Message)]
pub struct SignedHeader {
    #[prost(message, optional, tag = "1")]
    pub header: Option<LightHeader>,
    #[prost(message, optional, tag = "2")]
    pub commit: Option<Commit>,
}

/// The update message submitted to `UpdateClient`.
///
/// An empty `trusted_validators` list selects hash-only mode, optionally
/// pinned to `trusted_validators_hash`.
#[derive(Clone, PartialEq, Message)]
pub struct TmHeader {
    #[prost(message, optional, tag = "1")]
    pub signed_header: Option<SignedHeader>,
    #[prost(message, optional, tag = "2")]
    pub validator_set: Option<ValidatorSet>,
    #[prost(message, optional, tag = "3")]
    pub trusted_height: Option<Height>,
    #[prost(message, optional, tag = "4")]
    pub trusted_validators: Option<ValidatorSet>,
    #[prost(bytes = "vec", tag = "5")]
    pub trusted_validators_hash: Vec<u8>,
}

impl Name for TmHeader {
    const NAME: &'static str = "TmHeader";
    const PACKAGE: &'static str = PACKAGE;

    fn type_url() -> String {
        HEADER_TYPE_URL.to_string()
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct Misbehaviour {
    #[prost(message, optional, tag = "1")]
    pub header_1: Option<TmHeader>,
    #[prost(message, optional, tag = "2")]
    pub header_2: Option<TmHeader>,
}

impl Name for Misbehaviour {
    const NAME: &'static str = "Misbehaviour";
    const PACKAGE: &'static str = PACKAGE;

    fn type_url() -> String {
        MISBEHAVIOUR_TYPE_URL.to_string()
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct CanonicalPartSetHeader {
    #[prost(uint32, tag = "1")]
    pub total: u32,
    #[prost(bytes = "vec", tag = "2")]
    pub hash: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct CanonicalBlockId {
    #[prost(bytes = "vec", tag = "1")]
    pub hash: Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub part_set_header: Option<CanonicalPartSetHeader>,
}

/// `SignedMsgType::Precommit`
pub const PRECOMMIT_TYPE: i32 = 2;

/// The bytes every commit signature is computed over (length-delimited).
#[derive(Clone, PartialEq, Message)]
pub struct CanonicalVote {
    #[prost(int32, tag = "1")]
    pub r#type: i32,
    #[prost(sfixed64, tag = "2")]
    pub height: i64,
    #[prost(sfixed64, tag = "3")]
    pub round: i64,
    #[prost(message, optional, tag = "4")]
    pub block_id: Option<CanonicalBlockId>,
    #[prost(message, optional, tag = "5")]
    pub timestamp: Option<Timestamp>,
    #[prost(string, tag = "6")]
    pub chain_id: String,
}

/// `google.protobuf.StringValue`, used for header field leaves.
#[derive(Clone, PartialEq, Message)]
pub struct StringValue {
    #[prost(string, tag = "1")]
    pub value: String,
}

/// `google.protobuf.Int64Value`, used for header field leaves.
#[derive(Clone, PartialEq, Message)]
pub struct Int64Value {
    #[prost(int64, tag = "1")]
    pub value: i64,
}

/// `google.protobuf.BytesValue`, used for header field leaves.
#[derive(Clone, PartialEq, Message)]
pub struct BytesValue {
    #[prost(bytes = "vec", tag = "1")]
    pub value: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_urls_follow_the_package() {
        assert_eq!(ClientState::type_url(), CLIENT_STATE_TYPE_URL);
        assert_eq!(ClientState::full_name(), "tendermint.types.ClientState");
        assert_eq!(ConsensusState::type_url(), CONSENSUS_STATE_TYPE_URL);
        assert_eq!(TmHeader::type_url(), HEADER_TYPE_URL);
        assert_eq!(Misbehaviour::type_url(), MISBEHAVIOUR_TYPE_URL);
    }

    #[test]
    fn decode_any_rejects_unexpected_type_url() {
        let bz = encode_any(&TmHeader::default());

        let err = decode_any::<ClientState>(&bz).unwrap_err();
        assert_eq!(
            err,
            DecodingError::UnexpectedTypeUrl {
                expected: CLIENT_STATE_TYPE_URL.to_string(),
                found: HEADER_TYPE_URL.to_string(),
            }
        );
    }

    #[test]
    fn decode_any_rejects_garbage() {
        let err = decode_any::<ClientState>(&[0xff, 0xff, 0xff]).unwrap_err();
        assert!(matches!(err, DecodingError::Protobuf(_)));
    }

    #[test]
    fn encode_any_is_a_google_protobuf_any() {
        let consensus_state = ConsensusState {
            timestamp: Some(Timestamp {
                seconds: 7,
                nanos: 0,
            }),
            root: vec![1; 32],
            next_validators_hash: vec![2; 32],
        };
        let bz = encode_any(&consensus_state);

        let any = Any::decode(bz.as_slice()).unwrap();
        assert_eq!(any.type_url, CONSENSUS_STATE_TYPE_URL);
        assert_eq!(any.value, consensus_state.encode_to_vec());
        assert_eq!(decode_any::<ConsensusState>(&bz).unwrap(), consensus_state);
    }
}
