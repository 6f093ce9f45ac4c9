//! Block header and commit types, the canonical header hash and the vote
//! bytes commit signatures are computed over.

use prost::Message;
use serde::{Deserialize, Serialize};
use tm_light_client_utils::ensure;

use crate::{
    error::{DecodingError, TendermintClientError},
    merkle, proto,
    types::{hash_from_bytes, optional_hash, to_wire_int64, Address, Hash, Timestamp},
};

/// Protocol versions of a block
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Version {
    /// Block protocol version
    pub block: u64,
    /// Application protocol version
    pub app: u64,
}

/// Header of the set of block parts
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct PartSetHeader {
    /// Number of parts
    pub total: u32,
    /// Merkle root of the parts, empty for the zero block id
    #[serde(with = "tm_light_client_utils::serde::hex_bytes")]
    pub hash: Vec<u8>,
}

/// Identifies a block by its header hash and part set
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockId {
    /// Header hash, empty for the zero block id
    #[serde(with = "tm_light_client_utils::serde::hex_bytes")]
    pub hash: Vec<u8>,
    /// Part set header
    pub part_set_header: PartSetHeader,
}

impl BlockId {
    fn to_proto(&self) -> proto::BlockId {
        proto::BlockId {
            hash: self.hash.clone(),
            part_set_header: Some(proto::PartSetHeader {
                total: self.part_set_header.total,
                hash: self.part_set_header.hash.clone(),
            }),
        }
    }

    fn to_canonical(&self) -> proto::CanonicalBlockId {
        proto::CanonicalBlockId {
            hash: self.hash.clone(),
            part_set_header: Some(proto::CanonicalPartSetHeader {
                total: self.part_set_header.total,
                hash: self.part_set_header.hash.clone(),
            }),
        }
    }
}

impl TryFrom<proto::BlockId> for BlockId {
    type Error = DecodingError;

    fn try_from(value: proto::BlockId) -> Result<Self, Self::Error> {
        let psh = value.part_set_header.unwrap_or_default();
        Ok(Self {
            hash: optional_hash("block_id.hash", value.hash)?,
            part_set_header: PartSetHeader {
                total: psh.total,
                hash: optional_hash("block_id.part_set_header.hash", psh.hash)?,
            },
        })
    }
}

/// The header fields of a block, in canonical order
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BlockHeader {
    /// Protocol versions
    pub version: Version,
    /// Chain identifier
    pub chain_id: String,
    /// Block height
    pub height: u64,
    /// Block time
    pub time: Timestamp,
    /// Id of the previous block
    pub last_block_id: BlockId,
    /// Hash of the previous block's commit
    #[serde(with = "tm_light_client_utils::serde::hex_bytes")]
    pub last_commit_hash: Vec<u8>,
    /// Hash of the block's transactions
    #[serde(with = "tm_light_client_utils::serde::hex_bytes")]
    pub data_hash: Vec<u8>,
    /// Root of the validator set that signs this block
    #[serde(with = "tm_light_client_utils::serde::hex_array")]
    pub validators_hash: Hash,
    /// Root of the validator set that signs the next block
    #[serde(with = "tm_light_client_utils::serde::hex_array")]
    pub next_validators_hash: Hash,
    /// Hash of the consensus parameters
    #[serde(with = "tm_light_client_utils::serde::hex_bytes")]
    pub consensus_hash: Vec<u8>,
    /// Application state root after the previous block
    #[serde(with = "tm_light_client_utils::serde::hex_bytes")]
    pub app_hash: Vec<u8>,
    /// Hash of the previous block's results
    #[serde(with = "tm_light_client_utils::serde::hex_bytes")]
    pub last_results_hash: Vec<u8>,
    /// Hash of the evidence included in the block
    #[serde(with = "tm_light_client_utils::serde::hex_bytes")]
    pub evidence_hash: Vec<u8>,
    /// Address of the block proposer
    #[serde(with = "tm_light_client_utils::serde::hex_array")]
    pub proposer_address: Address,
}

impl BlockHeader {
    /// The canonical block hash: the Merkle root over the fourteen header
    /// fields, each wrapped in its protobuf encoding.
    ///
    /// This is the hash a commit's block id must carry, so every commit
    /// signature is bound to it.
    /// # Errors
    /// Returns [`TendermintClientError::EncodingOutOfRange`] if the height does
    /// not fit an `int64`.
    pub fn hash(&self) -> Result<Hash, TendermintClientError> {
        Ok(merkle::compute_root(&self.field_leaves()?))
    }

    fn field_leaves(&self) -> Result<[Vec<u8>; 14], TendermintClientError> {
        let bytes = |value: &[u8]| {
            proto::BytesValue {
                value: value.to_vec(),
            }
            .encode_to_vec()
        };
        Ok([
            proto::Consensus {
                block: self.version.block,
                app: self.version.app,
            }
            .encode_to_vec(),
            proto::StringValue {
                value: self.chain_id.clone(),
            }
            .encode_to_vec(),
            proto::Int64Value {
                value: to_wire_int64("header.height", self.height)?,
            }
            .encode_to_vec(),
            proto::Timestamp::from(self.time).encode_to_vec(),
            self.last_block_id.to_proto().encode_to_vec(),
            bytes(&self.last_commit_hash),
            bytes(&self.data_hash),
            bytes(&self.validators_hash),
            bytes(&self.next_validators_hash),
            bytes(&self.consensus_hash),
            bytes(&self.app_hash),
            bytes(&self.last_results_hash),
            bytes(&self.evidence_hash),
            bytes(&self.proposer_address),
        ])
    }
}

impl TryFrom<proto::LightHeader> for BlockHeader {
    type Error = DecodingError;

    fn try_from(value: proto::LightHeader) -> Result<Self, Self::Error> {
        let version = value.version.unwrap_or_default();
        let height = u64::try_from(value.height)
            .ok()
            .filter(|h| *h > 0)
            .ok_or(DecodingError::OutOfRange {
                field: "header.height",
                value: value.height,
            })?;
        let found = value.proposer_address.len();
        let proposer_address =
            value
                .proposer_address
                .try_into()
                .map_err(|_| DecodingError::InvalidLength {
                    field: "header.proposer_address",
                    expected: 20,
                    found,
                })?;
        Ok(Self {
            version: Version {
                block: version.block,
                app: version.app,
            },
            chain_id: value.chain_id,
            height,
            time: value
                .time
                .ok_or(DecodingError::MissingField("header.time"))?
                .try_into()?,
            last_block_id: value
                .last_block_id
                .map(BlockId::try_from)
                .transpose()?
                .unwrap_or_default(),
            last_commit_hash: optional_hash("header.last_commit_hash", value.last_commit_hash)?,
            data_hash: optional_hash("header.data_hash", value.data_hash)?,
            validators_hash: hash_from_bytes("header.validators_hash", value.validators_hash)?,
            next_validators_hash: hash_from_bytes(
                "header.next_validators_hash",
                value.next_validators_hash,
            )?,
            consensus_hash: optional_hash("header.consensus_hash", value.consensus_hash)?,
            app_hash: value.app_hash,
            last_results_hash: optional_hash("header.last_results_hash", value.last_results_hash)?,
            evidence_hash: optional_hash("header.evidence_hash", value.evidence_hash)?,
            proposer_address,
        })
    }
}

/// A validator's entry in a commit, by block id flag
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "block_id_flag", rename_all = "snake_case")]
pub enum CommitSig {
    /// The validator did not vote
    Absent,
    /// The validator voted for the committed block
    Commit {
        /// Address of the signer
        #[serde(with = "tm_light_client_utils::serde::hex_array")]
        validator_address: Address,
        /// Vote time
        timestamp: Timestamp,
        /// Signature over the vote sign bytes
        #[serde(with = "tm_light_client_utils::serde::hex_bytes")]
        signature: Vec<u8>,
    },
    /// The validator voted for nil
    Nil {
        /// Address of the signer
        #[serde(with = "tm_light_client_utils::serde::hex_array")]
        validator_address: Address,
        /// Vote time
        timestamp: Timestamp,
        /// Signature over the nil vote
        #[serde(with = "tm_light_client_utils::serde::hex_bytes")]
        signature: Vec<u8>,
    },
}

impl CommitSig {
    /// The signer address, if the validator voted
    #[must_use]
    pub const fn validator_address(&self) -> Option<&Address> {
        match self {
            Self::Absent => None,
            Self::Commit {
                validator_address, ..
            }
            | Self::Nil {
                validator_address, ..
            } => Some(validator_address),
        }
    }
}

impl TryFrom<proto::CommitSig> for CommitSig {
    type Error = DecodingError;

    fn try_from(value: proto::CommitSig) -> Result<Self, Self::Error> {
        let flag = proto::BlockIdFlag::try_from(value.block_id_flag)
            .map_err(|_| DecodingError::UnknownBlockIdFlag(value.block_id_flag))?;
        match flag {
            proto::BlockIdFlag::Absent => return Ok(Self::Absent),
            proto::BlockIdFlag::Unknown => {
                return Err(DecodingError::UnknownBlockIdFlag(value.block_id_flag))
            }
            proto::BlockIdFlag::Commit | proto::BlockIdFlag::Nil => {}
        }

        let found = value.validator_address.len();
        let validator_address =
            value
                .validator_address
                .try_into()
                .map_err(|_| DecodingError::InvalidLength {
                    field: "commit_sig.validator_address",
                    expected: 20,
                    found,
                })?;
        let timestamp = value
            .timestamp
            .ok_or(DecodingError::MissingField("commit_sig.timestamp"))?
            .try_into()?;
        let signature = value.signature;

        match flag {
            proto::BlockIdFlag::Commit => Ok(Self::Commit {
                validator_address,
                timestamp,
                signature,
            }),
            proto::BlockIdFlag::Nil => Ok(Self::Nil {
                validator_address,
                timestamp,
                signature,
            }),
            proto::BlockIdFlag::Absent | proto::BlockIdFlag::Unknown => {
                Err(DecodingError::UnknownBlockIdFlag(value.block_id_flag))
            }
        }
    }
}

/// The precommits for a block
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Commit {
    /// Height of the committed block
    pub height: u64,
    /// Consensus round the block was committed in
    pub round: u32,
    /// Id of the committed block
    pub block_id: BlockId,
    /// One entry per validator, in validator-set order
    pub signatures: Vec<CommitSig>,
}

impl Commit {
    /// The length-delimited `CanonicalVote` that signature `index` was
    /// computed over.
    /// # Errors
    /// Returns [`TendermintClientError::InvalidCommit`] if `index` is out of
    /// range or the entry is not a vote for the committed block.
    pub fn vote_sign_bytes(
        &self,
        chain_id: &str,
        index: usize,
    ) -> Result<Vec<u8>, TendermintClientError> {
        let Some(CommitSig::Commit { timestamp, .. }) = self.signatures.get(index) else {
            return Err(TendermintClientError::InvalidCommit {
                reason: format!("signature {index} is not a vote for the committed block"),
            });
        };
        let vote = proto::CanonicalVote {
            r#type: proto::PRECOMMIT_TYPE,
            height: to_wire_int64("commit.height", self.height)?,
            round: i64::from(self.round),
            block_id: Some(self.block_id.to_canonical()),
            timestamp: Some((*timestamp).into()),
            chain_id: chain_id.to_string(),
        };
        Ok(vote.encode_length_delimited_to_vec())
    }
}

impl TryFrom<proto::Commit> for Commit {
    type Error = DecodingError;

    fn try_from(value: proto::Commit) -> Result<Self, Self::Error> {
        let height = u64::try_from(value.height)
            .ok()
            .filter(|h| *h > 0)
            .ok_or(DecodingError::OutOfRange {
                field: "commit.height",
                value: value.height,
            })?;
        let round = u32::try_from(value.round).map_err(|_| DecodingError::OutOfRange {
            field: "commit.round",
            value: value.round.into(),
        })?;
        Ok(Self {
            height,
            round,
            block_id: value
                .block_id
                .ok_or(DecodingError::MissingField("commit.block_id"))?
                .try_into()?,
            signatures: value
                .signatures
                .into_iter()
                .map(CommitSig::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

/// A header together with the commit that signs it
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SignedHeader {
    /// The block header
    pub header: BlockHeader,
    /// The commit for the header
    pub commit: Commit,
}

impl SignedHeader {
    /// The canonical hash of the header
    /// # Errors
    /// Returns an error if the header cannot be encoded.
    pub fn hash(&self) -> Result<Hash, TendermintClientError> {
        self.header.hash()
    }

    /// Checks that the commit is for this header: same height and a block
    /// id carrying this header's hash.
    /// # Errors
    /// Returns [`TendermintClientError::InvalidCommit`] otherwise.
    pub fn validate_basic(&self) -> Result<(), TendermintClientError> {
        ensure!(
            self.commit.height == self.header.height,
            TendermintClientError::InvalidCommit {
                reason: format!(
                    "commit height {} does not match header height {}",
                    self.commit.height, self.header.height
                ),
            }
        );
        ensure!(
            self.commit.block_id.hash == self.hash()?,
            TendermintClientError::InvalidCommit {
                reason: "commit block id does not match the header hash".into(),
            }
        );
        Ok(())
    }
}

impl TryFrom<proto::SignedHeader> for SignedHeader {
    type Error = DecodingError;

    fn try_from(value: proto::SignedHeader) -> Result<Self, Self::Error> {
        Ok(Self {
            header: value
                .header
                .ok_or(DecodingError::MissingField("signed_header.header"))?
                .try_into()?,
            commit: value
                .commit
                .ok_or(DecodingError::MissingField("signed_header.commit"))?
                .try_into()?,
        })
    }
}

impl TryFrom<BlockHeader> for proto::LightHeader {
    type Error = TendermintClientError;

    fn try_from(value: BlockHeader) -> Result<Self, Self::Error> {
        Ok(Self {
            version: Some(proto::Consensus {
                block: value.version.block,
                app: value.version.app,
            }),
            chain_id: value.chain_id,
            height: to_wire_int64("header.height", value.height)?,
            time: Some(value.time.into()),
            last_block_id: Some(value.last_block_id.to_proto()),
            last_commit_hash: value.last_commit_hash,
            data_hash: value.data_hash,
            validators_hash: value.validators_hash.to_vec(),
            next_validators_hash: value.next_validators_hash.to_vec(),
            consensus_hash: value.consensus_hash,
            app_hash: value.app_hash,
            last_results_hash: value.last_results_hash,
            evidence_hash: value.evidence_hash,
            proposer_address: value.proposer_address.to_vec(),
        })
    }
}

impl From<CommitSig> for proto::CommitSig {
    fn from(value: CommitSig) -> Self {
        let (flag, validator_address, timestamp, signature) = match value {
            CommitSig::Absent => (proto::BlockIdFlag::Absent, None, None, Vec::new()),
            CommitSig::Commit {
                validator_address,
                timestamp,
                signature,
            } => (
                proto::BlockIdFlag::Commit,
                Some(validator_address),
                Some(timestamp),
                signature,
            ),
            CommitSig::Nil {
                validator_address,
                timestamp,
                signature,
            } => (
                proto::BlockIdFlag::Nil,
                Some(validator_address),
                Some(timestamp),
                signature,
            ),
        };
        Self {
            block_id_flag: flag.into(),
            validator_address: validator_address.map(|a| a.to_vec()).unwrap_or_default(),
            timestamp: timestamp.map(Into::into),
            signature,
        }
    }
}

impl TryFrom<Commit> for proto::Commit {
    type Error = TendermintClientError;

    fn try_from(value: Commit) -> Result<Self, Self::Error> {
        let round = i32::try_from(value.round).map_err(|_| {
            TendermintClientError::EncodingOutOfRange {
                field: "commit.round",
                value: value.round.into(),
            }
        })?;
        Ok(Self {
            height: to_wire_int64("commit.height", value.height)?,
            round,
            block_id: Some(value.block_id.to_proto()),
            signatures: value.signatures.into_iter().map(Into::into).collect(),
        })
    }
}

impl TryFrom<SignedHeader> for proto::SignedHeader {
    type Error = TendermintClientError;

    fn try_from(value: SignedHeader) -> Result<Self, Self::Error> {
        Ok(Self {
            header: Some(value.header.try_into()?),
            commit: Some(value.commit.try_into()?),
        })
    }
}

#[cfg(test)]
mod tests {
    use sha2::{Digest, Sha256};

    use super::*;
    use crate::crypto::PublicKey;

    const ED25519_PUBKEY: &str = "1361bf11753516e1c96d0ec78c59ba44964b4b28bbfe50242b6eced65420f9c8";
    const ED25519_MSG: &str = "6c080211ae0000000000000022480a201be10f1d98a078e24f7d153d435287f6c62dbbd84a1347e8d1779e6b90d9adc0122408011220be2920b8b9906102d29a0367c69e03d5f0082c49686f5c737fe02bd54ac69c842a0b0890dcb58b0610a883e33b3208776f726d686f6c65";
    const ED25519_SIG: &str = "22aa68771d6c00e322e6341e948f728bfe900423d2faed6f71a3c2e03af256524e213a9eef75f80e50406464d18b1e65c7b95819597123cab5ea8f6f2da8ba08";

    fn header() -> BlockHeader {
        BlockHeader {
            version: Version { block: 11, app: 0 },
            chain_id: "wormhole".to_string(),
            height: 174,
            time: Timestamp::new(1_634_561_552, 125_354_408).unwrap(),
            last_block_id: BlockId::default(),
            last_commit_hash: vec![1; 32],
            data_hash: vec![2; 32],
            validators_hash: [3; 32],
            next_validators_hash: [3; 32],
            consensus_hash: vec![4; 32],
            app_hash: vec![5; 32],
            last_results_hash: vec![],
            evidence_hash: vec![],
            proposer_address: [6; 20],
        }
    }

    #[test]
    fn vote_sign_bytes_match_a_signed_precommit() {
        let signature = hex::decode(ED25519_SIG).unwrap();
        let commit = Commit {
            height: 174,
            round: 0,
            block_id: BlockId {
                hash: hex::decode(
                    "1be10f1d98a078e24f7d153d435287f6c62dbbd84a1347e8d1779e6b90d9adc0",
                )
                .unwrap(),
                part_set_header: PartSetHeader {
                    total: 1,
                    hash: hex::decode(
                        "be2920b8b9906102d29a0367c69e03d5f0082c49686f5c737fe02bd54ac69c84",
                    )
                    .unwrap(),
                },
            },
            signatures: vec![CommitSig::Commit {
                validator_address: [0; 20],
                timestamp: Timestamp::new(1_634_561_552, 125_354_408).unwrap(),
                signature: signature.clone(),
            }],
        };

        let sign_bytes = commit.vote_sign_bytes("wormhole", 0).unwrap();
        assert_eq!(hex::encode(&sign_bytes), ED25519_MSG);

        let pubkey = PublicKey::Ed25519(hex::decode(ED25519_PUBKEY).unwrap());
        assert!(pubkey.verify(&sign_bytes, &signature).unwrap());
    }

    #[test]
    fn vote_sign_bytes_reject_non_commit_entries() {
        let commit = Commit {
            height: 1,
            round: 0,
            block_id: BlockId::default(),
            signatures: vec![CommitSig::Absent],
        };
        assert!(matches!(
            commit.vote_sign_bytes("chain", 0),
            Err(TendermintClientError::InvalidCommit { .. })
        ));
        assert!(matches!(
            commit.vote_sign_bytes("chain", 1),
            Err(TendermintClientError::InvalidCommit { .. })
        ));
    }

    fn sha256(data: &[u8]) -> Vec<u8> {
        Sha256::digest(data).to_vec()
    }

    #[test]
    fn header_hash_matches_cometbft_vector() {
        let header = BlockHeader {
            version: Version { block: 1, app: 2 },
            chain_id: "chainId".to_string(),
            height: 3,
            time: Timestamp::new(1_570_983_284, 0).unwrap(),
            last_block_id: BlockId {
                hash: vec![0; 32],
                part_set_header: PartSetHeader {
                    total: 6,
                    hash: vec![0; 32],
                },
            },
            last_commit_hash: sha256(b"last_commit_hash"),
            data_hash: sha256(b"data_hash"),
            validators_hash: Sha256::digest(b"validators_hash").into(),
            next_validators_hash: Sha256::digest(b"next_validators_hash").into(),
            consensus_hash: sha256(b"consensus_hash"),
            app_hash: sha256(b"app_hash"),
            last_results_hash: sha256(b"last_results_hash"),
            evidence_hash: sha256(b"evidence_hash"),
            proposer_address: sha256(b"proposer_address")[..20].try_into().unwrap(),
        };

        assert_eq!(
            hex::encode_upper(header.hash().unwrap()),
            "F740121F553B5418C3EFBD343C2DBFE9E007BB67B0D020A0741374BAB65242A4"
        );
    }

    #[test]
    fn header_field_leaves_use_wrapper_encodings() {
        let leaves = header().field_leaves().unwrap();

        // chain id leaf is a StringValue
        assert_eq!(leaves[1], [&[0x0a, 0x08][..], &b"wormhole"[..]].concat());
        // height leaf is an Int64Value
        assert_eq!(leaves[2], vec![0x08, 0xae, 0x01]);
        // empty hashes encode to empty leaves
        assert!(leaves[11].is_empty());
        // the zero block id still carries an empty part set header
        assert_eq!(leaves[4], vec![0x12, 0x00]);
    }

    #[test]
    fn height_above_int64_is_not_encoded() {
        let mut header = header();
        header.height = u64::MAX;
        let expected = TendermintClientError::EncodingOutOfRange {
            field: "header.height",
            value: u64::MAX,
        };
        assert_eq!(header.hash(), Err(expected.clone()));
        assert_eq!(proto::LightHeader::try_from(header), Err(expected));

        let commit = Commit {
            height: u64::MAX,
            round: 0,
            block_id: BlockId::default(),
            signatures: vec![CommitSig::Commit {
                validator_address: [0; 20],
                timestamp: Timestamp::new(1, 0).unwrap(),
                signature: vec![],
            }],
        };
        assert_eq!(
            commit.vote_sign_bytes("chain", 0),
            Err(TendermintClientError::EncodingOutOfRange {
                field: "commit.height",
                value: u64::MAX,
            })
        );

        let commit = Commit {
            height: 1,
            round: u32::MAX,
            ..commit
        };
        assert!(matches!(
            proto::Commit::try_from(commit),
            Err(TendermintClientError::EncodingOutOfRange {
                field: "commit.round",
                ..
            })
        ));
    }

    #[test]
    fn header_hash_commits_to_every_field() {
        let base = header().hash().unwrap();

        let mut changed = header();
        changed.app_hash[0] ^= 1;
        assert_ne!(changed.hash().unwrap(), base);

        let mut changed = header();
        changed.time = Timestamp::new(1_634_561_552, 125_354_409).unwrap();
        assert_ne!(changed.hash().unwrap(), base);

        let mut changed = header();
        changed.proposer_address[19] ^= 1;
        assert_ne!(changed.hash().unwrap(), base);
    }

    #[test]
    fn validate_basic_binds_commit_to_header() {
        let header = header();
        let mut signed = SignedHeader {
            commit: Commit {
                height: header.height,
                round: 0,
                block_id: BlockId {
                    hash: header.hash().unwrap().to_vec(),
                    part_set_header: PartSetHeader::default(),
                },
                signatures: vec![],
            },
            header,
        };
        assert!(signed.validate_basic().is_ok());

        signed.commit.height += 1;
        assert!(matches!(
            signed.validate_basic(),
            Err(TendermintClientError::InvalidCommit { .. })
        ));

        signed.commit.height -= 1;
        signed.header.chain_id = "other".to_string();
        assert!(matches!(
            signed.validate_basic(),
            Err(TendermintClientError::InvalidCommit { .. })
        ));
    }

    #[test]
    fn decoding_rejects_unknown_flags_and_bad_heights() {
        let sig = proto::CommitSig {
            block_id_flag: 7,
            ..Default::default()
        };
        assert_eq!(
            CommitSig::try_from(sig),
            Err(DecodingError::UnknownBlockIdFlag(7))
        );

        let absent = proto::CommitSig {
            block_id_flag: proto::BlockIdFlag::Absent as i32,
            ..Default::default()
        };
        assert_eq!(CommitSig::try_from(absent), Ok(CommitSig::Absent));

        let commit = proto::Commit {
            height: -1,
            ..Default::default()
        };
        assert!(matches!(
            Commit::try_from(commit),
            Err(DecodingError::OutOfRange { .. })
        ));
    }
}
