//! Test utilities for the tendermint light client: deterministic validator
//! keys and a chain that produces signed headers.

#[cfg(any(test, feature = "test-utils"))]
pub use fixtures::*;

#[allow(
    missing_docs,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::cast_possible_truncation
)]
#[cfg(any(test, feature = "test-utils"))]
mod fixtures {
    use std::time::Duration;

    use ed25519_dalek::Signer as _;
    use sha2::{Digest, Sha256};

    use crate::{
        block::{BlockHeader, BlockId, Commit, CommitSig, PartSetHeader, SignedHeader, Version},
        client_state::ClientState,
        consensus_state::ConsensusState,
        crypto::{KeyScheme, PublicKey},
        header::{Header, TrustedValidators},
        types::{Address, Height, Timestamp, TrustThreshold},
        validator_set::{Validator, ValidatorSet},
    };

    pub const TRUSTING_PERIOD: Duration = Duration::from_secs(14 * 24 * 60 * 60);
    pub const UNBONDING_PERIOD: Duration = Duration::from_secs(21 * 24 * 60 * 60);
    pub const MAX_CLOCK_DRIFT: Duration = Duration::from_secs(10);

    /// A timestamp at whole unix `seconds`.
    pub fn timestamp(seconds: i64) -> Timestamp {
        Timestamp::new(seconds, 0).expect("timestamp in range")
    }

    enum SigningKey {
        Ed25519(ed25519_dalek::SigningKey),
        Secp256k1(k256::ecdsa::SigningKey),
    }

    /// A disposable validator whose key is derived from a seed.
    pub struct TestValidator {
        key: SigningKey,
        pub voting_power: u64,
    }

    impl TestValidator {
        pub fn new(seed: u8, scheme: KeyScheme, voting_power: u64) -> Self {
            let secret: [u8; 32] = Sha256::new()
                .chain_update(b"test validator")
                .chain_update([seed, scheme as u8])
                .finalize()
                .into();
            let key = match scheme {
                KeyScheme::Ed25519 => {
                    SigningKey::Ed25519(ed25519_dalek::SigningKey::from_bytes(&secret))
                }
                KeyScheme::Secp256k1 => SigningKey::Secp256k1(
                    k256::ecdsa::SigningKey::from_slice(&secret).expect("valid secp256k1 key"),
                ),
            };
            Self { key, voting_power }
        }

        pub fn public_key(&self) -> PublicKey {
            match &self.key {
                SigningKey::Ed25519(key) => {
                    PublicKey::Ed25519(key.verifying_key().to_bytes().to_vec())
                }
                SigningKey::Secp256k1(key) => PublicKey::Secp256k1(
                    key.verifying_key()
                        .to_encoded_point(true)
                        .as_bytes()
                        .to_vec(),
                ),
            }
        }

        pub fn address(&self) -> Address {
            self.public_key().derive_address().expect("valid key")
        }

        pub fn validator(&self) -> Validator {
            Validator::new(self.public_key(), self.voting_power).expect("valid key")
        }

        pub fn sign(&self, msg: &[u8]) -> Vec<u8> {
            match &self.key {
                SigningKey::Ed25519(key) => key.sign(msg).to_bytes().to_vec(),
                SigningKey::Secp256k1(key) => {
                    let signature: k256::ecdsa::Signature = key.sign(msg);
                    signature.to_bytes().to_vec()
                }
            }
        }
    }

    /// A chain with a fixed validator set that signs whatever headers it builds.
    pub struct TestChain {
        pub chain_id: String,
        pub validators: Vec<TestValidator>,
    }

    impl TestChain {
        /// Creates a chain whose validators are seeded `1..=n`.
        pub fn new(chain_id: &str, validators: &[(KeyScheme, u64)]) -> Self {
            Self::with_seed_offset(chain_id, 0, validators)
        }

        /// Creates a chain whose validators are seeded from `offset + 1`, so
        /// that chains with different offsets share no validators.
        pub fn with_seed_offset(chain_id: &str, offset: u8, validators: &[(KeyScheme, u64)]) -> Self {
            let validators = validators
                .iter()
                .enumerate()
                .map(|(i, (scheme, power))| TestValidator::new(offset + i as u8 + 1, *scheme, *power))
                .collect();
            Self {
                chain_id: chain_id.to_string(),
                validators,
            }
        }

        /// Creates a chain from explicit validators.
        pub fn from_validators(chain_id: &str, validators: Vec<TestValidator>) -> Self {
            Self {
                chain_id: chain_id.to_string(),
                validators,
            }
        }

        pub fn validator_set(&self) -> ValidatorSet {
            ValidatorSet::new(self.validators.iter().map(TestValidator::validator).collect())
        }

        /// An unsigned header at `height`, with this chain's set as both the
        /// current and the next validator set.
        pub fn header(&self, height: u64, time: i64) -> BlockHeader {
            let validators_hash = self.validator_set().hash().expect("encodable set");
            BlockHeader {
                version: Version { block: 11, app: 0 },
                chain_id: self.chain_id.clone(),
                height,
                time: timestamp(time),
                last_block_id: BlockId::default(),
                last_commit_hash: Sha256::digest(b"last commit").to_vec(),
                data_hash: Sha256::digest(b"data").to_vec(),
                validators_hash,
                next_validators_hash: validators_hash,
                consensus_hash: Sha256::digest(b"consensus params").to_vec(),
                app_hash: Sha256::digest(height.to_be_bytes()).to_vec(),
                last_results_hash: Vec::new(),
                evidence_hash: Sha256::digest(b"").to_vec(),
                proposer_address: self.validators[0].address(),
            }
        }

        /// The consensus state a client would hold after verifying `header(height, time)`.
        pub fn consensus_state(&self, height: u64, time: i64) -> ConsensusState {
            ConsensusState::from(&self.header(height, time))
        }

        /// Signs `header` with the validators at `signers`. Everyone else is absent.
        pub fn sign(&self, header: BlockHeader, signers: &[usize]) -> SignedHeader {
            let block_id = BlockId {
                hash: header.hash().expect("encodable header").to_vec(),
                part_set_header: PartSetHeader {
                    total: 1,
                    hash: Sha256::digest(b"parts").to_vec(),
                },
            };
            let mut commit = Commit {
                height: header.height,
                round: 0,
                block_id,
                signatures: vec![CommitSig::Absent; self.validators.len()],
            };
            for &index in signers {
                commit.signatures[index] = CommitSig::Commit {
                    validator_address: self.validators[index].address(),
                    timestamp: header.time,
                    signature: Vec::new(),
                };
                let sign_bytes = commit
                    .vote_sign_bytes(&header.chain_id, index)
                    .expect("commit vote");
                if let CommitSig::Commit { signature, .. } = &mut commit.signatures[index] {
                    *signature = self.validators[index].sign(&sign_bytes);
                }
            }
            SignedHeader { header, commit }
        }

        /// Signs `header` with every validator.
        pub fn sign_all(&self, header: BlockHeader) -> SignedHeader {
            let signers: Vec<usize> = (0..self.validators.len()).collect();
            self.sign(header, &signers)
        }

        /// An update message for `height` signed by every validator, trusting
        /// this chain's own set at `trusted_height`.
        pub fn update_header(&self, trusted_height: Height, height: u64, time: i64) -> Header {
            Header {
                signed_header: self.sign_all(self.header(height, time)),
                validator_set: self.validator_set(),
                trusted_height,
                trusted_validators: TrustedValidators::Full(self.validator_set()),
            }
        }

        /// A fresh client for this chain at `latest_height`.
        pub fn client_state(&self, latest_height: Height) -> ClientState {
            ClientState {
                chain_id: self.chain_id.clone(),
                trust_level: TrustThreshold::new(1, 2),
                trusting_period: TRUSTING_PERIOD,
                unbonding_period: UNBONDING_PERIOD,
                max_clock_drift: MAX_CLOCK_DRIFT,
                frozen_height: Height::default(),
                latest_height,
                allow_update_after_expiry: false,
                allow_update_after_misbehaviour: false,
            }
        }
    }
}
