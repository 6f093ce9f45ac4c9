//! Signature verification for the two key schemes tendermint validators use.
//!
//! Both schemes separate malformed input (wrong key or signature length,
//! points off the curve) from a well-formed signature that does not verify:
//! the former is an error, the latter is `Ok(false)`.

use ed25519_dalek::Verifier as _;
use k256::ecdsa::RecoveryId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sha3::Keccak256;

use crate::{
    error::{DecodingError, TendermintClientError},
    proto,
    types::Address,
};

/// Length of a raw ed25519 public key
pub const ED25519_PUBKEY_LENGTH: usize = 32;
/// Length of a compressed secp256k1 public key
pub const SECP256K1_PUBKEY_LENGTH: usize = 33;
/// Length of an `r || s` signature in either scheme
pub const SIGNATURE_LENGTH: usize = 64;
/// Length of an `r || s || v` recoverable secp256k1 signature
pub const RECOVERABLE_SIGNATURE_LENGTH: usize = 65;

/// Key scheme of a validator public key
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum KeyScheme {
    /// Edwards-curve signatures
    Ed25519,
    /// ECDSA over secp256k1 with SHA-256 message digests
    Secp256k1,
}

/// A validator public key tagged with its scheme.
///
/// Key bytes are kept as received; their length and encoding are checked by
/// the scheme's verifier so that a key paired with the wrong scheme surfaces
/// as [`TendermintClientError::InvalidPublicKeyFormat`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PublicKey {
    /// 32 byte ed25519 key
    Ed25519(#[serde(with = "tm_light_client_utils::serde::hex_bytes")] Vec<u8>),
    /// 33 byte compressed secp256k1 key
    Secp256k1(#[serde(with = "tm_light_client_utils::serde::hex_bytes")] Vec<u8>),
}

impl PublicKey {
    /// The scheme this key is tagged with
    #[must_use]
    pub const fn scheme(&self) -> KeyScheme {
        match self {
            Self::Ed25519(_) => KeyScheme::Ed25519,
            Self::Secp256k1(_) => KeyScheme::Secp256k1,
        }
    }

    /// The raw key bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Ed25519(bytes) | Self::Secp256k1(bytes) => bytes,
        }
    }

    /// Derives the validator address of this key.
    /// # Errors
    /// Returns an error if the key is malformed for its scheme.
    pub fn derive_address(&self) -> Result<Address, TendermintClientError> {
        derive_address(self.as_bytes(), self.scheme())
    }

    /// Verifies `signature` over `msg` with this key.
    /// # Errors
    /// Returns an error if the key or signature is malformed.
    pub fn verify(&self, msg: &[u8], signature: &[u8]) -> Result<bool, TendermintClientError> {
        verifier_for(self.scheme()).verify(msg, self.as_bytes(), signature)
    }
}

impl TryFrom<proto::PublicKey> for PublicKey {
    type Error = DecodingError;

    fn try_from(value: proto::PublicKey) -> Result<Self, Self::Error> {
        match value.sum {
            Some(proto::public_key::Sum::Ed25519(key)) => Ok(Self::Ed25519(key)),
            Some(proto::public_key::Sum::Secp256k1(key)) => Ok(Self::Secp256k1(key)),
            None => Err(DecodingError::UnknownPublicKeyType),
        }
    }
}

impl From<PublicKey> for proto::PublicKey {
    fn from(value: PublicKey) -> Self {
        let sum = match value {
            PublicKey::Ed25519(key) => proto::public_key::Sum::Ed25519(key),
            PublicKey::Secp256k1(key) => proto::public_key::Sum::Secp256k1(key),
        };
        Self { sum: Some(sum) }
    }
}

/// A signature scheme able to check a signature against a raw public key.
pub trait SignatureVerifier {
    /// Verifies `signature` over `msg` with the raw `pubkey`.
    ///
    /// Returns `Ok(false)` for a well-formed signature that does not verify.
    /// # Errors
    /// Returns [`TendermintClientError::InvalidPublicKeyFormat`] or
    /// [`TendermintClientError::InvalidSignatureFormat`] for malformed input.
    fn verify(&self, msg: &[u8], pubkey: &[u8], signature: &[u8])
        -> Result<bool, TendermintClientError>;
}

/// Returns the verifier for `scheme`
#[must_use]
pub fn verifier_for(scheme: KeyScheme) -> &'static dyn SignatureVerifier {
    match scheme {
        KeyScheme::Ed25519 => &Ed25519Verifier,
        KeyScheme::Secp256k1 => &Secp256k1Verifier,
    }
}

/// Derives a 20 byte validator address from a raw public key.
///
/// - ed25519: the first 20 bytes of `SHA256(pubkey)`
/// - secp256k1: the last 20 bytes of `Keccak256` over the uncompressed point
///   without its `0x04` prefix, the same address [`Secp256k1Verifier::recover`]
///   yields
///
/// # Errors
/// Returns an error if the key is malformed for its scheme.
pub fn derive_address(pubkey: &[u8], scheme: KeyScheme) -> Result<Address, TendermintClientError> {
    let mut address = [0u8; 20];
    match scheme {
        KeyScheme::Ed25519 => {
            ed25519_key(pubkey)?;
            address.copy_from_slice(&Sha256::digest(pubkey)[..20]);
        }
        KeyScheme::Secp256k1 => {
            let uncompressed = Secp256k1Verifier::serialize_pubkey(pubkey)?;
            address = keccak_address(&uncompressed);
        }
    }
    Ok(address)
}

fn keccak_address(uncompressed: &[u8; 65]) -> Address {
    let hash = Keccak256::digest(&uncompressed[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

fn ed25519_key(pubkey: &[u8]) -> Result<ed25519_dalek::VerifyingKey, TendermintClientError> {
    let bytes: &[u8; ED25519_PUBKEY_LENGTH] =
        pubkey
            .try_into()
            .map_err(|_| TendermintClientError::InvalidPublicKeyFormat {
                reason: format!(
                    "ed25519 key must be {ED25519_PUBKEY_LENGTH} bytes, found {}",
                    pubkey.len()
                ),
            })?;
    ed25519_dalek::VerifyingKey::from_bytes(bytes).map_err(|e| {
        TendermintClientError::InvalidPublicKeyFormat {
            reason: format!("ed25519 key is not a curve point: {e}"),
        }
    })
}

/// EdDSA over Curve25519. There is no key recovery: the public key must be
/// supplied and matched against the claimed validator address.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(
        &self,
        msg: &[u8],
        pubkey: &[u8],
        signature: &[u8],
    ) -> Result<bool, TendermintClientError> {
        let key = ed25519_key(pubkey)?;
        let signature = ed25519_dalek::Signature::from_slice(signature).map_err(|_| {
            TendermintClientError::InvalidSignatureFormat {
                reason: format!(
                    "ed25519 signature must be {SIGNATURE_LENGTH} bytes, found {}",
                    signature.len()
                ),
            }
        })?;
        Ok(key.verify(msg, &signature).is_ok())
    }
}

/// ECDSA over secp256k1, with messages digested by SHA-256.
#[derive(Clone, Copy, Debug, Default)]
pub struct Secp256k1Verifier;

impl Secp256k1Verifier {
    /// Decompresses a 33 byte SEC1 key into its 65 byte uncompressed form.
    ///
    /// Only the `0x02`/`0x03` parity prefixes are accepted.
    /// # Errors
    /// Returns [`TendermintClientError::InvalidPublicKeyFormat`] for any other
    /// length or prefix, or when the x coordinate is not on the curve.
    pub fn serialize_pubkey(pubkey: &[u8]) -> Result<[u8; 65], TendermintClientError> {
        Ok(uncompressed(&secp256k1_key(pubkey)?))
    }

    /// Recovers the signer address from a signature and its recovery id.
    ///
    /// `recovery_id` may be given as `0`/`1` or in the `27`/`28` form.
    /// # Errors
    /// Returns an error if the signature or recovery id is malformed, or no key
    /// can be recovered.
    pub fn recover(
        msg: &[u8],
        signature: &[u8],
        recovery_id: u8,
    ) -> Result<Address, TendermintClientError> {
        let signature = secp256k1_signature(signature)?;
        let recovery_id = RecoveryId::from_byte(normalize_recovery_id(recovery_id))
            .ok_or_else(|| TendermintClientError::InvalidSignatureFormat {
                reason: format!("invalid recovery id {recovery_id}"),
            })?;
        let key = k256::ecdsa::VerifyingKey::recover_from_msg(msg, &signature, recovery_id)
            .map_err(|e| TendermintClientError::InvalidSignatureFormat {
                reason: format!("public key recovery failed: {e}"),
            })?;
        Ok(keccak_address(&uncompressed(&key)))
    }
}

impl SignatureVerifier for Secp256k1Verifier {
    fn verify(
        &self,
        msg: &[u8],
        pubkey: &[u8],
        signature: &[u8],
    ) -> Result<bool, TendermintClientError> {
        let key = secp256k1_key(pubkey)?;
        let signature = secp256k1_signature(signature)?;
        Ok(key.verify(msg, &signature).is_ok())
    }
}

const fn normalize_recovery_id(v: u8) -> u8 {
    match v {
        27 | 28 => v - 27,
        _ => v,
    }
}

fn secp256k1_key(pubkey: &[u8]) -> Result<k256::ecdsa::VerifyingKey, TendermintClientError> {
    if pubkey.len() != SECP256K1_PUBKEY_LENGTH || !matches!(pubkey[0], 0x02 | 0x03) {
        return Err(TendermintClientError::InvalidPublicKeyFormat {
            reason: "secp256k1 key must be compressed (33 bytes, 0x02/0x03 prefix)".into(),
        });
    }
    k256::ecdsa::VerifyingKey::from_sec1_bytes(pubkey).map_err(|_| {
        TendermintClientError::InvalidPublicKeyFormat {
            reason: "secp256k1 key is not a curve point".into(),
        }
    })
}

fn secp256k1_signature(signature: &[u8]) -> Result<k256::ecdsa::Signature, TendermintClientError> {
    let rs = match signature.len() {
        SIGNATURE_LENGTH | RECOVERABLE_SIGNATURE_LENGTH => &signature[..SIGNATURE_LENGTH],
        found => {
            return Err(TendermintClientError::InvalidSignatureFormat {
                reason: format!(
                    "secp256k1 signature must be {SIGNATURE_LENGTH} or \
                    {RECOVERABLE_SIGNATURE_LENGTH} bytes, found {found}"
                ),
            })
        }
    };
    k256::ecdsa::Signature::from_slice(rs).map_err(|e| {
        TendermintClientError::InvalidSignatureFormat {
            reason: format!("secp256k1 signature scalars out of range: {e}"),
        }
    })
}

fn uncompressed(key: &k256::ecdsa::VerifyingKey) -> [u8; 65] {
    let point = key.to_encoded_point(false);
    let mut bytes = [0u8; 65];
    bytes.copy_from_slice(point.as_bytes());
    bytes
}
