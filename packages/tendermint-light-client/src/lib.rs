#![doc = "Tendermint light client verifier: canonical header and validator-set hashing, commit signature verification and the create/update state machine."]
#![deny(
    clippy::nursery,
    clippy::pedantic,
    warnings,
    missing_docs,
    unused_crate_dependencies
)]

#[cfg(test)]
use rstest as _;

pub mod block;
pub mod client_state;
pub mod consensus_state;
pub mod create;
pub mod crypto;
pub mod error;
pub mod header;
pub mod merkle;
pub mod misbehaviour;
pub mod options;
pub mod proto;
pub mod status;
pub mod types;
pub mod update;
pub mod validator_set;
pub mod verify;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
