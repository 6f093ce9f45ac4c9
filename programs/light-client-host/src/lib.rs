#![doc = "Host-side glue for the tendermint light client: a registry of client types, per-client state storage and the create, update and query entry points."]
#![deny(
    clippy::nursery,
    clippy::pedantic,
    warnings,
    missing_docs,
    unused_crate_dependencies
)]

#[cfg(test)]
use rstest as _;

pub mod context;
pub mod contract;
pub mod error;
pub mod instantiate;
pub mod query;
pub mod registry;
pub mod state;
pub mod sudo;

pub use error::HostError;
