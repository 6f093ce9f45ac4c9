//! This module defines the client [`Status`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{client_state::ClientState, consensus_state::ConsensusState, types::Timestamp};

/// Whether a client can currently be updated
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// The client accepts updates
    Active,
    /// Misbehaviour was detected
    Frozen,
    /// The latest consensus state is older than the trusting period
    Expired,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Frozen => write!(f, "Frozen"),
            Self::Expired => write!(f, "Expired"),
        }
    }
}

/// Computes the status of a client from its state and the consensus state
/// at its latest height. A missing latest consensus state counts as expired,
/// as does a trusting period ending past year 9999.
#[must_use]
pub fn status(
    client_state: &ClientState,
    latest_consensus_state: Option<&ConsensusState>,
    now: Timestamp,
) -> Status {
    if client_state.is_frozen() {
        return Status::Frozen;
    }
    let Some(latest) = latest_consensus_state else {
        return Status::Expired;
    };
    match latest.timestamp.checked_add(client_state.trusting_period) {
        Some(expiry) if now < expiry => Status::Active,
        _ => Status::Expired,
    }
}
