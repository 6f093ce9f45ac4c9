//! Verifier-wide configuration shared by every client of one host.

use serde::{Deserialize, Serialize};
use tm_light_client_utils::ensure;

use crate::{
    error::TendermintClientError, types::TrustThreshold, validator_set::MAX_TOTAL_VOTING_POWER,
};

/// The client type this crate registers under by default
pub const TENDERMINT_CLIENT_TYPE: &str = "07-tendermint";

/// Verifier options. Per-client parameters live in the client state.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Options {
    /// Bound on the total voting power of any validator set
    #[serde(with = "tm_light_client_utils::serde::number_as_string")]
    pub max_total_voting_power: u64,
    /// Fraction of the trusted set that must sign an adjacent header, compared
    /// strictly
    pub adjacent_trust_threshold: TrustThreshold,
    /// Client type identifier, the prefix of every client id
    pub client_type: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_total_voting_power: MAX_TOTAL_VOTING_POWER,
            adjacent_trust_threshold: TrustThreshold::TWO_THIRDS,
            client_type: TENDERMINT_CLIENT_TYPE.to_string(),
        }
    }
}

impl Options {
    /// Loads options from JSON. Missing fields take their default.
    /// # Errors
    /// Returns an error if the JSON is malformed or the options are unsafe.
    pub fn from_json(json: &str) -> Result<Self, TendermintClientError> {
        let options: Self =
            serde_json::from_str(json).map_err(|err| TendermintClientError::InvalidOptions {
                reason: err.to_string(),
            })?;
        options.validate()?;
        Ok(options)
    }

    /// Checks that the options cannot weaken verification.
    ///
    /// The adjacent threshold must lie in `[2/3, 1]`, and the voting power
    /// bound in `1..=MAX_TOTAL_VOTING_POWER` so that threshold arithmetic
    /// stays exact.
    /// # Errors
    /// Returns [`TendermintClientError::InvalidOptions`] naming the first
    /// violated constraint.
    pub fn validate(&self) -> Result<(), TendermintClientError> {
        let threshold = self.adjacent_trust_threshold;
        ensure!(
            threshold.denominator != 0
                && u128::from(threshold.numerator) * 3 >= u128::from(threshold.denominator) * 2
                && threshold.numerator <= threshold.denominator,
            TendermintClientError::InvalidOptions {
                reason: format!("adjacent trust threshold {threshold} is outside [2/3, 1]"),
            }
        );
        ensure!(
            (1..=MAX_TOTAL_VOTING_POWER).contains(&self.max_total_voting_power),
            TendermintClientError::InvalidOptions {
                reason: format!(
                    "max total voting power {} is outside 1..={MAX_TOTAL_VOTING_POWER}",
                    self.max_total_voting_power
                ),
            }
        );
        ensure!(
            !self.client_type.is_empty(),
            TendermintClientError::InvalidOptions {
                reason: "client type is empty".into(),
            }
        );
        Ok(())
    }
}
