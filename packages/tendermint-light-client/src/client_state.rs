//! This module defines [`ClientState`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tm_light_client_utils::ensure;

use crate::{
    error::{DecodingError, TendermintClientError},
    proto,
    types::{duration_from_proto, duration_to_proto, Height, TrustThreshold},
};

/// The per-client configuration and progress of a tendermint light client
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ClientState {
    /// Chain id of the tracked chain
    pub chain_id: String,
    /// Fraction of trusted voting power required for skipping updates
    pub trust_level: TrustThreshold,
    /// How long a consensus state may be used to verify new headers
    pub trusting_period: Duration,
    /// Unbonding period of the tracked chain
    pub unbonding_period: Duration,
    /// Tolerated clock skew between the host and the tracked chain
    pub max_clock_drift: Duration,
    /// Height at which misbehaviour was detected, zero when not frozen
    pub frozen_height: Height,
    /// Latest verified height
    pub latest_height: Height,
    /// Whether updates may use an expired trusted consensus state
    pub allow_update_after_expiry: bool,
    /// Whether updates are accepted while frozen
    pub allow_update_after_misbehaviour: bool,
}

impl ClientState {
    /// Whether misbehaviour has been detected
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        !self.frozen_height.is_zero()
    }

    /// Returns a copy frozen at `height`
    #[must_use]
    pub fn frozen_at(&self, height: Height) -> Self {
        Self {
            frozen_height: height,
            ..self.clone()
        }
    }

    /// Checks the invariants a client must satisfy at creation.
    /// # Errors
    /// Returns [`TendermintClientError::InvalidClientState`] naming the first
    /// violated invariant.
    pub fn validate(&self) -> Result<(), TendermintClientError> {
        let invalid = |reason: &str| TendermintClientError::InvalidClientState {
            reason: reason.to_string(),
        };

        ensure!(!self.chain_id.trim().is_empty(), invalid("chain id is empty"));
        ensure!(
            self.trust_level.is_valid_trust_level(),
            TendermintClientError::InvalidClientState {
                reason: format!("trust level {} is not within (1/3, 1]", self.trust_level),
            }
        );
        ensure!(
            !self.trusting_period.is_zero(),
            invalid("trusting period must be positive")
        );
        ensure!(
            self.unbonding_period >= self.trusting_period,
            invalid("unbonding period must not be shorter than the trusting period")
        );
        ensure!(
            !self.is_frozen(),
            invalid("a new client must not be frozen")
        );
        ensure!(
            self.latest_height.revision_height > 0,
            invalid("latest height must be positive")
        );
        Ok(())
    }
}

impl TryFrom<proto::ClientState> for ClientState {
    type Error = DecodingError;

    fn try_from(value: proto::ClientState) -> Result<Self, Self::Error> {
        Ok(Self {
            chain_id: value.chain_id,
            trust_level: value
                .trust_level
                .ok_or(DecodingError::MissingField("trust_level"))?
                .into(),
            trusting_period: duration_from_proto(
                "trusting_period",
                value
                    .trusting_period
                    .ok_or(DecodingError::MissingField("trusting_period"))?,
            )?,
            unbonding_period: duration_from_proto(
                "unbonding_period",
                value
                    .unbonding_period
                    .ok_or(DecodingError::MissingField("unbonding_period"))?,
            )?,
            max_clock_drift: duration_from_proto(
                "max_clock_drift",
                value
                    .max_clock_drift
                    .ok_or(DecodingError::MissingField("max_clock_drift"))?,
            )?,
            frozen_height: value.frozen_height.unwrap_or_default().into(),
            latest_height: value
                .latest_height
                .ok_or(DecodingError::MissingField("latest_height"))?
                .into(),
            allow_update_after_expiry: value.allow_update_after_expiry,
            allow_update_after_misbehaviour: value.allow_update_after_misbehaviour,
        })
    }
}

impl TryFrom<ClientState> for proto::ClientState {
    type Error = TendermintClientError;

    fn try_from(value: ClientState) -> Result<Self, Self::Error> {
        Ok(Self {
            chain_id: value.chain_id,
            trust_level: Some(value.trust_level.into()),
            trusting_period: Some(duration_to_proto("trusting_period", value.trusting_period)?),
            unbonding_period: Some(duration_to_proto(
                "unbonding_period",
                value.unbonding_period,
            )?),
            max_clock_drift: Some(duration_to_proto("max_clock_drift", value.max_clock_drift)?),
            frozen_height: Some(value.frozen_height.into()),
            latest_height: Some(value.latest_height.into()),
            allow_update_after_expiry: value.allow_update_after_expiry,
            allow_update_after_misbehaviour: value.allow_update_after_misbehaviour,
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn client_state() -> ClientState {
        ClientState {
            chain_id: "test-chain".to_string(),
            trust_level: TrustThreshold::TWO_THIRDS,
            trusting_period: Duration::from_secs(1_209_600),
            unbonding_period: Duration::from_secs(1_814_400),
            max_clock_drift: Duration::from_secs(10),
            frozen_height: Height::default(),
            latest_height: Height::new(0, 10),
            allow_update_after_expiry: false,
            allow_update_after_misbehaviour: false,
        }
    }

    #[test]
    fn valid_client_state_passes() {
        assert!(client_state().validate().is_ok());
    }

    #[rstest]
    #[case::trust_level_one_third(ClientState { trust_level: TrustThreshold::ONE_THIRD, ..client_state() })]
    #[case::trust_level_above_one(ClientState { trust_level: TrustThreshold::new(4, 3), ..client_state() })]
    #[case::zero_denominator(ClientState { trust_level: TrustThreshold::new(1, 0), ..client_state() })]
    #[case::zero_trusting_period(ClientState { trusting_period: Duration::ZERO, ..client_state() })]
    #[case::short_unbonding(ClientState { unbonding_period: Duration::from_secs(1), ..client_state() })]
    #[case::frozen(ClientState { frozen_height: Height::new(0, 1), ..client_state() })]
    #[case::zero_latest_height(ClientState { latest_height: Height::new(1, 0), ..client_state() })]
    #[case::empty_chain_id(ClientState { chain_id: String::new(), ..client_state() })]
    fn invalid_client_states_are_rejected(#[case] state: ClientState) {
        assert!(matches!(
            state.validate(),
            Err(TendermintClientError::InvalidClientState { .. })
        ));
    }

    #[test]
    fn unbonding_equal_to_trusting_is_accepted() {
        let client_state = ClientState {
            unbonding_period: Duration::from_secs(1_209_600),
            ..client_state()
        };
        assert!(client_state.validate().is_ok());
    }

    #[test]
    fn wire_conversion_preserves_fields() {
        let original = ClientState {
            frozen_height: Height::new(0, 4),
            allow_update_after_expiry: true,
            ..client_state()
        };
        let wire = proto::ClientState::try_from(original.clone()).unwrap();
        assert_eq!(ClientState::try_from(wire).unwrap(), original);
    }

    #[test]
    fn unencodable_period_is_an_error() {
        let client_state = ClientState {
            trusting_period: Duration::from_secs(u64::MAX),
            ..client_state()
        };
        assert_eq!(
            proto::ClientState::try_from(client_state),
            Err(TendermintClientError::EncodingOutOfRange {
                field: "trusting_period",
                value: u64::MAX,
            })
        );
    }

    #[test]
    fn missing_trust_level_is_a_decoding_error() {
        let mut wire = proto::ClientState::try_from(client_state()).unwrap();
        wire.trust_level = None;
        assert_eq!(
            ClientState::try_from(wire),
            Err(DecodingError::MissingField("trust_level"))
        );
    }
}
