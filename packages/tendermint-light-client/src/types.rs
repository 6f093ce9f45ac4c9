//! Small value types shared across the client: [`Height`], [`Timestamp`] and
//! [`TrustThreshold`].

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tm_light_client_utils::ensure;

use crate::{
    error::{DecodingError, TendermintClientError},
    proto,
};

/// A 32 byte SHA-256 digest
pub type Hash = [u8; 32];

/// A 20 byte validator address
pub type Address = [u8; 20];

/// Converts a wire byte field into a [`Hash`].
/// # Errors
/// Returns an error if `bytes` is not exactly 32 bytes long.
pub fn hash_from_bytes(field: &'static str, bytes: Vec<u8>) -> Result<Hash, DecodingError> {
    let found = bytes.len();
    bytes.try_into().map_err(|_| DecodingError::InvalidLength {
        field,
        expected: 32,
        found,
    })
}

/// Checks that an optional hash field is either empty or 32 bytes long.
/// # Errors
/// Returns an error for any other length.
pub fn optional_hash(field: &'static str, bytes: Vec<u8>) -> Result<Vec<u8>, DecodingError> {
    ensure!(
        bytes.is_empty() || bytes.len() == 32,
        DecodingError::InvalidLength {
            field,
            expected: 32,
            found: bytes.len(),
        }
    );
    Ok(bytes)
}

/// Revisioned block height. Ordered by revision first.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Height {
    /// Revision of the chain
    pub revision_number: u64,
    /// Height within the revision
    pub revision_height: u64,
}

impl Height {
    /// Creates a new height
    #[must_use]
    pub const fn new(revision_number: u64, revision_height: u64) -> Self {
        Self {
            revision_number,
            revision_height,
        }
    }

    /// Whether this is the zero height, used as the "not frozen" marker
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.revision_number == 0 && self.revision_height == 0
    }

    /// Whether `other` is exactly one block after `self` in the same revision
    #[must_use]
    pub const fn is_adjacent_to(&self, other: &Self) -> bool {
        self.revision_number == other.revision_number
            && self.revision_height.checked_add(1).is_some()
            && self.revision_height + 1 == other.revision_height
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.revision_number, self.revision_height)
    }
}

impl From<proto::Height> for Height {
    fn from(value: proto::Height) -> Self {
        Self::new(value.revision_number, value.revision_height)
    }
}

impl From<Height> for proto::Height {
    fn from(value: Height) -> Self {
        Self {
            revision_number: value.revision_number,
            revision_height: value.revision_height,
        }
    }
}

const NANOS_PER_SECOND: i128 = 1_000_000_000;

/// A UTC timestamp with nanosecond precision, as carried in block headers.
///
/// Always within years 1 to 9999, the range of a protobuf `Timestamp`.
/// Serializes as an RFC 3339 string.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    /// Creates a timestamp from unix seconds and nanoseconds.
    /// # Errors
    /// Returns an error if `nanos` is not a valid sub-second value or the
    /// instant falls outside years 1 to 9999.
    pub fn new(seconds: i64, nanos: i32) -> Result<Self, DecodingError> {
        ensure!(
            (0..1_000_000_000).contains(&nanos),
            DecodingError::OutOfRange {
                field: "timestamp.nanos",
                value: nanos.into(),
            }
        );
        Self::from_unix_nanos(i128::from(seconds) * NANOS_PER_SECOND + i128::from(nanos))
    }

    /// Creates a timestamp from nanoseconds since the unix epoch.
    /// # Errors
    /// Returns an error if the instant falls outside years 1 to 9999.
    pub fn from_unix_nanos(unix_nanos: i128) -> Result<Self, DecodingError> {
        OffsetDateTime::from_unix_timestamp_nanos(unix_nanos)
            .ok()
            .and_then(Self::in_range)
            .ok_or(DecodingError::InvalidTimestamp { unix_nanos })
    }

    fn in_range(time: OffsetDateTime) -> Option<Self> {
        (1..=9999).contains(&time.year()).then_some(Self(time))
    }

    /// Whole seconds since the unix epoch
    #[must_use]
    pub const fn unix_seconds(&self) -> i64 {
        self.0.unix_timestamp()
    }

    /// Nanoseconds within the second
    #[must_use]
    pub const fn subsec_nanos(&self) -> u32 {
        self.0.nanosecond()
    }

    /// Nanoseconds since the unix epoch
    #[must_use]
    pub const fn unix_nanos(&self) -> i128 {
        self.0.unix_timestamp_nanos()
    }

    /// Adds a duration, returning `None` past year 9999
    #[must_use]
    pub fn checked_add(&self, duration: Duration) -> Option<Self> {
        let delta = time::Duration::try_from(duration).ok()?;
        self.0.checked_add(delta).and_then(Self::in_range)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = self.0.format(&Rfc3339).map_err(|_| fmt::Error)?;
        f.write_str(&formatted)
    }
}

impl TryFrom<String> for Timestamp {
    type Error = DecodingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let parsed = OffsetDateTime::parse(&value, &Rfc3339)
            .map_err(|err| DecodingError::InvalidTimestampFormat(err.to_string()))?;
        Self::from_unix_nanos(parsed.unix_timestamp_nanos())
    }
}

impl From<Timestamp> for String {
    fn from(value: Timestamp) -> Self {
        value.to_string()
    }
}

impl TryFrom<proto::Timestamp> for Timestamp {
    type Error = DecodingError;

    fn try_from(value: proto::Timestamp) -> Result<Self, Self::Error> {
        Self::new(value.seconds, value.nanos)
    }
}

impl From<Timestamp> for proto::Timestamp {
    #[allow(clippy::cast_possible_wrap)]
    fn from(value: Timestamp) -> Self {
        Self {
            seconds: value.unix_seconds(),
            // below 10^9
            nanos: value.subsec_nanos() as i32,
        }
    }
}

/// Converts an unsigned value to the `int64` its wire encoding uses.
/// # Errors
/// Returns [`TendermintClientError::EncodingOutOfRange`] above `i64::MAX`.
pub fn to_wire_int64(field: &'static str, value: u64) -> Result<i64, TendermintClientError> {
    i64::try_from(value).map_err(|_| TendermintClientError::EncodingOutOfRange { field, value })
}

/// Converts a wire duration, rejecting negative values.
/// # Errors
/// Returns an error if either component is negative or nanos overflow a second.
pub fn duration_from_proto(
    field: &'static str,
    value: proto::Duration,
) -> Result<Duration, DecodingError> {
    let seconds = u64::try_from(value.seconds).map_err(|_| DecodingError::OutOfRange {
        field,
        value: value.seconds,
    })?;
    let nanos = u32::try_from(value.nanos)
        .ok()
        .filter(|n| *n < 1_000_000_000)
        .ok_or(DecodingError::OutOfRange {
            field,
            value: value.nanos.into(),
        })?;
    Ok(Duration::new(seconds, nanos))
}

/// Converts a duration to its wire form.
/// # Errors
/// Returns [`TendermintClientError::EncodingOutOfRange`] if the seconds do not
/// fit an `int64`.
#[allow(clippy::cast_possible_wrap)]
pub fn duration_to_proto(
    field: &'static str,
    value: Duration,
) -> Result<proto::Duration, TendermintClientError> {
    Ok(proto::Duration {
        seconds: to_wire_int64(field, value.as_secs())?,
        // below 10^9
        nanos: value.subsec_nanos() as i32,
    })
}

/// A voting power fraction `numerator / denominator`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TrustThreshold {
    /// Numerator of the fraction
    pub numerator: u64,
    /// Denominator of the fraction
    pub denominator: u64,
}

impl TrustThreshold {
    /// The default trust level of one third
    pub const ONE_THIRD: Self = Self::new(1, 3);
    /// The BFT supermajority of two thirds
    pub const TWO_THIRDS: Self = Self::new(2, 3);

    /// Creates a new fraction without validating it
    #[must_use]
    pub const fn new(numerator: u64, denominator: u64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Whether the fraction lies in `(1/3, 1]`, the range a light client may trust.
    #[must_use]
    pub fn is_valid_trust_level(&self) -> bool {
        self.denominator != 0
            && u128::from(self.numerator) * 3 > u128::from(self.denominator)
            && self.numerator <= self.denominator
    }

    /// `tallied / total >= numerator / denominator`
    #[must_use]
    pub fn is_met_by(&self, tallied: u64, total: u64) -> bool {
        u128::from(tallied) * u128::from(self.denominator)
            >= u128::from(total) * u128::from(self.numerator)
    }

    /// `tallied / total > numerator / denominator`
    #[must_use]
    pub fn is_exceeded_by(&self, tallied: u64, total: u64) -> bool {
        u128::from(tallied) * u128::from(self.denominator)
            > u128::from(total) * u128::from(self.numerator)
    }
}

impl fmt::Display for TrustThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl From<proto::Fraction> for TrustThreshold {
    fn from(value: proto::Fraction) -> Self {
        Self::new(value.numerator, value.denominator)
    }
}

impl From<TrustThreshold> for proto::Fraction {
    fn from(value: TrustThreshold) -> Self {
        Self {
            numerator: value.numerator,
            denominator: value.denominator,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn heights_order_by_revision_first() {
        assert!(Height::new(1, 1) > Height::new(0, 100));
        assert!(Height::new(0, 2) > Height::new(0, 1));
        assert!(Height::default().is_zero());
    }

    #[test]
    fn adjacency_requires_same_revision() {
        assert!(Height::new(0, 10).is_adjacent_to(&Height::new(0, 11)));
        assert!(!Height::new(0, 10).is_adjacent_to(&Height::new(0, 12)));
        assert!(!Height::new(0, 10).is_adjacent_to(&Height::new(1, 11)));
        assert!(!Height::new(0, u64::MAX).is_adjacent_to(&Height::new(0, 0)));
    }

    #[test]
    fn timestamp_rejects_invalid_nanos() {
        assert!(Timestamp::new(1, 999_999_999).is_ok());
        assert_eq!(
            Timestamp::new(1, 1_000_000_000),
            Err(DecodingError::OutOfRange {
                field: "timestamp.nanos",
                value: 1_000_000_000
            })
        );
        assert!(Timestamp::new(1, -1).is_err());
    }

    #[rstest]
    #[case::year_one(-62_135_596_800, true)]
    #[case::before_year_one(-62_135_596_801, false)]
    #[case::year_9999(253_402_300_799, true)]
    #[case::year_10000(253_402_300_800, false)]
    #[case::i64_max(i64::MAX, false)]
    fn timestamp_range_is_years_one_to_9999(#[case] seconds: i64, #[case] valid: bool) {
        assert_eq!(Timestamp::new(seconds, 0).is_ok(), valid);
    }

    #[test]
    fn timestamp_addition_carries_nanos() {
        let ts = Timestamp::new(10, 900_000_000).unwrap();
        let sum = ts.checked_add(Duration::from_millis(200)).unwrap();
        assert_eq!(sum, Timestamp::new(11, 100_000_000).unwrap());
        assert_eq!(sum.unix_seconds(), 11);
        assert_eq!(sum.subsec_nanos(), 100_000_000);
        assert_eq!(sum.unix_nanos(), 11_100_000_000);

        let last = Timestamp::new(253_402_300_799, 999_999_999).unwrap();
        assert!(last.checked_add(Duration::from_nanos(1)).is_none());
        assert!(Timestamp::new(0, 0)
            .unwrap()
            .checked_add(Duration::MAX)
            .is_none());
    }

    #[test]
    fn timestamp_serializes_as_rfc3339() {
        let ts = Timestamp::new(1_570_983_284, 5).unwrap();
        assert_eq!(ts.to_string(), "2019-10-13T16:14:44.000000005Z");

        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2019-10-13T16:14:44.000000005Z\"");
        assert_eq!(serde_json::from_str::<Timestamp>(&json).unwrap(), ts);

        let shifted: Timestamp =
            serde_json::from_str("\"2019-10-13T18:14:44.000000005+02:00\"").unwrap();
        assert_eq!(shifted, ts);
        assert!(serde_json::from_str::<Timestamp>("\"yesterday\"").is_err());
    }

    #[test]
    fn wire_encoders_reject_values_above_int64() {
        assert_eq!(to_wire_int64("height", 7), Ok(7));
        assert_eq!(
            to_wire_int64("height", u64::MAX),
            Err(TendermintClientError::EncodingOutOfRange {
                field: "height",
                value: u64::MAX
            })
        );
        assert_eq!(
            duration_to_proto("trusting_period", Duration::from_secs(u64::MAX)),
            Err(TendermintClientError::EncodingOutOfRange {
                field: "trusting_period",
                value: u64::MAX
            })
        );
        assert_eq!(
            duration_to_proto("trusting_period", Duration::new(5, 7)),
            Ok(proto::Duration {
                seconds: 5,
                nanos: 7
            })
        );
    }

    #[test]
    fn negative_durations_are_rejected() {
        let err = duration_from_proto(
            "trusting_period",
            proto::Duration {
                seconds: -1,
                nanos: 0,
            },
        )
        .unwrap_err();
        assert_eq!(
            err,
            DecodingError::OutOfRange {
                field: "trusting_period",
                value: -1
            }
        );
    }

    #[rstest]
    #[case(1, 3, false)]
    #[case(0, 1, false)]
    #[case(1, 0, false)]
    #[case(4, 3, false)]
    #[case(34, 100, true)]
    #[case(2, 3, true)]
    #[case(1, 1, true)]
    fn trust_level_range(#[case] numerator: u64, #[case] denominator: u64, #[case] valid: bool) {
        assert_eq!(
            TrustThreshold::new(numerator, denominator).is_valid_trust_level(),
            valid
        );
    }

    #[test]
    fn threshold_comparisons() {
        assert!(TrustThreshold::ONE_THIRD.is_met_by(1, 3));
        assert!(!TrustThreshold::ONE_THIRD.is_exceeded_by(1, 3));
        assert!(TrustThreshold::TWO_THIRDS.is_exceeded_by(7, 10));
        assert!(!TrustThreshold::TWO_THIRDS.is_exceeded_by(2, 3));
        assert!(TrustThreshold::TWO_THIRDS.is_met_by(u64::MAX, u64::MAX));
    }
}
