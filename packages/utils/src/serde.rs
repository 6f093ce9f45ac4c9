//! This module provides custom serde implementations.

/// Serialize a number as a string.
pub mod number_as_string {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Implements the serde `serialize` function for a number.
    /// # Errors
    /// Returns an error if the number cannot be serialized.
    pub fn serialize<T, S>(number: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: ToString,
        S: Serializer,
    {
        serializer.serialize_str(&number.to_string())
    }

    /// Implements the serde `deserialize` function for a number.
    /// # Errors
    /// Returns an error if the string cannot be deserialized to a number.
    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Serialize a byte vector as a hex string. An optional `0x` prefix is accepted when
/// deserializing.
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Implements the serde `serialize` function for a byte vector.
    /// # Errors
    /// Returns an error if the string cannot be serialized.
    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    /// Implements the serde `deserialize` function for a byte vector.
    /// # Errors
    /// Returns an error if the string is not valid hex.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)
    }
}

/// Serialize a fixed size byte array as a hex string.
pub mod hex_array {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Implements the serde `serialize` function for a byte array.
    /// # Errors
    /// Returns an error if the string cannot be serialized.
    pub fn serialize<const N: usize, S>(bytes: &[u8; N], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    /// Implements the serde `deserialize` function for a byte array.
    /// # Errors
    /// Returns an error if the string is not valid hex or has the wrong length.
    pub fn deserialize<'de, const N: usize, D>(deserializer: D) -> Result<[u8; N], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)?;
        let found = bytes.len();
        bytes.try_into().map_err(|_| {
            serde::de::Error::custom(format!("expected {N} bytes, found {found}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    struct Fixture {
        #[serde(with = "super::hex_array")]
        hash: [u8; 4],
        #[serde(with = "super::hex_bytes")]
        data: Vec<u8>,
        #[serde(with = "super::number_as_string")]
        power: u64,
    }

    #[test]
    fn hex_fields_roundtrip_through_json() {
        let fixture = Fixture {
            hash: [0xde, 0xad, 0xbe, 0xef],
            data: vec![0x01, 0x02],
            power: 42,
        };

        let json = serde_json::to_string(&fixture).unwrap();
        assert_eq!(json, r#"{"hash":"deadbeef","data":"0102","power":"42"}"#);
        assert_eq!(serde_json::from_str::<Fixture>(&json).unwrap(), fixture);
    }

    #[test]
    fn hex_array_accepts_prefix_and_rejects_wrong_length() {
        let ok: Fixture =
            serde_json::from_str(r#"{"hash":"0xdeadbeef","data":"","power":"1"}"#).unwrap();
        assert_eq!(ok.hash, [0xde, 0xad, 0xbe, 0xef]);

        let err = serde_json::from_str::<Fixture>(r#"{"hash":"dead","data":"","power":"1"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("expected 4 bytes"));
    }
}
