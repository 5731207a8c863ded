// SPDX-License-Identifier: MIT OR Apache-2.0

//! `serde` support for the public export types.
//!
//! Public keys and signatures serialize as hex strings in human-readable encodings (JSON) and
//! as raw bytes otherwise (CBOR), matching what key-distribution services expect from upload
//! payloads. Secret key material deliberately has no `serde` support; full account state only
//! leaves the process through the pickle codec.
use serde::{Deserialize, Serialize};
use serde_bytes::{ByteBuf as SerdeByteBuf, Bytes as SerdeBytes};

use crate::crypto::{curve25519, ed25519};

/// Serializes bytes into a hex string when using a human readable encoding, otherwise
/// serializes the bytes directly.
fn serialize_hex<S>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    if serializer.is_human_readable() {
        hex::serde::serialize(value, serializer)
    } else {
        SerdeBytes::new(value).serialize(serializer)
    }
}

/// Deserializes from a hex string into bytes when using a human readable encoding, otherwise
/// deserializes the bytes directly.
fn deserialize_hex<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    if deserializer.is_human_readable() {
        hex::serde::deserialize(deserializer)
    } else {
        let bytes = <SerdeByteBuf>::deserialize(deserializer)?;
        Ok(bytes.to_vec())
    }
}

impl Serialize for curve25519::PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serialize_hex(self.as_bytes(), serializer)
    }
}

impl<'de> Deserialize<'de> for curve25519::PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bytes = deserialize_hex(deserializer)?;

        bytes
            .as_slice()
            .try_into()
            .map(curve25519::PublicKey::from_bytes)
            .map_err(|_| serde::de::Error::custom("invalid curve25519 public key length"))
    }
}

impl Serialize for ed25519::PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serialize_hex(self.as_bytes(), serializer)
    }
}

impl<'de> Deserialize<'de> for ed25519::PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bytes = deserialize_hex(deserializer)?;

        bytes
            .as_slice()
            .try_into()
            .map(ed25519::PublicKey::from_bytes)
            .map_err(|_| serde::de::Error::custom("invalid ed25519 public key length"))
    }
}

impl Serialize for ed25519::Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serialize_hex(&self.to_bytes(), serializer)
    }
}

impl<'de> Deserialize<'de> for ed25519::Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bytes = deserialize_hex(deserializer)?;

        bytes
            .as_slice()
            .try_into()
            .map(ed25519::Signature::from_bytes)
            .map_err(|_| serde::de::Error::custom("invalid ed25519 signature length"))
    }
}

#[cfg(test)]
mod tests {
    use crate::crypto::{curve25519, ed25519};

    #[test]
    fn public_keys_as_hex_in_json() {
        // Public key from RFC 8032, Section 7.1 (TEST 1).
        let hex = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";
        let public_key =
            ed25519::PublicKey::from_bytes(hex::decode(hex).unwrap().try_into().unwrap());

        let json = serde_json::to_string(&public_key).unwrap();
        assert_eq!(json, format!("\"{hex}\""));

        let public_key_again: ed25519::PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(public_key_again, public_key);
    }

    #[test]
    fn curve25519_round_trip_in_json() {
        let key_pair = curve25519::KeyPair::from_random_bytes([11; 32]);
        let public_key = key_pair.public_key();

        let json = serde_json::to_string(&public_key).unwrap();
        assert_eq!(json, format!("\"{}\"", public_key.to_hex()));

        let public_key_again: curve25519::PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(public_key_again, public_key);
    }

    #[test]
    fn signature_round_trip_in_json() {
        let key_pair = ed25519::KeyPair::from_random_bytes([12; 32]);
        let signature = key_pair.sign(b"upload payload");

        let json = serde_json::to_string(&signature).unwrap();
        let signature_again: ed25519::Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(signature_again, signature);
    }

    #[test]
    fn wrong_lengths_are_rejected() {
        let result: Result<curve25519::PublicKey, _> = serde_json::from_str("\"0011\"");
        assert!(result.is_err());

        let result: Result<ed25519::Signature, _> = serde_json::from_str("\"not hex at all\"");
        assert!(result.is_err());
    }
}
