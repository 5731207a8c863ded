// SPDX-License-Identifier: MIT OR Apache-2.0

//! Curve25519 key pairs for Diffie-Hellman key agreement.
//!
//! The account's long-lived identity key and every one-time pre-key are Curve25519 key pairs.
//! Generation is deterministic: the 32 random bytes handed in by the caller become the secret
//! key and the public key is derived from it, so the same input always yields the same pair.
use std::fmt;

use x25519_dalek::StaticSecret;

use crate::crypto::Secret;

/// Size of a Curve25519 public key in bytes.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Size of a Curve25519 secret key in bytes.
pub const SECRET_KEY_SIZE: usize = 32;

/// Curve25519 secret key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecretKey(Secret<SECRET_KEY_SIZE>);

impl SecretKey {
    /// Derives a secret key from caller-supplied random bytes.
    pub fn from_bytes(bytes: [u8; SECRET_KEY_SIZE]) -> Self {
        Self(Secret::from_bytes(bytes))
    }

    /// Derives the public counterpart of this secret key.
    pub fn public_key(&self) -> PublicKey {
        let secret = StaticSecret::from(*self.0.as_bytes());
        PublicKey(x25519_dalek::PublicKey::from(&secret).to_bytes())
    }

    pub(crate) fn as_bytes(&self) -> &[u8; SECRET_KEY_SIZE] {
        self.0.as_bytes()
    }
}

/// Curve25519 public key.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct PublicKey([u8; PUBLIC_KEY_SIZE]);

impl PublicKey {
    pub fn from_bytes(bytes: [u8; PUBLIC_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.0
    }

    pub fn to_bytes(self) -> [u8; PUBLIC_KEY_SIZE] {
        self.0
    }

    /// Returns the public key as a hex-encoded string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Curve25519 key pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPair {
    secret_key: SecretKey,
    public_key: PublicKey,
}

impl KeyPair {
    /// Number of random bytes consumed when generating one key pair.
    pub const RANDOM_LENGTH: usize = SECRET_KEY_SIZE;

    /// Generates a key pair deterministically from caller-supplied random bytes.
    pub fn from_random_bytes(random: [u8; SECRET_KEY_SIZE]) -> Self {
        let secret_key = SecretKey::from_bytes(random);
        let public_key = secret_key.public_key();
        Self {
            secret_key,
            public_key,
        }
    }

    /// Restores a key pair from its stored halves without re-deriving the public key.
    pub(crate) fn from_parts(public_key: PublicKey, secret_key: SecretKey) -> Self {
        Self {
            secret_key,
            public_key,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    pub(crate) fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }
}
