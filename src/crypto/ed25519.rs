// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ed25519 keys for signing and verifying messages.
//!
//! Each account carries one Ed25519 key pair next to its Curve25519 identity key. The account
//! only ever signs; verification lives on [`PublicKey`] for parties consuming exported keys.
//! Signatures are deterministic (RFC 8032), so signing consumes no randomness.
use std::fmt;

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use thiserror::Error;

use crate::crypto::Secret;

/// Size of an Ed25519 public key in bytes.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Size of an Ed25519 secret key seed in bytes.
pub const SECRET_KEY_SIZE: usize = 32;

/// Size of a detached Ed25519 signature in bytes.
pub const SIGNATURE_SIZE: usize = 64;

/// Ed25519 secret key, stored as the 32-byte seed it was generated from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecretKey(Secret<SECRET_KEY_SIZE>);

impl SecretKey {
    /// Derives a secret key from caller-supplied random bytes.
    pub fn from_bytes(bytes: [u8; SECRET_KEY_SIZE]) -> Self {
        Self(Secret::from_bytes(bytes))
    }

    /// Derives the public counterpart of this secret key.
    pub fn public_key(&self) -> PublicKey {
        let signing_key = SigningKey::from_bytes(self.0.as_bytes());
        PublicKey(signing_key.verifying_key().to_bytes())
    }

    /// Signs a message, returning a detached signature.
    pub fn sign(&self, message: &[u8]) -> Signature {
        let signing_key = SigningKey::from_bytes(self.0.as_bytes());
        Signature(signing_key.sign(message).to_bytes())
    }

    pub(crate) fn as_bytes(&self) -> &[u8; SECRET_KEY_SIZE] {
        self.0.as_bytes()
    }
}

/// Ed25519 public key.
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

    /// Verifies a signature over a message against this public key.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), Ed25519Error> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| Ed25519Error::InvalidPublicKey)?;
        let signature = ed25519_dalek::Signature::from_bytes(&signature.0);
        verifying_key
            .verify(message, &signature)
            .map_err(|_| Ed25519Error::VerificationFailed)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Detached Ed25519 signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature([u8; SIGNATURE_SIZE]);

impl Signature {
    pub fn from_bytes(bytes: [u8; SIGNATURE_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn to_bytes(self) -> [u8; SIGNATURE_SIZE] {
        self.0
    }

    /// Returns the signature as a hex-encoded string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Ed25519 key pair.
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

    pub fn sign(&self, message: &[u8]) -> Signature {
        self.secret_key.sign(message)
    }

    pub(crate) fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }
}

#[derive(Debug, Error)]
pub enum Ed25519Error {
    #[error("public key bytes do not form a valid curve point")]
    InvalidPublicKey,

    #[error("signature does not match message and public key")]
    VerificationFailed,
}

#[cfg(test)]
mod tests {
    use super::{KeyPair, SecretKey, Signature};

    #[test]
    fn signatures_match_rfc_8032() {
        // Test vector from RFC 8032, Section 7.1 (TEST 1, empty message).
        let secret_bytes: [u8; 32] =
            hex::decode("9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60")
                .unwrap()
                .try_into()
                .unwrap();

        let secret_key = SecretKey::from_bytes(secret_bytes);
        assert_eq!(
            secret_key.public_key().to_hex(),
            "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a"
        );

        let signature = secret_key.sign(b"");
        assert_eq!(
            signature.to_hex(),
            "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e06522490155\
             5fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b"
        );
    }

    #[test]
    fn verification_accepts_only_the_signed_message() {
        let key_pair = KeyPair::from_random_bytes([5; 32]);
        let signature = key_pair.sign(b"a message to my future self");

        assert!(
            key_pair
                .public_key()
                .verify(b"a message to my future self", &signature)
                .is_ok()
        );
        assert!(
            key_pair
                .public_key()
                .verify(b"a different message", &signature)
                .is_err()
        );

        let other_key_pair = KeyPair::from_random_bytes([6; 32]);
        assert!(
            other_key_pair
                .public_key()
                .verify(b"a message to my future self", &signature)
                .is_err()
        );
    }

    #[test]
    fn signing_is_deterministic() {
        let key_pair = KeyPair::from_random_bytes([9; 32]);

        let signature_1 = key_pair.sign(b"same input");
        let signature_2 = key_pair.sign(b"same input");
        assert_eq!(signature_1, signature_2);

        let restored = Signature::from_bytes(signature_1.to_bytes());
        assert_eq!(restored, signature_1);
    }
}
