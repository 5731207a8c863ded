// SPDX-License-Identifier: MIT OR Apache-2.0

//! Device account holding the long-lived identity key, the signing key and the one-time key
//! pool.
//!
//! An account is created once per device and lives as long as the device identity. Peers use
//! its Curve25519 identity key plus one of its one-time pre-keys to establish an encrypted
//! session; the Ed25519 signing key authenticates everything the device publishes. Key
//! generation is deterministic over caller-supplied random bytes, with the exact byte
//! requirements reported up front, so entropy handling stays auditable and testable.
//!
//! Full account state persists through the binary pickle codec, see [`Account::pickle`].
mod one_time_keys;
mod pickle;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::crypto::{Rng, RngError, curve25519, ed25519};
use crate::pickle::PickleError;

use one_time_keys::OneTimeKeys;
pub use one_time_keys::{MAX_ONE_TIME_KEYS, OneTimeKey, OneTimeKeyId};

/// Public identity of an account: the Curve25519 key for Diffie-Hellman key agreement and the
/// Ed25519 key others use to verify this device's signatures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityKeys {
    pub curve25519: curve25519::PublicKey,
    pub ed25519: ed25519::PublicKey,
}

/// Outcome of the most recent state-changing account operation.
///
/// Foreign-language bindings pass status codes instead of rich results across the boundary;
/// this mirror gives them one place to read the latest outcome from. Library code never
/// branches on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    Success,
    NotEnoughRandom,
    KeyNotFound,
    BufferTooShort,
    CorruptedData,
    UnsupportedVersion,
}

impl From<&AccountError> for ErrorCode {
    fn from(error: &AccountError) -> Self {
        match error {
            AccountError::Rng(_) => ErrorCode::NotEnoughRandom,
            AccountError::NotEnoughRandom { .. } => ErrorCode::NotEnoughRandom,
            AccountError::KeyNotFound(_) => ErrorCode::KeyNotFound,
        }
    }
}

impl From<&PickleError> for ErrorCode {
    fn from(error: &PickleError) -> Self {
        match error {
            PickleError::BufferTooShort => ErrorCode::BufferTooShort,
            PickleError::CorruptedData(_) => ErrorCode::CorruptedData,
            PickleError::UnsupportedVersion(_) => ErrorCode::UnsupportedVersion,
        }
    }
}

#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Rng(#[from] RngError),

    #[error("{required} random bytes required but only {provided} provided")]
    NotEnoughRandom { required: usize, provided: usize },

    #[error("could not find one-time key with id {0}")]
    KeyNotFound(OneTimeKeyId),
}

/// Long-lived cryptographic identity of one device.
///
/// An account owns a permanent Curve25519 identity key pair, an Ed25519 signing key pair and a
/// bounded pool of one-time pre-keys. All key material is generated deterministically from
/// random bytes supplied by the caller; [`Account::RANDOM_LENGTH`] and
/// [`Account::one_time_keys_random_length`] report exactly how many bytes each operation
/// consumes. Secret key material is zeroised when the account is dropped.
#[derive(Debug)]
pub struct Account {
    identity_key: curve25519::KeyPair,
    signing_key: ed25519::KeyPair,
    one_time_keys: OneTimeKeys,
    next_key_id: OneTimeKeyId,
    last_error: ErrorCode,
}

impl Account {
    /// Number of random bytes [`Account::from_random_bytes`] consumes.
    pub const RANDOM_LENGTH: usize =
        curve25519::KeyPair::RANDOM_LENGTH + ed25519::KeyPair::RANDOM_LENGTH;

    /// Creates a new account from caller-supplied random bytes.
    ///
    /// The first 32 bytes become the Curve25519 identity secret, the following 32 bytes the
    /// Ed25519 signing seed; bytes beyond [`Account::RANDOM_LENGTH`] are ignored. Creation is
    /// deterministic, so the bytes must be fresh output of a cryptographically secure random
    /// number generator and must never be reused.
    pub fn from_random_bytes(random: &[u8]) -> Result<Self, AccountError> {
        if random.len() < Self::RANDOM_LENGTH {
            return Err(AccountError::NotEnoughRandom {
                required: Self::RANDOM_LENGTH,
                provided: random.len(),
            });
        }

        let identity_key = curve25519::KeyPair::from_random_bytes(
            random[..curve25519::KeyPair::RANDOM_LENGTH]
                .try_into()
                .expect("length checked above"),
        );
        let signing_key = ed25519::KeyPair::from_random_bytes(
            random[curve25519::KeyPair::RANDOM_LENGTH..Self::RANDOM_LENGTH]
                .try_into()
                .expect("length checked above"),
        );

        Ok(Self {
            identity_key,
            signing_key,
            one_time_keys: OneTimeKeys::new(),
            next_key_id: 0,
            last_error: ErrorCode::Success,
        })
    }

    /// Creates a new account, sourcing the required randomness from `rng`.
    pub fn from_rng(rng: &Rng) -> Result<Self, AccountError> {
        let random: Zeroizing<[u8; Self::RANDOM_LENGTH]> = Zeroizing::new(rng.random_array()?);
        Self::from_random_bytes(random.as_slice())
    }

    /// Public identity keys of this account.
    pub fn identity_keys(&self) -> IdentityKeys {
        IdentityKeys {
            curve25519: self.identity_key.public_key(),
            ed25519: self.signing_key.public_key(),
        }
    }

    /// Curve25519 identity key other parties use for key agreement towards this device.
    pub fn curve25519_key(&self) -> curve25519::PublicKey {
        self.identity_key.public_key()
    }

    /// Ed25519 key other parties use to verify this device's signatures.
    pub fn ed25519_key(&self) -> ed25519::PublicKey {
        self.signing_key.public_key()
    }

    /// Signs a message with the account's Ed25519 signing key.
    ///
    /// Signing is deterministic, consumes no randomness and leaves account state untouched.
    pub fn sign(&self, message: &[u8]) -> ed25519::Signature {
        self.signing_key.sign(message)
    }

    /// Maximum number of one-time keys the account holds at once.
    pub fn max_one_time_keys(&self) -> usize {
        MAX_ONE_TIME_KEYS
    }

    /// Number of random bytes required to generate `count` one-time keys.
    pub fn one_time_keys_random_length(count: usize) -> usize {
        count.saturating_mul(curve25519::KeyPair::RANDOM_LENGTH)
    }

    /// Generates `count` one-time keys from caller-supplied random bytes.
    ///
    /// Key `k` consumes bytes `[k * 32, (k + 1) * 32)` of `random`; excess bytes are ignored.
    /// Every key is assigned the next id from the account's counter and appended to the pool,
    /// evicting the oldest keys (published or not) once the pool would grow beyond
    /// [`MAX_ONE_TIME_KEYS`]. Returns the number of generated keys.
    pub fn generate_one_time_keys(
        &mut self,
        count: usize,
        random: &[u8],
    ) -> Result<usize, AccountError> {
        let required = Self::one_time_keys_random_length(count);
        if random.len() < required {
            self.last_error = ErrorCode::NotEnoughRandom;
            return Err(AccountError::NotEnoughRandom {
                required,
                provided: random.len(),
            });
        }

        for chunk in random[..required].chunks_exact(curve25519::KeyPair::RANDOM_LENGTH) {
            let key = curve25519::KeyPair::from_random_bytes(
                chunk.try_into().expect("chunks are exactly 32 bytes"),
            );
            self.one_time_keys
                .insert(OneTimeKey::new(self.next_key_id, key));
            self.next_key_id += 1;
        }

        self.last_error = ErrorCode::Success;
        Ok(count)
    }

    /// Generates `count` one-time keys, sourcing the required randomness from `rng`.
    pub fn generate_one_time_keys_from_rng(
        &mut self,
        count: usize,
        rng: &Rng,
    ) -> Result<usize, AccountError> {
        let random = Zeroizing::new(rng.random_vec(Self::one_time_keys_random_length(count))?);
        self.generate_one_time_keys(count, &random)
    }

    /// Borrows the one-time key pair with the given id.
    ///
    /// `None` for unknown ids is a normal outcome: the key may never have existed, or was
    /// consumed or evicted in the meantime. The borrow ends before any further mutation of the
    /// account, so a looked-up key cannot outlive its slot.
    pub fn lookup_key(&self, id: OneTimeKeyId) -> Option<&curve25519::KeyPair> {
        self.one_time_keys.lookup(id)
    }

    /// Removes the one-time key with the given id, returning its position in insertion order.
    ///
    /// Called once the session a key was consumed for is established. Removing a key below the
    /// published watermark shrinks the published prefix accordingly.
    pub fn remove_key(&mut self, id: OneTimeKeyId) -> Result<usize, AccountError> {
        match self.one_time_keys.remove(id) {
            Some(position) => {
                self.last_error = ErrorCode::Success;
                Ok(position)
            }
            None => {
                self.last_error = ErrorCode::KeyNotFound;
                Err(AccountError::KeyNotFound(id))
            }
        }
    }

    /// Marks every currently stored one-time key as published.
    ///
    /// Called after uploading the unpublished keys to a key-distribution service. Idempotent;
    /// marking does not protect a key from eviction.
    pub fn mark_keys_as_published(&mut self) {
        self.one_time_keys.mark_as_published();
        self.last_error = ErrorCode::Success;
    }

    /// All one-time keys currently in the pool, oldest first.
    pub fn one_time_keys(&self) -> &[OneTimeKey] {
        self.one_time_keys.as_slice()
    }

    /// One-time keys not yet marked as published, oldest first.
    ///
    /// This is the batch to upload next; after a successful upload
    /// [`Account::mark_keys_as_published`] advances the watermark past it.
    pub fn unpublished_one_time_keys(&self) -> &[OneTimeKey] {
        self.one_time_keys.unpublished()
    }

    /// Outcome of the most recent state-changing operation on this account.
    pub fn last_error(&self) -> ErrorCode {
        self.last_error
    }
}

#[cfg(test)]
mod tests {
    use crate::crypto::Rng;

    use super::{Account, AccountError, ErrorCode, MAX_ONE_TIME_KEYS};

    fn fixed_random(len: usize) -> Vec<u8> {
        (0..len).map(|i| i as u8).collect()
    }

    #[test]
    fn creation_requires_the_reported_amount_of_randomness() {
        let too_short = fixed_random(Account::RANDOM_LENGTH - 1);
        assert!(matches!(
            Account::from_random_bytes(&too_short),
            Err(AccountError::NotEnoughRandom {
                required: 64,
                provided: 63,
            })
        ));

        let exact = fixed_random(Account::RANDOM_LENGTH);
        let account = Account::from_random_bytes(&exact).unwrap();

        // Extra bytes beyond the reported requirement are ignored.
        let oversized = fixed_random(Account::RANDOM_LENGTH + 13);
        let account_again = Account::from_random_bytes(&oversized).unwrap();
        assert_eq!(account.identity_keys(), account_again.identity_keys());
    }

    #[test]
    fn creation_is_deterministic() {
        let random = fixed_random(Account::RANDOM_LENGTH);
        let account_1 = Account::from_random_bytes(&random).unwrap();
        let account_2 = Account::from_random_bytes(&random).unwrap();

        assert_eq!(account_1.identity_keys(), account_2.identity_keys());
        assert_eq!(account_1.curve25519_key(), account_2.curve25519_key());
        assert_eq!(account_1.ed25519_key(), account_2.ed25519_key());

        // The two key pairs are derived from disjoint parts of the input.
        assert_ne!(
            account_1.curve25519_key().as_bytes(),
            account_1.ed25519_key().as_bytes()
        );
    }

    #[test]
    fn signatures_verify_against_the_identity_keys() {
        let rng = Rng::from_seed([1; 32]);
        let account = Account::from_rng(&rng).unwrap();

        let signature = account.sign(b"device handshake");
        assert!(
            account
                .identity_keys()
                .ed25519
                .verify(b"device handshake", &signature)
                .is_ok()
        );
        assert!(
            account
                .identity_keys()
                .ed25519
                .verify(b"tampered handshake", &signature)
                .is_err()
        );
    }

    #[test]
    fn one_time_key_generation_consumes_disjoint_chunks() {
        let rng = Rng::from_seed([1; 32]);
        let mut account = Account::from_rng(&rng).unwrap();

        let random = fixed_random(Account::one_time_keys_random_length(3));
        assert_eq!(random.len(), 96);
        assert_eq!(account.generate_one_time_keys(3, &random).unwrap(), 3);

        // Generating from the same bytes on a fresh account reproduces the same public keys.
        let mut account_again = Account::from_rng(&rng).unwrap();
        account_again.generate_one_time_keys(3, &random).unwrap();
        let publics: Vec<_> = account
            .one_time_keys()
            .iter()
            .map(|key| key.public_key())
            .collect();
        let publics_again: Vec<_> = account_again
            .one_time_keys()
            .iter()
            .map(|key| key.public_key())
            .collect();
        assert_eq!(publics, publics_again);

        // All three keys are distinct since their chunks are.
        assert_ne!(publics[0], publics[1]);
        assert_ne!(publics[1], publics[2]);
    }

    #[test]
    fn one_time_key_generation_checks_randomness_up_front() {
        let rng = Rng::from_seed([2; 32]);
        let mut account = Account::from_rng(&rng).unwrap();

        let random = fixed_random(Account::one_time_keys_random_length(2) - 1);
        assert!(matches!(
            account.generate_one_time_keys(2, &random),
            Err(AccountError::NotEnoughRandom {
                required: 64,
                provided: 63,
            })
        ));

        // Nothing was generated on the failed call.
        assert!(account.one_time_keys().is_empty());
    }

    #[test]
    fn publish_flow_advances_the_watermark() {
        let rng = Rng::from_seed([3; 32]);
        let mut account = Account::from_rng(&rng).unwrap();

        account.generate_one_time_keys_from_rng(10, &rng).unwrap();
        assert_eq!(account.unpublished_one_time_keys().len(), 10);

        account.mark_keys_as_published();
        assert!(account.unpublished_one_time_keys().is_empty());
        assert_eq!(account.one_time_keys().len(), 10);

        account.generate_one_time_keys_from_rng(5, &rng).unwrap();
        let unpublished = account.unpublished_one_time_keys();
        assert_eq!(unpublished.len(), 5);

        // The unpublished suffix holds exactly the ids issued after publishing.
        let ids: Vec<u32> = unpublished.iter().map(|key| key.id()).collect();
        assert_eq!(ids, vec![10, 11, 12, 13, 14]);

        // Marking again is idempotent.
        account.mark_keys_as_published();
        account.mark_keys_as_published();
        assert!(account.unpublished_one_time_keys().is_empty());
    }

    #[test]
    fn consumed_keys_are_looked_up_then_removed() {
        let rng = Rng::from_seed([4; 32]);
        let mut account = Account::from_rng(&rng).unwrap();
        account.generate_one_time_keys_from_rng(3, &rng).unwrap();

        // A peer picked the key with id 1 to establish a session.
        let key_pair = account.lookup_key(1).unwrap();
        assert_eq!(key_pair.public_key(), account.one_time_keys()[1].public_key());

        assert_eq!(account.remove_key(1).unwrap(), 1);
        assert!(account.lookup_key(1).is_none());
        assert_eq!(account.one_time_keys().len(), 2);

        // Removing the same id again reports it as missing.
        assert!(matches!(
            account.remove_key(1),
            Err(AccountError::KeyNotFound(1))
        ));
    }

    #[test]
    fn ids_stay_monotonic_across_removals() {
        let rng = Rng::from_seed([5; 32]);
        let mut account = Account::from_rng(&rng).unwrap();

        account.generate_one_time_keys_from_rng(3, &rng).unwrap();
        account.remove_key(1).unwrap();
        account.generate_one_time_keys_from_rng(2, &rng).unwrap();

        let ids: Vec<u32> = account.one_time_keys().iter().map(|key| key.id()).collect();
        assert_eq!(ids, vec![0, 2, 3, 4]);
    }

    #[test]
    fn generating_beyond_capacity_evicts_oldest_keys() {
        let rng = Rng::from_seed([6; 32]);
        let mut account = Account::from_rng(&rng).unwrap();
        assert_eq!(account.max_one_time_keys(), MAX_ONE_TIME_KEYS);

        account
            .generate_one_time_keys_from_rng(MAX_ONE_TIME_KEYS, &rng)
            .unwrap();
        account.mark_keys_as_published();

        account.generate_one_time_keys_from_rng(1, &rng).unwrap();
        assert_eq!(account.one_time_keys().len(), MAX_ONE_TIME_KEYS);

        // The oldest id was evicted, the new one sits at the end.
        assert!(account.lookup_key(0).is_none());
        let ids: Vec<u32> = account.one_time_keys().iter().map(|key| key.id()).collect();
        assert_eq!(ids.first(), Some(&1));
        assert_eq!(ids.last(), Some(&(MAX_ONE_TIME_KEYS as u32)));

        // Eviction of a published key pulled the watermark down by one.
        assert_eq!(
            account.unpublished_one_time_keys().len(),
            1,
            "only the newly generated key is unpublished"
        );
    }

    #[test]
    fn last_error_mirrors_the_most_recent_outcome() {
        let rng = Rng::from_seed([7; 32]);
        let mut account = Account::from_rng(&rng).unwrap();
        assert_eq!(account.last_error(), ErrorCode::Success);

        account.generate_one_time_keys(2, &[]).unwrap_err();
        assert_eq!(account.last_error(), ErrorCode::NotEnoughRandom);

        account.generate_one_time_keys_from_rng(2, &rng).unwrap();
        assert_eq!(account.last_error(), ErrorCode::Success);

        account.remove_key(77).unwrap_err();
        assert_eq!(account.last_error(), ErrorCode::KeyNotFound);

        account.remove_key(0).unwrap();
        assert_eq!(account.last_error(), ErrorCode::Success);

        // Conversion used by binding shims.
        let error = account.remove_key(77).unwrap_err();
        assert_eq!(ErrorCode::from(&error), ErrorCode::KeyNotFound);
    }

    #[test]
    fn identity_keys_serialize_as_hex_json() {
        let random = fixed_random(Account::RANDOM_LENGTH);
        let account = Account::from_random_bytes(&random).unwrap();
        let identity_keys = account.identity_keys();

        let json = serde_json::to_string(&identity_keys).unwrap();
        assert_eq!(
            json,
            format!(
                "{{\"curve25519\":\"{}\",\"ed25519\":\"{}\"}}",
                identity_keys.curve25519.to_hex(),
                identity_keys.ed25519.to_hex()
            )
        );

        let identity_keys_again: super::IdentityKeys = serde_json::from_str(&json).unwrap();
        assert_eq!(identity_keys_again, identity_keys);
    }
}
