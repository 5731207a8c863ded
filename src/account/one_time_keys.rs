// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded pool of one-time pre-keys.
//!
//! One-time keys are Curve25519 key pairs other parties consume to establish an encrypted
//! session with this device. The pool keeps them in insertion order (oldest first) and is
//! capped at [`MAX_ONE_TIME_KEYS`] entries: generating beyond the cap evicts the oldest keys,
//! published or not. A watermark records how many of the oldest entries were already uploaded
//! to a key-distribution service, so the keys still awaiting upload are always the suffix.
use crate::crypto::curve25519;

/// Identifier of a one-time key, unique for the lifetime of an account.
///
/// Ids come from a monotonically increasing counter and are never reused, even after the key
/// was removed or evicted. A stale id therefore resolves to "not found" rather than to a
/// different key.
pub type OneTimeKeyId = u32;

/// Maximum number of one-time keys an account holds at once.
///
/// The cap bounds account state and pickle size. Clients are expected to keep roughly this
/// many keys available on their key-distribution service.
pub const MAX_ONE_TIME_KEYS: usize = 100;

/// One-time pre-key together with the id it was issued under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OneTimeKey {
    id: OneTimeKeyId,
    key: curve25519::KeyPair,
}

impl OneTimeKey {
    pub(crate) fn new(id: OneTimeKeyId, key: curve25519::KeyPair) -> Self {
        Self { id, key }
    }

    pub fn id(&self) -> OneTimeKeyId {
        self.id
    }

    pub fn public_key(&self) -> curve25519::PublicKey {
        self.key.public_key()
    }

    pub(crate) fn key_pair(&self) -> &curve25519::KeyPair {
        &self.key
    }
}

/// Insertion-ordered one-time key storage with the published watermark.
#[derive(Debug)]
pub(crate) struct OneTimeKeys {
    keys: Vec<OneTimeKey>,
    published: usize,
}

impl OneTimeKeys {
    pub(crate) fn new() -> Self {
        Self {
            keys: Vec::new(),
            published: 0,
        }
    }

    pub(crate) fn from_parts(keys: Vec<OneTimeKey>, published: usize) -> Self {
        Self { keys, published }
    }

    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn published_count(&self) -> usize {
        self.published
    }

    pub(crate) fn as_slice(&self) -> &[OneTimeKey] {
        &self.keys
    }

    pub(crate) fn unpublished(&self) -> &[OneTimeKey] {
        &self.keys[self.published..]
    }

    /// Appends a key, evicting the oldest entry first when the pool is full.
    pub(crate) fn insert(&mut self, key: OneTimeKey) {
        if self.keys.len() == MAX_ONE_TIME_KEYS {
            self.keys.remove(0);
            // Index 0 lies inside the published prefix whenever one exists.
            self.published = self.published.saturating_sub(1);
        }
        self.keys.push(key);
    }

    pub(crate) fn lookup(&self, id: OneTimeKeyId) -> Option<&curve25519::KeyPair> {
        self.keys.iter().find(|key| key.id == id).map(|key| &key.key)
    }

    /// Removes the key with the given id, returning its position in insertion order.
    pub(crate) fn remove(&mut self, id: OneTimeKeyId) -> Option<usize> {
        let position = self.keys.iter().position(|key| key.id == id)?;
        self.keys.remove(position);
        if position < self.published {
            self.published -= 1;
        }
        Some(position)
    }

    pub(crate) fn mark_as_published(&mut self) {
        self.published = self.keys.len();
    }
}
