// SPDX-License-Identifier: MIT OR Apache-2.0

//! Binary serialization of full account state.
//!
//! The pickle is a dense positional encoding with all integers 32-bit big-endian:
//!
//! - version tag (4 bytes)
//! - identity public key (32), identity secret key (32)
//! - signing public key (32), signing secret key (32)
//! - one-time key count `n` (4)
//! - `n` records, oldest first: key id (4), public key (32), secret key (32)
//! - published count (4)
//! - next key id (4)
//!
//! The format is wire-stable: encoders of any library version produce bit-identical output for
//! the same state. Changes are additive only; new fields are appended and decoders ignore
//! trailing bytes they do not know, so old pickles stay readable and new ones degrade
//! gracefully on old builds.
//!
//! The produced bytes contain secret key material. The storage layer is expected to wrap them
//! in authenticated encryption before persisting; that wrapping lives above this crate.
use zeroize::Zeroizing;

use crate::account::one_time_keys::{MAX_ONE_TIME_KEYS, OneTimeKey, OneTimeKeyId, OneTimeKeys};
use crate::account::{Account, ErrorCode};
use crate::crypto::{curve25519, ed25519};
use crate::pickle::{PickleError, Reader, Writer};

/// Version tag written at the start of every pickle.
const PICKLE_VERSION: u32 = 1;

/// Encoded size of a u32 field (version tag, list length, published count, id counter).
const U32_SIZE: usize = 4;

/// Encoded size of one one-time key record: id, public key, secret key.
const ONE_TIME_KEY_SIZE: usize = U32_SIZE + curve25519::PUBLIC_KEY_SIZE + curve25519::SECRET_KEY_SIZE;

/// Encoded size of everything outside the one-time key records.
const BASE_SIZE: usize = U32_SIZE
    + curve25519::PUBLIC_KEY_SIZE
    + curve25519::SECRET_KEY_SIZE
    + ed25519::PUBLIC_KEY_SIZE
    + ed25519::SECRET_KEY_SIZE
    + U32_SIZE
    + U32_SIZE
    + U32_SIZE;

impl Account {
    /// Exact length in bytes of the pickle [`Account::pickle`] currently produces.
    ///
    /// Lets callers allocate storage buffers up front; the length only changes when one-time
    /// keys are added or removed.
    pub fn pickle_length(&self) -> usize {
        BASE_SIZE + self.one_time_keys.len() * ONE_TIME_KEY_SIZE
    }

    /// Serializes the complete account state into its canonical binary form.
    ///
    /// The output contains secret key material and is therefore returned in a zeroising
    /// buffer.
    pub fn pickle(&self) -> Zeroizing<Vec<u8>> {
        let mut writer = Writer::new(self.pickle_length());

        writer.write_u32(PICKLE_VERSION);
        writer.write_bytes(self.identity_key.public_key().as_bytes());
        writer.write_bytes(self.identity_key.secret_key().as_bytes());
        writer.write_bytes(self.signing_key.public_key().as_bytes());
        writer.write_bytes(self.signing_key.secret_key().as_bytes());

        let keys = self.one_time_keys.as_slice();
        writer.write_u32(keys.len() as u32);
        for key in keys {
            writer.write_u32(key.id());
            writer.write_bytes(key.key_pair().public_key().as_bytes());
            writer.write_bytes(key.key_pair().secret_key().as_bytes());
        }

        writer.write_u32(self.one_time_keys.published_count() as u32);
        writer.write_u32(self.next_key_id);

        Zeroizing::new(writer.finish())
    }

    /// Restores an account from the canonical binary form produced by [`Account::pickle`].
    ///
    /// Decoding validates everything the encoder guarantees: a known version tag, a pool
    /// within capacity, strictly increasing ids, a published count within the pool length and
    /// an id counter above every stored id. On any error no account is constructed.
    pub fn from_pickle(pickle: &[u8]) -> Result<Self, PickleError> {
        let mut reader = Reader::new(pickle);

        let version = reader.read_u32()?;
        if version != PICKLE_VERSION {
            return Err(PickleError::UnsupportedVersion(version));
        }

        let identity_public = curve25519::PublicKey::from_bytes(reader.read_array()?);
        let identity_secret = curve25519::SecretKey::from_bytes(reader.read_array()?);
        let identity_key = curve25519::KeyPair::from_parts(identity_public, identity_secret);

        let signing_public = ed25519::PublicKey::from_bytes(reader.read_array()?);
        let signing_secret = ed25519::SecretKey::from_bytes(reader.read_array()?);
        let signing_key = ed25519::KeyPair::from_parts(signing_public, signing_secret);

        let count = reader.read_u32()? as usize;
        if count > MAX_ONE_TIME_KEYS {
            return Err(PickleError::CorruptedData(
                "one-time key count exceeds capacity",
            ));
        }

        let mut keys = Vec::with_capacity(count);
        let mut last_id: Option<OneTimeKeyId> = None;
        for _ in 0..count {
            let id = reader.read_u32()?;
            if last_id.is_some_and(|last| id <= last) {
                return Err(PickleError::CorruptedData("one-time key ids out of order"));
            }
            last_id = Some(id);

            let public_key = curve25519::PublicKey::from_bytes(reader.read_array()?);
            let secret_key = curve25519::SecretKey::from_bytes(reader.read_array()?);
            keys.push(OneTimeKey::new(
                id,
                curve25519::KeyPair::from_parts(public_key, secret_key),
            ));
        }

        let published = reader.read_u32()? as usize;
        if published > count {
            return Err(PickleError::CorruptedData(
                "published count exceeds stored keys",
            ));
        }

        let next_key_id = reader.read_u32()?;
        if last_id.is_some_and(|last| next_key_id <= last) {
            return Err(PickleError::CorruptedData(
                "id counter lies below an issued id",
            ));
        }

        Ok(Self {
            identity_key,
            signing_key,
            one_time_keys: OneTimeKeys::from_parts(keys, published),
            next_key_id,
            last_error: ErrorCode::Success,
        })
    }
}
