// SPDX-License-Identifier: MIT OR Apache-2.0

//! Device accounts with identity keys and one-time pre-keys for end-to-end encrypted
//! messaging.
//!
//! Every device owns one [`Account`]: a permanent Curve25519 identity key pair for
//! Diffie-Hellman key agreement, an Ed25519 key pair for signing and a bounded pool of
//! single-use Curve25519 pre-keys. Peers combine the public identity key with one published
//! pre-key to establish an encrypted session towards the device even while it is offline;
//! the signing key authenticates everything the device publishes.
//!
//! ## Deterministic key generation
//!
//! The account never talks to a system random number generator on its own. Callers pass
//! random bytes in and key material is derived from them deterministically, with
//! [`Account::RANDOM_LENGTH`] and [`Account::one_time_keys_random_length`] reporting the
//! exact requirement up front. This keeps entropy handling auditable and makes every
//! operation reproducible under test. The bundled [`Rng`] is one possible source of those
//! bytes.
//!
//! ## Persistence
//!
//! Full account state serializes into a canonical binary "pickle" and back, byte-for-byte
//! reversible, see [`Account::pickle`] and [`Account::from_pickle`]. The pickle contains
//! secret key material; encrypting it before it touches disk is the caller's concern.
//!
//! All secret key material held by this crate is zeroised on drop.
//!
//! ```
//! use p2panda_account::{Account, Rng};
//!
//! let rng = Rng::default();
//!
//! // A new device account with fresh identity and signing keys.
//! let mut account = Account::from_rng(&rng)?;
//!
//! // Generate a batch of one-time pre-keys and upload it to a key-distribution service.
//! account.generate_one_time_keys_from_rng(10, &rng)?;
//! let upload = account.unpublished_one_time_keys();
//! assert_eq!(upload.len(), 10);
//! account.mark_keys_as_published();
//!
//! // Persist the account across restarts.
//! let pickle = account.pickle();
//! let restored = Account::from_pickle(&pickle)?;
//! assert_eq!(restored.identity_keys(), account.identity_keys());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod account;
pub mod crypto;
mod pickle;
mod serde;

pub use account::{
    Account, AccountError, ErrorCode, IdentityKeys, MAX_ONE_TIME_KEYS, OneTimeKey, OneTimeKeyId,
};
pub use crypto::{Rng, RngError};
pub use pickle::PickleError;
