// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cryptographic primitives backing the account: Curve25519 for Diffie-Hellman key agreement,
//! Ed25519 for signatures, a ChaCha20-based random number generator and a protected container
//! for secret key material.
pub mod curve25519;
pub mod ed25519;
mod rng;
mod secret;

pub use rng::{Rng, RngError};
pub(crate) use secret::Secret;
