//! This crate includes the cryptographic primitives behind identity attestations:
//! - Arithmetic on the prime-order group G1 of BN254, with two generators derived by
//!   try-and-increment so that nobody knows a discrete log relation between them.
//! - Rejection-sampled hashing of byte strings and identifiers into scalars.
//! - Pedersen-style commitments to an identifier under a secret blinding scalar.
//! - Schnorr-style zero-knowledge proofs of knowledge of an exponent, and of equality of the
//!   identities hidden in two commitments.
//! - Deterministic and randomized ECDSA over secp256k1 with low-S normalization.

#![warn(missing_docs)]
#![warn(missing_copy_implementations, missing_debug_implementations)]
#![warn(unused_qualifications, unused_results)]
#![warn(future_incompatible)]
#![warn(unused)]
#![forbid(rustdoc::broken_intra_doc_links)]

pub mod curve;
pub mod ecdsa;
pub mod hash;
pub mod pedersen;
pub mod proofs;

mod serde;

pub use crate::serde::SerializeElement;

use crate::common::*;
use ::serde::*;
use thiserror::*;

/// Error types that may arise from cryptographic operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The bytes do not parse into the expected structure.
    #[error("bytes do not decode to the expected structure")]
    MalformedEncoding,
    /// The bytes are not a curve point, or encode the point at infinity where it is disallowed.
    #[error("not a valid curve point, or the point at infinity")]
    InvalidPoint,
    /// A signature failed to verify.
    #[error("signature failed to verify")]
    SignatureInvalid,
    /// A proof failed to verify.
    #[error("proof failed to verify")]
    ProofInvalid,
    /// A caller-supplied secret does not reproduce the claimed commitment.
    #[error("secret does not open the commitment")]
    SecretMismatch,
    /// The curve order is outside the accepted bit-length band.
    #[error("curve order has {bits} bits, expected 254")]
    UnsafeCurveParameters {
        /// Bit length of the rejected order.
        bits: u32,
    },
}

impl From<der::Error> for Error {
    fn from(_: der::Error) -> Self {
        Error::MalformedEncoding
    }
}

/// Secret blinding scalar for an identity commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret(#[serde(with = "SerializeElement")] Scalar);

impl Secret {
    /// Generate a new non-zero secret uniformly at random.
    pub fn new(rng: &mut impl Rng) -> Self {
        Self(random_non_zero(rng))
    }

    /// Construct a secret from the scalar representing it.
    ///
    /// **warning:** secrets built from guessable scalars hide nothing.
    pub fn from_scalar(scalar: Scalar) -> Self {
        Self(scalar)
    }

    /// Convert to the inner scalar representing this secret.
    pub fn to_scalar(&self) -> Scalar {
        self.0
    }

    /// Big-endian encoding of the secret.
    pub fn to_bytes(&self) -> [u8; 32] {
        curve::scalar_to_bytes(&self.0)
    }

    /// Decode a secret from its big-endian encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        curve::scalar_from_bytes(bytes)
            .map(Self)
            .ok_or(Error::MalformedEncoding)
    }
}

impl From<u64> for Secret {
    fn from(value: u64) -> Self {
        Self(Scalar::from(value))
    }
}

mod common {
    //! Common types used internally.

    pub use crate::{curve::Parameters, Error, Secret};
    pub use ark_bn254::{Fq, Fr as Scalar, G1Affine as Point};
    pub use ark_ec::{AffineRepr, CurveGroup};
    pub use ark_ff::{BigInteger, Field, PrimeField, Zero};
    pub use ark_std::UniformRand;

    /// A trait synonym for a cryptographically secure random number generator. This trait is
    /// blanket-implemented for all valid types and will never need to be implemented by-hand.
    pub trait Rng: rand::CryptoRng + rand::RngCore {}
    impl<T: rand::CryptoRng + rand::RngCore> Rng for T {}

    /// Select a non-zero scalar uniformly at random.
    pub fn random_non_zero(rng: &mut impl Rng) -> Scalar {
        loop {
            let s = Scalar::rand(&mut *rng);
            if !s.is_zero() {
                return s;
            }
        }
    }
}

pub use common::{Point, Rng, Scalar};
pub use curve::Parameters;

#[cfg(test)]
mod test {
    use rand::SeedableRng;

    pub(crate) fn rng() -> impl crate::Rng {
        rand::rngs::StdRng::from_seed(*b"NEVER USE THIS FOR ANYTHING REAL")
    }
}
