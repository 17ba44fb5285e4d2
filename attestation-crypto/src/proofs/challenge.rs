//! Functionality for building challenge scalars.
//!
//! Public inputs are absorbed into a Keccak-256 state in the order they are supplied. A digest at
//! or above the group order does not produce a challenge at all; provers start over with fresh
//! randomness and verifiers reject, so challenges are never reduced.

use crate::{
    common::*,
    curve::{encode_point, ELEMENT_BYTES},
    hash::digest_to_scalar,
    pedersen::Commitment,
};
use sha3::{Digest, Keccak256};

/// A trait implemented by types which can feed their public components into a [`ChallengeBuilder`].
pub trait ChallengeDigest {
    /// Incorporate public components of this type into a [`ChallengeBuilder`].
    fn digest(&self, builder: &mut ChallengeBuilder);
}

impl<'a, T: ChallengeDigest> ChallengeDigest for &'a T {
    fn digest(&self, builder: &mut ChallengeBuilder) {
        (**self).digest(builder);
    }
}

impl ChallengeDigest for Point {
    fn digest(&self, builder: &mut ChallengeBuilder) {
        builder.digest_bytes(encode_point(self, false));
    }
}

impl ChallengeDigest for Commitment {
    fn digest(&self, builder: &mut ChallengeBuilder) {
        builder.digest(&self.0);
    }
}

/// A challenge scalar for use in a Schnorr-style proof.
#[derive(Debug, Clone, Copy)]
pub struct Challenge(Scalar);

impl Challenge {
    /// Retrieve the internal scalar value.
    pub fn to_scalar(self) -> Scalar {
        self.0
    }
}

/// Holds state used when building a [`Challenge`] using the Fiat-Shamir heuristic, as in a
/// non-interactive Schnorr proof.
#[derive(Debug, Clone)]
#[allow(missing_copy_implementations)]
pub struct ChallengeBuilder {
    hasher: Keccak256,
}

impl Default for ChallengeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChallengeBuilder {
    /// Initialize a new, empty challenge.
    pub fn new() -> Self {
        Self {
            hasher: Keccak256::new(),
        }
    }

    /// Incorporate public data from some given type into the challenge.
    pub fn digest<T: ChallengeDigest>(&mut self, object: &T) {
        object.digest(self);
    }

    /// A conveniently chainable variant of [`ChallengeBuilder::digest`].
    pub fn with<T: ChallengeDigest>(mut self, object: &T) -> Self {
        object.digest(&mut self);
        self
    }

    /// Incorporate arbitrary bytes into the challenge.
    pub fn digest_bytes(&mut self, bytes: impl AsRef<[u8]>) {
        self.hasher.update(bytes);
    }

    /// A conveniently chainable variant of [`ChallengeBuilder::digest_bytes`].
    pub fn with_bytes(mut self, bytes: impl AsRef<[u8]>) -> Self {
        self.digest_bytes(bytes);
        self
    }

    /// Consume the builder and generate a [`Challenge`] from the accumulated data.
    ///
    /// Returns `None` if the digest, read as a big-endian integer, is not below the group order.
    pub fn finish(self) -> Option<Challenge> {
        let mut digested = [0; ELEMENT_BYTES];
        digested.copy_from_slice(self.hasher.finalize().as_ref());
        digest_to_scalar(&digested).map(Challenge)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn order_of_inputs_matters() {
        let params = Parameters::global();
        let forward = ChallengeBuilder::new().with(params.g()).with(params.h());
        let backward = ChallengeBuilder::new().with(params.h()).with(params.g());
        let (forward, backward) = (forward.hasher.finalize(), backward.hasher.finalize());
        assert_ne!(forward, backward);
    }

    #[test]
    fn points_are_hashed_uncompressed() {
        let params = Parameters::global();
        let direct = ChallengeBuilder::new().with(params.g()).hasher.finalize();
        let bytes = ChallengeBuilder::new()
            .with_bytes(encode_point(params.g(), false))
            .hasher
            .finalize();
        assert_eq!(direct, bytes);
    }

    #[test]
    fn challenges_are_below_the_order_or_absent() {
        let mut accepted = 0;
        for i in 0u32..64 {
            if let Some(challenge) = ChallengeBuilder::new().with_bytes(i.to_be_bytes()).finish() {
                assert!(challenge.to_scalar().into_bigint() < Scalar::MODULUS);
                accepted += 1;
            }
        }
        // Roughly a fifth of all 256-bit digests fall below the order.
        assert!(accepted > 0 && accepted < 64);
    }
}
