//! Pedersen commitments \[1\] binding an identifier to a secret.
//!
//! A commitment to identifier `id` of type `t` under secret `s` is the point
//! `multiplier(t, id)·G + s·H`, where the multiplier comes from
//! [`map_identity_to_multiplier`](crate::hash::map_identity_to_multiplier). The same identity
//! committed under two secrets yields two points whose difference is a known multiple of `H`;
//! this is what the equality proof in [`proofs`](crate::proofs) relies on.
//!
//! ```
//! # use attestation_crypto::{curve::Parameters, hash::IdentifierType, pedersen::Commitment, Secret};
//! # let mut rng = rand::thread_rng();
//! let params = Parameters::global();
//! let secret = Secret::new(&mut rng);
//! let commitment = Commitment::new(params, "alice@example.com", IdentifierType::Email, &secret)?;
//! assert!(commitment.verify_opening(params, "alice@example.com", IdentifierType::Email, &secret));
//! # Ok::<(), attestation_crypto::Error>(())
//! ```
//!
//! ## References
//!
//! 1. Torben Pyrds Pedersen. "Non-interactive and information-theoretic secure verifiable secret
//!    sharing". 1992. URL: <https://www.cs.cornell.edu/courses/cs754/2001fa/129.PDF>

use crate::{
    common::*,
    curve::{decode_point, encode_point, scalar_multiply},
    hash::{map_identity_to_multiplier, IdentifierType},
    serde::SerializeElement,
};
use serde::{Deserialize, Serialize};

/// A commitment to an identity. Never the point at infinity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment(#[serde(with = "SerializeElement")] pub(crate) Point);

impl Commitment {
    /// Commit to an identifier of the given type under a secret.
    pub fn new(
        params: &Parameters,
        identifier: &str,
        identifier_type: IdentifierType,
        secret: &Secret,
    ) -> Result<Self, Error> {
        let hiding = scalar_multiply(params.h(), &secret.to_scalar());
        Self::with_hiding_point(params, identifier, identifier_type, &hiding)
    }

    /// Commit to an identifier using an already-computed hiding point `secret·H`.
    ///
    /// An issuer uses this with the riddle of a verified attestation request, so it never
    /// learns the secret itself.
    pub fn with_hiding_point(
        params: &Parameters,
        identifier: &str,
        identifier_type: IdentifierType,
        hiding: &Point,
    ) -> Result<Self, Error> {
        let multiplier = map_identity_to_multiplier(identifier_type, identifier);
        let point = (*params.g() * multiplier + hiding).into_affine();
        Self::from_point(point)
    }

    /// Wrap a point as a commitment, rejecting infinity.
    pub fn from_point(point: Point) -> Result<Self, Error> {
        if point.infinity {
            return Err(Error::InvalidPoint);
        }
        Ok(Self(point))
    }

    /// The committed point.
    pub fn to_point(&self) -> Point {
        self.0
    }

    /// Check that the commitment opens to the given identifier and secret.
    pub fn verify_opening(
        &self,
        params: &Parameters,
        identifier: &str,
        identifier_type: IdentifierType,
        secret: &Secret,
    ) -> bool {
        matches!(
            Self::new(params, identifier, identifier_type, secret),
            Ok(expected) if expected == *self
        )
    }

    /// Uncompressed encoding of the committed point.
    pub fn to_bytes(&self) -> Vec<u8> {
        encode_point(&self.0, false)
    }

    /// Decode a commitment from either point encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        decode_point(bytes).map(Self)
    }
}

/// Commit to an identifier of the given type under a secret and encode the result.
pub fn make_commitment(
    params: &Parameters,
    identifier: &str,
    identifier_type: IdentifierType,
    secret: &Secret,
) -> Result<Vec<u8>, Error> {
    Commitment::new(params, identifier, identifier_type, secret).map(|c| c.to_bytes())
}

/// Commit to an identifier given the hiding point `secret·H` and encode the result.
pub fn make_commitment_with_hiding_point(
    params: &Parameters,
    identifier: &str,
    identifier_type: IdentifierType,
    hiding: &Point,
) -> Result<Vec<u8>, Error> {
    Commitment::with_hiding_point(params, identifier, identifier_type, hiding).map(|c| c.to_bytes())
}
