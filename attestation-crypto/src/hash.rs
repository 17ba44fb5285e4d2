//! Hashing byte strings and identifiers into scalars.
//!
//! Digests are never reduced modulo the group order. A digest at or above the order is hashed
//! again until one lands below it, so the resulting scalars are uniform.

use crate::{
    common::*,
    curve::{bigint_from_be, ELEMENT_BYTES},
};
use log::trace;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;

/// Keccak-256 digest of the input.
pub fn keccak256(bytes: impl AsRef<[u8]>) -> [u8; ELEMENT_BYTES] {
    let mut out = [0; ELEMENT_BYTES];
    out.copy_from_slice(&Keccak256::digest(bytes.as_ref()));
    out
}

/// Interpret a digest as a big-endian integer; `None` if it is not below the group order.
pub(crate) fn digest_to_scalar(digest: &[u8; ELEMENT_BYTES]) -> Option<Scalar> {
    Scalar::from_bigint(bigint_from_be(digest))
}

/// Map arbitrary bytes to a uniformly distributed scalar by rejection sampling over Keccak-256.
pub fn map_to_scalar(bytes: &[u8]) -> Scalar {
    let mut digest = keccak256(bytes);
    loop {
        if let Some(scalar) = digest_to_scalar(&digest) {
            return scalar;
        }
        trace!("digest exceeds the group order; rehashing");
        digest = keccak256(digest);
    }
}

/// The kind of off-chain identifier an attestation is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentifierType {
    /// A telephone number.
    Phone,
    /// An email address.
    Email,
}

impl IdentifierType {
    /// Numeric tag hashed into identity multipliers and written on the wire.
    pub fn tag(self) -> u32 {
        match self {
            IdentifierType::Phone => 0,
            IdentifierType::Email => 1,
        }
    }
}

impl TryFrom<u32> for IdentifierType {
    type Error = Error;

    fn try_from(tag: u32) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(IdentifierType::Phone),
            1 => Ok(IdentifierType::Email),
            _ => Err(Error::MalformedEncoding),
        }
    }
}

impl fmt::Display for IdentifierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierType::Phone => write!(f, "phone"),
            IdentifierType::Email => write!(f, "email"),
        }
    }
}

/// Map an identifier of the given type to the scalar that multiplies `G` in its commitment.
///
/// The identifier is hashed exactly as given. Whitespace and case are significant.
pub fn map_identity_to_multiplier(identifier_type: IdentifierType, identifier: &str) -> Scalar {
    let mut bytes = Vec::with_capacity(4 + identifier.len());
    bytes.extend_from_slice(&identifier_type.tag().to_be_bytes());
    bytes.extend_from_slice(identifier.as_bytes());
    map_to_scalar(&bytes)
}
