//! Objects that can be redeemed against an attestation.
//!
//! An attestable object is issued by a sender, carries its own commitment to the recipient's
//! identity and its sender's signature, and can be bound to a matching attestation in an
//! [`AttestedObject`](crate::attested::AttestedObject).

use crate::types::*;

/// A signed payload carrying a commitment to an identity.
///
/// Implementations verify themselves when built or decoded, so a value of an implementing type
/// has verified at least once.
pub trait Attestable: Sized {
    /// The commitment to the recipient's identity.
    fn commitment(&self) -> &Commitment;

    /// The sender's DER-encoded ECDSA signature.
    fn signature(&self) -> &[u8];

    /// The sender's key.
    fn public_key(&self) -> &PublicKey;

    /// Whether the sender's signature covers the payload and commitment.
    fn verify(&self) -> bool;

    /// Structural and time validity, independent of [`Attestable::verify`].
    fn check_validity(&self) -> bool;

    /// Canonical DER encoding, including the public key and signature.
    fn to_der(&self) -> Result<Vec<u8>, Error>;

    /// Decode and verify.
    fn from_der(bytes: &[u8]) -> Result<Self, Error>;
}
