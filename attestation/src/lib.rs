/*!
This crate describes the identity-attestation protocol built on the primitives in
`attestation-crypto`.

A subject proves to an issuer that it knows the secret behind a riddle and holds a signing key
([`request::AttestationRequest`]). The issuer signs an [`attestation::Attestation`] committing to
the subject's identifier under that riddle, without learning the secret
([`signed::SignedAttestation`]). Independently, a sender issues an [`Attestable`] object such as a
[`cheque::Cheque`] or [`ticket::Ticket`] committed to the same identifier under a fresh secret.
The subject redeems it by proving that both commitments hide the same identity, in an
[`attested::AttestedObject`] signed with the attested key.

Each object checks itself as it is built or decoded; an object that does not verify is never
returned. `verify` methods report cryptographic soundness, `check_validity` methods report
structure and expiry, and the two are deliberately separate.
 */
#![warn(missing_docs)]
#![warn(missing_copy_implementations, missing_debug_implementations)]
#![warn(unused_qualifications, unused_results)]
#![warn(future_incompatible)]
#![warn(unused)]
#![forbid(rustdoc::broken_intra_doc_links)]
pub mod attestable;
pub mod attestation;
pub mod attested;
pub mod cheque;
pub mod envelope;
pub mod request;
pub mod signed;
pub mod ticket;

pub use attestable::Attestable;
pub use attestation_crypto::{
    ecdsa::{KeyPair, PublicKey},
    hash::IdentifierType,
    Error, Rng, Secret,
};

mod validity;

#[allow(unused)]
mod types {
    pub use attestation_crypto::{
        curve::{scalar_multiply, subtract},
        ecdsa::{sign_deterministic, verify, KeyPair, PublicKey},
        hash::IdentifierType,
        pedersen::Commitment,
        proofs::{
            compute_attestation_proof, compute_equality_proof, verify_attestation_request_proof,
            verify_equality_proof, ProofOfExponent,
        },
        Error, Parameters, Rng, Secret,
    };
}
