//! Redeeming an attestable object with an attestation.
//!
//! The holder of a signed attestation proves that the attestation's identity commitment and the
//! attestable object's commitment hide the same identifier, then signs the bundle with the
//! attested key. A relying party needs only the issuer's public key to check the result.
//!
//! Encoded as `SEQUENCE { attestable, signedAttestation, proof, signature BIT STRING }`; the
//! holder's key is the attestation's subject key and is not repeated.

use crate::{attestable::Attestable, signed::SignedAttestation, types::*};
use der::{asn1::BitString, Any, Decode, Encode, Sequence};
use log::error;

#[derive(Sequence)]
struct AttestedObjectInfo {
    attestable: Any,
    signed_attestation: Any,
    proof: Any,
    signature: BitString,
}

/// An attestable object bound to a signed attestation of its recipient's identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestedObject<A: Attestable> {
    pub(crate) attestable: A,
    pub(crate) signed_attestation: SignedAttestation,
    pub(crate) proof: ProofOfExponent,
    pub(crate) signature: Vec<u8>,
}

impl<A: Attestable> AttestedObject<A> {
    /// Bind `attestable` to `signed_attestation`.
    ///
    /// `holder` must be the attested key, and the two secrets must open the attestation's and the
    /// attestable's commitments to the same identifier. Mismatched secrets are reported as
    /// [`Error::SecretMismatch`] before any proof is attempted.
    pub fn new(
        rng: &mut impl Rng,
        attestable: A,
        signed_attestation: SignedAttestation,
        holder: &KeyPair,
        attestation_secret: &Secret,
        attestable_secret: &Secret,
    ) -> Result<Self, Error> {
        let params = Parameters::global();
        let attestation = signed_attestation.attestation();
        if holder.public_key() != attestation.subject_public_key() {
            error!("holder key is not the attested key");
            return Err(Error::SignatureInvalid);
        }

        // Both commitments minus their hiding points must leave the same identity term.
        let attestation_commitment = attestation.identity_commitment();
        let attestable_commitment = attestable.commitment();
        let attested_identity = subtract(
            &attestation_commitment.to_point(),
            &scalar_multiply(params.h(), &attestation_secret.to_scalar()),
        );
        let attestable_identity = subtract(
            &attestable_commitment.to_point(),
            &scalar_multiply(params.h(), &attestable_secret.to_scalar()),
        );
        if attested_identity != attestable_identity {
            return Err(Error::SecretMismatch);
        }

        let proof = compute_equality_proof(
            rng,
            params,
            attestation_commitment,
            attestable_commitment,
            attestation_secret,
            attestable_secret,
            &[],
        )?;
        let payload = signed_payload(&attestable, &signed_attestation, &proof)?;
        let signature = sign_deterministic(&payload, holder)?;
        Self::from_parts(attestable, signed_attestation, proof, signature)
    }

    /// Assemble an attested object from its parts, checking everything.
    pub fn from_parts(
        attestable: A,
        signed_attestation: SignedAttestation,
        proof: ProofOfExponent,
        signature: Vec<u8>,
    ) -> Result<Self, Error> {
        let attested = Self {
            attestable,
            signed_attestation,
            proof,
            signature,
        };
        if let Err(error) = attested.check() {
            error!("refusing to build an attested object: {}", error);
            return Err(error);
        }
        Ok(attested)
    }

    /// Decode an attested object whose attestation was signed by `issuer_public_key`.
    pub fn from_der(bytes: &[u8], issuer_public_key: &PublicKey) -> Result<Self, Error> {
        let info = AttestedObjectInfo::from_der(bytes)?;
        let attestable = A::from_der(&info.attestable.to_der()?)?;
        let signed_attestation =
            SignedAttestation::from_der(&info.signed_attestation.to_der()?, issuer_public_key)?;
        let proof = ProofOfExponent::from_der(Parameters::global(), &info.proof.to_der()?)?;
        Self::from_parts(
            attestable,
            signed_attestation,
            proof,
            info.signature.raw_bytes().to_vec(),
        )
    }

    /// The attestable object.
    pub fn attestable(&self) -> &A {
        &self.attestable
    }

    /// The attestation of the holder's identity.
    pub fn signed_attestation(&self) -> &SignedAttestation {
        &self.signed_attestation
    }

    /// The proof that both commitments hide the same identifier.
    pub fn proof(&self) -> &ProofOfExponent {
        &self.proof
    }

    /// The holder's DER-encoded ECDSA signature.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// The holder's key, which is the attested key.
    pub fn holder_public_key(&self) -> &PublicKey {
        self.signed_attestation.attestation().subject_public_key()
    }

    /// Whether every signature and the equality proof hold.
    pub fn verify(&self) -> bool {
        self.check().is_ok()
    }

    /// Validity of both the attestable object and the attestation.
    pub fn check_validity(&self) -> bool {
        self.attestable.check_validity() && self.signed_attestation.check_validity()
    }

    /// DER encoding.
    pub fn to_der(&self) -> Result<Vec<u8>, Error> {
        let info = AttestedObjectInfo {
            attestable: Any::from_der(&self.attestable.to_der()?)?,
            signed_attestation: Any::from_der(&self.signed_attestation.to_der()?)?,
            proof: Any::from_der(&self.proof.to_der()?)?,
            signature: BitString::from_bytes(&self.signature)?,
        };
        Ok(info.to_der()?)
    }

    fn check(&self) -> Result<(), Error> {
        if !self.attestable.verify() || !self.signed_attestation.verify() {
            return Err(Error::SignatureInvalid);
        }
        if !verify_equality_proof(
            Parameters::global(),
            self.signed_attestation.attestation().identity_commitment(),
            self.attestable.commitment(),
            &self.proof,
        ) {
            return Err(Error::ProofInvalid);
        }
        let payload = signed_payload(&self.attestable, &self.signed_attestation, &self.proof)?;
        if !verify(&payload, &self.signature, self.holder_public_key()) {
            return Err(Error::SignatureInvalid);
        }
        Ok(())
    }
}

/// The bytes the holder signs: the three component encodings, concatenated.
fn signed_payload<A: Attestable>(
    attestable: &A,
    signed_attestation: &SignedAttestation,
    proof: &ProofOfExponent,
) -> Result<Vec<u8>, Error> {
    let mut payload = attestable.to_der()?;
    payload.extend(signed_attestation.to_der()?);
    payload.extend(proof.to_der()?);
    Ok(payload)
}
