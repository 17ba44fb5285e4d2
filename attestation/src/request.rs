//! A subject's request for an attestation.
//!
//! The subject proves knowledge of the secret behind the riddle `secret·H` and signs the request
//! with the key to be attested. The issuer checks both and commits to the requested identifier
//! using the riddle; see [`Attestation::from_request`](crate::attestation::Attestation::from_request).

use crate::types::*;
use der::{asn1::BitString, Any, Decode, Encode, Sequence};
use log::error;

#[derive(Sequence)]
struct RequestInfo {
    identifier: String,
    identifier_type: u32,
    proof: Any,
}

#[derive(Sequence)]
struct SignedRequestInfo {
    request: RequestInfo,
    public_key: BitString,
    signature: BitString,
}

/// A signed request to attest an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationRequest {
    identifier: String,
    identifier_type: IdentifierType,
    proof: ProofOfExponent,
    public_key: PublicKey,
    signature: Vec<u8>,
}

impl AttestationRequest {
    /// Build a request for `identifier`, proving knowledge of `secret` and signing with `keys`.
    pub fn new(
        rng: &mut impl Rng,
        identifier: impl Into<String>,
        identifier_type: IdentifierType,
        secret: &Secret,
        keys: &KeyPair,
    ) -> Result<Self, Error> {
        let identifier = identifier.into();
        let proof = compute_attestation_proof(rng, Parameters::global(), secret, &[])?;
        let payload = request_info(&identifier, identifier_type, &proof)?.to_der()?;
        let request = Self {
            identifier,
            identifier_type,
            proof,
            public_key: keys.public_key().clone(),
            signature: sign_deterministic(&payload, keys)?,
        };
        if !request.verify() {
            error!("freshly built attestation request does not verify");
            return Err(Error::ProofInvalid);
        }
        Ok(request)
    }

    /// Decode a request and check it.
    pub fn from_der(bytes: &[u8]) -> Result<Self, Error> {
        let info = SignedRequestInfo::from_der(bytes)?;
        let request = Self {
            identifier_type: IdentifierType::try_from(info.request.identifier_type)?,
            identifier: info.request.identifier,
            proof: ProofOfExponent::from_der(Parameters::global(), &info.request.proof.to_der()?)?,
            public_key: PublicKey::from_bytes(info.public_key.raw_bytes())?,
            signature: info.signature.raw_bytes().to_vec(),
        };
        if !request.verify() {
            error!("decoded attestation request does not verify");
            return Err(Error::ProofInvalid);
        }
        Ok(request)
    }

    /// The identifier to be attested.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The kind of identifier.
    pub fn identifier_type(&self) -> IdentifierType {
        self.identifier_type
    }

    /// The proof of knowledge of the secret behind the riddle.
    pub fn proof(&self) -> &ProofOfExponent {
        &self.proof
    }

    /// The key to be attested.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Whether the proof holds and the requester's signature covers the request.
    pub fn verify(&self) -> bool {
        if !verify_attestation_request_proof(Parameters::global(), &self.proof) {
            return false;
        }
        match request_info(&self.identifier, self.identifier_type, &self.proof)
            .and_then(|info| info.to_der().map_err(Error::from))
        {
            Ok(payload) => verify(&payload, &self.signature, &self.public_key),
            Err(_) => false,
        }
    }

    /// DER encoding.
    pub fn to_der(&self) -> Result<Vec<u8>, Error> {
        let info = SignedRequestInfo {
            request: request_info(&self.identifier, self.identifier_type, &self.proof)?,
            public_key: BitString::from_bytes(&self.public_key.to_bytes())?,
            signature: BitString::from_bytes(&self.signature)?,
        };
        Ok(info.to_der()?)
    }
}

fn request_info(
    identifier: &str,
    identifier_type: IdentifierType,
    proof: &ProofOfExponent,
) -> Result<RequestInfo, Error> {
    Ok(RequestInfo {
        identifier: identifier.to_owned(),
        identifier_type: identifier_type.tag(),
        proof: Any::from_der(&proof.to_der()?)?,
    })
}
