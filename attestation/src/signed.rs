//! Attestations signed by their issuer.
//!
//! Encoded as `SEQUENCE { attestation, AlgorithmIdentifier, signature BIT STRING }`. Both
//! constructors verify the signature and refuse to produce an unverifiable object.

use crate::{
    attestation::{AlgorithmIdentifier, Attestation},
    types::*,
};
use der::{asn1::BitString, Any, Decode, Encode, Sequence};
use log::error;

#[derive(Sequence)]
struct SignedAttestationInfo {
    attestation: Any,
    algorithm: AlgorithmIdentifier,
    signature: BitString,
}

/// An attestation together with its issuer's signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedAttestation {
    pub(crate) attestation: Attestation,
    pub(crate) signature: Vec<u8>,
    pub(crate) issuer_public_key: PublicKey,
}

impl SignedAttestation {
    /// Sign an attestation as its issuer.
    pub fn new(attestation: Attestation, issuer: &KeyPair) -> Result<Self, Error> {
        let signature = sign_deterministic(&attestation.to_der()?, issuer)?;
        let signed = Self {
            attestation,
            signature,
            issuer_public_key: issuer.public_key().clone(),
        };
        if !signed.verify() {
            error!("freshly signed attestation does not verify");
            return Err(Error::SignatureInvalid);
        }
        Ok(signed)
    }

    /// Decode a signed attestation and verify it against the issuer's key.
    pub fn from_der(bytes: &[u8], issuer_public_key: &PublicKey) -> Result<Self, Error> {
        let info = SignedAttestationInfo::from_der(bytes)?;
        if info.algorithm != AlgorithmIdentifier::ecdsa() {
            return Err(Error::MalformedEncoding);
        }
        let signed = Self {
            attestation: Attestation::from_der(&info.attestation.to_der()?)?,
            signature: info.signature.raw_bytes().to_vec(),
            issuer_public_key: issuer_public_key.clone(),
        };
        if !signed.verify() {
            error!("decoded attestation is not signed by the given issuer");
            return Err(Error::SignatureInvalid);
        }
        Ok(signed)
    }

    /// The signed attestation.
    pub fn attestation(&self) -> &Attestation {
        &self.attestation
    }

    /// The issuer's DER-encoded ECDSA signature.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// The key the signature verifies under.
    pub fn issuer_public_key(&self) -> &PublicKey {
        &self.issuer_public_key
    }

    /// Whether the issuer's signature covers the attestation as it currently encodes.
    pub fn verify(&self) -> bool {
        match self.attestation.to_der() {
            Ok(bytes) => verify(&bytes, &self.signature, &self.issuer_public_key),
            Err(_) => false,
        }
    }

    /// Structural and time validity of the attestation.
    pub fn check_validity(&self) -> bool {
        self.attestation.check_validity()
    }

    /// DER encoding.
    pub fn to_der(&self) -> Result<Vec<u8>, Error> {
        let info = SignedAttestationInfo {
            attestation: Any::from_der(&self.attestation.to_der()?)?,
            algorithm: AlgorithmIdentifier::ecdsa(),
            signature: BitString::from_bytes(&self.signature)?,
        };
        Ok(info.to_der()?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{Duration, Utc};

    fn signed(rng: &mut impl Rng) -> (SignedAttestation, KeyPair) {
        let issuer = KeyPair::new(&mut *rng);
        let subject = KeyPair::new(&mut *rng);
        let secret = Secret::new(&mut *rng);
        let commitment = Commitment::new(
            Parameters::global(),
            "+4512345678",
            IdentifierType::Phone,
            &secret,
        )
        .unwrap();
        let mut attestation = Attestation::new(commitment, subject.public_key().clone());
        attestation.set_issuer("CN=attestation.id");
        attestation.set_validity(Utc::now(), Utc::now() + Duration::days(365));
        (SignedAttestation::new(attestation, &issuer).unwrap(), issuer)
    }

    #[test]
    fn signed_attestation_verifies_and_decodes() {
        let mut rng = crate::test::rng();
        let (signed, issuer) = signed(&mut rng);
        assert!(signed.verify());
        assert!(signed.check_validity());

        let encoded = signed.to_der().unwrap();
        let decoded = SignedAttestation::from_der(&encoded, issuer.public_key()).unwrap();
        assert_eq!(decoded, signed);
        assert_eq!(decoded.to_der().unwrap(), encoded);
    }

    #[test]
    fn wrong_issuer_key_is_refused() {
        let mut rng = crate::test::rng();
        let (signed, _) = signed(&mut rng);
        let other = KeyPair::new(&mut rng);
        assert_eq!(
            SignedAttestation::from_der(&signed.to_der().unwrap(), other.public_key()),
            Err(Error::SignatureInvalid)
        );
    }

    #[test]
    fn tampering_breaks_the_signature() {
        let mut rng = crate::test::rng();
        let (signed, _) = signed(&mut rng);

        let mut bad = signed.clone();
        bad.attestation.serial_number += 1;
        assert!(!bad.verify());
        assert!(bad.check_validity());

        let mut bad = signed.clone();
        bad.issuer_public_key = KeyPair::new(&mut rng).public_key().clone();
        assert!(!bad.verify());
        assert!(bad.check_validity());

        let mut bad = signed;
        bad.attestation.not_after = Utc::now() - Duration::hours(1);
        assert!(!bad.verify());
        assert!(!bad.check_validity());
    }
}
