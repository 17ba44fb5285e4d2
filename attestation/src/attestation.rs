//! The identity claim an issuer signs.
//!
//! An [`Attestation`] binds a subject's signing key to a commitment to one of its identifiers,
//! within a validity window. It is assembled by the issuer with the setters below and then signed
//! exactly once into a [`SignedAttestation`](crate::signed::SignedAttestation).
//!
//! The wire format is a DER `SEQUENCE` of version, serial number, signature algorithm, issuer,
//! validity, subject, subject public key and extensions. The first extension always carries the
//! identity commitment.

use crate::{
    request::AttestationRequest,
    types::*,
    validity::{is_current, truncate, Validity},
};
use chrono::{DateTime, Utc};
use der::{
    asn1::{BitString, ObjectIdentifier, OctetString},
    Decode, Encode, Sequence,
};
use log::error;

/// Version number of identifier attestations.
pub const IDENTIFIER_ATTESTATION_VERSION: u64 = 18;

/// `ecdsa-with-Recommended`: ECDSA with the hash fixed by the protocol (Keccak-256).
pub const ECDSA_WITH_RECOMMENDED: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.10045.4.2");

/// Extension identifier under which the identity commitment is stored.
pub const IDENTITY_COMMITMENT_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.4.1.1466.115.121.1.40");

/// `SEQUENCE { algorithm OBJECT IDENTIFIER }`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Sequence)]
pub(crate) struct AlgorithmIdentifier {
    pub(crate) algorithm: ObjectIdentifier,
}

impl AlgorithmIdentifier {
    pub(crate) fn ecdsa() -> Self {
        Self {
            algorithm: ECDSA_WITH_RECOMMENDED,
        }
    }
}

/// An X.509-style extension.
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct Extension {
    extn_id: ObjectIdentifier,
    critical: bool,
    extn_value: OctetString,
}

impl Extension {
    /// Create an extension.
    pub fn new(id: ObjectIdentifier, critical: bool, value: Vec<u8>) -> Result<Self, Error> {
        Ok(Self {
            extn_id: id,
            critical,
            extn_value: OctetString::new(value)?,
        })
    }

    /// The extension's identifier.
    pub fn id(&self) -> ObjectIdentifier {
        self.extn_id
    }

    /// Whether a relying party must understand the extension.
    pub fn critical(&self) -> bool {
        self.critical
    }

    /// The extension's contents.
    pub fn value(&self) -> &[u8] {
        self.extn_value.as_bytes()
    }
}

#[derive(Sequence)]
struct AttestationInfo {
    version: u64,
    serial_number: u64,
    signature: AlgorithmIdentifier,
    issuer: String,
    validity: Validity,
    subject: String,
    subject_public_key: BitString,
    extensions: Vec<Extension>,
}

/// An unsigned identity attestation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attestation {
    pub(crate) version: u64,
    pub(crate) serial_number: u64,
    pub(crate) issuer: String,
    pub(crate) not_before: DateTime<Utc>,
    pub(crate) not_after: DateTime<Utc>,
    pub(crate) subject: String,
    pub(crate) subject_public_key: PublicKey,
    pub(crate) identity_commitment: Commitment,
    pub(crate) extensions: Vec<Extension>,
}

impl Attestation {
    /// Start an attestation of `identity_commitment` for the holder of `subject_public_key`.
    ///
    /// The subject is derived from the key's address. The issuer, serial number and validity
    /// window still have to be set; until then the attestation is not valid.
    pub fn new(identity_commitment: Commitment, subject_public_key: PublicKey) -> Self {
        let now = truncate(Utc::now());
        Self {
            version: IDENTIFIER_ATTESTATION_VERSION,
            serial_number: 0,
            issuer: String::new(),
            not_before: now,
            not_after: now,
            subject: subject_name(&subject_public_key),
            subject_public_key,
            identity_commitment,
            extensions: Vec::new(),
        }
    }

    /// Start an attestation for a verified request, committing to the requested identifier with
    /// the request's riddle. The issuer never sees the secret.
    pub fn from_request(request: &AttestationRequest) -> Result<Self, Error> {
        if !request.verify() {
            error!("refusing to attest an unverifiable request");
            return Err(Error::ProofInvalid);
        }
        let commitment = Commitment::with_hiding_point(
            Parameters::global(),
            request.identifier(),
            request.identifier_type(),
            request.proof().riddle(),
        )?;
        Ok(Self::new(commitment, request.public_key().clone()))
    }

    /// Set the version number.
    pub fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    /// Set the serial number.
    pub fn set_serial_number(&mut self, serial_number: u64) {
        self.serial_number = serial_number;
    }

    /// Set the issuer's distinguished name, e.g. `CN=attestation.id`.
    pub fn set_issuer(&mut self, issuer: impl Into<String>) {
        self.issuer = issuer.into();
    }

    /// Set the validity window. Sub-second precision is dropped.
    pub fn set_validity(&mut self, not_before: DateTime<Utc>, not_after: DateTime<Utc>) {
        self.not_before = truncate(not_before);
        self.not_after = truncate(not_after);
    }

    /// Override the subject name.
    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.subject = subject.into();
    }

    /// Replace the subject key. The subject name is left as it is.
    pub fn set_subject_public_key(&mut self, subject_public_key: PublicKey) {
        self.subject_public_key = subject_public_key;
    }

    /// Append an extension after the identity commitment.
    pub fn add_extension(&mut self, extension: Extension) {
        self.extensions.push(extension);
    }

    /// The version number.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The serial number.
    pub fn serial_number(&self) -> u64 {
        self.serial_number
    }

    /// The issuer's distinguished name.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Start of the validity window.
    pub fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    /// End of the validity window (exclusive).
    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    /// The subject name.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The attested signing key.
    pub fn subject_public_key(&self) -> &PublicKey {
        &self.subject_public_key
    }

    /// The commitment to the attested identifier.
    pub fn identity_commitment(&self) -> &Commitment {
        &self.identity_commitment
    }

    /// Extensions other than the identity commitment.
    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    /// Structural and time checks: version, issuer, window, and that the subject names the key.
    pub fn check_validity(&self) -> bool {
        self.version == IDENTIFIER_ATTESTATION_VERSION
            && !self.issuer.is_empty()
            && self.not_before < self.not_after
            && is_current(&self.not_before, &self.not_after)
            && self.subject == subject_name(&self.subject_public_key)
    }

    /// Canonical DER encoding; the bytes an issuer signs.
    pub fn to_der(&self) -> Result<Vec<u8>, Error> {
        let mut extensions = Vec::with_capacity(self.extensions.len() + 1);
        extensions.push(Extension::new(
            IDENTITY_COMMITMENT_OID,
            false,
            self.identity_commitment.to_bytes(),
        )?);
        extensions.extend(self.extensions.iter().cloned());

        let info = AttestationInfo {
            version: self.version,
            serial_number: self.serial_number,
            signature: AlgorithmIdentifier::ecdsa(),
            issuer: self.issuer.clone(),
            validity: Validity::new(&self.not_before, &self.not_after)?,
            subject: self.subject.clone(),
            subject_public_key: BitString::from_bytes(&self.subject_public_key.to_bytes())?,
            extensions,
        };
        Ok(info.to_der()?)
    }

    /// Decode an attestation. Nothing beyond the encoding is checked.
    pub fn from_der(bytes: &[u8]) -> Result<Self, Error> {
        let info = AttestationInfo::from_der(bytes)?;
        if info.signature != AlgorithmIdentifier::ecdsa() {
            return Err(Error::MalformedEncoding);
        }
        let mut extensions = info.extensions.into_iter();
        let identity_commitment = match extensions.next() {
            Some(extension) if extension.id() == IDENTITY_COMMITMENT_OID => {
                Commitment::from_bytes(extension.value())?
            }
            _ => return Err(Error::MalformedEncoding),
        };
        Ok(Self {
            version: info.version,
            serial_number: info.serial_number,
            issuer: info.issuer,
            not_before: info.validity.not_before()?,
            not_after: info.validity.not_after()?,
            subject: info.subject,
            subject_public_key: PublicKey::from_bytes(info.subject_public_key.raw_bytes())?,
            identity_commitment,
            extensions: extensions.collect(),
        })
    }
}

/// `CN=` followed by the key's address.
fn subject_name(public_key: &PublicKey) -> String {
    format!("CN={}", public_key.address())
}
