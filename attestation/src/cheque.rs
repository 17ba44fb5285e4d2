//! Cheques: an amount payable to whoever proves the committed identity.

use crate::{
    attestable::Attestable,
    types::*,
    validity::{is_current, truncate, Validity},
};
use chrono::{DateTime, Duration, Utc};
use der::{
    asn1::{BitString, OctetString},
    Decode, Encode, Sequence,
};
use log::error;

#[derive(Sequence)]
struct ChequeInfo {
    amount: u64,
    validity: Validity,
    commitment: OctetString,
}

#[derive(Sequence)]
struct SignedChequeInfo {
    cheque: ChequeInfo,
    public_key: BitString,
    signature: BitString,
}

/// A cheque for `amount`, redeemable within its validity window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cheque {
    pub(crate) amount: u64,
    pub(crate) not_before: DateTime<Utc>,
    pub(crate) not_after: DateTime<Utc>,
    pub(crate) commitment: Commitment,
    pub(crate) public_key: PublicKey,
    pub(crate) signature: Vec<u8>,
}

impl Cheque {
    /// Write a cheque to `identifier`, valid from now for `validity`.
    pub fn new(
        identifier: &str,
        identifier_type: IdentifierType,
        amount: u64,
        validity: Duration,
        sender: &KeyPair,
        secret: &Secret,
    ) -> Result<Self, Error> {
        let not_before = Utc::now();
        Self::with_window(
            identifier,
            identifier_type,
            amount,
            not_before,
            not_before + validity,
            sender,
            secret,
        )
    }

    /// Write a cheque to `identifier` with an explicit validity window.
    pub fn with_window(
        identifier: &str,
        identifier_type: IdentifierType,
        amount: u64,
        not_before: DateTime<Utc>,
        not_after: DateTime<Utc>,
        sender: &KeyPair,
        secret: &Secret,
    ) -> Result<Self, Error> {
        let commitment =
            Commitment::new(Parameters::global(), identifier, identifier_type, secret)?;
        let mut cheque = Self {
            amount,
            not_before: truncate(not_before),
            not_after: truncate(not_after),
            commitment,
            public_key: sender.public_key().clone(),
            signature: Vec::new(),
        };
        cheque.signature = sign_deterministic(&cheque.payload()?.to_der()?, sender)?;
        if !cheque.verify() {
            error!("freshly signed cheque does not verify");
            return Err(Error::SignatureInvalid);
        }
        Ok(cheque)
    }

    /// The amount.
    pub fn amount(&self) -> u64 {
        self.amount
    }

    /// Start of the validity window.
    pub fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    /// End of the validity window (exclusive).
    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    fn payload(&self) -> Result<ChequeInfo, Error> {
        Ok(ChequeInfo {
            amount: self.amount,
            validity: Validity::new(&self.not_before, &self.not_after)?,
            commitment: OctetString::new(self.commitment.to_bytes())?,
        })
    }
}

impl Attestable for Cheque {
    fn commitment(&self) -> &Commitment {
        &self.commitment
    }

    fn signature(&self) -> &[u8] {
        &self.signature
    }

    fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    fn verify(&self) -> bool {
        match self.payload().and_then(|info| info.to_der().map_err(Error::from)) {
            Ok(payload) => verify(&payload, &self.signature, &self.public_key),
            Err(_) => false,
        }
    }

    fn check_validity(&self) -> bool {
        is_current(&self.not_before, &self.not_after)
    }

    fn to_der(&self) -> Result<Vec<u8>, Error> {
        let info = SignedChequeInfo {
            cheque: self.payload()?,
            public_key: BitString::from_bytes(&self.public_key.to_bytes())?,
            signature: BitString::from_bytes(&self.signature)?,
        };
        Ok(info.to_der()?)
    }

    fn from_der(bytes: &[u8]) -> Result<Self, Error> {
        let info = SignedChequeInfo::from_der(bytes)?;
        let cheque = Self {
            amount: info.cheque.amount,
            not_before: info.cheque.validity.not_before()?,
            not_after: info.cheque.validity.not_after()?,
            commitment: Commitment::from_bytes(info.cheque.commitment.as_bytes())?,
            public_key: PublicKey::from_bytes(info.public_key.raw_bytes())?,
            signature: info.signature.raw_bytes().to_vec(),
        };
        if !cheque.verify() {
            error!("decoded cheque does not verify");
            return Err(Error::SignatureInvalid);
        }
        Ok(cheque)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const ID: &str = "test@test.ts";

    #[test]
    fn cheque_verifies_and_decodes() {
        let mut rng = crate::test::rng();
        let sender = KeyPair::new(&mut rng);
        let secret = Secret::from(112112112);
        let cheque = Cheque::new(
            ID,
            IdentifierType::Email,
            1000,
            Duration::hours(1),
            &sender,
            &secret,
        )
        .unwrap();
        assert!(cheque.verify());
        assert!(cheque.check_validity());
        assert!(cheque
            .commitment()
            .verify_opening(Parameters::global(), ID, IdentifierType::Email, &secret));

        let encoded = cheque.to_der().unwrap();
        let decoded = Cheque::from_der(&encoded).unwrap();
        assert_eq!(decoded, cheque);
        assert_eq!(decoded.to_der().unwrap(), encoded);
    }

    #[test]
    fn tampered_cheque_does_not_verify() {
        let mut rng = crate::test::rng();
        let sender = KeyPair::new(&mut rng);
        let secret = Secret::new(&mut rng);
        let cheque = Cheque::new(
            ID,
            IdentifierType::Email,
            1000,
            Duration::hours(1),
            &sender,
            &secret,
        )
        .unwrap();

        let mut bad = cheque.clone();
        bad.amount = 1_000_000;
        assert!(!bad.verify());
        assert!(Cheque::from_der(&bad.to_der().unwrap()).is_err());

        let mut bad = cheque.clone();
        bad.not_after = Utc::now() - Duration::hours(1);
        assert!(!bad.verify());
        assert!(!bad.check_validity());

        let mut bad = cheque;
        bad.public_key = KeyPair::new(&mut rng).public_key().clone();
        assert!(!bad.verify());
    }

    #[test]
    fn expired_cheque_is_authentic_but_not_valid() {
        let mut rng = crate::test::rng();
        let sender = KeyPair::new(&mut rng);
        let secret = Secret::new(&mut rng);
        let now = Utc::now();
        let cheque = Cheque::with_window(
            ID,
            IdentifierType::Email,
            1000,
            now - Duration::hours(2),
            now - Duration::hours(1),
            &sender,
            &secret,
        )
        .unwrap();
        assert!(cheque.verify());
        assert!(!cheque.check_validity());
    }
}
