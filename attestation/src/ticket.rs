//! Conference tickets issued to an identity.

use crate::{attestable::Attestable, types::*};
use der::{
    asn1::{BitString, OctetString},
    Decode, Encode, Sequence,
};
use log::error;

#[derive(Sequence)]
struct TicketInfo {
    devcon_id: String,
    ticket_id: u64,
    ticket_class: u32,
    commitment: OctetString,
}

#[derive(Sequence)]
struct SignedTicketInfo {
    ticket: TicketInfo,
    public_key: BitString,
    signature: BitString,
}

/// A ticket of some class for a conference. Tickets do not expire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub(crate) devcon_id: String,
    pub(crate) ticket_id: u64,
    pub(crate) ticket_class: u32,
    pub(crate) commitment: Commitment,
    pub(crate) public_key: PublicKey,
    pub(crate) signature: Vec<u8>,
}

impl Ticket {
    /// Issue a ticket to `identifier`.
    pub fn new(
        identifier: &str,
        identifier_type: IdentifierType,
        devcon_id: impl Into<String>,
        ticket_id: u64,
        ticket_class: u32,
        issuer: &KeyPair,
        secret: &Secret,
    ) -> Result<Self, Error> {
        let commitment =
            Commitment::new(Parameters::global(), identifier, identifier_type, secret)?;
        let mut ticket = Self {
            devcon_id: devcon_id.into(),
            ticket_id,
            ticket_class,
            commitment,
            public_key: issuer.public_key().clone(),
            signature: Vec::new(),
        };
        ticket.signature = sign_deterministic(&ticket.payload()?.to_der()?, issuer)?;
        if !ticket.verify() {
            error!("freshly signed ticket does not verify");
            return Err(Error::SignatureInvalid);
        }
        Ok(ticket)
    }

    /// The conference.
    pub fn devcon_id(&self) -> &str {
        &self.devcon_id
    }

    /// The ticket number.
    pub fn ticket_id(&self) -> u64 {
        self.ticket_id
    }

    /// The ticket class.
    pub fn ticket_class(&self) -> u32 {
        self.ticket_class
    }

    fn payload(&self) -> Result<TicketInfo, Error> {
        Ok(TicketInfo {
            devcon_id: self.devcon_id.clone(),
            ticket_id: self.ticket_id,
            ticket_class: self.ticket_class,
            commitment: OctetString::new(self.commitment.to_bytes())?,
        })
    }
}

impl Attestable for Ticket {
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
        true
    }

    fn to_der(&self) -> Result<Vec<u8>, Error> {
        let info = SignedTicketInfo {
            ticket: self.payload()?,
            public_key: BitString::from_bytes(&self.public_key.to_bytes())?,
            signature: BitString::from_bytes(&self.signature)?,
        };
        Ok(info.to_der()?)
    }

    fn from_der(bytes: &[u8]) -> Result<Self, Error> {
        let info = SignedTicketInfo::from_der(bytes)?;
        let ticket = Self {
            devcon_id: info.ticket.devcon_id,
            ticket_id: info.ticket.ticket_id,
            ticket_class: info.ticket.ticket_class,
            commitment: Commitment::from_bytes(info.ticket.commitment.as_bytes())?,
            public_key: PublicKey::from_bytes(info.public_key.raw_bytes())?,
            signature: info.signature.raw_bytes().to_vec(),
        };
        if !ticket.verify() {
            error!("decoded ticket does not verify");
            return Err(Error::SignatureInvalid);
        }
        Ok(ticket)
    }
}
