//! Proofs of knowledge of an exponent.
//!
//! Both protocols prove knowledge of `x` such that `riddle = x·base`, with `base = H`:
//!
//! - An *attestation request proof* shows that the subject knows the secret behind the riddle
//!   `secret·H` it hands to an issuer.
//! - An *equality proof* shows that two commitments `com1`, `com2` hide the same identity: their
//!   difference is `(s1 − s2)·H` exactly when the identity multipliers cancel.
//!
//! The prover samples `r`, publishes `t = r·base`, derives `c` from a hash of the public inputs,
//! and responds with `d = r + c·x`. Only `(riddle, d, t, nonce)` are encoded; the verifier
//! recomputes `c` and accepts iff `d·base == c·riddle + t`.

use crate::{
    common::*,
    curve::{decode_point, decode_scalar, encode_point, encode_scalar, scalar_multiply, subtract},
    pedersen::Commitment,
    proofs::{Challenge, ChallengeBuilder},
    serde::SerializeElement,
};
use der::{asn1::OctetString, Decode, Encode, Sequence};
use log::trace;
use serde::{Deserialize, Serialize};

/// Fully constructed proof of knowledge of an exponent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofOfExponent {
    /// The point whose multiple the riddle is.
    #[serde(with = "SerializeElement")]
    pub(crate) base: Point,
    /// The proof statement: a multiple of `base` by the hidden exponent.
    #[serde(with = "SerializeElement")]
    pub(crate) riddle: Point,
    /// Commitment to the prover's randomness.
    #[serde(with = "SerializeElement")]
    pub(crate) point: Point,
    /// The response scalar.
    #[serde(with = "SerializeElement")]
    pub(crate) challenge: Scalar,
    /// Caller-chosen bytes bound into the challenge.
    pub(crate) nonce: Vec<u8>,
}

#[derive(Sequence)]
struct ProofInfo {
    riddle: OctetString,
    challenge: OctetString,
    point: OctetString,
    nonce: OctetString,
}

impl ProofOfExponent {
    /// Assemble a proof from its parts without checking it.
    pub fn from_parts(
        base: Point,
        riddle: Point,
        point: Point,
        challenge: Scalar,
        nonce: Vec<u8>,
    ) -> Self {
        Self {
            base,
            riddle,
            point,
            challenge,
            nonce,
        }
    }

    /// The base point.
    pub fn base(&self) -> &Point {
        &self.base
    }

    /// The proof statement.
    pub fn riddle(&self) -> &Point {
        &self.riddle
    }

    /// The commitment to the prover's randomness.
    pub fn point(&self) -> &Point {
        &self.point
    }

    /// The response scalar, stored where the challenge would be in a full transcript.
    pub fn challenge(&self) -> &Scalar {
        &self.challenge
    }

    /// The nonce bound into the challenge.
    pub fn nonce(&self) -> &[u8] {
        &self.nonce
    }

    /// DER encoding: riddle, response, randomness commitment, nonce.
    pub fn to_der(&self) -> Result<Vec<u8>, Error> {
        let info = ProofInfo {
            riddle: OctetString::new(encode_point(&self.riddle, false))?,
            challenge: OctetString::new(encode_scalar(&self.challenge))?,
            point: OctetString::new(encode_point(&self.point, false))?,
            nonce: OctetString::new(self.nonce.clone())?,
        };
        Ok(info.to_der()?)
    }

    /// Decode a proof. The base is not encoded; it is always `H`.
    pub fn from_der(params: &Parameters, bytes: &[u8]) -> Result<Self, Error> {
        let info = ProofInfo::from_der(bytes)?;
        Ok(Self {
            base: *params.h(),
            riddle: decode_point(info.riddle.as_bytes())?,
            point: decode_point(info.point.as_bytes())?,
            challenge: decode_scalar(info.challenge.as_bytes())?,
            nonce: info.nonce.into_bytes(),
        })
    }

    fn has_infinity(&self) -> bool {
        self.base.infinity || self.riddle.infinity || self.point.infinity
    }

    /// Check `d·base == c·riddle + t` for a recomputed challenge.
    fn verify_response(&self, challenge: Option<Challenge>) -> bool {
        if self.has_infinity() {
            return false;
        }
        let challenge = match challenge {
            Some(challenge) => challenge,
            None => return false,
        };
        let lhs = self.base * self.challenge;
        let rhs = self.riddle * challenge.to_scalar() + self.point;
        lhs == rhs
    }
}

/// Sample randomness until the transcript yields a challenge below the order, then respond.
fn prove(
    rng: &mut impl Rng,
    base: Point,
    riddle: Point,
    exponent: Scalar,
    nonce: &[u8],
    transcript: impl Fn(&Point) -> ChallengeBuilder,
) -> ProofOfExponent {
    loop {
        let hiding = random_non_zero(&mut *rng);
        let point = scalar_multiply(&base, &hiding);
        match transcript(&point).finish() {
            Some(challenge) => {
                return ProofOfExponent {
                    base,
                    riddle,
                    point,
                    challenge: hiding + challenge.to_scalar() * exponent,
                    nonce: nonce.to_vec(),
                }
            }
            None => trace!("challenge not below the group order; resampling"),
        }
    }
}

fn attestation_transcript(
    base: &Point,
    riddle: &Point,
    point: &Point,
    nonce: &[u8],
) -> ChallengeBuilder {
    ChallengeBuilder::new()
        .with(base)
        .with(riddle)
        .with(point)
        .with_bytes(nonce)
}

fn equality_transcript(
    params: &Parameters,
    base: &Point,
    com1: &Commitment,
    com2: &Commitment,
    point: &Point,
    nonce: &[u8],
) -> ChallengeBuilder {
    ChallengeBuilder::new()
        .with(params.g())
        .with(base)
        .with(com1)
        .with(com2)
        .with(point)
        .with_bytes(nonce)
}

/// Prove knowledge of `secret` behind the riddle `secret·H`, binding in `nonce`.
pub fn compute_attestation_proof(
    rng: &mut impl Rng,
    params: &Parameters,
    secret: &Secret,
    nonce: &[u8],
) -> Result<ProofOfExponent, Error> {
    let base = *params.h();
    let riddle = scalar_multiply(&base, &secret.to_scalar());
    if riddle.infinity {
        return Err(Error::InvalidPoint);
    }
    Ok(prove(
        rng,
        base,
        riddle,
        secret.to_scalar(),
        nonce,
        |point| attestation_transcript(&base, &riddle, point, nonce),
    ))
}

/// Verify a proof produced by [`compute_attestation_proof`].
pub fn verify_attestation_request_proof(params: &Parameters, pok: &ProofOfExponent) -> bool {
    if pok.base != *params.h() {
        return false;
    }
    let challenge = attestation_transcript(&pok.base, &pok.riddle, &pok.point, &pok.nonce).finish();
    pok.verify_response(challenge)
}

/// Prove that `com1` and `com2` commit to the same identity under `secret1` and `secret2`.
///
/// Nothing is checked here: inconsistent inputs produce a proof that does not verify.
pub fn compute_equality_proof(
    rng: &mut impl Rng,
    params: &Parameters,
    com1: &Commitment,
    com2: &Commitment,
    secret1: &Secret,
    secret2: &Secret,
    nonce: &[u8],
) -> Result<ProofOfExponent, Error> {
    let base = *params.h();
    let riddle = subtract(&com1.0, &com2.0);
    if riddle.infinity {
        return Err(Error::InvalidPoint);
    }
    let exponent = secret1.to_scalar() - secret2.to_scalar();
    Ok(prove(rng, base, riddle, exponent, nonce, |point| {
        equality_transcript(params, &base, com1, com2, point, nonce)
    }))
}

/// Verify a proof produced by [`compute_equality_proof`] for the same ordered pair of commitments.
pub fn verify_equality_proof(
    params: &Parameters,
    com1: &Commitment,
    com2: &Commitment,
    pok: &ProofOfExponent,
) -> bool {
    if pok.base != *params.h() || pok.riddle != subtract(&com1.0, &com2.0) {
        return false;
    }
    let challenge =
        equality_transcript(params, &pok.base, com1, com2, &pok.point, &pok.nonce).finish();
    pok.verify_response(challenge)
}
