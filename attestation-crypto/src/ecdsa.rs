//! ECDSA over secp256k1 with Keccak-256 message hashing and low-S normalization.
//!
//! Every signature leaving this module has `s ≤ n/2`, and verification normalizes `s` before
//! checking, so a signature and its mirror `(r, n − s)` are the same signature. Signatures are
//! DER-encoded as `SEQUENCE { INTEGER r, INTEGER s }`.
//!
//! Verification returns `false` on any malformed input instead of an error.

use crate::{common::*, hash::keccak256};
use k256::ecdsa::{
    signature::hazmat::{PrehashSigner, PrehashVerifier, RandomizedPrehashSigner},
    Signature, SigningKey, VerifyingKey,
};
use log::trace;

/// `(p − 1) / 2` for the secp256k1 base field, big-endian.
const HALF_FIELD: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x7f, 0xff, 0xfe, 0x17,
];

/// A public verification key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    /// Uncompressed SEC1 encoding (65 bytes).
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_encoded_point(false).as_bytes().to_vec()
    }

    /// Decode a key from either SEC1 encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        VerifyingKey::from_sec1_bytes(bytes)
            .map(Self)
            .map_err(|_| Error::InvalidPoint)
    }

    /// The Ethereum-style address of this key.
    pub fn address(&self) -> String {
        address_from_key(self)
    }

    /// Whether the key's `y` coordinate is at most `(p − 1) / 2`.
    pub fn has_low_y(&self) -> bool {
        match self.0.to_encoded_point(false).y() {
            Some(y) => &y[..] <= &HALF_FIELD[..],
            None => false,
        }
    }
}

/// A signing key and its public key.
#[derive(Debug, Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
    public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new key pair.
    pub fn new(rng: &mut impl Rng) -> Self {
        Self::from_signing_key(SigningKey::random(rng))
    }

    /// Generate a key pair whose public `y` coordinate is in the lower half of the field, as
    /// some Ethereum tooling expects.
    pub fn new_low_y(rng: &mut impl Rng) -> Self {
        loop {
            let keys = Self::new(&mut *rng);
            if keys.public_key.has_low_y() {
                return keys;
            }
            trace!("public key has high y; regenerating");
        }
    }

    /// Load a key pair from a 32-byte big-endian private scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        SigningKey::from_slice(bytes)
            .map(Self::from_signing_key)
            .map_err(|_| Error::MalformedEncoding)
    }

    /// The 32-byte big-endian private scalar.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.signing_key.to_bytes().to_vec()
    }

    /// The public half of the pair.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let public_key = PublicKey(signing_key.verifying_key().clone());
        Self {
            signing_key,
            public_key,
        }
    }
}

fn normalize(signature: Signature) -> Signature {
    signature.normalize_s().unwrap_or(signature)
}

fn encode(signature: Signature) -> Vec<u8> {
    normalize(signature).to_der().as_bytes().to_vec()
}

/// Sign the Keccak-256 digest of `message` with an RFC 6979 nonce. Same message and key, same
/// signature.
pub fn sign_deterministic(message: &[u8], key: &KeyPair) -> Result<Vec<u8>, Error> {
    let signature: Signature = key
        .signing_key
        .sign_prehash(&keccak256(message))
        .map_err(|_| Error::SignatureInvalid)?;
    Ok(encode(signature))
}

/// Sign an already-hashed digest, mixing fresh randomness into the nonce.
pub fn sign_hashed_randomized(
    rng: &mut impl Rng,
    digest: &[u8],
    key: &KeyPair,
) -> Result<Vec<u8>, Error> {
    let signature: Signature = key
        .signing_key
        .sign_prehash_with_rng(rng, digest)
        .map_err(|_| Error::SignatureInvalid)?;
    Ok(encode(signature))
}

/// Verify a signature over the Keccak-256 digest of `message`.
pub fn verify(message: &[u8], signature: &[u8], public_key: &PublicKey) -> bool {
    verify_hashed(&keccak256(message), signature, public_key)
}

/// Verify a signature over an already-hashed digest.
pub fn verify_hashed(digest: &[u8], signature: &[u8], public_key: &PublicKey) -> bool {
    match Signature::from_der(signature) {
        Ok(signature) => public_key
            .0
            .verify_prehash(digest, &normalize(signature))
            .is_ok(),
        Err(_) => false,
    }
}

/// `0x` followed by the hex of the last 20 bytes of the Keccak-256 digest of the uncompressed key
/// without its `0x04` prefix.
pub fn address_from_key(public_key: &PublicKey) -> String {
    let encoded = public_key.to_bytes();
    let digest = keccak256(&encoded[1..]);
    format!("0x{}", hex::encode(&digest[12..]))
}

#[cfg(test)]
mod test {
    use super::*;
    use k256::elliptic_curve::scalar::IsHigh;

    #[test]
    fn deterministic_signatures_repeat_and_verify() {
        let mut rng = crate::test::rng();
        let keys = KeyPair::new(&mut rng);
        let message = b"some message";

        let first = sign_deterministic(message, &keys).unwrap();
        let second = sign_deterministic(message, &keys).unwrap();
        assert_eq!(first, second);
        assert!(verify(message, &first, keys.public_key()));

        assert!(!verify(b"some other message", &first, keys.public_key()));
        let other = KeyPair::new(&mut rng);
        assert!(!verify(message, &first, other.public_key()));
    }

    #[test]
    fn signatures_are_low_s_and_mirrors_verify() {
        let mut rng = crate::test::rng();
        let keys = KeyPair::new(&mut rng);

        for i in 0u8..16 {
            let message = [i; 8];
            let encoded = sign_deterministic(&message, &keys).unwrap();
            let signature = Signature::from_der(&encoded).unwrap();
            assert!(!bool::from(signature.s().is_high()));

            let (r, s) = signature.split_scalars();
            let mirrored = Signature::from_scalars(r, -*s).unwrap();
            assert!(bool::from(mirrored.s().is_high()));
            let mirrored = mirrored.to_der().as_bytes().to_vec();
            assert_ne!(mirrored, encoded);
            assert!(verify(&message, &mirrored, keys.public_key()));
        }
    }

    #[test]
    fn randomized_signatures_verify() {
        let mut rng = crate::test::rng();
        let keys = KeyPair::new(&mut rng);
        let digest = keccak256(b"pay 1000");

        let first = sign_hashed_randomized(&mut rng, &digest, &keys).unwrap();
        let second = sign_hashed_randomized(&mut rng, &digest, &keys).unwrap();
        assert_ne!(first, second);
        assert!(verify_hashed(&digest, &first, keys.public_key()));
        assert!(verify_hashed(&digest, &second, keys.public_key()));
        assert!(verify(b"pay 1000", &first, keys.public_key()));
    }

    #[test]
    fn malformed_signatures_do_not_verify() {
        let mut rng = crate::test::rng();
        let keys = KeyPair::new(&mut rng);
        let mut signature = sign_deterministic(b"m", &keys).unwrap();

        assert!(!verify(b"m", &[], keys.public_key()));
        assert!(!verify(b"m", &signature[..signature.len() - 1], keys.public_key()));
        assert!(!verify(b"m", &[0x30, 0x00], keys.public_key()));
        let last = signature.len() - 1;
        signature[last] ^= 0x01;
        assert!(!verify(b"m", &signature, keys.public_key()));
    }

    #[test]
    fn address_matches_known_key() {
        let mut private = [0u8; 32];
        private[31] = 1;
        let keys = KeyPair::from_bytes(&private).unwrap();
        assert_eq!(
            keys.public_key().address(),
            "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
        assert_eq!(keys.to_bytes(), private.to_vec());
    }

    #[test]
    fn addresses_have_ethereum_shape() {
        let mut rng = crate::test::rng();
        let keys = KeyPair::new(&mut rng);
        let address = address_from_key(keys.public_key());
        assert_eq!(address.len(), 42);
        assert!(address.starts_with("0x"));
        assert!(address[2..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn low_y_keys_have_low_y() {
        let mut rng = crate::test::rng();
        for _ in 0..8 {
            let keys = KeyPair::new_low_y(&mut rng);
            assert!(keys.public_key().has_low_y());
        }
    }

    #[test]
    fn public_keys_round_trip() {
        let mut rng = crate::test::rng();
        let keys = KeyPair::new(&mut rng);
        let encoded = keys.public_key().to_bytes();
        assert_eq!(encoded.len(), 65);
        assert_eq!(&PublicKey::from_bytes(&encoded).unwrap(), keys.public_key());
        assert_eq!(PublicKey::from_bytes(&encoded[..64]), Err(Error::InvalidPoint));
    }
}
