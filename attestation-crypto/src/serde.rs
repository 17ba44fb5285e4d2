//! Utilities for serializing and deserializing curve elements using Serde.
//!
//! [`SerializeElement`] looks like a "module" to Serde and is used with the
//! `#[serde(with = "SerializeElement")]` syntax, adding serialization to arkworks types which do
//! not implement `Serialize` and `Deserialize` themselves. It reuses the checked encodings of
//! [`curve`](crate::curve), so deserialized points are always on the curve and never infinity.

use crate::{
    common::*,
    curve::{decode_point, encode_point, scalar_from_bytes, scalar_to_bytes, ELEMENT_BYTES},
};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Serialization/deserialization functionality for external arkworks types.
///
/// Points use the compressed encoding; scalars use fixed-width big-endian bytes.
pub trait SerializeElement: Sized {
    /// Proxy serialization function telling serde how to serialize the implementing type.
    fn serialize<S>(this: &Self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer;

    /// Proxy deserialization function telling serde how to deserialize the implementing type.
    fn deserialize<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>;
}

impl SerializeElement for Point {
    fn serialize<S>(this: &Self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        encode_point(this, true).serialize(serializer)
    }

    fn deserialize<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes = Vec::<u8>::deserialize(deserializer)?;
        decode_point(&bytes).map_err(|_| de::Error::custom("invalid element encoding"))
    }
}

impl SerializeElement for Scalar {
    fn serialize<S>(this: &Self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        scalar_to_bytes(this).serialize(serializer)
    }

    fn deserialize<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes = <[u8; ELEMENT_BYTES]>::deserialize(deserializer)?;
        scalar_from_bytes(&bytes).ok_or_else(|| de::Error::custom("invalid scalar encoding"))
    }
}

#[cfg(test)]
mod test {
    use crate::{
        hash::IdentifierType,
        pedersen::Commitment,
        proofs::{compute_attestation_proof, verify_attestation_request_proof, ProofOfExponent},
        Parameters, Secret,
    };

    #[test]
    fn serde_preserves_elements() {
        let mut rng = crate::test::rng();
        let params = Parameters::global();
        let secret = Secret::new(&mut rng);
        let com = Commitment::new(params, "+15550100", IdentifierType::Phone, &secret).unwrap();
        let pok = compute_attestation_proof(&mut rng, params, &secret, b"n").unwrap();

        let secret_bytes = bincode::serialize(&secret).unwrap();
        assert_eq!(bincode::deserialize::<Secret>(&secret_bytes).unwrap(), secret);

        let com_bytes = bincode::serialize(&com).unwrap();
        assert_eq!(bincode::deserialize::<Commitment>(&com_bytes).unwrap(), com);

        let pok_bytes = bincode::serialize(&pok).unwrap();
        let decoded: ProofOfExponent = bincode::deserialize(&pok_bytes).unwrap();
        assert!(verify_attestation_request_proof(params, &decoded));
    }

    #[test]
    fn serde_rejects_points_off_the_curve() {
        let garbage = bincode::serialize(&vec![0xffu8; 33]).unwrap();
        assert!(bincode::deserialize::<Commitment>(&garbage).is_err());
    }
}
