//! Arithmetic and encodings for the prime-order group G1 of BN254.
//!
//! Every other module works with [`Point`]s in affine form and [`Scalar`]s modulo the group order.
//! The two generators `G` and `H` are derived with [`compute_point`] from fixed seeds, so their
//! discrete log relation is unknown to everyone ("nothing up my sleeve"). They live in an
//! immutable [`Parameters`] value which is built once and shared by reference.
//!
//! Points travel as SEC1-style octets: `0x04 ‖ x ‖ y` uncompressed, `0x02 | 0x03 ‖ x` compressed.
//! The point at infinity encodes as the single byte `0x00` and never decodes.

use crate::{common::*, hash::map_to_scalar};
use ark_bn254::g1::Config;
use ark_ec::{short_weierstrass::SWCurveConfig, CurveConfig};
use ark_ff::{BigInt, One};
use log::{debug, trace};
use std::sync::OnceLock;

/// Length of a field element or scalar in bytes.
pub const ELEMENT_BYTES: usize = 32;

const UNCOMPRESSED_TAG: u8 = 0x04;
const INFINITY_TAG: u8 = 0x00;

/// Smallest order rejected from below; accepted orders lie strictly above `2^253`.
const MIN_ORDER: BigInt<4> = BigInt::new([0, 0, 0, 1 << 61]);

/// Bit length every accepted group order must have.
const ORDER_BITS: u32 = 254;

static PARAMETERS: OnceLock<Parameters> = OnceLock::new();

/// The public generators `G` and `H` used by commitments and proofs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameters {
    g: Point,
    h: Point,
}

impl Parameters {
    /// Check the group order and derive both generators.
    pub fn new() -> Result<Self, Error> {
        let order = Scalar::MODULUS;
        if !verify_curve_order(&order) {
            return Err(Error::UnsafeCurveParameters {
                bits: order.num_bits(),
            });
        }
        let g = compute_point(&map_to_scalar(&[0x00]));
        let h = compute_point(&map_to_scalar(&[0x01]));
        debug!("derived commitment generators");
        Ok(Self { g, h })
    }

    /// The process-wide parameters, derived on first use.
    pub fn global() -> &'static Self {
        PARAMETERS.get_or_init(|| {
            Self::new().expect("BN254 has a 254-bit order and always yields generators")
        })
    }

    /// The generator multiplied by identity multipliers.
    pub fn g(&self) -> &Point {
        &self.g
    }

    /// The generator multiplied by secrets; the base of every proof of exponent.
    pub fn h(&self) -> &Point {
        &self.h
    }
}

/// Accept a group order only if `2^253 < order < 2^254`.
///
/// Hashing into scalars draws 256-bit digests and rejects those at or above the order, so a much
/// smaller order would make rejection sampling impractical and a larger one would not fit.
pub fn verify_curve_order(order: &BigInt<4>) -> bool {
    order.num_bits() == ORDER_BITS && *order > MIN_ORDER
}

/// Deterministically find a point of the prime-order subgroup from a seed.
///
/// Starting from `x = seed`, increments `x` until `x³ + ax + b` is a square, takes the smaller
/// square root as `y`, and accepts the candidate only if multiplying it by `order − 1` lands on
/// its negation.
pub fn compute_point(seed: &Scalar) -> Point {
    let mut x = Fq::from_le_bytes_mod_order(&seed.into_bigint().to_bytes_le());
    let order_minus_one = (-Scalar::one()).into_bigint();
    loop {
        let y = loop {
            x += Fq::one();
            let y_squared = curve_rhs(&x);
            if is_quadratic_residue(&y_squared) {
                match y_squared.sqrt() {
                    Some(y) => break y,
                    None => continue,
                }
            }
        };
        let candidate = canonical(Point::new_unchecked(x, y));
        let reference = canonical(candidate.mul_bigint(order_minus_one).into_affine());
        if reference == candidate && !candidate.infinity {
            return candidate.mul_bigint(Config::COFACTOR).into_affine();
        }
        trace!("generator candidate failed the subgroup check; trying next x");
    }
}

/// Encode a point, compressed or not. Infinity encodes as `[0x00]`.
pub fn encode_point(point: &Point, compressed: bool) -> Vec<u8> {
    if point.infinity {
        return vec![INFINITY_TAG];
    }
    let x = field_to_bytes(&point.x);
    if compressed {
        let tag = if point.y.into_bigint().is_odd() {
            0x03
        } else {
            0x02
        };
        let mut out = Vec::with_capacity(1 + ELEMENT_BYTES);
        out.push(tag);
        out.extend_from_slice(&x);
        out
    } else {
        let mut out = Vec::with_capacity(1 + 2 * ELEMENT_BYTES);
        out.push(UNCOMPRESSED_TAG);
        out.extend_from_slice(&x);
        out.extend_from_slice(&field_to_bytes(&point.y));
        out
    }
}

/// Decode a point in either encoding, rejecting infinity and anything off the curve.
pub fn decode_point(bytes: &[u8]) -> Result<Point, Error> {
    let point = match (bytes.first(), bytes.len()) {
        (Some(&UNCOMPRESSED_TAG), 65) => {
            let x = field_from_bytes(&bytes[1..33])?;
            let y = field_from_bytes(&bytes[33..65])?;
            Point::new_unchecked(x, y)
        }
        (Some(&tag), 33) if tag == 0x02 || tag == 0x03 => {
            let x = field_from_bytes(&bytes[1..33])?;
            let mut y = curve_rhs(&x).sqrt().ok_or(Error::InvalidPoint)?;
            if y.into_bigint().is_odd() != (tag == 0x03) {
                y = -y;
            }
            Point::new_unchecked(x, y)
        }
        _ => return Err(Error::InvalidPoint),
    };
    if !point.is_on_curve() || !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(Error::InvalidPoint);
    }
    Ok(point)
}

/// Sum of two points.
pub fn add(a: &Point, b: &Point) -> Point {
    (a.into_group() + b).into_affine()
}

/// Difference `a − b` of two points.
pub fn subtract(a: &Point, b: &Point) -> Point {
    (a.into_group() - b).into_affine()
}

/// Additive inverse of a point.
pub fn negate(point: &Point) -> Point {
    -*point
}

/// Multiply a point by a scalar.
pub fn scalar_multiply(point: &Point, scalar: &Scalar) -> Point {
    (*point * scalar).into_affine()
}

/// Whether the point is the group identity.
pub fn is_infinity(point: &Point) -> bool {
    point.infinity
}

/// Fixed-width big-endian encoding of a scalar.
pub fn scalar_to_bytes(scalar: &Scalar) -> [u8; ELEMENT_BYTES] {
    let mut out = [0; ELEMENT_BYTES];
    out.copy_from_slice(&scalar.into_bigint().to_bytes_be());
    out
}

/// Interpret up to 32 big-endian bytes as a scalar; `None` if the value is not below the order.
pub fn scalar_from_bytes(bytes: &[u8]) -> Option<Scalar> {
    if bytes.len() > ELEMENT_BYTES {
        return None;
    }
    let mut padded = [0; ELEMENT_BYTES];
    padded[ELEMENT_BYTES - bytes.len()..].copy_from_slice(bytes);
    Scalar::from_bigint(bigint_from_be(&padded))
}

/// Minimal big-endian two's-complement encoding of a scalar, as an ASN.1 INTEGER body.
pub fn encode_scalar(scalar: &Scalar) -> Vec<u8> {
    let bytes = scalar_to_bytes(scalar);
    let first = bytes
        .iter()
        .position(|&b| b != 0)
        .unwrap_or(ELEMENT_BYTES - 1);
    let mut out = Vec::with_capacity(ELEMENT_BYTES + 1);
    if bytes[first] & 0x80 != 0 {
        out.push(0);
    }
    out.extend_from_slice(&bytes[first..]);
    out
}

/// Strict inverse of [`encode_scalar`]: rejects negative, padded, and out-of-range input.
pub fn decode_scalar(bytes: &[u8]) -> Result<Scalar, Error> {
    match bytes {
        [] => Err(Error::MalformedEncoding),
        [first, ..] if first & 0x80 != 0 => Err(Error::MalformedEncoding),
        [0, second, ..] if second & 0x80 == 0 => Err(Error::MalformedEncoding),
        [0, rest @ ..] if !rest.is_empty() => {
            scalar_from_bytes(rest).ok_or(Error::MalformedEncoding)
        }
        _ => scalar_from_bytes(bytes).ok_or(Error::MalformedEncoding),
    }
}

pub(crate) fn bigint_from_be(bytes: &[u8; ELEMENT_BYTES]) -> BigInt<4> {
    let mut limbs = [0u64; 4];
    for (i, limb) in limbs.iter_mut().enumerate() {
        let end = ELEMENT_BYTES - 8 * i;
        let mut chunk = [0; 8];
        chunk.copy_from_slice(&bytes[end - 8..end]);
        *limb = u64::from_be_bytes(chunk);
    }
    BigInt::new(limbs)
}

fn field_to_bytes(element: &Fq) -> [u8; ELEMENT_BYTES] {
    let mut out = [0; ELEMENT_BYTES];
    out.copy_from_slice(&element.into_bigint().to_bytes_be());
    out
}

fn field_from_bytes(bytes: &[u8]) -> Result<Fq, Error> {
    let array = <[u8; ELEMENT_BYTES]>::try_from(bytes).map_err(|_| Error::InvalidPoint)?;
    Fq::from_bigint(bigint_from_be(&array)).ok_or(Error::InvalidPoint)
}

fn curve_rhs(x: &Fq) -> Fq {
    x.square() * x + Config::COEFF_A * x + Config::COEFF_B
}

fn is_quadratic_residue(element: &Fq) -> bool {
    element.pow(Fq::MODULUS_MINUS_ONE_DIV_TWO).is_one()
}

/// The representative of `{P, −P}` whose `y` is at most `(p − 1) / 2`.
fn canonical(point: Point) -> Point {
    if point.y.into_bigint() > Fq::MODULUS_MINUS_ONE_DIV_TWO {
        -point
    } else {
        point
    }
}
