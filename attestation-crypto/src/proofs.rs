//! Schnorr-style zero-knowledge proofs of knowledge of an exponent, made non-interactive with the
//! Fiat-Shamir heuristic.

mod challenge;
mod exponent;

pub use self::{challenge::*, exponent::*};
