//! Thin adapter over `blstrs`'s Type-III pairing: the only place in this crate that reaches
//! directly into the curve library. Everything above this module works with `Scalar`,
//! `G1Projective`, `G2Projective` and the handful of functions below.

use crate::constants::MAX_SCALAR_RESAMPLE_ATTEMPTS;
use crate::error::MercurialError;
use blstrs::{Bls12, G1Affine, G1Projective, G2Prepared, G2Projective, Gt};
pub use blstrs::Scalar;
use ff::Field;
use group::{Curve, Group};
use pairing::{MillerLoopResult, MultiMillerLoop};
use rand_core::{CryptoRng, RngCore};
use std::ops::Neg;

/// Samples a uniformly random scalar. Infallible: unlike the teacher's `rand_core_hell`
/// workaround, `blstrs` and this crate's `rand`/`rand_core` versions agree, so there is no need
/// to go through `BigUint` to bridge incompatible RNG traits.
pub fn random_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Scalar {
    Scalar::random(rng)
}

/// Samples a uniformly random nonzero scalar, retrying a bounded number of times.
///
/// The chance of drawing zero is ~2^-254; the retry budget exists only so this function has a
/// well-defined failure mode instead of looping forever if the RNG is broken.
pub fn nonzero_random_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Scalar, MercurialError> {
    for _ in 0..MAX_SCALAR_RESAMPLE_ATTEMPTS {
        let s = Scalar::random(&mut *rng);
        if !bool::from(s.is_zero()) {
            return Ok(s);
        }
    }
    Err(MercurialError::RandomnessExhausted)
}

/// Hashes `msg` to a point in G1 under domain-separation tag `dst`, via `blstrs`'s standardized
/// (IETF hash-to-curve) construction.
pub fn hash_to_g1(msg: &[u8], dst: &[u8]) -> G1Projective {
    G1Projective::hash_to_curve(msg, dst, b"MERCURIAL-G1")
}

/// Hashes `msg` to a point in G2 under domain-separation tag `dst`, via `blstrs`'s standardized
/// (IETF hash-to-curve) construction.
pub fn hash_to_g2(msg: &[u8], dst: &[u8]) -> G2Projective {
    G2Projective::hash_to_curve(msg, dst, b"MERCURIAL-G2")
}

/// Computes e(g1, g2) for a single pair.
pub fn pairing(g1: &G1Projective, g2: &G2Projective) -> Gt {
    let res = Bls12::multi_miller_loop(&[(&g1.to_affine(), &G2Prepared::from(g2.to_affine()))]);
    res.final_exponentiation()
}

/// Returns true iff `prod_i e(lhs[i].0, lhs[i].1) == e(rhs.0, rhs.1)`, evaluated as a single
/// multi-pairing (one multi-Miller-loop plus one final exponentiation) rather than as separate
/// pairings multiplied together in `Gt`.
pub fn multi_pairing_eq(lhs: &[(G1Projective, G2Projective)], rhs: (G1Projective, G2Projective)) -> bool {
    let g1_affines: Vec<G1Affine> = lhs
        .iter()
        .map(|(g1, _)| g1.to_affine())
        .chain(std::iter::once(rhs.0.neg().to_affine()))
        .collect();
    let g2_prepared: Vec<G2Prepared> = lhs
        .iter()
        .map(|(_, g2)| G2Prepared::from(g2.to_affine()))
        .chain(std::iter::once(G2Prepared::from(rhs.1.to_affine())))
        .collect();

    let pairs: Vec<(&G1Affine, &G2Prepared)> = g1_affines.iter().zip(g2_prepared.iter()).collect();
    let res = Bls12::multi_miller_loop(pairs.as_slice());

    res.final_exponentiation() == Gt::identity()
}
