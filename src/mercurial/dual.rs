//! The dual Mercurial signature variant: role-swapped from [`super::primary`] — public keys live
//! in G1, messages live in G2, and the signature's group assignments invert accordingly.

use crate::algebra::{self, Scalar};
use crate::constants::DST_HASH_MESSAGE_DUAL;
use crate::error::MercurialError;
use blstrs::{G1Projective, G2Projective};
use ff::Field;
use group::Group;
use rand_core::{CryptoRng, RngCore};
use std::ops::Mul;

/// A length-`ell` sequence of G1 points, `Xi = xi * p`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey(Vec<G1Projective>);

impl PublicKey {
    pub fn points(&self) -> &[G1Projective] {
        &self.0
    }

    pub fn from_points(points: Vec<G1Projective>) -> Self {
        PublicKey(points)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A length-`ell` sequence of scalars. Not `Clone`/`Copy` and zeroised on drop, mirroring
/// [`super::primary::SecretKey`].
#[derive(Debug)]
pub struct SecretKey(Vec<Scalar>);

static_assertions::assert_not_impl_any!(SecretKey: Clone, Copy);

impl SecretKey {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn zeroize(&mut self) {
        for x in self.0.iter_mut() {
            *x = Scalar::zero();
        }
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// A message is a sequence of G2 points, one per secret-key/public-key slot.
pub type Message = Vec<G2Projective>;

/// A Mercurial signature `(z, y, y_hat)` for the dual variant: z, y in G2; y_hat in G1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub z: G2Projective,
    pub y: G2Projective,
    pub y_hat: G1Projective,
}

/// Samples a fresh key pair of length `ell`.
pub fn key_gen<R: RngCore + CryptoRng>(ell: usize, rng: &mut R) -> (PublicKey, SecretKey) {
    more_asserts::assert_gt!(ell, 0, "ell must be a positive key length");

    let p = G1Projective::generator();
    let sk: Vec<Scalar> = (0..ell).map(|_| algebra::random_scalar(rng)).collect();
    let pk: Vec<G1Projective> = sk.iter().map(|x| p.mul(x)).collect();

    (PublicKey(pk), SecretKey(sk))
}

/// Signs `msg` (length `ell`) under `sk` (length `ell`).
pub fn sign<R: RngCore + CryptoRng>(
    sk: &SecretKey,
    msg: &[G2Projective],
    rng: &mut R,
) -> Result<Signature, MercurialError> {
    assert_eq!(sk.len(), msg.len(), "secret key / message length mismatch");

    let y = algebra::nonzero_random_scalar(rng)?;
    let y_inv = y.invert().unwrap();

    let sigma = G2Projective::multi_exp(msg, &sk.0);
    let z = sigma.mul(y);
    let y1 = G2Projective::generator().mul(y_inv);
    let y_hat = G1Projective::generator().mul(y_inv);

    Ok(Signature { z, y: y1, y_hat })
}

/// Verifies `sig` over `msg` under `pk`. Never fails; returns `false` on any mismatch, except for
/// a length mismatch between `pk` and `msg`, which is a caller-bug panic rather than a rejection.
pub fn verify(pk: &PublicKey, msg: &[G2Projective], sig: &Signature) -> bool {
    assert_eq!(pk.len(), msg.len(), "public key / message length mismatch");

    let lhs_terms: Vec<(G1Projective, G2Projective)> =
        pk.0.iter().cloned().zip(msg.iter().cloned()).collect();
    let identity1 = algebra::multi_pairing_eq(&lhs_terms, (sig.y_hat, sig.z));

    let identity2 = algebra::pairing(&G1Projective::generator(), &sig.y)
        == algebra::pairing(&sig.y_hat, &G2Projective::generator());

    identity1 && identity2
}

/// Rescales a secret key by `rho`. Pure; never fails.
pub fn convert_secret_key(sk: &SecretKey, rho: &Scalar) -> SecretKey {
    SecretKey(sk.0.iter().map(|x| x.mul(rho)).collect())
}

/// Rescales a public key by `rho`. Pure; never fails.
pub fn convert_public_key(pk: &PublicKey, rho: &Scalar) -> PublicKey {
    PublicKey(pk.0.iter().map(|x| x.mul(rho)).collect())
}

/// Re-randomises `sig` so that it verifies under `convert_public_key(pk, rho)` and the same `msg`.
pub fn convert_signature<R: RngCore + CryptoRng>(
    pk: &PublicKey,
    msg: &[G2Projective],
    sig: &Signature,
    rho: &Scalar,
    rng: &mut R,
) -> Result<Signature, MercurialError> {
    debug_assert_eq!(pk.len(), msg.len(), "public key / message length mismatch");

    let psi = algebra::nonzero_random_scalar(rng)?;
    let psi_inv = psi.invert().unwrap();

    Ok(Signature {
        z: sig.z.mul(psi.mul(rho)),
        y: sig.y.mul(psi_inv),
        y_hat: sig.y_hat.mul(psi_inv),
    })
}

/// Rescales `msg` by `mu` and re-randomises `sig` so the result verifies under the same `pk`.
pub fn change_representation<R: RngCore + CryptoRng>(
    pk: &PublicKey,
    msg: &[G2Projective],
    sig: &Signature,
    mu: &Scalar,
    rng: &mut R,
) -> Result<(Message, Signature), MercurialError> {
    assert_eq!(pk.len(), msg.len(), "public key / message length mismatch");

    let psi = algebra::nonzero_random_scalar(rng)?;
    let psi_inv = psi.invert().unwrap();

    let new_msg: Message = msg.iter().map(|m| m.mul(mu)).collect();
    let new_sig = Signature {
        z: sig.z.mul(psi.mul(mu)),
        y: sig.y.mul(psi_inv),
        y_hat: sig.y_hat.mul(psi_inv),
    };

    Ok((new_msg, new_sig))
}

/// Deterministically hashes `label` to a point in G2, suitable as one entry of a `Message`.
///
/// This is a real, deterministic hash-to-curve call — not the non-deterministic placeholder
/// (random scalar times generator) that the dual variant's original test harness used.
pub fn hash_message(label: &[u8]) -> G2Projective {
    algebra::hash_to_g2(label, DST_HASH_MESSAGE_DUAL)
}
