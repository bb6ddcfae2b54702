//! The primary Mercurial signature variant: secret keys are scalars, public keys live in G2,
//! messages live in G1. See [`super::dual`] for the role-swapped variant.

use crate::algebra::{self, Scalar};
use crate::constants::DST_HASH_MESSAGE_PRIMARY;
use crate::error::MercurialError;
use blstrs::{G1Projective, G2Projective};
use ff::Field;
use group::Group;
use rand_core::{CryptoRng, RngCore};
use std::ops::Mul;

/// A length-`ell` sequence of G2 points, `Xi = xi * p_hat`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey(Vec<G2Projective>);

impl PublicKey {
    pub fn points(&self) -> &[G2Projective] {
        &self.0
    }

    pub fn from_points(points: Vec<G2Projective>) -> Self {
        PublicKey(points)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A length-`ell` sequence of scalars. Not `Clone`/`Copy` (see [`NOT_CLONEABLE`]) and zeroised on
/// drop, matching §5's secret-key hygiene recommendation.
#[derive(Debug)]
pub struct SecretKey(Vec<Scalar>);

static_assertions::assert_not_impl_any!(SecretKey: Clone, Copy);

impl SecretKey {
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

impl SecretKey {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A message is a sequence of G1 points, one per secret-key/public-key slot.
pub type Message = Vec<G1Projective>;

/// A Mercurial signature `(z, y, y_hat)` for the primary variant: z, y in G1; y_hat in G2.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub z: G1Projective,
    pub y: G1Projective,
    pub y_hat: G2Projective,
}

/// Samples a fresh key pair of length `ell`.
pub fn key_gen<R: RngCore + CryptoRng>(ell: usize, rng: &mut R) -> (PublicKey, SecretKey) {
    more_asserts::assert_gt!(ell, 0, "ell must be a positive key length");

    let p_hat = G2Projective::generator();
    let sk: Vec<Scalar> = (0..ell).map(|_| algebra::random_scalar(rng)).collect();
    let pk: Vec<G2Projective> = sk.iter().map(|x| p_hat.mul(x)).collect();

    (PublicKey(pk), SecretKey(sk))
}

/// Signs `msg` (length `ell`) under `sk` (length `ell`).
pub fn sign<R: RngCore + CryptoRng>(
    sk: &SecretKey,
    msg: &[G1Projective],
    rng: &mut R,
) -> Result<Signature, MercurialError> {
    assert_eq!(sk.len(), msg.len(), "secret key / message length mismatch");

    let y = algebra::nonzero_random_scalar(rng)?;
    let y_inv = y.invert().unwrap();

    let sigma = G1Projective::multi_exp(msg, &sk.0);
    let z = sigma.mul(y);
    let y1 = G1Projective::generator().mul(y_inv);
    let y_hat = G2Projective::generator().mul(y_inv);

    Ok(Signature { z, y: y1, y_hat })
}

/// Verifies `sig` over `msg` under `pk`. Never fails; returns `false` on any mismatch, except for
/// a length mismatch between `pk` and `msg`, which is a caller-bug panic rather than a rejection.
pub fn verify(pk: &PublicKey, msg: &[G1Projective], sig: &Signature) -> bool {
    assert_eq!(pk.len(), msg.len(), "public key / message length mismatch");

    let lhs_terms: Vec<(G1Projective, G2Projective)> =
        msg.iter().cloned().zip(pk.0.iter().cloned()).collect();
    let identity1 = algebra::multi_pairing_eq(&lhs_terms, (sig.z, sig.y_hat));

    let identity2 = algebra::pairing(&G1Projective::generator(), &sig.y_hat)
        == algebra::pairing(&sig.y, &G2Projective::generator());

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
    msg: &[G1Projective],
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
    msg: &[G1Projective],
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

/// Deterministically hashes `label` to a point in G1, suitable as one entry of a `Message`.
pub fn hash_message(label: &[u8]) -> G1Projective {
    algebra::hash_to_g1(label, DST_HASH_MESSAGE_PRIMARY)
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::thread_rng;

    fn random_message<R: RngCore + CryptoRng>(ell: usize, rng: &mut R) -> Message {
        (0..ell)
            .map(|i| hash_message(format!("msg-{i}").as_bytes()))
            .collect::<Vec<_>>()
            .into_iter()
            .map(|p| {
                // re-randomise so repeated calls in one test don't reuse the same fixed points
                p.mul(algebra::random_scalar(rng))
            })
            .collect()
    }

    #[test]
    fn sign_then_verify_roundtrips() {
        let mut rng = thread_rng();
        for ell in [1, 2, 5] {
            let (pk, sk) = key_gen(ell, &mut rng);
            let msg = random_message(ell, &mut rng);
            let sig = sign(&sk, &msg, &mut rng).expect("signing should not exhaust randomness");
            assert!(verify(&pk, &msg, &sig));
        }
    }

    #[test]
    fn convert_signature_roundtrips_and_rejects_forged_message() {
        let mut rng = thread_rng();
        let ell = 4;
        let (pk, sk) = key_gen(ell, &mut rng);
        let msg = random_message(ell, &mut rng);
        let sig = sign(&sk, &msg, &mut rng).unwrap();

        let rho = algebra::random_scalar(&mut rng);
        let pk_prime = convert_public_key(&pk, &rho);
        let sig_prime = convert_signature(&pk, &msg, &sig, &rho, &mut rng).unwrap();
        assert!(verify(&pk_prime, &msg, &sig_prime));

        let mut forged = msg.clone();
        forged[0] = hash_message(b"oh noes");
        assert!(!verify(&pk_prime, &forged, &sig_prime));
    }

    #[test]
    fn change_representation_roundtrips_and_rejects_forged_message() {
        let mut rng = thread_rng();
        let ell = 5;
        let (pk, sk) = key_gen(ell, &mut rng);
        let msg = random_message(ell, &mut rng);
        let sig = sign(&sk, &msg, &mut rng).unwrap();

        let mu = algebra::random_scalar(&mut rng);
        let (msg_prime, sig_prime) = change_representation(&pk, &msg, &sig, &mu, &mut rng).unwrap();
        assert!(verify(&pk, &msg_prime, &sig_prime));

        let mut forged = msg_prime.clone();
        *forged.last_mut().unwrap() = hash_message(b"is bad");
        assert!(!verify(&pk, &forged, &sig_prime));
    }

    #[test]
    fn hash_message_is_deterministic_and_collision_free() {
        assert_eq!(hash_message(b"foo"), hash_message(b"foo"));
        assert_ne!(hash_message(b"foo"), hash_message(b"bar"));
        assert_ne!(hash_message(b"bar"), hash_message(b"baz"));
    }

    #[test]
    fn secret_key_scalars_are_zeroised_on_drop() {
        let mut rng = thread_rng();
        let (_, mut sk) = key_gen(3, &mut rng);
        for x in sk.0.iter_mut() {
            *x = Scalar::one();
        }
        // Exercise the same zeroisation path `Drop` runs, without actually dropping `sk` (so we
        // can inspect the buffer afterwards instead of reading freed memory).
        sk.zeroize();
        assert!(sk.0.iter().all(|s| bool::from(s.is_zero())));
    }
}
