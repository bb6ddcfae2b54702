//! The delegatable anonymous credential protocol (§4.3): composes [`crate::mercurial::primary`]
//! and [`crate::mercurial::dual`] into a credential chain, alternating variants at each position.
//!
//! A chain position's variant is never recomputed from an index-parity formula at the call site;
//! it falls directly out of matching on a [`Pseudonym`]'s own enum tag, which is what lets the
//! algebra stay correct without re-deriving the alternation rule at every step (see DESIGN.md for
//! the derivation of which variant signs which position, and why the source spec's prose about it
//! is internally inconsistent).

use crate::algebra::{self, Scalar};
use crate::error::MercurialError;
use crate::mercurial::{dual, primary};
use rand_core::{CryptoRng, RngCore};

/// A dual-variant key pair, held by a chain member who will issue credentials *from* an
/// even-indexed position.
pub type EvenKeyPair = (dual::PublicKey, dual::SecretKey);

/// A primary-variant key pair, held by a chain member who will issue credentials *from* an
/// odd-indexed position.
pub type OddKeyPair = (primary::PublicKey, primary::SecretKey);

/// A pseudonym: a re-randomised public key, tagged by which Mercurial variant produced it.
#[derive(Clone, Debug, PartialEq)]
pub enum Pseudonym {
    Dual(dual::PublicKey),
    Primary(primary::PublicKey),
}

/// A secret key handed to `issue_next`, tagged by variant. Consumed by value: since neither
/// underlying secret-key type is `Clone`, a caller cannot reuse it after issuing.
#[derive(Debug)]
pub enum SecretKeyHandle {
    Dual(dual::SecretKey),
    Primary(primary::SecretKey),
}

/// A chain-link signature, tagged by which variant produced it.
#[derive(Clone, Debug, PartialEq)]
pub enum Signature {
    Dual(dual::Signature),
    Primary(primary::Signature),
}

/// One link of a credential chain: a pseudonym and the signature over it.
#[derive(Clone, Debug, PartialEq)]
pub struct ChainLink {
    pub nym: Pseudonym,
    pub sig: Signature,
}

/// A credential chain, stored as a single sequence of links rather than two parallel sequences of
/// pseudonyms and signatures — the equal-length invariant the source spec calls out becomes
/// unrepresentable rather than merely asserted.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct CredentialChain {
    pub links: Vec<ChainLink>,
}

impl CredentialChain {
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// The root state of a delegatable anonymous credential instance: a fixed key length and a fixed,
/// dual-variant root key pair. Immutable after construction.
pub struct Dac {
    ell: usize,
    initial_pk: dual::PublicKey,
    initial_sk: dual::SecretKey,
}

impl Dac {
    /// Constructs a new DAC instance with per-level key length `ell`, generating a fresh
    /// dual-variant root key pair.
    pub fn new<R: RngCore + CryptoRng>(ell: usize, rng: &mut R) -> Self {
        more_asserts::assert_gt!(ell, 0, "ell must be a positive key length");
        let (initial_pk, initial_sk) = dual::key_gen(ell, rng);
        Dac {
            ell,
            initial_pk,
            initial_sk,
        }
    }

    pub fn ell(&self) -> usize {
        self.ell
    }

    pub fn initial_public_key(&self) -> &dual::PublicKey {
        &self.initial_pk
    }

    /// Generates one dual-variant key pair (for even positions) and one primary-variant key pair
    /// (for odd positions).
    pub fn key_gen<R: RngCore + CryptoRng>(&self, rng: &mut R) -> (EvenKeyPair, OddKeyPair) {
        (dual::key_gen(self.ell, rng), primary::key_gen(self.ell, rng))
    }

    /// Re-randomises an even and an odd key pair into a fresh (pseudonym, secret key) pair each,
    /// independently sampling rho_even and rho_odd.
    pub fn nym_gen<R: RngCore + CryptoRng>(
        &self,
        even_kp: &EvenKeyPair,
        odd_kp: &OddKeyPair,
        rng: &mut R,
    ) -> ((Pseudonym, dual::SecretKey), (Pseudonym, primary::SecretKey)) {
        let rho_even = algebra::random_scalar(rng);
        let rho_odd = algebra::random_scalar(rng);

        let nym_even = dual::convert_public_key(&even_kp.0, &rho_even);
        let sk_even = dual::convert_secret_key(&even_kp.1, &rho_even);

        let nym_odd = primary::convert_public_key(&odd_kp.0, &rho_odd);
        let sk_odd = primary::convert_secret_key(&odd_kp.1, &rho_odd);

        (
            (Pseudonym::Dual(nym_even), sk_even),
            (Pseudonym::Primary(nym_odd), sk_odd),
        )
    }

    /// Signs `initial_nym` with the root secret key, producing a chain of length 1.
    ///
    /// `initial_nym` must be a primary-variant pseudonym: the root key is dual-variant, so its
    /// message group is G2, which is exactly where primary-variant public keys live.
    pub fn issue_first<R: RngCore + CryptoRng>(
        &self,
        initial_nym: Pseudonym,
        rng: &mut R,
    ) -> Result<CredentialChain, MercurialError> {
        let message: dual::Message = match &initial_nym {
            Pseudonym::Primary(pk) => pk.points().to_vec(),
            Pseudonym::Dual(_) => {
                panic!("issue_first requires a primary-variant pseudonym under the dual-variant root key")
            }
        };

        let sig = dual::sign(&self.initial_sk, &message, rng)?;
        Ok(CredentialChain {
            links: vec![ChainLink {
                nym: initial_nym,
                sig: Signature::Dual(sig),
            }],
        })
    }

    /// Extends `chain` by re-randomising every existing link and then appending `new_nym`, signed
    /// by `sk` (the secret key of the current last link's pseudonym).
    pub fn issue_next<R: RngCore + CryptoRng>(
        &self,
        mut chain: CredentialChain,
        new_nym: Pseudonym,
        sk: SecretKeyHandle,
        rng: &mut R,
    ) -> Result<CredentialChain, MercurialError> {
        let n = chain.links.len();
        more_asserts::assert_gt!(n, 0, "cannot extend an empty credential chain");

        // Step 2: re-randomise position 0 under the fixed root key. Only a ChangeRepresentation
        // is applied here (no ConvertSignature): there is no prior link whose own rescaling would
        // need converting into, since `initial_pk` itself is never rescaled. The same `rho` is
        // then reused, unmodified, as the first iteration's conversion scalar in step 3 below.
        let mut rho = algebra::random_scalar(rng);
        {
            let initial_pk = self.initial_pk.clone();
            let mut link0 = chain.links[0].clone();
            rerandomize_root(&initial_pk, &mut link0, &rho, rng)?;
            chain.links[0] = link0;
        }

        // Step 3: thread rho through the remaining links.
        for i in 0..n.saturating_sub(1) {
            let pk_i = chain.links[i].nym.clone();
            let mut next = chain.links[i + 1].clone();
            rho = match pk_i {
                Pseudonym::Dual(pk) => rerandomize_dual(&pk, &mut next, &rho, rng)?,
                Pseudonym::Primary(pk) => rerandomize_primary(&pk, &mut next, &rho, rng)?,
            };
            chain.links[i + 1] = next;
        }

        // Step 4: append the new link, signed by the (re-randomised) final rho.
        let last_nym = chain.links[n - 1].nym.clone();
        let link_new = match (sk, &last_nym) {
            (SecretKeyHandle::Primary(sk), Pseudonym::Primary(_)) => {
                let points = match &new_nym {
                    Pseudonym::Dual(pk) => pk.points().to_vec(),
                    Pseudonym::Primary(_) => panic!(
                        "new pseudonym must be dual-variant to follow a primary-variant predecessor"
                    ),
                };
                let sk_prime = primary::convert_secret_key(&sk, &rho);
                let sig = primary::sign(&sk_prime, &points, rng)?;
                ChainLink {
                    nym: new_nym,
                    sig: Signature::Primary(sig),
                }
            }
            (SecretKeyHandle::Dual(sk), Pseudonym::Dual(_)) => {
                let points = match &new_nym {
                    Pseudonym::Primary(pk) => pk.points().to_vec(),
                    Pseudonym::Dual(_) => panic!(
                        "new pseudonym must be primary-variant to follow a dual-variant predecessor"
                    ),
                };
                let sk_prime = dual::convert_secret_key(&sk, &rho);
                let sig = dual::sign(&sk_prime, &points, rng)?;
                ChainLink {
                    nym: new_nym,
                    sig: Signature::Dual(sig),
                }
            }
            _ => panic!("signing key variant must match the previous chain link's pseudonym variant"),
        };

        debug_assert!(
            verify_link(&self.initial_pk, &chain.links[n - 1], &link_new),
            "newly issued link failed to verify"
        );
        chain.links.push(link_new);
        Ok(chain)
    }

    /// Verifies every link of `chain` against the root key.
    pub fn verify_chain(&self, chain: &CredentialChain) -> bool {
        let n = chain.links.len();
        if n == 0 {
            return false;
        }

        let first = &chain.links[0];
        let first_ok = match (&first.nym, &first.sig) {
            (Pseudonym::Primary(pk), Signature::Dual(sig)) => {
                dual::verify(&self.initial_pk, &pk.points().to_vec(), sig)
            }
            _ => false,
        };
        if !first_ok {
            return false;
        }

        for i in 0..n.saturating_sub(1) {
            if !verify_link(&self.initial_pk, &chain.links[i], &chain.links[i + 1]) {
                return false;
            }
        }
        true
    }
}

/// Verifies that `next` is a correctly signed successor of `prev` (position `i+1` verifying
/// under `prev`'s own pseudonym). `root_pk` is unused here except to keep the function signature
/// uniform with the root-link check; kept private since it only makes sense within this module.
fn verify_link(_root_pk: &dual::PublicKey, prev: &ChainLink, next: &ChainLink) -> bool {
    match (&prev.nym, &next.nym, &next.sig) {
        (Pseudonym::Dual(pk), Pseudonym::Primary(msg_pk), Signature::Dual(sig)) => {
            dual::verify(pk, &msg_pk.points().to_vec(), sig)
        }
        (Pseudonym::Primary(pk), Pseudonym::Dual(msg_pk), Signature::Primary(sig)) => {
            primary::verify(pk, &msg_pk.points().to_vec(), sig)
        }
        _ => false,
    }
}

/// Re-randomises the root link (position 0) by rescaling its message by `rho` under
/// `initial_pk`, which never itself gets rescaled (there is no link before position 0 to have
/// converted it). Unlike [`rerandomize_dual`], this issues a single `ChangeRepresentation` call
/// and no `ConvertSignature` — `rho` is consumed as-is by the caller for the next step, rather than
/// a fresh one being sampled here.
fn rerandomize_root<R: RngCore + CryptoRng>(
    initial_pk: &dual::PublicKey,
    child: &mut ChainLink,
    rho: &Scalar,
    rng: &mut R,
) -> Result<(), MercurialError> {
    let message: dual::Message = match &child.nym {
        Pseudonym::Primary(p) => p.points().to_vec(),
        Pseudonym::Dual(_) => panic!("chain parity violated: expected a primary-variant pseudonym"),
    };
    let Signature::Dual(sig) = &child.sig else {
        panic!("chain parity violated: expected a dual-variant signature");
    };

    let (new_message, new_sig) = dual::change_representation(initial_pk, &message, sig, rho, rng)?;

    debug_assert!(
        dual::verify(initial_pk, &new_message, &new_sig),
        "re-randomised root link failed to verify under initial_pk"
    );

    child.nym = Pseudonym::Primary(primary::PublicKey::from_points(new_message));
    child.sig = Signature::Dual(new_sig);
    Ok(())
}

/// Re-randomises `child` (an existing `(nym, sig)` link) so it verifies under
/// `dual::convert_public_key(pk, rho)` instead of `pk`, threading a freshly sampled rho forward.
fn rerandomize_dual<R: RngCore + CryptoRng>(
    pk: &dual::PublicKey,
    child: &mut ChainLink,
    rho: &Scalar,
    rng: &mut R,
) -> Result<Scalar, MercurialError> {
    let message: dual::Message = match &child.nym {
        Pseudonym::Primary(p) => p.points().to_vec(),
        Pseudonym::Dual(_) => panic!("chain parity violated: expected a primary-variant pseudonym"),
    };
    let Signature::Dual(sig) = &child.sig else {
        panic!("chain parity violated: expected a dual-variant signature");
    };

    let sig_tilde = dual::convert_signature(pk, &message, sig, rho, rng)?;
    let fresh_rho = algebra::random_scalar(rng);
    let (new_message, new_sig) = dual::change_representation(pk, &message, &sig_tilde, &fresh_rho, rng)?;

    debug_assert!(
        dual::verify(pk, &new_message, &new_sig),
        "re-randomised link failed to verify under the dual variant"
    );

    child.nym = Pseudonym::Primary(primary::PublicKey::from_points(new_message));
    child.sig = Signature::Dual(new_sig);
    Ok(fresh_rho)
}

/// Mirror of [`rerandomize_dual`] for a primary-variant `pk`.
fn rerandomize_primary<R: RngCore + CryptoRng>(
    pk: &primary::PublicKey,
    child: &mut ChainLink,
    rho: &Scalar,
    rng: &mut R,
) -> Result<Scalar, MercurialError> {
    let message: primary::Message = match &child.nym {
        Pseudonym::Dual(p) => p.points().to_vec(),
        Pseudonym::Primary(_) => panic!("chain parity violated: expected a dual-variant pseudonym"),
    };
    let Signature::Primary(sig) = &child.sig else {
        panic!("chain parity violated: expected a primary-variant signature");
    };

    let sig_tilde = primary::convert_signature(pk, &message, sig, rho, rng)?;
    let fresh_rho = algebra::random_scalar(rng);
    let (new_message, new_sig) =
        primary::change_representation(pk, &message, &sig_tilde, &fresh_rho, rng)?;

    debug_assert!(
        primary::verify(pk, &new_message, &new_sig),
        "re-randomised link failed to verify under the primary variant"
    );

    child.nym = Pseudonym::Dual(dual::PublicKey::from_points(new_message));
    child.sig = Signature::Primary(new_sig);
    Ok(fresh_rho)
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::thread_rng;

    /// Builds a 5-user chain by alternating `issue_next` calls, mirroring the delegation sequence
    /// a real deployment would run: User 1 -> User 2 -> User 3 -> User 4 -> User 5.
    fn build_five_user_chain<R: RngCore + CryptoRng>(ell: usize, rng: &mut R) -> (Dac, CredentialChain) {
        let dac = Dac::new(ell, rng);

        // User 1's own key material and pseudonym (primary-variant, signed directly by the root).
        let (even_kp1, odd_kp1) = dac.key_gen(rng);
        let ((_nym_even1, _sk_even1), (nym_odd1, sk_odd1)) = dac.nym_gen(&even_kp1, &odd_kp1, rng);
        let mut chain = dac.issue_first(nym_odd1, rng).unwrap();
        assert!(dac.verify_chain(&chain));

        // User 2: dual-variant pseudonym, issued by User 1's primary-variant secret key.
        let (even_kp2, odd_kp2) = dac.key_gen(rng);
        let ((nym_even2, sk_even2), (_nym_odd2, _sk_odd2)) = dac.nym_gen(&even_kp2, &odd_kp2, rng);
        chain = dac
            .issue_next(chain, nym_even2, SecretKeyHandle::Primary(sk_odd1), rng)
            .unwrap();
        assert!(dac.verify_chain(&chain));

        // User 3: primary-variant pseudonym, issued by User 2's dual-variant secret key.
        let (even_kp3, odd_kp3) = dac.key_gen(rng);
        let ((_nym_even3, _sk_even3), (nym_odd3, sk_odd3)) = dac.nym_gen(&even_kp3, &odd_kp3, rng);
        chain = dac
            .issue_next(chain, nym_odd3, SecretKeyHandle::Dual(sk_even2), rng)
            .unwrap();
        assert!(dac.verify_chain(&chain));

        // User 4: dual-variant pseudonym, issued by User 3's primary-variant secret key.
        let (even_kp4, odd_kp4) = dac.key_gen(rng);
        let ((nym_even4, sk_even4), (_nym_odd4, _sk_odd4)) = dac.nym_gen(&even_kp4, &odd_kp4, rng);
        chain = dac
            .issue_next(chain, nym_even4, SecretKeyHandle::Primary(sk_odd3), rng)
            .unwrap();
        assert!(dac.verify_chain(&chain));

        // User 5: primary-variant pseudonym, issued by User 4's dual-variant secret key.
        let (even_kp5, odd_kp5) = dac.key_gen(rng);
        let ((_nym_even5, _sk_even5), (nym_odd5, _sk_odd5)) = dac.nym_gen(&even_kp5, &odd_kp5, rng);
        chain = dac
            .issue_next(chain, nym_odd5, SecretKeyHandle::Dual(sk_even4), rng)
            .unwrap();
        assert!(dac.verify_chain(&chain));

        (dac, chain)
    }

    #[test]
    fn five_user_chain_verifies_at_every_ell_in_the_sweep() {
        let mut rng = thread_rng();
        for ell in crate::constants::TEST_ELL_SWEEP {
            let (dac, chain) = build_five_user_chain(ell, &mut rng);
            assert_eq!(chain.len(), 5);
            assert!(dac.verify_chain(&chain));
        }
    }

    #[test]
    fn tampered_chain_fails_to_verify() {
        let mut rng = thread_rng();
        let (dac, mut chain) = build_five_user_chain(3, &mut rng);

        // Swap two links' signatures: this is a not-even-well-typed forgery in most cases (the
        // variant tags won't line up), which is itself further evidence the chain rejects it.
        chain.links.swap(1, 2);
        assert!(!dac.verify_chain(&chain));
    }

    #[test]
    fn empty_chain_does_not_verify() {
        let dac = Dac::new(3, &mut thread_rng());
        assert!(!dac.verify_chain(&CredentialChain::default()));
    }
}
