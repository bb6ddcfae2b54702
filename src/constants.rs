//! Domain-separation tags and tuning constants. Kept as plain `&[u8]` constants, the same way the
//! teacher crate separates its PVSS hashing domains, rather than computed at startup.

/// Domain separator for `mercurial::primary::hash_message` (hash-to-G1).
pub const DST_HASH_MESSAGE_PRIMARY: &[u8] = b"MERCURIAL_SIGNATURE_PRIMARY_HASH_MESSAGE_G1";

/// Domain separator for `mercurial::dual::hash_message` (hash-to-G2).
pub const DST_HASH_MESSAGE_DUAL: &[u8] = b"MERCURIAL_SIGNATURE_DUAL_HASH_MESSAGE_G2";

/// Upper bound on how many times a nonzero-scalar sampler retries before giving up. The true
/// probability of needing a second draw is ~2^-254; this bound only exists to give a broken RNG a
/// well-defined failure instead of an infinite loop.
pub const MAX_SCALAR_RESAMPLE_ATTEMPTS: usize = 16;

/// Key lengths exercised by the per-level-length sweep in the integration tests.
pub const TEST_ELL_SWEEP: [usize; 3] = [2, 3, 4];
