use thiserror::Error;

/// Errors this crate can return. Every other failure mode either panics (an invariant violation —
/// a caller or implementation bug) or is reported as a plain `bool` (signature/chain verification).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MercurialError {
    /// A bounded retry budget for sampling a nonzero scalar (the `y` in `Sign`, or the `psi` in
    /// `ConvertSignature`/`ChangeRepresentation`) was exhausted. With a sound RNG this is
    /// astronomically unlikely; callers may simply retry with a fresh draw.
    #[error("exhausted retry budget while sampling a nonzero scalar")]
    RandomnessExhausted,
}
