//! A delegatable anonymous credential scheme built on two Mercurial signature variants
//! ([`mercurial::primary`], [`mercurial::dual`]) over a Type-III bilinear pairing.
//!
//! [`dac`] composes the two variants into credential chains; [`algebra`] is the thin adapter over
//! the underlying pairing library; [`error`] holds the one fallible-but-recoverable error this
//! crate can return.

pub mod algebra;
pub mod constants;
pub mod dac;
pub mod error;
pub mod mercurial;
