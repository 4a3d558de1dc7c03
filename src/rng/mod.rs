//! Reproducible randomness for stochastic quantization.
//!
//! This module has one job: provide the bit source `STOCH_WEIGHTED` and
//! `STOCH_EQUAL` rounding draw from, in a way that is exactly reproducible
//! given a seed. It intentionally does not chase OS entropy or forward
//! secrecy — those are cryptographic-RNG concerns a CSPRNG cares about and
//! this one does not.

mod chacha20;
mod stochastic;

pub use stochastic::StochasticRng;
