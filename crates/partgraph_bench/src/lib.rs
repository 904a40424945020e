//! Shared helpers for the PartGraph benchmarks.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod utils;
