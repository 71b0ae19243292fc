//! Shared utilities.
//!
//! Shell quoting, hashing, and test helpers.

pub mod hash;
pub mod shell;

#[cfg(test)]
pub mod testutil;
