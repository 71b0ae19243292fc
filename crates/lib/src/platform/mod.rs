//! Host environment lookups.

pub mod paths;
