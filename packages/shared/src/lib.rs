//! Utilities shared between the Parley binaries and tests.

pub mod logger;
pub mod time;
