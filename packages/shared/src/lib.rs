//! Utilities shared by the roomkeeper crates.

pub mod logger;
pub mod time;
