//! Code that is required to provide or improve the observability of the
//! liquidity crates. For now that is the shared logging initialization.
pub mod tracing;
