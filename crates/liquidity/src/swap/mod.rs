//! Replica of the on-chain Balancer fixed point math.

pub mod error;
pub mod fixed_point;
