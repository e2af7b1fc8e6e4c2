//! Off-chain replica of the Balancer V2 vault's join and exit math.
//!
//! Given the on-chain state of a pool, read through a [`PoolStateProviding`]
//! implementation, a [`Pool`] quotes how much liquidity a join mints or an
//! exit pays out and encodes the matching vault calls as [`ZapStep`]s.

pub mod config;
pub mod contracts;
pub mod error;
pub mod join_exit;
pub mod pool_state;
pub mod pools;
pub mod quote;
pub mod scaling;
pub mod swap;
pub mod zap;

pub use {
    error::{Error, Result},
    pool_state::{PoolContext, PoolStateProviding},
    pools::{Feature, Features, Pool, PoolConfig, PoolKind, Token},
    quote::{AddQuote, RemoveQuote},
    zap::ZapStep,
};
