//! Abstract join and exit requests and their pool family specific encoding
//! into the vault's opaque `userData`.
//!
//! All token indexed arrays and token indices of a request are in the space
//! of the pool's member tokens, i.e. they never contain an entry for the
//! pool's own BPT.

use {
    crate::pools::{Feature, PoolKind},
    alloy::{
        primitives::{Bytes, U256},
        sol_types::SolValue,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum JoinKind {
    ExactTokensInForBptOut,
    TokenInForExactBptOut,
    AllTokensInForExactBptOut,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitKind {
    ExactBptInForOneTokenOut,
    ExactBptInForTokensOut,
    BptInForExactTokensOut,
}

impl JoinKind {
    /// The capability a pool needs for joins of this kind.
    pub fn feature(self) -> Feature {
        match self {
            Self::ExactTokensInForBptOut | Self::AllTokensInForExactBptOut => Feature::AllTokens,
            Self::TokenInForExactBptOut => Feature::SingleToken,
        }
    }

    /// The on-chain `JoinKind` enum value of `family`, if it supports the
    /// kind at all.
    pub fn code(self, family: PoolKind) -> Option<u8> {
        use {JoinKind::*, PoolKind::*};
        match (family, self) {
            (Weighted | ComposableStable, ExactTokensInForBptOut) => Some(1),
            (Weighted | ComposableStable, TokenInForExactBptOut) => Some(2),
            (Weighted | ComposableStable, AllTokensInForExactBptOut) => Some(3),
            (Stable | MetaStable, ExactTokensInForBptOut) => Some(1),
            (Stable | MetaStable, TokenInForExactBptOut) => Some(2),
            (Stable | MetaStable, AllTokensInForExactBptOut) => None,
            (Gyro2Clp, AllTokensInForExactBptOut) => Some(1),
            (Gyro2Clp, ExactTokensInForBptOut | TokenInForExactBptOut) => None,
        }
    }
}

impl ExitKind {
    pub fn feature(self) -> Feature {
        match self {
            Self::ExactBptInForTokensOut | Self::BptInForExactTokensOut => Feature::AllTokens,
            Self::ExactBptInForOneTokenOut => Feature::SingleToken,
        }
    }

    pub fn code(self, family: PoolKind) -> Option<u8> {
        use {ExitKind::*, PoolKind::*};
        match (family, self) {
            (Weighted | Stable | MetaStable, ExactBptInForOneTokenOut) => Some(0),
            (Weighted | Stable | MetaStable, ExactBptInForTokensOut) => Some(1),
            (Weighted | Stable | MetaStable, BptInForExactTokensOut) => Some(2),
            (ComposableStable, ExactBptInForOneTokenOut) => Some(0),
            (ComposableStable, BptInForExactTokensOut) => Some(1),
            (ComposableStable, ExactBptInForTokensOut) => Some(2),
            (Gyro2Clp, ExactBptInForTokensOut) => Some(0),
            (Gyro2Clp, ExactBptInForOneTokenOut | BptInForExactTokensOut) => None,
        }
    }
}

/// How liquidity is added to a pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JoinRequest {
    /// Join with exactly `amounts_in`, minting at least `min_bpt_out`.
    ExactTokensInForBptOut {
        amounts_in: Vec<U256>,
        min_bpt_out: U256,
    },
    /// Mint exactly `bpt_out` paying with a single token.
    TokenInForExactBptOut {
        bpt_out: U256,
        token_index: usize,
        max_amount_in: U256,
    },
    /// Mint exactly `bpt_out` paying proportionally with all tokens.
    AllTokensInForExactBptOut {
        bpt_out: U256,
        max_amounts_in: Vec<U256>,
    },
}

impl JoinRequest {
    pub fn kind(&self) -> JoinKind {
        match self {
            Self::ExactTokensInForBptOut { .. } => JoinKind::ExactTokensInForBptOut,
            Self::TokenInForExactBptOut { .. } => JoinKind::TokenInForExactBptOut,
            Self::AllTokensInForExactBptOut { .. } => JoinKind::AllTokensInForExactBptOut,
        }
    }

    /// Vault level `maxAmountsIn` over the `len` member tokens.
    pub fn max_amounts_in(&self, len: usize) -> Vec<U256> {
        match self {
            Self::ExactTokensInForBptOut { amounts_in, .. } => amounts_in.clone(),
            Self::TokenInForExactBptOut {
                token_index,
                max_amount_in,
                ..
            } => single(len, *token_index, *max_amount_in),
            Self::AllTokensInForExactBptOut { max_amounts_in, .. } => max_amounts_in.clone(),
        }
    }

    pub fn token_arrays(&self) -> Vec<&[U256]> {
        match self {
            Self::ExactTokensInForBptOut { amounts_in, .. } => vec![amounts_in.as_slice()],
            Self::TokenInForExactBptOut { .. } => vec![],
            Self::AllTokensInForExactBptOut { max_amounts_in, .. } => {
                vec![max_amounts_in.as_slice()]
            }
        }
    }

    pub fn token_index(&self) -> Option<usize> {
        match self {
            Self::TokenInForExactBptOut { token_index, .. } => Some(*token_index),
            _ => None,
        }
    }

    /// ABI encoded `userData` for the on-chain join kind `code`.
    pub fn user_data(&self, code: u8) -> Bytes {
        let code = U256::from(code);
        let encoded = match self {
            Self::ExactTokensInForBptOut {
                amounts_in,
                min_bpt_out,
            } => (code, amounts_in.clone(), *min_bpt_out).abi_encode_params(),
            Self::TokenInForExactBptOut {
                bpt_out,
                token_index,
                ..
            } => (code, *bpt_out, U256::from(*token_index)).abi_encode_params(),
            Self::AllTokensInForExactBptOut { bpt_out, .. } => (code, *bpt_out).abi_encode_params(),
        };
        encoded.into()
    }
}

/// How liquidity is removed from a pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExitRequest {
    /// Burn exactly `bpt_in` for a single token.
    ExactBptInForOneTokenOut {
        bpt_in: U256,
        token_index: usize,
        min_amount_out: U256,
    },
    /// Burn exactly `bpt_in` for all tokens proportionally.
    ExactBptInForTokensOut {
        bpt_in: U256,
        min_amounts_out: Vec<U256>,
    },
    /// Withdraw exactly `amounts_out`, burning at most `max_bpt_in`.
    BptInForExactTokensOut {
        amounts_out: Vec<U256>,
        max_bpt_in: U256,
    },
}

impl ExitRequest {
    pub fn kind(&self) -> ExitKind {
        match self {
            Self::ExactBptInForOneTokenOut { .. } => ExitKind::ExactBptInForOneTokenOut,
            Self::ExactBptInForTokensOut { .. } => ExitKind::ExactBptInForTokensOut,
            Self::BptInForExactTokensOut { .. } => ExitKind::BptInForExactTokensOut,
        }
    }

    /// Vault level `minAmountsOut` over the `len` member tokens.
    pub fn min_amounts_out(&self, len: usize) -> Vec<U256> {
        match self {
            Self::ExactBptInForOneTokenOut {
                token_index,
                min_amount_out,
                ..
            } => single(len, *token_index, *min_amount_out),
            Self::ExactBptInForTokensOut {
                min_amounts_out, ..
            } => min_amounts_out.clone(),
            Self::BptInForExactTokensOut { amounts_out, .. } => amounts_out.clone(),
        }
    }

    pub fn token_arrays(&self) -> Vec<&[U256]> {
        match self {
            Self::ExactBptInForOneTokenOut { .. } => vec![],
            Self::ExactBptInForTokensOut {
                min_amounts_out, ..
            } => vec![min_amounts_out.as_slice()],
            Self::BptInForExactTokensOut { amounts_out, .. } => vec![amounts_out.as_slice()],
        }
    }

    pub fn token_index(&self) -> Option<usize> {
        match self {
            Self::ExactBptInForOneTokenOut { token_index, .. } => Some(*token_index),
            _ => None,
        }
    }

    pub fn user_data(&self, code: u8) -> Bytes {
        let code = U256::from(code);
        let encoded = match self {
            Self::ExactBptInForOneTokenOut {
                bpt_in,
                token_index,
                ..
            } => (code, *bpt_in, U256::from(*token_index)).abi_encode_params(),
            Self::ExactBptInForTokensOut { bpt_in, .. } => (code, *bpt_in).abi_encode_params(),
            Self::BptInForExactTokensOut {
                amounts_out,
                max_bpt_in,
            } => (code, amounts_out.clone(), *max_bpt_in).abi_encode_params(),
        };
        encoded.into()
    }
}

fn single(len: usize, index: usize, amount: U256) -> Vec<U256> {
    (0..len)
        .map(|i| if i == index { amount } else { U256::ZERO })
        .collect()
}
