//! Conversion of raw token amounts into the 18 decimal space the pool math
//! works in and back.

use {
    crate::{
        error::{Error, MathResultExt as _, Result},
        swap::{error::Error as MathError, fixed_point::Bfp},
    },
    alloy::primitives::{Address, U256},
};

/// Highest decimal count a token may have.
const MAX_DECIMALS: u8 = 18;

/// Scaling factor normalizing a token with `decimals` to 18 decimals.
pub fn decimal_scaling_factor(pool: Address, token: Address, decimals: u8) -> Result<Bfp> {
    if decimals > MAX_DECIMALS {
        return Err(Error::UnsupportedDecimals {
            pool,
            token,
            decimals,
        });
    }
    Ok(Bfp::exp10(u32::from(MAX_DECIMALS - decimals)))
}

/// Scaling factor of a rate-bearing token, folding the on-chain rate into its
/// decimal scaling factor.
pub fn rate_scaling_factor(decimal_factor: &Bfp, rate: &Bfp) -> Result<Bfp, MathError> {
    decimal_factor.mul_down(rate)
}

/// Up-scales a single amount, rounding down.
pub fn upscale(amount: U256, factor: &Bfp) -> Result<Bfp, MathError> {
    Bfp::from_wei(amount).mul_down(factor)
}

/// Down-scales a single amount, rounding up so that a result is never
/// smaller than what the pool actually requires or owes.
pub fn downscale(amount: &Bfp, factor: &Bfp) -> Result<U256, MathError> {
    amount.div_up(factor)?.as_uint256()
}

/// Per-token scaling factors of a pool, in the order of its member tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScalingFactors(Vec<Bfp>);

impl ScalingFactors {
    pub fn new(factors: Vec<Bfp>) -> Self {
        Self(factors)
    }

    pub fn factors(&self) -> &[Bfp] {
        &self.0
    }

    /// Up-scales one amount per member token of `pool`.
    pub fn upscale_all(&self, pool: Address, amounts: &[U256]) -> Result<Vec<Bfp>> {
        self.ensure_len(pool, amounts.len())?;
        amounts
            .iter()
            .zip(&self.0)
            .map(|(amount, factor)| upscale(*amount, factor))
            .collect::<Result<Vec<_>, MathError>>()
            .in_pool(pool)
    }

    /// Down-scales one amount per member token of `pool`.
    pub fn downscale_all(&self, pool: Address, amounts: &[Bfp]) -> Result<Vec<U256>> {
        self.ensure_len(pool, amounts.len())?;
        amounts
            .iter()
            .zip(&self.0)
            .map(|(amount, factor)| downscale(amount, factor))
            .collect::<Result<Vec<_>, MathError>>()
            .in_pool(pool)
    }

    fn ensure_len(&self, pool: Address, len: usize) -> Result<()> {
        if len != self.0.len() {
            return Err(Error::calculation_failed(
                pool,
                format!("{len} amounts for {} scaling factors", self.0.len()),
            ));
        }
        Ok(())
    }
}
