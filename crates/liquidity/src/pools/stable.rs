//! Stable pools, and the balance-proportional ratio math that every family
//! except weighted pools shares.

use {
    super::Pool,
    crate::{
        error::{MathResultExt as _, Result},
        scaling::{self, ScalingFactors},
        swap::fixed_point::Bfp,
    },
    alloy::primitives::Address,
};

/// Scaling factors from token decimals alone.
pub fn decimal_scaling_factors(pool: &Pool) -> Result<ScalingFactors> {
    pool.member_tokens()
        .iter()
        .map(|token| {
            scaling::decimal_scaling_factor(pool.address(), token.address, token.decimals)
        })
        .collect::<Result<_>>()
        .map(ScalingFactors::new)
}

/// Each upscaled balance divided by the upscaled total.
pub fn balance_ratios(pool: Address, balances: &[Bfp]) -> Result<Vec<Bfp>> {
    let total = balances
        .iter()
        .try_fold(Bfp::zero(), |total, balance| total.add(balance))
        .in_pool(pool)?;
    let leading = balances
        .iter()
        .take(balances.len().saturating_sub(1))
        .map(|balance| balance.div_down(&total))
        .collect::<Result<Vec<_>, _>>()
        .in_pool(pool)?;
    close_ratios(pool, leading)
}

/// Appends the last ratio as `ONE` minus all others so that rounding in the
/// individual entries never makes the ratios sum to anything but `ONE`.
pub(super) fn close_ratios(pool: Address, mut leading: Vec<Bfp>) -> Result<Vec<Bfp>> {
    let sum = leading
        .iter()
        .try_fold(Bfp::zero(), |sum, ratio| sum.add(ratio))
        .in_pool(pool)?;
    leading.push(Bfp::one().sub(&sum).in_pool(pool)?);
    Ok(leading)
}
