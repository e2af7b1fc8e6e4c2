//! Module implementing Gyroscope 2-CLP pool specific liquidity logic.
//!
//! Gyro pools only join by minting an exact amount of BPT for proportional
//! token inputs. The inverse direction, how much BPT a set of capped inputs
//! can mint, has no closed form and is found by searching downwards from an
//! upper bound, using a dry-run join as ground truth for every candidate.

use {
    super::Pool,
    crate::{
        error::{Error, MathResultExt as _, Result},
        join_exit::JoinRequest,
        pool_state::PoolContext,
        quote::AddQuote,
        scaling::ScalingFactors,
        swap::{error::Error as MathError, fixed_point::Bfp},
    },
    alloy::primitives::{Address, U256},
};

/// Finds the largest BPT amount that the pool accepts for at most
/// `amounts_in`.
///
/// Terminates after at most as many candidates as the initial estimate (or
/// the configured search limit) with either a quote whose used input is
/// within `amounts_in` or [`Error::CalculationFailed`].
pub async fn estimate_add_liquidity(
    pool: &Pool,
    context: &PoolContext<'_>,
    amounts_in: &[U256],
) -> Result<AddQuote> {
    let address = pool.address();
    let one_wei = U256::from(1);
    if let Some(index) = amounts_in.iter().position(|amount| *amount <= one_wei) {
        return Err(Error::invalid_input(
            address,
            format!("input amount at index {index} must be greater than 1"),
        ));
    }

    let (supply, balances) = futures::try_join!(
        context.actual_supply(),
        pool.upscaled_balances(context)
    )?;
    let supply = Bfp::from_wei(*supply);
    if supply.is_zero() {
        return Err(Error::invalid_input(address, "pool has no supply"));
    }
    let factors = pool.scaling_factors(context).await?;
    let amounts = factors.upscale_all(address, amounts_in)?;

    let one_wei = Bfp::from_wei(one_wei);
    let mut candidate = initial_estimate(&amounts, &balances, &supply).in_pool(address)?;
    if candidate <= one_wei {
        return Err(Error::invalid_input(
            address,
            format!("initial estimate {candidate:?} is too small"),
        ));
    }

    let limit = pool.settings().gyro_search_limit;
    let mut attempts = 0u64;
    loop {
        if limit.is_some_and(|limit| attempts >= limit) {
            return Err(Error::calculation_failed(
                address,
                format!("no consistent result within {attempts} candidates"),
            ));
        }
        attempts += 1;

        let required = required_amounts(address, &candidate, &balances, &supply, &factors)?;
        if required.iter().all(|amount| *amount <= U256::from(1)) {
            return Err(Error::calculation_failed(
                address,
                "required amounts do not exceed 1",
            ));
        }

        if within(&required, amounts_in) {
            let bpt_out = candidate.as_uint256().in_pool(address)?;
            let request = pool.join_pool_request(
                &JoinRequest::AllTokensInForExactBptOut {
                    bpt_out,
                    max_amounts_in: required.clone(),
                },
                pool.settings().use_internal_balance,
            )?;
            let query = pool.query_join(context, request).await?;
            let used = pool.drop_bpt(query.amounts_in);
            if within(&used, amounts_in) {
                tracing::debug!(%bpt_out, attempts, "found gyro liquidity");
                return AddQuote::new(address, bpt_out, amounts_in, used);
            }
            tracing::trace!(?candidate, ?used, "dry-run exceeds inputs");
        } else {
            tracing::trace!(?candidate, ?required, "required amounts exceed inputs");
        }

        candidate = candidate.sub(&one_wei).in_pool(address)?;
        if candidate <= one_wei {
            return Err(Error::calculation_failed(address, "search exhausted"));
        }
    }
}

/// The BPT minted if each token alone were the binding constraint, taking the
/// minimum over all tokens.
fn initial_estimate(amounts: &[Bfp], balances: &[Bfp], supply: &Bfp) -> Result<Bfp, MathError> {
    let estimates = amounts
        .iter()
        .zip(balances)
        .map(|(amount, balance)| amount.mul_down(supply)?.div_down(balance))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(estimates.into_iter().min().unwrap_or_default())
}

/// Raw token amounts the pool takes for minting exactly `bpt_out`, rounded in
/// the pool's favour.
fn required_amounts(
    pool: Address,
    bpt_out: &Bfp,
    balances: &[Bfp],
    supply: &Bfp,
    factors: &ScalingFactors,
) -> Result<Vec<U256>> {
    let ratio = bpt_out.div_up(supply).in_pool(pool)?;
    let upscaled = balances
        .iter()
        .map(|balance| balance.mul_up(&ratio))
        .collect::<Result<Vec<_>, _>>()
        .in_pool(pool)?;
    factors.downscale_all(pool, &upscaled)
}

fn within(amounts: &[U256], caps: &[U256]) -> bool {
    amounts.len() == caps.len() && amounts.iter().zip(caps).all(|(amount, cap)| amount <= cap)
}
