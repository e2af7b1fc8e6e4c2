//! Meta-stable pools hold rate-bearing tokens, so their scaling factors move
//! with the token rates. Gyro pools scale the same way.

use {
    super::Pool,
    crate::{
        error::{MathResultExt as _, Result},
        pool_state::PoolContext,
        scaling::{self, ScalingFactors},
    },
};

/// Decimal scaling factors with the current token rates folded in.
pub async fn rate_scaling_factors(
    pool: &Pool,
    context: &PoolContext<'_>,
) -> Result<ScalingFactors> {
    let rates = context.token_rates().await?;
    itertools::izip!(pool.member_tokens(), rates)
        .map(|(token, rate)| {
            let factor =
                scaling::decimal_scaling_factor(pool.address(), token.address, token.decimals)?;
            scaling::rate_scaling_factor(&factor, rate).in_pool(pool.address())
        })
        .collect::<Result<_>>()
        .map(ScalingFactors::new)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            pool_state::MockPoolStateProviding,
            pools::{PoolKind, tests::*},
            swap::fixed_point::Bfp,
        },
        alloy::primitives::U256,
    };

    #[tokio::test]
    async fn rates_are_read_per_call() {
        let pool = pool(
            PoolKind::MetaStable,
            vec![token(TOKEN_A, 18), token(TOKEN_B, 6)],
            None,
        );
        let mut provider = MockPoolStateProviding::new();
        provider.expect_token_rates().times(2).returning(|_| {
            Ok(vec![
                U256::from(1_100_000_000_000_000_000u128),
                U256::from(1_000_000_000_000_000_000u128),
            ])
        });

        for _ in 0..2 {
            let context = PoolContext::new(&provider, pool.config());
            let factors = pool.scaling_factors(&context).await.unwrap();
            // Cached within one context.
            pool.scaling_factors(&context).await.unwrap();
            assert_eq!(
                factors.factors(),
                [
                    Bfp::from_wei(U256::from(1_100_000_000_000_000_000u128)),
                    Bfp::from(1_000_000_000_000),
                ]
            );
        }
    }

    #[tokio::test]
    async fn upscaled_ratio_uses_rates() {
        let pool = pool(
            PoolKind::MetaStable,
            vec![token(TOKEN_A, 18), token(TOKEN_B, 18)],
            None,
        );
        let mut provider = MockPoolStateProviding::new();
        provider.expect_token_rates().returning(|_| {
            Ok(vec![
                U256::from(3_000_000_000_000_000_000u128),
                U256::from(1_000_000_000_000_000_000u128),
            ])
        });
        provider.expect_pool_tokens().returning(|_| {
            Ok(vec![
                (TOKEN_A, U256::from(1_000_000_000_000_000_000u128)),
                (TOKEN_B, U256::from(1_000_000_000_000_000_000u128)),
            ])
        });

        let ratios = pool.swap_ratios(&provider).await.unwrap();
        assert_eq!(
            ratios,
            vec![
                Bfp::from_wei(U256::from(750_000_000_000_000_000u128)),
                Bfp::from_wei(U256::from(250_000_000_000_000_000u128)),
            ]
        );
    }
}
