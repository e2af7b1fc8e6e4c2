//! Weighted pools split balanced joins and exits by their normalized weights.

use {
    super::{Pool, stable::close_ratios},
    crate::{error::Result, pool_state::PoolContext, swap::fixed_point::Bfp},
};

pub(super) async fn swap_ratios(pool: &Pool, context: &PoolContext<'_>) -> Result<Vec<Bfp>> {
    let weights = context.normalized_weights().await?;
    let leading = weights[..weights.len().saturating_sub(1)].to_vec();
    close_ratios(pool.address(), leading)
}

#[cfg(test)]
mod tests {
    use {
        crate::{
            pool_state::{JoinQuery, MockPoolStateProviding},
            pools::{PoolKind, tests::*},
            swap::fixed_point::Bfp,
        },
        alloy::primitives::U256,
    };

    const HALF: u128 = 500_000_000_000_000_000;

    #[tokio::test]
    async fn ratios_are_weights() {
        let pool = pool(
            PoolKind::Weighted,
            vec![token(TOKEN_A, 18), token(TOKEN_B, 18), token(TOKEN_C, 18)],
            None,
        );
        let mut provider = MockPoolStateProviding::new();
        provider.expect_normalized_weights().returning(|_| {
            Ok(vec![
                U256::from(333_333_333_333_333_333u128),
                U256::from(333_333_333_333_333_333u128),
                U256::from(333_333_333_333_333_333u128),
            ])
        });

        let ratios = pool.swap_ratios(&provider).await.unwrap();
        assert_eq!(
            ratios[2],
            Bfp::from_wei(U256::from(333_333_333_333_333_334u128))
        );
    }

    #[tokio::test]
    async fn partially_used_inputs_are_reported_unused() {
        let pool = pool(
            PoolKind::Weighted,
            vec![token(TOKEN_A, 18), token(TOKEN_B, 18)],
            None,
        );
        let mut provider = MockPoolStateProviding::new();
        provider
            .expect_normalized_weights()
            .returning(|_| Ok(vec![U256::from(HALF), U256::from(HALF)]));
        provider
            .expect_query_join()
            .withf(|pool_id, _, _, request| {
                *pool_id == POOL_ID
                    && request.userData[31] == 1
                    && request.maxAmountsIn == vec![U256::from(100), U256::from(50)]
            })
            .times(1)
            .returning(|_, _, _, _| {
                // The pool only takes 60 of the 100 token A offered.
                Ok(JoinQuery {
                    bpt_out: U256::from(97),
                    amounts_in: vec![U256::from(60), U256::from(50)],
                })
            });

        let ratios = pool.swap_ratios(&provider).await.unwrap();
        assert_eq!(ratios, vec![Bfp::from_wei(U256::from(HALF)); 2]);

        let quote = pool
            .quote_add_liquidity(&provider, &[U256::from(100), U256::from(50)])
            .await
            .unwrap();
        assert_eq!(quote.liquidity, U256::from(97));
        assert_eq!(quote.used_input, vec![U256::from(60), U256::from(50)]);
        assert_eq!(quote.unused_input, vec![U256::from(40), U256::ZERO]);
    }
}
