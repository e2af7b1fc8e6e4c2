//! Encoded vault calls ("zap steps") that an external assembler chains into a
//! multi-step transaction.

use {
    crate::{
        contracts::IVault,
        error::Result,
        join_exit::{ExitRequest, JoinRequest},
        pool_state::{PoolContext, PoolStateProviding},
        pools::{Feature, Pool, PoolKind, gyro_2clp},
    },
    alloy::{
        primitives::{Address, B256, Bytes, U256},
        sol_types::SolCall,
    },
    tracing::instrument,
};

/// An interaction as the `(target, value, calldata)` triple settlement
/// contracts execute.
pub type EncodedInteraction = (Address, U256, Bytes);

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum StepKind {
    Join,
    Exit,
}

/// A fully encoded join or exit against the vault.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZapStep {
    pub kind: StepKind,
    /// The vault.
    pub target: Address,
    pub pool_id: B256,
    pub sender: Address,
    pub recipient: Address,
    /// All tokens registered for the pool, including a composable pool's BPT.
    pub assets: Vec<Address>,
    /// Maximum amounts in for joins, minimum amounts out for exits.
    pub amounts: Vec<U256>,
    pub user_data: Bytes,
    pub use_internal_balance: bool,
}

impl ZapStep {
    pub fn encode(&self) -> EncodedInteraction {
        let calldata = match self.kind {
            StepKind::Join => IVault::joinPoolCall {
                poolId: self.pool_id,
                sender: self.sender,
                recipient: self.recipient,
                request: IVault::JoinPoolRequest {
                    assets: self.assets.clone(),
                    maxAmountsIn: self.amounts.clone(),
                    userData: self.user_data.clone(),
                    fromInternalBalance: self.use_internal_balance,
                },
            }
            .abi_encode(),
            StepKind::Exit => IVault::exitPoolCall {
                poolId: self.pool_id,
                sender: self.sender,
                recipient: self.recipient,
                request: IVault::ExitPoolRequest {
                    assets: self.assets.clone(),
                    minAmountsOut: self.amounts.clone(),
                    userData: self.user_data.clone(),
                    toInternalBalance: self.use_internal_balance,
                },
            }
            .abi_encode(),
        };
        (self.target, U256::ZERO, calldata.into())
    }
}

impl Pool {
    /// Zap step for an arbitrary join.
    pub fn join_step(
        &self,
        request: &JoinRequest,
        sender: Address,
        recipient: Address,
    ) -> Result<ZapStep> {
        let settings = self.settings();
        let request = self.join_pool_request(request, settings.use_internal_balance)?;
        Ok(ZapStep {
            kind: StepKind::Join,
            target: settings.vault,
            pool_id: self.config().id,
            sender,
            recipient,
            assets: request.assets,
            amounts: request.maxAmountsIn,
            user_data: request.userData,
            use_internal_balance: request.fromInternalBalance,
        })
    }

    /// Zap step for an arbitrary exit.
    pub fn exit_step(
        &self,
        request: &ExitRequest,
        sender: Address,
        recipient: Address,
    ) -> Result<ZapStep> {
        let settings = self.settings();
        let request = self.exit_pool_request(request, settings.use_internal_balance)?;
        Ok(ZapStep {
            kind: StepKind::Exit,
            target: settings.vault,
            pool_id: self.config().id,
            sender,
            recipient,
            assets: request.assets,
            amounts: request.minAmountsOut,
            user_data: request.userData,
            use_internal_balance: request.toInternalBalance,
        })
    }

    /// Adds `amounts_in` minting at least `min_liquidity`. Gyro pools mint the
    /// largest exact amount their search finds within `amounts_in`, which
    /// needs the pool state.
    #[instrument(skip_all, fields(pool = %self.address(), family = %self.kind()))]
    pub async fn get_add_liquidity_zap(
        &self,
        provider: &dyn PoolStateProviding,
        amounts_in: &[U256],
        min_liquidity: U256,
        sender: Address,
        recipient: Address,
    ) -> Result<ZapStep> {
        self.ensure_feature(Feature::AllTokens)?;
        if !min_liquidity.is_zero() {
            self.ensure_feature(Feature::AddSlippage)?;
        }
        self.ensure_amounts_in(amounts_in)?;

        let request = match self.kind() {
            PoolKind::Gyro2Clp => {
                let context = PoolContext::new(provider, self.config());
                let quote = gyro_2clp::estimate_add_liquidity(self, &context, amounts_in).await?;
                JoinRequest::AllTokensInForExactBptOut {
                    bpt_out: quote.liquidity,
                    max_amounts_in: amounts_in.to_vec(),
                }
            }
            _ => JoinRequest::ExactTokensInForBptOut {
                amounts_in: amounts_in.to_vec(),
                min_bpt_out: min_liquidity,
            },
        };
        let step = self.join_step(&request, sender, recipient)?;
        tracing::debug!(?request, "built add liquidity zap");
        Ok(step)
    }

    /// Burns `bpt_in` for all member tokens, paying out at least
    /// `min_amounts_out`.
    #[instrument(skip_all, fields(pool = %self.address(), family = %self.kind()))]
    pub fn get_remove_liquidity_zap(
        &self,
        bpt_in: U256,
        min_amounts_out: &[U256],
        sender: Address,
        recipient: Address,
    ) -> Result<ZapStep> {
        self.ensure_feature(Feature::AllTokens)?;
        if min_amounts_out.iter().any(|amount| !amount.is_zero()) {
            self.ensure_feature(Feature::RemoveSlippage)?;
        }
        self.ensure_bpt_amount(bpt_in)?;

        let request = ExitRequest::ExactBptInForTokensOut {
            bpt_in,
            min_amounts_out: min_amounts_out.to_vec(),
        };
        let step = self.exit_step(&request, sender, recipient)?;
        tracing::debug!(?request, "built remove liquidity zap");
        Ok(step)
    }

    /// Mints exactly `bpt_out` paying at most `max_amount_in` of the member
    /// token at `token_index`.
    #[instrument(skip_all, fields(pool = %self.address(), family = %self.kind()))]
    pub fn get_add_liquidity_single_zap(
        &self,
        token_index: usize,
        bpt_out: U256,
        max_amount_in: U256,
        sender: Address,
        recipient: Address,
    ) -> Result<ZapStep> {
        self.ensure_feature(Feature::SingleToken)?;
        self.ensure_bpt_amount(bpt_out)?;

        let request = JoinRequest::TokenInForExactBptOut {
            bpt_out,
            token_index,
            max_amount_in,
        };
        self.join_step(&request, sender, recipient)
    }

    /// Burns `bpt_in` for at least `min_amount_out` of the member token at
    /// `token_index`.
    #[instrument(skip_all, fields(pool = %self.address(), family = %self.kind()))]
    pub fn get_remove_liquidity_single_zap(
        &self,
        bpt_in: U256,
        token_index: usize,
        min_amount_out: U256,
        sender: Address,
        recipient: Address,
    ) -> Result<ZapStep> {
        self.ensure_feature(Feature::SingleToken)?;
        if !min_amount_out.is_zero() {
            self.ensure_feature(Feature::RemoveSlippage)?;
        }
        self.ensure_bpt_amount(bpt_in)?;

        let request = ExitRequest::ExactBptInForOneTokenOut {
            bpt_in,
            token_index,
            min_amount_out,
        };
        self.exit_step(&request, sender, recipient)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            config::{BALANCER_V2_VAULT, Config},
            error::Error,
            pool_state::{JoinQuery, MockPoolStateProviding},
            pools::tests::*,
        },
        alloy::primitives::address,
    };

    const SENDER: Address = address!("9008d19f58aabd9ed0d60971565aa8510560ab41");
    const RECIPIENT: Address = address!("c92e8bdf79f0507f65a392b0ab4667716bfe0110");

    #[test]
    fn encodes_join_calldata() {
        let pool = pool(
            PoolKind::Weighted,
            vec![token(TOKEN_A, 18), token(TOKEN_B, 18)],
            None,
        );
        let step = pool
            .join_step(
                &JoinRequest::ExactTokensInForBptOut {
                    amounts_in: vec![U256::from(1), U256::from(2)],
                    min_bpt_out: U256::from(3),
                },
                SENDER,
                RECIPIENT,
            )
            .unwrap();

        let (target, value, calldata) = step.encode();
        assert_eq!(target, BALANCER_V2_VAULT);
        assert_eq!(value, U256::ZERO);
        assert_eq!(calldata[..4], IVault::joinPoolCall::SELECTOR);

        let decoded = IVault::joinPoolCall::abi_decode(&calldata).unwrap();
        assert_eq!(decoded.poolId, POOL_ID);
        assert_eq!(decoded.sender, SENDER);
        assert_eq!(decoded.recipient, RECIPIENT);
        assert_eq!(decoded.request.assets, vec![TOKEN_A, TOKEN_B]);
        assert_eq!(decoded.request.maxAmountsIn, vec![U256::from(1), U256::from(2)]);
        assert_eq!(decoded.request.userData, step.user_data);
        assert!(!decoded.request.fromInternalBalance);
    }

    #[test]
    fn encodes_composable_exit_calldata() {
        let pool = Pool::new(
            PoolKind::ComposableStable,
            config(
                vec![token(TOKEN_A, 18), token(POOL, 18), token(TOKEN_C, 6)],
                Some(1),
            ),
            Config {
                use_internal_balance: true,
                ..Default::default()
            },
        )
        .unwrap();
        let step = pool
            .get_remove_liquidity_single_zap(U256::from(10), 1, U256::from(9), SENDER, RECIPIENT)
            .unwrap();
        assert_eq!(step.kind, StepKind::Exit);
        assert_eq!(step.amounts, vec![U256::ZERO, U256::ZERO, U256::from(9)]);

        let (_, _, calldata) = step.encode();
        assert_eq!(calldata[..4], IVault::exitPoolCall::SELECTOR);
        let decoded = IVault::exitPoolCall::abi_decode(&calldata).unwrap();
        assert_eq!(decoded.request.assets, vec![TOKEN_A, POOL, TOKEN_C]);
        assert!(decoded.request.toInternalBalance);
        // Member token index 1 is the second non-BPT token.
        assert_eq!(decoded.request.userData[95], 1);
    }

    #[test]
    fn slippage_needs_feature() {
        let gyro = pool(
            PoolKind::Gyro2Clp,
            vec![token(TOKEN_A, 18), token(TOKEN_B, 18)],
            None,
        );
        assert!(
            gyro.get_remove_liquidity_zap(
                U256::from(5),
                &[U256::from(1), U256::from(1)],
                SENDER,
                RECIPIENT
            )
            .is_ok()
        );
        assert!(matches!(
            gyro.get_add_liquidity_single_zap(0, U256::from(1), U256::from(1), SENDER, RECIPIENT),
            Err(Error::UnsupportedFeature {
                feature: Feature::SingleToken,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn gyro_add_zap_rejects_min_liquidity() {
        let gyro = pool(
            PoolKind::Gyro2Clp,
            vec![token(TOKEN_A, 18), token(TOKEN_B, 18)],
            None,
        );
        let provider = MockPoolStateProviding::new();
        assert!(matches!(
            gyro.get_add_liquidity_zap(
                &provider,
                &[U256::from(10), U256::from(10)],
                U256::from(1),
                SENDER,
                RECIPIENT
            )
            .await,
            Err(Error::UnsupportedFeature {
                feature: Feature::AddSlippage,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn gyro_add_zap_mints_exact_bpt() {
        const E18: u128 = 1_000_000_000_000_000_000;
        let gyro = pool(
            PoolKind::Gyro2Clp,
            vec![token(TOKEN_A, 18), token(TOKEN_B, 18)],
            None,
        );
        let mut provider = MockPoolStateProviding::new();
        provider
            .expect_actual_supply()
            .returning(|_| Ok(U256::from(1000 * E18)));
        provider
            .expect_token_rates()
            .returning(|_| Ok(vec![U256::from(E18); 2]));
        provider.expect_pool_tokens().returning(|_| {
            Ok(vec![
                (TOKEN_A, U256::from(1000 * E18)),
                (TOKEN_B, U256::from(1000 * E18)),
            ])
        });
        provider
            .expect_query_join()
            .returning(|_, _, _, request| {
                Ok(JoinQuery {
                    bpt_out: U256::ZERO,
                    amounts_in: request.maxAmountsIn,
                })
            });

        let amounts_in = [U256::from(100 * E18), U256::from(300 * E18)];
        let step = gyro
            .get_add_liquidity_zap(&provider, &amounts_in, U256::ZERO, SENDER, RECIPIENT)
            .await
            .unwrap();
        assert_eq!(step.amounts, amounts_in);
        assert_eq!(step.user_data[31], 1);
        assert_eq!(
            U256::from_be_slice(&step.user_data[32..64]),
            U256::from(100 * E18)
        );
    }

    #[tokio::test]
    async fn add_zap_carries_min_liquidity() {
        let pool = pool(
            PoolKind::MetaStable,
            vec![token(TOKEN_A, 18), token(TOKEN_B, 18)],
            None,
        );
        let provider = MockPoolStateProviding::new();
        let step = pool
            .get_add_liquidity_zap(
                &provider,
                &[U256::from(10), U256::ZERO],
                U256::from(7),
                SENDER,
                RECIPIENT,
            )
            .await
            .unwrap();
        assert_eq!(step.kind, StepKind::Join);
        assert_eq!(step.user_data[31], 1);
        assert_eq!(step.user_data[95], 7);
        assert_eq!(step.target, BALANCER_V2_VAULT);
    }
}
