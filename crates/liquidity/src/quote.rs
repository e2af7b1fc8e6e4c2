//! Dry-run quotes for adding and removing liquidity.

use {
    crate::{
        contracts::IVault,
        error::{Error, Result},
        join_exit::{ExitRequest, JoinRequest},
        pool_state::{ExitQuery, JoinQuery, PoolContext, PoolStateProviding},
        pools::{Feature, Pool, PoolKind, gyro_2clp},
    },
    alloy::primitives::{Address, U256},
    anyhow::anyhow,
    tracing::instrument,
};

/// Estimated outcome of adding liquidity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddQuote {
    /// BPT minted.
    pub liquidity: U256,
    /// Token amounts the pool takes, per member token.
    pub used_input: Vec<U256>,
    /// What is left of the supplied amounts.
    pub unused_input: Vec<U256>,
}

impl AddQuote {
    pub(crate) fn new(
        pool: Address,
        liquidity: U256,
        amounts_in: &[U256],
        used_input: Vec<U256>,
    ) -> Result<Self> {
        let unused_input = amounts_in
            .iter()
            .zip(&used_input)
            .enumerate()
            .map(|(index, (supplied, used))| {
                supplied.checked_sub(*used).ok_or_else(|| {
                    Error::calculation_failed(
                        pool,
                        format!("pool takes {used} of token {index} but only {supplied} supplied"),
                    )
                })
            })
            .collect::<Result<_>>()?;
        Ok(Self {
            liquidity,
            used_input,
            unused_input,
        })
    }
}

/// Estimated outcome of removing liquidity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoveQuote {
    /// BPT burned.
    pub liquidity: U256,
    /// Token amounts paid out, per member token.
    pub amounts_out: Vec<U256>,
}

impl Pool {
    /// Quotes a join with exactly `amounts_in`. Gyro pools cannot join that
    /// way and quote the largest proportional join within `amounts_in`.
    #[instrument(skip_all, fields(pool = %self.address(), family = %self.kind()))]
    pub async fn quote_add_liquidity(
        &self,
        provider: &dyn PoolStateProviding,
        amounts_in: &[U256],
    ) -> Result<AddQuote> {
        self.ensure_feature(Feature::AllTokens)?;
        self.ensure_amounts_in(amounts_in)?;

        let context = PoolContext::new(provider, self.config());
        let quote = match self.kind() {
            PoolKind::Gyro2Clp => {
                gyro_2clp::estimate_add_liquidity(self, &context, amounts_in).await?
            }
            _ => {
                let request = self.join_pool_request(
                    &JoinRequest::ExactTokensInForBptOut {
                        amounts_in: amounts_in.to_vec(),
                        min_bpt_out: U256::ZERO,
                    },
                    self.settings().use_internal_balance,
                )?;
                let query = self.query_join(&context, request).await?;
                AddQuote::new(
                    self.address(),
                    query.bpt_out,
                    amounts_in,
                    self.drop_bpt(query.amounts_in),
                )?
            }
        };
        tracing::debug!(?quote, "quoted add liquidity");
        Ok(quote)
    }

    /// Quotes burning exactly `bpt_in` for all member tokens.
    #[instrument(skip_all, fields(pool = %self.address(), family = %self.kind()))]
    pub async fn quote_remove_liquidity(
        &self,
        provider: &dyn PoolStateProviding,
        bpt_in: U256,
    ) -> Result<RemoveQuote> {
        self.ensure_feature(Feature::AllTokens)?;
        self.ensure_bpt_amount(bpt_in)?;

        let request = ExitRequest::ExactBptInForTokensOut {
            bpt_in,
            min_amounts_out: vec![U256::ZERO; self.member_count()],
        };
        self.quote_exit(provider, &request).await
    }

    /// Quotes burning exactly `bpt_in` for the member token at `token_index`.
    #[instrument(skip_all, fields(pool = %self.address(), family = %self.kind()))]
    pub async fn quote_remove_liquidity_single(
        &self,
        provider: &dyn PoolStateProviding,
        bpt_in: U256,
        token_index: usize,
    ) -> Result<RemoveQuote> {
        self.ensure_feature(Feature::SingleToken)?;
        self.ensure_bpt_amount(bpt_in)?;

        let request = ExitRequest::ExactBptInForOneTokenOut {
            bpt_in,
            token_index,
            min_amount_out: U256::ZERO,
        };
        self.quote_exit(provider, &request).await
    }

    async fn quote_exit(
        &self,
        provider: &dyn PoolStateProviding,
        request: &ExitRequest,
    ) -> Result<RemoveQuote> {
        let request = self.exit_pool_request(request, self.settings().use_internal_balance)?;
        let context = PoolContext::new(provider, self.config());
        let query = self.query_exit(&context, request).await?;
        let quote = RemoveQuote {
            liquidity: query.bpt_in,
            amounts_out: self.drop_bpt(query.amounts_out),
        };
        tracing::debug!(?quote, "quoted remove liquidity");
        Ok(quote)
    }

    /// Dry-runs a join through the provider.
    pub(crate) async fn query_join(
        &self,
        context: &PoolContext<'_>,
        request: IVault::JoinPoolRequest,
    ) -> Result<JoinQuery> {
        let query = context
            .provider()
            .query_join(self.config().id, Address::ZERO, Address::ZERO, request)
            .await
            .map_err(|source| self.unavailable(source))?;
        self.ensure_vault_length(query.amounts_in.len())?;
        Ok(query)
    }

    /// Dry-runs an exit through the provider.
    pub(crate) async fn query_exit(
        &self,
        context: &PoolContext<'_>,
        request: IVault::ExitPoolRequest,
    ) -> Result<ExitQuery> {
        let query = context
            .provider()
            .query_exit(self.config().id, Address::ZERO, Address::ZERO, request)
            .await
            .map_err(|source| self.unavailable(source))?;
        self.ensure_vault_length(query.amounts_out.len())?;
        Ok(query)
    }

    fn ensure_vault_length(&self, len: usize) -> Result<()> {
        let expected = self.config().tokens.len();
        if len != expected {
            return Err(self.unavailable(anyhow!(
                "dry-run returned {len} amounts for {expected} tokens"
            )));
        }
        Ok(())
    }

    fn unavailable(&self, source: anyhow::Error) -> Error {
        Error::StateUnavailable {
            pool: self.address(),
            source,
        }
    }

    /// One amount per member token, not all of them zero.
    pub(crate) fn ensure_amounts_in(&self, amounts_in: &[U256]) -> Result<()> {
        let members = self.member_count();
        if amounts_in.len() != members {
            return Err(Error::invalid_input(
                self.address(),
                format!("expected {members} input amounts but got {}", amounts_in.len()),
            ));
        }
        if amounts_in.iter().all(U256::is_zero) {
            return Err(Error::invalid_input(self.address(), "all input amounts are zero"));
        }
        Ok(())
    }

    pub(crate) fn ensure_bpt_amount(&self, bpt: U256) -> Result<()> {
        if bpt.is_zero() {
            return Err(Error::invalid_input(
                self.address(),
                "pool token amount must be at least 1",
            ));
        }
        Ok(())
    }
}
