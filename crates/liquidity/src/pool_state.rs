//! Read access to the on-chain state of a pool.
//!
//! The state is fetched through a [`PoolStateProviding`] implementation and
//! memoized for the duration of a single quote or zap in a [`PoolContext`].
//! Nothing is shared between calls since balances and rates move every block.

use {
    crate::{
        contracts::IVault,
        error::{Error, Result},
        pools::PoolConfig,
        swap::fixed_point::Bfp,
    },
    alloy::primitives::{Address, B256, U256},
    anyhow::anyhow,
    tokio::sync::OnceCell,
};

/// Result of a dry-run join, over the full vault token list of the pool.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JoinQuery {
    pub bpt_out: U256,
    pub amounts_in: Vec<U256>,
}

/// Result of a dry-run exit, over the full vault token list of the pool.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExitQuery {
    pub bpt_in: U256,
    pub amounts_out: Vec<U256>,
}

/// Read-only view of the chain that pool math needs. Implementations
/// typically wrap an RPC node together with Balancer's `BalancerQueries`
/// contract.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait::async_trait]
pub trait PoolStateProviding: Send + Sync {
    /// The vault's `getPoolTokens`: registered tokens with their balances.
    async fn pool_tokens(&self, pool_id: B256) -> anyhow::Result<Vec<(Address, U256)>>;

    /// The pool's `getActualSupply`, which includes protocol fees that are
    /// owed but not yet minted.
    async fn actual_supply(&self, pool: Address) -> anyhow::Result<U256>;

    /// The pool's `getScalingFactors`, one per registered token.
    async fn scaling_factors(&self, pool: Address) -> anyhow::Result<Vec<U256>>;

    /// The normalized weights of a weighted pool.
    async fn normalized_weights(&self, pool: Address) -> anyhow::Result<Vec<U256>>;

    /// The current rates of a pool's rate-bearing tokens, one per registered
    /// token. Tokens without a rate provider report `1e18`.
    async fn token_rates(&self, pool: Address) -> anyhow::Result<Vec<U256>>;

    /// Simulates `joinPool` without changing any state.
    async fn query_join(
        &self,
        pool_id: B256,
        sender: Address,
        recipient: Address,
        request: IVault::JoinPoolRequest,
    ) -> anyhow::Result<JoinQuery>;

    /// Simulates `exitPool` without changing any state.
    async fn query_exit(
        &self,
        pool_id: B256,
        sender: Address,
        recipient: Address,
        request: IVault::ExitPoolRequest,
    ) -> anyhow::Result<ExitQuery>;
}

/// State of one pool, read at most once per [`PoolContext`].
pub struct PoolContext<'a> {
    provider: &'a dyn PoolStateProviding,
    config: &'a PoolConfig,
    balances: OnceCell<Vec<U256>>,
    actual_supply: OnceCell<U256>,
    scaling_factors: OnceCell<Vec<Bfp>>,
    normalized_weights: OnceCell<Vec<Bfp>>,
    token_rates: OnceCell<Vec<Bfp>>,
}

impl<'a> PoolContext<'a> {
    pub fn new(provider: &'a dyn PoolStateProviding, config: &'a PoolConfig) -> Self {
        Self {
            provider,
            config,
            balances: OnceCell::new(),
            actual_supply: OnceCell::new(),
            scaling_factors: OnceCell::new(),
            normalized_weights: OnceCell::new(),
            token_rates: OnceCell::new(),
        }
    }

    pub fn provider(&self) -> &'a dyn PoolStateProviding {
        self.provider
    }

    /// Raw balances over the full vault token list.
    pub async fn balances(&self) -> Result<&[U256]> {
        self.balances
            .get_or_try_init(|| async {
                let tokens = self
                    .provider
                    .pool_tokens(self.config.id)
                    .await
                    .map_err(|err| self.unavailable(err))?;
                let (addresses, balances): (Vec<_>, Vec<_>) = tokens.into_iter().unzip();
                if addresses != self.config.token_addresses() {
                    return Err(self.unavailable(anyhow!("pool token mismatch")));
                }
                tracing::trace!(?balances, "fetched pool balances");
                Ok(balances)
            })
            .await
            .map(Vec::as_slice)
    }

    pub async fn actual_supply(&self) -> Result<&U256> {
        self.actual_supply
            .get_or_try_init(|| async {
                self.provider
                    .actual_supply(self.config.address)
                    .await
                    .map_err(|err| self.unavailable(err))
            })
            .await
    }

    /// The pool's own scaling factors over the full vault token list.
    pub async fn scaling_factors(&self) -> Result<&[Bfp]> {
        self.scaling_factors
            .get_or_try_init(|| async {
                let factors = self
                    .provider
                    .scaling_factors(self.config.address)
                    .await
                    .map_err(|err| self.unavailable(err))?;
                self.per_token(factors)
            })
            .await
            .map(Vec::as_slice)
    }

    pub async fn normalized_weights(&self) -> Result<&[Bfp]> {
        self.normalized_weights
            .get_or_try_init(|| async {
                let weights = self
                    .provider
                    .normalized_weights(self.config.address)
                    .await
                    .map_err(|err| self.unavailable(err))?;
                self.per_token(weights)
            })
            .await
            .map(Vec::as_slice)
    }

    /// Token rates over the full vault token list.
    pub async fn token_rates(&self) -> Result<&[Bfp]> {
        self.token_rates
            .get_or_try_init(|| async {
                let rates = self
                    .provider
                    .token_rates(self.config.address)
                    .await
                    .map_err(|err| self.unavailable(err))?;
                self.per_token(rates)
            })
            .await
            .map(Vec::as_slice)
    }

    fn per_token(&self, values: Vec<U256>) -> Result<Vec<Bfp>> {
        let expected = self.config.tokens.len();
        if values.len() != expected {
            return Err(self.unavailable(anyhow!(
                "expected {expected} per-token values but got {}",
                values.len()
            )));
        }
        Ok(values.into_iter().map(Bfp::from_wei).collect())
    }

    fn unavailable(&self, source: anyhow::Error) -> Error {
        Error::StateUnavailable {
            pool: self.config.address,
            source,
        }
    }
}
