//! Balancer V2 pool families and the parts they have in common.
//!
//! Every family is served by the same [`Pool`] type. The family decides
//! which scaling factors and swap ratios apply, which join and exit kinds
//! exist and which [`Features`] the pool offers.

pub mod composable_stable;
pub mod gyro_2clp;
pub mod meta_stable;
pub mod stable;
pub mod weighted;

pub use composable_stable::{drop_bpt_index, insert_bpt_index};
use {
    crate::{
        config::Config,
        contracts::IVault,
        error::{Error, Result},
        join_exit::{ExitRequest, JoinRequest},
        pool_state::{PoolContext, PoolStateProviding},
        scaling::{self, ScalingFactors},
        swap::fixed_point::Bfp,
    },
    alloy::primitives::{Address, B256, U256},
    std::ops::BitOr,
    tracing::instrument,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum PoolKind {
    Weighted,
    Stable,
    MetaStable,
    ComposableStable,
    Gyro2Clp,
}

impl PoolKind {
    pub fn features(self) -> Features {
        match self {
            Self::Weighted | Self::Stable | Self::MetaStable | Self::ComposableStable => {
                Features::ALL_TOKENS
                    | Features::SINGLE_TOKEN
                    | Features::ADD_SLIPPAGE
                    | Features::REMOVE_SLIPPAGE
            }
            Self::Gyro2Clp => Features::ALL_TOKENS | Features::REMOVE_SLIPPAGE,
        }
    }
}

/// A single capability a pool may offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Feature {
    /// Adding and removing liquidity with all tokens in ratio.
    AllTokens,
    /// Adding and removing liquidity with a single token.
    SingleToken,
    /// A minimum pool token output when adding liquidity.
    AddSlippage,
    /// Minimum token outputs when removing liquidity.
    RemoveSlippage,
}

/// Set of [`Feature`]s.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Features(u8);

impl Features {
    pub const ADD_SLIPPAGE: Self = Self(1 << 2);
    pub const ALL_TOKENS: Self = Self(1 << 0);
    pub const REMOVE_SLIPPAGE: Self = Self(1 << 3);
    pub const SINGLE_TOKEN: Self = Self(1 << 1);

    pub fn contains(self, feature: Feature) -> bool {
        let flag = match feature {
            Feature::AllTokens => Self::ALL_TOKENS,
            Feature::SingleToken => Self::SINGLE_TOKEN,
            Feature::AddSlippage => Self::ADD_SLIPPAGE,
            Feature::RemoveSlippage => Self::REMOVE_SLIPPAGE,
        };
        self.0 & flag.0 != 0
    }
}

impl BitOr for Features {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub address: Address,
    pub decimals: u8,
}

/// Immutable description of a pool instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    pub address: Address,
    pub id: B256,
    /// All tokens registered with the vault, in canonical (ascending address)
    /// order. For composable stable pools this includes the BPT itself.
    pub tokens: Vec<Token>,
    /// Position of the pool's own token in `tokens`, composable stable pools
    /// only.
    pub bpt_index: Option<usize>,
}

impl PoolConfig {
    pub fn token_addresses(&self) -> Vec<Address> {
        self.tokens.iter().map(|token| token.address).collect()
    }
}

/// A pool of one of the supported families.
#[derive(Clone, Debug)]
pub struct Pool {
    kind: PoolKind,
    config: PoolConfig,
    settings: Config,
}

impl Pool {
    /// Validates the configuration. Nothing is ever computed for a pool that
    /// fails here.
    pub fn new(kind: PoolKind, config: PoolConfig, settings: Config) -> Result<Self> {
        let pool = config.address;
        if config.tokens.len() < 2 {
            return Err(Error::invalid_config(pool, "pools have at least two tokens"));
        }
        if let Some(index) = config
            .tokens
            .windows(2)
            .position(|pair| pair[0].address >= pair[1].address)
        {
            return Err(Error::invalid_config(
                pool,
                format!("tokens are not in ascending order at index {}", index + 1),
            ));
        }

        match (kind, config.bpt_index) {
            (PoolKind::ComposableStable, Some(index)) => {
                if config.tokens.get(index).map(|token| token.address) != Some(pool) {
                    return Err(Error::invalid_config(
                        pool,
                        format!("token at BPT index {index} is not the pool token"),
                    ));
                }
            }
            (PoolKind::ComposableStable, None) => {
                return Err(Error::invalid_config(pool, "missing BPT index"));
            }
            (_, Some(_)) => {
                return Err(Error::invalid_config(
                    pool,
                    format!("{kind} pools have no BPT index"),
                ));
            }
            (_, None) => {}
        }
        if kind == PoolKind::Gyro2Clp && config.tokens.len() != 2 {
            return Err(Error::invalid_config(pool, "Gyro 2-CLP pools have exactly two tokens"));
        }

        for (index, token) in config.tokens.iter().enumerate() {
            if Some(index) != config.bpt_index {
                scaling::decimal_scaling_factor(pool, token.address, token.decimals)?;
            }
        }

        Ok(Self {
            kind,
            config,
            settings,
        })
    }

    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn settings(&self) -> &Config {
        &self.settings
    }

    pub fn address(&self) -> Address {
        self.config.address
    }

    pub fn features(&self) -> Features {
        self.kind.features()
    }

    /// The tokens liquidity is added in and removed as, i.e. the registered
    /// tokens without the BPT.
    pub fn member_tokens(&self) -> Vec<Token> {
        self.drop_bpt(self.config.tokens.clone())
    }

    pub fn member_count(&self) -> usize {
        self.config.tokens.len() - usize::from(self.config.bpt_index.is_some())
    }

    pub fn ensure_feature(&self, feature: Feature) -> Result<()> {
        if !self.features().contains(feature) {
            return Err(Error::UnsupportedFeature {
                pool: self.address(),
                family: self.kind,
                feature,
            });
        }
        Ok(())
    }

    /// Proportional split of a balanced join or exit across the member
    /// tokens. Always sums to exactly `ONE`.
    #[instrument(skip_all, fields(pool = %self.address(), family = %self.kind))]
    pub async fn swap_ratios(&self, provider: &dyn PoolStateProviding) -> Result<Vec<Bfp>> {
        let context = PoolContext::new(provider, &self.config);
        let ratios = match self.kind {
            PoolKind::Weighted => weighted::swap_ratios(self, &context).await?,
            PoolKind::Stable
            | PoolKind::MetaStable
            | PoolKind::ComposableStable
            | PoolKind::Gyro2Clp => {
                let balances = self.upscaled_balances(&context).await?;
                stable::balance_ratios(self.address(), &balances)?
            }
        };
        tracing::debug!(?ratios, "computed swap ratios");
        Ok(ratios)
    }

    /// Scaling factors of the member tokens.
    pub async fn scaling_factors(&self, context: &PoolContext<'_>) -> Result<ScalingFactors> {
        match self.kind {
            PoolKind::Weighted | PoolKind::Stable => stable::decimal_scaling_factors(self),
            PoolKind::MetaStable | PoolKind::Gyro2Clp => {
                meta_stable::rate_scaling_factors(self, context).await
            }
            PoolKind::ComposableStable => composable_stable::scaling_factors(self, context).await,
        }
    }

    /// Raw balances of the member tokens.
    pub async fn balances(&self, context: &PoolContext<'_>) -> Result<Vec<U256>> {
        Ok(self.drop_bpt(context.balances().await?.to_vec()))
    }

    pub async fn upscaled_balances(&self, context: &PoolContext<'_>) -> Result<Vec<Bfp>> {
        let factors = self.scaling_factors(context).await?;
        let balances = self.balances(context).await?;
        factors.upscale_all(self.address(), &balances)
    }

    pub(crate) fn insert_bpt<T>(&self, values: Vec<T>, filler: T) -> Vec<T> {
        match self.config.bpt_index {
            Some(index) => insert_bpt_index(values, index, filler),
            None => values,
        }
    }

    pub(crate) fn drop_bpt<T>(&self, values: Vec<T>) -> Vec<T> {
        match self.config.bpt_index {
            Some(index) => drop_bpt_index(values, index),
            None => values,
        }
    }

    /// Checks that token arrays and indices of a request address exactly the
    /// member tokens.
    fn ensure_member_shape(&self, arrays: &[&[U256]], token_index: Option<usize>) -> Result<()> {
        let members = self.member_count();
        if let Some(array) = arrays.iter().find(|array| array.len() != members) {
            return Err(Error::invalid_input(
                self.address(),
                format!("expected {members} token amounts but got {}", array.len()),
            ));
        }
        if let Some(index) = token_index.filter(|index| *index >= members) {
            return Err(Error::invalid_input(
                self.address(),
                format!("token index {index} out of range for {members} tokens"),
            ));
        }
        Ok(())
    }

    /// Builds the vault request for a join, rejecting kinds the family does
    /// not support before looking at any amounts.
    pub fn join_pool_request(
        &self,
        request: &JoinRequest,
        use_internal_balance: bool,
    ) -> Result<IVault::JoinPoolRequest> {
        let kind = request.kind();
        self.ensure_feature(kind.feature())?;
        let code = kind.code(self.kind).ok_or(Error::UnsupportedJoinKind {
            pool: self.address(),
            family: self.kind,
            kind,
        })?;
        self.ensure_member_shape(&request.token_arrays(), request.token_index())?;

        Ok(IVault::JoinPoolRequest {
            assets: self.config.token_addresses(),
            maxAmountsIn: self.insert_bpt(request.max_amounts_in(self.member_count()), U256::ZERO),
            userData: request.user_data(code),
            fromInternalBalance: use_internal_balance,
        })
    }

    /// Builds the vault request for an exit.
    pub fn exit_pool_request(
        &self,
        request: &ExitRequest,
        use_internal_balance: bool,
    ) -> Result<IVault::ExitPoolRequest> {
        let kind = request.kind();
        self.ensure_feature(kind.feature())?;
        let code = kind.code(self.kind).ok_or(Error::UnsupportedExitKind {
            pool: self.address(),
            family: self.kind,
            kind,
        })?;
        self.ensure_member_shape(&request.token_arrays(), request.token_index())?;

        Ok(IVault::ExitPoolRequest {
            assets: self.config.token_addresses(),
            minAmountsOut: self
                .insert_bpt(request.min_amounts_out(self.member_count()), U256::ZERO),
            userData: request.user_data(code),
            toInternalBalance: use_internal_balance,
        })
    }
}
