use {
    crate::{
        join_exit::{ExitKind, JoinKind},
        pools::{Feature, PoolKind},
        swap::error::Error as MathError,
    },
    alloy::primitives::Address,
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong while quoting or encoding a join or exit.
/// None of these are retried by this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid input for pool {pool:?}: {reason}")]
    InvalidInput { pool: Address, reason: String },
    #[error("{family} pool {pool:?} does not support {feature}")]
    UnsupportedFeature {
        pool: Address,
        family: PoolKind,
        feature: Feature,
    },
    #[error("{family} pool {pool:?} does not support join kind {kind}")]
    UnsupportedJoinKind {
        pool: Address,
        family: PoolKind,
        kind: JoinKind,
    },
    #[error("{family} pool {pool:?} does not support exit kind {kind}")]
    UnsupportedExitKind {
        pool: Address,
        family: PoolKind,
        kind: ExitKind,
    },
    #[error("math error in pool {pool:?}: {source}")]
    Math {
        pool: Address,
        #[source]
        source: MathError,
    },
    #[error("token {token:?} of pool {pool:?} has {decimals} decimals, at most 18 are supported")]
    UnsupportedDecimals {
        pool: Address,
        token: Address,
        decimals: u8,
    },
    #[error("state of pool {pool:?} is unavailable")]
    StateUnavailable {
        pool: Address,
        #[source]
        source: anyhow::Error,
    },
    #[error("liquidity calculation for pool {pool:?} failed: {reason}")]
    CalculationFailed { pool: Address, reason: String },
    #[error("invalid configuration for pool {pool:?}: {reason}")]
    InvalidConfig { pool: Address, reason: String },
}

impl Error {
    pub(crate) fn invalid_input(pool: Address, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            pool,
            reason: reason.into(),
        }
    }

    pub(crate) fn calculation_failed(pool: Address, reason: impl Into<String>) -> Self {
        Self::CalculationFailed {
            pool,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_config(pool: Address, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            pool,
            reason: reason.into(),
        }
    }
}

/// Attaches the pool to errors of the pool agnostic math.
pub(crate) trait MathResultExt<T> {
    fn in_pool(self, pool: Address) -> Result<T>;
}

impl<T> MathResultExt<T> for std::result::Result<T, MathError> {
    fn in_pool(self, pool: Address) -> Result<T> {
        self.map_err(|source| Error::Math { pool, source })
    }
}

#[cfg(test)]
mod tests {
    use {super::*, alloy::primitives::address};

    #[test]
    fn errors_name_their_context() {
        let pool = address!("1111111111111111111111111111111111111111");
        let err = Error::UnsupportedJoinKind {
            pool,
            family: PoolKind::Gyro2Clp,
            kind: JoinKind::ExactTokensInForBptOut,
        };
        assert_eq!(
            err.to_string(),
            "Gyro2Clp pool 0x1111111111111111111111111111111111111111 does not support join \
             kind EXACT_TOKENS_IN_FOR_BPT_OUT"
        );

        let err = Err::<(), _>(MathError::ZeroDivision).in_pool(pool).unwrap_err();
        assert!(err.to_string().ends_with("BAL#004: ZeroDivision"));
    }
}
