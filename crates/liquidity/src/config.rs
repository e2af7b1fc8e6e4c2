use {
    alloy::primitives::{Address, address},
    anyhow::{Context, Result},
    serde::Deserialize,
    std::path::Path,
    tokio::fs,
};

/// The canonical Balancer V2 vault, deployed at the same address on every
/// supported chain.
pub const BALANCER_V2_VAULT: Address = address!("BA12222222228d8Ba445958a75a0704d566BF2C8");

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// The vault contract zap steps call. Defaults to the canonical Balancer
    /// V2 vault.
    #[serde(default = "default_vault")]
    pub vault: Address,

    /// Whether zap steps pay from and pay out to vault internal balances.
    #[serde(default)]
    pub use_internal_balance: bool,

    /// Optional cap on the number of candidates the Gyro add-liquidity
    /// search tries before giving up.
    #[serde(default)]
    pub gyro_search_limit: Option<u64>,
}

fn default_vault() -> Address {
    BALANCER_V2_VAULT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vault: default_vault(),
            use_internal_balance: false,
            gyro_search_limit: None,
        }
    }
}

/// Load the liquidity configuration from a TOML file.
pub async fn load(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .await
        .with_context(|| format!("I/O error while reading {path:?}"))?;
    toml::de::from_str::<Config>(&data)
        .with_context(|| format!("TOML syntax error while reading {path:?}"))
}

#[cfg(test)]
mod tests {
    use {super::*, std::io::Write};

    #[tokio::test]
    async fn loads_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            vault = "0x1111111111111111111111111111111111111111"
            use-internal-balance = true
            gyro-search-limit = 1000
            "#
        )
        .unwrap();

        let config = load(file.path()).await.unwrap();
        assert_eq!(
            config,
            Config {
                vault: address!("1111111111111111111111111111111111111111"),
                use_internal_balance: true,
                gyro_search_limit: Some(1000),
            }
        );
    }

    #[tokio::test]
    async fn empty_file_uses_defaults() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(load(file.path()).await.unwrap(), Config::default());
        assert_eq!(Config::default().vault, BALANCER_V2_VAULT);
    }

    #[tokio::test]
    async fn rejects_unknown_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "slippage = 1").unwrap();
        let err = load(file.path()).await.unwrap_err();
        assert!(err.to_string().starts_with("TOML syntax error"));
    }

    #[tokio::test]
    async fn missing_file_names_path() {
        let err = load(Path::new("/nonexistent/liquidity.toml"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/liquidity.toml"));
    }
}
