//! Configuration support for Courier.
//!
//! Network settings come from three layers, highest precedence first:
//! 1. Command line flags and environment variables (`NetworkOverrides`)
//! 2. Project config: `.courier/config.toml`
//! 3. Global config: `~/.courier/config.toml`
//!
//! The signing key is never read from a config file, only from the
//! environment or the command line.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::net::{HttpClient, HttpTransport, RpcClient, RpcError};

/// Endpoint used when nothing is configured (local development node).
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// Receipt polling interval when nothing is configured.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Per-request HTTP timeout when nothing is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fallback environment variable names, checked when the primary
/// `COURIER_*` variable is unset.
pub const RPC_URL_FALLBACK_ENV: &str = "MONAD_RPC_URL";
pub const PRIVATE_KEY_FALLBACK_ENV: &str = "PRIVATE_KEY";
pub const CHAIN_ID_FALLBACK_ENV: &str = "CHAIN_ID";

/// A private key that never shows up in logs or debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(key: impl Into<String>) -> Self {
        SecretKey(key.into())
    }

    /// The raw key material.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// Courier configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Network settings
    pub network: NetConfig,
}

/// Network-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// JSON-RPC endpoint
    pub rpc_url: Option<String>,

    /// Expected chain id; deploys abort if the endpoint reports another
    pub chain_id: Option<u64>,

    /// Receipt polling interval in milliseconds
    pub poll_interval_ms: Option<u64>,

    /// Per-request HTTP timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.network.rpc_url.is_some() {
            self.network.rpc_url = other.network.rpc_url;
        }
        if other.network.chain_id.is_some() {
            self.network.chain_id = other.network.chain_id;
        }
        if other.network.poll_interval_ms.is_some() {
            self.network.poll_interval_ms = other.network.poll_interval_ms;
        }
        if other.network.timeout_secs.is_some() {
            self.network.timeout_secs = other.network.timeout_secs;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.courier/config.toml)
/// 2. Global config (~/.courier/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Result<Config> {
    let mut config = Config::default();

    // A file that exists but does not parse is an error, never a silent default
    if global_path.exists() {
        config.merge(Config::load(global_path)?);
    }

    if project_path.exists() {
        config.merge(Config::load(project_path)?);
    }

    Ok(config)
}

/// Get the global courier config directory (~/.courier).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".courier"))
}

/// Network settings given on the command line or in the environment.
#[derive(Debug, Clone, Default)]
pub struct NetworkOverrides {
    pub rpc_url: Option<String>,
    pub private_key: Option<SecretKey>,
    pub chain_id: Option<u64>,
}

impl NetworkOverrides {
    /// Fill unset values from the fallback environment variables.
    ///
    /// `lookup` is `std::env::var` in the binary; tests pass a map.
    pub fn with_fallbacks(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if self.rpc_url.is_none() {
            self.rpc_url = non_empty(RPC_URL_FALLBACK_ENV);
        }
        if self.private_key.is_none() {
            self.private_key = non_empty(PRIVATE_KEY_FALLBACK_ENV).map(SecretKey::new);
        }
        if self.chain_id.is_none() {
            self.chain_id = non_empty(CHAIN_ID_FALLBACK_ENV)
                .map(|v| {
                    v.trim()
                        .parse::<u64>()
                        .with_context(|| format!("invalid {}: `{}`", CHAIN_ID_FALLBACK_ENV, v))
                })
                .transpose()?;
        }

        Ok(self)
    }
}

/// Resolved network configuration handed to the deployer.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint
    pub rpc_url: Url,

    /// Local signing key; `None` uses the node's own accounts
    pub signing_key: Option<SecretKey>,

    /// Expected chain id
    pub chain_id: Option<u64>,

    /// How often to poll for the creation receipt
    pub poll_interval: Duration,

    /// Per-request HTTP timeout
    pub timeout: Duration,
}

impl NetworkConfig {
    /// Configuration for `rpc_url` with default settings.
    pub fn new(rpc_url: Url) -> Self {
        NetworkConfig {
            rpc_url,
            signing_key: None,
            chain_id: None,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Use a local signing key.
    pub fn with_signing_key(mut self, key: SecretKey) -> Self {
        self.signing_key = Some(key);
        self
    }

    /// Require the endpoint to serve this chain.
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// Set the receipt polling interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Combine overrides with file configuration.
    pub fn resolve(overrides: NetworkOverrides, config: &Config) -> Result<Self> {
        let raw_url = overrides
            .rpc_url
            .or_else(|| config.network.rpc_url.clone())
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());

        let rpc_url =
            Url::parse(&raw_url).with_context(|| format!("invalid RPC URL: `{}`", raw_url))?;
        if !matches!(rpc_url.scheme(), "http" | "https") {
            anyhow::bail!(
                "unsupported RPC URL scheme `{}`; expected http or https",
                rpc_url.scheme()
            );
        }

        let mut network = NetworkConfig::new(rpc_url);
        network.signing_key = overrides.private_key;
        network.chain_id = overrides.chain_id.or(config.network.chain_id);

        if let Some(ms) = config.network.poll_interval_ms {
            network.poll_interval = Duration::from_millis(ms.max(1));
        }
        if let Some(secs) = config.network.timeout_secs {
            network.timeout = Duration::from_secs(secs.max(1));
        }

        Ok(network)
    }

    /// Open a JSON-RPC client for the endpoint.
    pub fn connect(&self) -> Result<HttpClient, RpcError> {
        let transport = HttpTransport::new(self.rpc_url.clone(), self.timeout)?;
        Ok(RpcClient::new(transport))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.network.rpc_url.is_none());
        assert!(config.network.chain_id.is_none());
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[network]
rpc_url = "https://testnet-rpc.monad.xyz/"
chain_id = 10143
poll_interval_ms = 250
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(
            config.network.rpc_url.as_deref(),
            Some("https://testnet-rpc.monad.xyz/")
        );
        assert_eq!(config.network.chain_id, Some(10143));
        assert_eq!(config.network.poll_interval_ms, Some(250));
        assert_eq!(config.network.timeout_secs, None);
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global_path = tmp.path().join("global.toml");
        let project_path = tmp.path().join("project.toml");

        std::fs::write(
            &global_path,
            "[network]\nrpc_url = \"http://global:8545\"\nchain_id = 1\n",
        )
        .unwrap();
        std::fs::write(&project_path, "[network]\nchain_id = 31337\n").unwrap();

        let config = load_config(&global_path, &project_path).unwrap();
        assert_eq!(config.network.rpc_url.as_deref(), Some("http://global:8545"));
        assert_eq!(config.network.chain_id, Some(31337));
    }

    #[test]
    fn test_load_config_missing_files_use_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("global.toml"), &tmp.path().join("project.toml"))
            .unwrap();
        assert_eq!(config.network.rpc_url, None);
        assert_eq!(config.network.chain_id, None);
    }

    #[test]
    fn test_load_config_rejects_malformed_file() {
        let tmp = TempDir::new().unwrap();
        let global_path = tmp.path().join("global.toml");
        let project_path = tmp.path().join("project.toml");

        std::fs::write(&global_path, "[network]\nchain_id = 1\n").unwrap();
        std::fs::write(&project_path, "[network]\nchain_id = 10143\nrpc_url = 5\n").unwrap();

        let err = load_config(&global_path, &project_path).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to parse config file"));
        assert!(err.to_string().contains("project.toml"));
    }

    #[test]
    fn test_resolve_defaults() {
        let network = NetworkConfig::resolve(NetworkOverrides::default(), &Config::default()).unwrap();
        assert_eq!(network.rpc_url.as_str(), "http://127.0.0.1:8545/");
        assert!(network.signing_key.is_none());
        assert_eq!(network.chain_id, None);
        assert_eq!(network.poll_interval, Duration::from_millis(DEFAULT_POLL_INTERVAL_MS));
    }

    #[test]
    fn test_resolve_overrides_win() {
        let mut config = Config::default();
        config.network.rpc_url = Some("http://from-file:8545".to_string());
        config.network.chain_id = Some(1);

        let overrides = NetworkOverrides {
            rpc_url: Some("https://cli.example.com".to_string()),
            private_key: Some(SecretKey::new("0xabc")),
            chain_id: Some(10143),
        };

        let network = NetworkConfig::resolve(overrides, &config).unwrap();
        assert_eq!(network.rpc_url.host_str(), Some("cli.example.com"));
        assert_eq!(network.chain_id, Some(10143));
        assert_eq!(network.signing_key.unwrap().expose(), "0xabc");
    }

    #[test]
    fn test_resolve_rejects_bad_url() {
        let overrides = NetworkOverrides {
            rpc_url: Some("ws://127.0.0.1:8546".to_string()),
            ..Default::default()
        };
        let err = NetworkConfig::resolve(overrides, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("unsupported RPC URL scheme"));

        let overrides = NetworkOverrides {
            rpc_url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(NetworkConfig::resolve(overrides, &Config::default()).is_err());
    }

    #[test]
    fn test_fallback_env() {
        let env: HashMap<&str, &str> = [
            ("MONAD_RPC_URL", "https://testnet-rpc.monad.xyz/"),
            ("PRIVATE_KEY", ""),
            ("CHAIN_ID", "10143"),
        ]
        .into_iter()
        .collect();

        let overrides = NetworkOverrides::default()
            .with_fallbacks(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(
            overrides.rpc_url.as_deref(),
            Some("https://testnet-rpc.monad.xyz/")
        );
        // Empty values count as unset
        assert!(overrides.private_key.is_none());
        assert_eq!(overrides.chain_id, Some(10143));
    }

    #[test]
    fn test_fallback_env_does_not_override() {
        let overrides = NetworkOverrides {
            rpc_url: Some("http://primary:8545".to_string()),
            ..Default::default()
        }
        .with_fallbacks(|name| match name {
            "MONAD_RPC_URL" => Some("http://fallback:8545".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(overrides.rpc_url.as_deref(), Some("http://primary:8545"));
    }

    #[test]
    fn test_fallback_env_bad_chain_id() {
        let result = NetworkOverrides::default().with_fallbacks(|name| match name {
            "CHAIN_ID" => Some("monad".to_string()),
            _ => None,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_secret_key_redacted() {
        let key = SecretKey::new("0xdeadbeef");
        assert!(!format!("{:?}", key).contains("deadbeef"));
    }
}
