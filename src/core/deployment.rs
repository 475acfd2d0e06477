//! Deployment records.

use std::path::Path;

use alloy_primitives::{Address, B256};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::util::fs::write_string;

/// Result of one successful deployment.
///
/// Courier prints the record and only writes it to disk when asked to; the
/// deployed address is never folded into the distributed ABI files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    /// Contract name
    pub contract: String,

    /// Address of the deployed contract
    pub address: Address,

    /// Account that sent the creation transaction
    pub deployer: Address,

    /// Chain id reported by the network
    pub chain_id: u64,

    /// Creation transaction hash
    pub transaction_hash: B256,

    /// Block the creation transaction was included in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

impl DeploymentRecord {
    /// Write the record as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("failed to serialize deployment record")?;
        write_string(path, &json)
    }

    /// Load a previously saved record.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read deployment record: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse deployment record: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256};
    use tempfile::TempDir;

    fn record() -> DeploymentRecord {
        DeploymentRecord {
            contract: "CultureProof".to_string(),
            address: address!("5fbdb2315678afecb367f032d93f642f64180aa3"),
            deployer: address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"),
            chain_id: 31337,
            transaction_hash: b256!(
                "e6f4c1a1a0e3b1f3d6a3a5a4c9b0e3a2f1d5c6b7a8e9f0a1b2c3d4e5f6a7b8c9"
            ),
            block_number: Some(1),
        }
    }

    #[test]
    fn test_save_and_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("deployments/culture_proof.json");

        let rec = record();
        rec.save(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"chainId\": 31337"));
        assert!(contents.contains("\"transactionHash\""));

        assert_eq!(DeploymentRecord::load(&path).unwrap(), rec);
    }
}
