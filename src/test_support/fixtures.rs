//! Test fixtures for common test scenarios.
//!
//! Build artifacts shaped like the ones a Hardhat compile produces.

use std::path::{Path, PathBuf};

use serde_json::{json, Value};

/// Fixture for a compiled contract artifact.
#[derive(Debug, Clone)]
pub struct ArtifactFixture {
    /// Contract name.
    pub contract_name: String,
    /// Source file the contract was compiled from.
    pub source_name: String,
    /// ABI entries in compiler order.
    pub abi: Value,
    /// Creation bytecode.
    pub bytecode: String,
    /// Runtime bytecode.
    pub deployed_bytecode: String,
}

impl ArtifactFixture {
    /// An attestation contract: no constructor arguments, two functions and one event.
    pub fn culture_proof() -> Self {
        ArtifactFixture {
            contract_name: "CultureProof".to_string(),
            source_name: "contracts/CultureProof.sol".to_string(),
            abi: json!([
                {
                    "inputs": [],
                    "stateMutability": "nonpayable",
                    "type": "constructor"
                },
                {
                    "anonymous": false,
                    "inputs": [
                        {"indexed": true, "internalType": "address", "name": "user", "type": "address"},
                        {"indexed": false, "internalType": "string", "name": "proofHash", "type": "string"}
                    ],
                    "name": "Attested",
                    "type": "event"
                },
                {
                    "inputs": [
                        {"internalType": "string", "name": "proofHash", "type": "string"}
                    ],
                    "name": "attest",
                    "outputs": [],
                    "stateMutability": "nonpayable",
                    "type": "function"
                },
                {
                    "inputs": [
                        {"internalType": "address", "name": "user", "type": "address"}
                    ],
                    "name": "hasAttested",
                    "outputs": [
                        {"internalType": "bool", "name": "", "type": "bool"}
                    ],
                    "stateMutability": "view",
                    "type": "function"
                }
            ]),
            bytecode: "0x608060405234801561001057600080fd5b50".to_string(),
            deployed_bytecode: "0x6080604052600080fd".to_string(),
        }
    }

    /// Use a constructor with the given `(name, type)` inputs.
    pub fn with_constructor(mut self, inputs: &[(&str, &str)]) -> Self {
        let inputs: Vec<Value> = inputs
            .iter()
            .map(|(name, ty)| json!({"internalType": ty, "name": name, "type": ty}))
            .collect();
        if let Some(entries) = self.abi.as_array_mut() {
            entries.retain(|e| e["type"] != "constructor");
            entries.insert(
                0,
                json!({"inputs": inputs, "stateMutability": "nonpayable", "type": "constructor"}),
            );
        }
        self
    }

    /// Render as a Hardhat artifact file.
    pub fn to_json(&self) -> String {
        let artifact = json!({
            "_format": "hh-sol-artifact-1",
            "contractName": self.contract_name,
            "sourceName": self.source_name,
            "abi": self.abi,
            "bytecode": self.bytecode,
            "deployedBytecode": self.deployed_bytecode,
            "linkReferences": {},
            "deployedLinkReferences": {}
        });
        serde_json::to_string_pretty(&artifact).unwrap()
    }

    /// Write under `artifacts_dir` at `<sourceName>/<contractName>.json`.
    pub fn write_to(&self, artifacts_dir: &Path) -> PathBuf {
        let path = artifacts_dir
            .join(&self.source_name)
            .join(format!("{}.json", self.contract_name));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, self.to_json()).unwrap();
        path
    }
}
