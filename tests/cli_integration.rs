//! CLI integration tests for Courier.
//!
//! These tests drive the real binary against temporary projects: init,
//! distribute, check, and the failure paths of deploy that need no node.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

const ARTIFACT: &str = r#"{
  "_format": "hh-sol-artifact-1",
  "contractName": "CultureProof",
  "sourceName": "contracts/CultureProof.sol",
  "abi": [
    {
      "inputs": [],
      "stateMutability": "nonpayable",
      "type": "constructor"
    },
    {
      "inputs": [{"internalType": "string", "name": "proofHash", "type": "string"}],
      "name": "attest",
      "outputs": [],
      "stateMutability": "nonpayable",
      "type": "function"
    }
  ],
  "bytecode": "0x608060405234801561001057600080fd5b50",
  "deployedBytecode": "0x6080604052600080fd",
  "linkReferences": {},
  "deployedLinkReferences": {}
}"#;

const BACKEND: &str = "backend/app/services/culture_proof_abi.json";
const FRONTEND: &str = "frontend/assets/culture_proof_abi.json";

/// Get the courier binary command, isolated from the user's config and env.
fn courier(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("courier").unwrap();
    cmd.env("COURIER_HOME", home)
        .env_remove("COURIER_RPC_URL")
        .env_remove("COURIER_PRIVATE_KEY")
        .env_remove("COURIER_CHAIN_ID")
        .env_remove("MONAD_RPC_URL")
        .env_remove("PRIVATE_KEY")
        .env_remove("CHAIN_ID");
    cmd
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

/// A project with Courier.toml, a compiled artifact and both consumer directories.
fn project() -> TempDir {
    let tmp = temp_dir();
    let root = tmp.path();

    courier(&root.join(".home"))
        .args(["init", "--contract", "CultureProof"])
        .current_dir(root)
        .assert()
        .success();

    let artifact_dir = root.join("contracts/artifacts/contracts/CultureProof.sol");
    fs::create_dir_all(&artifact_dir).unwrap();
    fs::write(artifact_dir.join("CultureProof.json"), ARTIFACT).unwrap();

    fs::create_dir_all(root.join("backend/app/services")).unwrap();
    fs::create_dir_all(root.join("frontend/assets")).unwrap();
    tmp
}

fn home(tmp: &TempDir) -> std::path::PathBuf {
    tmp.path().join(".home")
}

// ============================================================================
// courier init
// ============================================================================

#[test]
fn test_init_writes_manifest() {
    let tmp = temp_dir();

    courier(&home(&tmp))
        .arg("init")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Created"));

    let manifest = fs::read_to_string(tmp.path().join("Courier.toml")).unwrap();
    assert!(manifest.contains("name = \"CultureProof\""));
    assert!(manifest.contains(BACKEND));
    assert!(manifest.contains(FRONTEND));
}

#[test]
fn test_init_refuses_existing_manifest() {
    let tmp = project();

    courier(&home(&tmp))
        .arg("init")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_init_custom_targets() {
    let tmp = temp_dir();

    courier(&home(&tmp))
        .args([
            "init",
            "--contract",
            "Token",
            "--target",
            "mobile=app/abi/token.json",
        ])
        .current_dir(tmp.path())
        .assert()
        .success();

    let manifest = fs::read_to_string(tmp.path().join("Courier.toml")).unwrap();
    assert!(manifest.contains("path = \"app/abi/token.json\""));
    assert!(manifest.contains("role = \"mobile\""));
    assert!(!manifest.contains("backend"));
}

// ============================================================================
// courier distribute
// ============================================================================

#[test]
fn test_distribute_writes_identical_copies() {
    let tmp = project();

    courier(&home(&tmp))
        .arg("distribute")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("in sync"))
        .stderr(predicate::str::contains("sha256"));

    let backend = fs::read(tmp.path().join(BACKEND)).unwrap();
    let frontend = fs::read(tmp.path().join(FRONTEND)).unwrap();
    assert_eq!(backend, frontend);

    let text = String::from_utf8(backend).unwrap();
    assert!(text.starts_with("[\n  {\n    \"inputs\": []"));
    assert!(text.contains("    \"name\": \"attest\""));
    assert!(!text.ends_with('\n'));
    assert!(!text.contains("bytecode"));
}

#[test]
fn test_distribute_twice_is_byte_identical() {
    let tmp = project();

    courier(&home(&tmp))
        .arg("distribute")
        .current_dir(tmp.path())
        .assert()
        .success();
    let first = fs::read(tmp.path().join(BACKEND)).unwrap();

    courier(&home(&tmp))
        .arg("distribute")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("0 changed"));

    assert_eq!(fs::read(tmp.path().join(BACKEND)).unwrap(), first);
}

#[test]
fn test_distribute_from_subdirectory() {
    let tmp = project();

    courier(&home(&tmp))
        .arg("distribute")
        .current_dir(tmp.path().join("frontend"))
        .assert()
        .success();

    assert!(tmp.path().join(FRONTEND).exists());
}

#[test]
fn test_distribute_missing_artifact_writes_nothing() {
    let tmp = project();
    fs::remove_file(
        tmp.path()
            .join("contracts/artifacts/contracts/CultureProof.sol/CultureProof.json"),
    )
    .unwrap();

    courier(&home(&tmp))
        .arg("distribute")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no build artifact for `CultureProof`"))
        .stderr(predicate::str::contains("CultureProof.sol/CultureProof.json"))
        .stderr(predicate::str::contains("help"));

    assert!(!tmp.path().join(BACKEND).exists());
    assert!(!tmp.path().join(FRONTEND).exists());
}

#[test]
fn test_distribute_malformed_artifact() {
    let tmp = project();
    fs::write(
        tmp.path()
            .join("contracts/artifacts/contracts/CultureProof.sol/CultureProof.json"),
        "{\"abi\": ",
    )
    .unwrap();

    courier(&home(&tmp))
        .arg("distribute")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("CultureProof.json"));

    assert!(!tmp.path().join(BACKEND).exists());
}

#[test]
fn test_partial_distribution_fails_and_reports_targets() {
    let tmp = project();
    fs::remove_dir_all(tmp.path().join("frontend")).unwrap();

    courier(&home(&tmp))
        .arg("distribute")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("1 of 2 targets failed"))
        .stderr(predicate::str::contains("FAILED frontend/assets/culture_proof_abi.json"))
        .stderr(predicate::str::contains("ok     backend/app/services/culture_proof_abi.json"));

    // The healthy target was still written; the missing directory was not created.
    assert!(tmp.path().join(BACKEND).exists());
    assert!(!tmp.path().join("frontend").exists());
}

#[test]
fn test_distribute_without_manifest() {
    let tmp = temp_dir();

    courier(&home(&tmp))
        .args(["--manifest-path", "Courier.toml", "distribute"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Courier.toml"));
}

// ============================================================================
// courier distribute --check
// ============================================================================

#[test]
fn test_check_reports_missing_targets_without_writing() {
    let tmp = project();

    courier(&home(&tmp))
        .args(["distribute", "--check"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("2 of 2 target(s) out of date"));

    assert!(!tmp.path().join(BACKEND).exists());
    assert!(!tmp.path().join(FRONTEND).exists());
}

#[test]
fn test_check_passes_after_distribute() {
    let tmp = project();

    courier(&home(&tmp))
        .arg("distribute")
        .current_dir(tmp.path())
        .assert()
        .success();

    courier(&home(&tmp))
        .args(["distribute", "--check"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("up to date"));
}

#[test]
fn test_check_detects_stale_copy() {
    let tmp = project();

    courier(&home(&tmp))
        .arg("distribute")
        .current_dir(tmp.path())
        .assert()
        .success();
    fs::write(tmp.path().join(FRONTEND), "[]").unwrap();

    courier(&home(&tmp))
        .args(["distribute", "--check"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("stale"));

    assert_eq!(fs::read_to_string(tmp.path().join(FRONTEND)).unwrap(), "[]");
}

// ============================================================================
// courier artifact
// ============================================================================

#[test]
fn test_artifact_prints_fingerprint() {
    let tmp = project();

    courier(&home(&tmp))
        .arg("artifact")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::is_match("^[0-9a-f]{64}\n$").unwrap())
        .stderr(predicate::str::contains("1 functions, 0 events"));
}

// ============================================================================
// courier deploy (failure paths only; no node is running)
// ============================================================================

#[test]
fn test_deploy_missing_artifact_fails_before_network() {
    let tmp = project();
    fs::remove_file(
        tmp.path()
            .join("contracts/artifacts/contracts/CultureProof.sol/CultureProof.json"),
    )
    .unwrap();

    courier(&home(&tmp))
        .args(["deploy", "--rpc-url", "http://127.0.0.1:1"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no build artifact"));
}

#[test]
fn test_deploy_unreachable_node() {
    let tmp = project();

    courier(&home(&tmp))
        .args(["deploy", "--rpc-url", "http://127.0.0.1:1"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("network request failed"))
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_deploy_rejects_unsupported_scheme() {
    let tmp = project();

    courier(&home(&tmp))
        .args(["deploy", "--rpc-url", "ws://127.0.0.1:8546"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported RPC URL scheme"));
}

#[test]
fn test_deploy_rejects_bad_fallback_chain_id() {
    let tmp = project();

    courier(&home(&tmp))
        .args(["deploy", "--rpc-url", "http://127.0.0.1:1"])
        .env("CHAIN_ID", "monad")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid CHAIN_ID"));
}

#[test]
fn test_deploy_rejects_malformed_project_config() {
    let tmp = project();
    fs::create_dir_all(tmp.path().join(".courier")).unwrap();
    fs::write(
        tmp.path().join(".courier/config.toml"),
        "[network]\nchain_id = 10143\nrpc_url = 5\n",
    )
    .unwrap();

    courier(&home(&tmp))
        .args(["--quiet", "deploy", "--rpc-url", "http://127.0.0.1:1"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed to parse config file"))
        .stderr(predicate::str::contains("network request failed").not());
}

#[test]
fn test_release_unreachable_node_writes_nothing() {
    let tmp = project();

    courier(&home(&tmp))
        .args(["release", "--rpc-url", "http://127.0.0.1:1"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("`deploy` step failed"));

    assert!(!tmp.path().join(BACKEND).exists());
}

// ============================================================================
// courier completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let tmp = temp_dir();

    courier(&home(&tmp))
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("courier"));
}
