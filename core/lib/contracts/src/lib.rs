//! ABIs of the contracts used to deploy contracts through L1, and helpers to read contract bytecode.

#![allow(clippy::derive_partial_eq_without_eq)]

use std::{fs, path::Path};

use anyhow::Context as _;
use once_cell::sync::Lazy;
use zksync_basic_types::ethabi::Contract;
use zksync_utils::decode_0x_hex;

const BRIDGEHUB_ABI: &str = include_str!("./abi/IBridgehub.json");
const CONTRACT_DEPLOYER_ABI: &str = include_str!("./abi/IContractDeployer.json");

fn load_abi(name: &str, abi: &str) -> Contract {
    Contract::load(abi.as_bytes())
        .unwrap_or_else(|err| panic!("Failed to parse embedded {name} ABI: {err}"))
}

static BRIDGEHUB_CONTRACT: Lazy<Contract> = Lazy::new(|| load_abi("IBridgehub", BRIDGEHUB_ABI));
static CONTRACT_DEPLOYER_CONTRACT: Lazy<Contract> =
    Lazy::new(|| load_abi("IContractDeployer", CONTRACT_DEPLOYER_ABI));

/// L1 Bridgehub contract: entry point for L1->L2 priority requests.
pub fn bridgehub_contract() -> &'static Contract {
    &BRIDGEHUB_CONTRACT
}

/// L2 `ContractDeployer` system contract.
pub fn deployer_contract() -> &'static Contract {
    &CONTRACT_DEPLOYER_CONTRACT
}

/// Reads contract bytecode from a file.
///
/// Supported formats:
/// - compiler artifacts (JSON) with a `bytecode` field holding either a hex string or an object
///   with the `object` hex string;
/// - plain hex files (with or without the `0x` prefix);
/// - raw binary `.zbin` files.
pub fn read_bytecode_from_path(path: impl AsRef<Path>) -> anyhow::Result<Vec<u8>> {
    let path = path.as_ref();
    let contents =
        fs::read(path).with_context(|| format!("failed reading bytecode from {path:?}"))?;

    if path.extension().is_some_and(|ext| ext == "zbin") {
        return Ok(contents);
    }
    let text = String::from_utf8(contents)
        .with_context(|| format!("bytecode file {path:?} is neither `.zbin` nor UTF-8"))?;
    let text = text.trim();
    if text.starts_with('{') {
        let artifact: serde_json::Value = serde_json::from_str(text)
            .with_context(|| format!("failed parsing artifact {path:?}"))?;
        return bytecode_from_artifact(&artifact).with_context(|| format!("invalid artifact {path:?}"));
    }
    decode_0x_hex(text).with_context(|| format!("bytecode in {path:?} is not hex"))
}

fn bytecode_from_artifact(artifact: &serde_json::Value) -> anyhow::Result<Vec<u8>> {
    let bytecode = &artifact["bytecode"];
    let hex = bytecode
        .as_str()
        .or_else(|| bytecode["object"].as_str())
        .context("`bytecode` field is missing")?;
    decode_0x_hex(hex).context("`bytecode` is not hex")
}
