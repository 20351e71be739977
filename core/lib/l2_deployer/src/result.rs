use std::fmt;

use zksync_types::{web3::types::TransactionReceipt, Address, H256};

/// Outcome of a successful deployment.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentResult {
    /// Receipt of the L1 transaction that requested the deployment.
    pub l1_receipt: TransactionReceipt,
    /// Address of the deployed contract on L2. Computed before the transaction was sent.
    pub l2_address: Address,
}

impl DeploymentResult {
    pub fn l1_tx_hash(&self) -> H256 {
        self.l1_receipt.transaction_hash
    }

    /// Returns a view of this result formatted as `KEY=value` lines, with the L2 address
    /// reported under `address_key`.
    pub fn report<'a>(&'a self, address_key: &'a str) -> DeploymentReport<'a> {
        DeploymentReport {
            result: self,
            address_key,
        }
    }
}

/// `KEY=value` presentation of a [`DeploymentResult`], suitable for appending to `.env` files.
#[derive(Debug, Clone, Copy)]
pub struct DeploymentReport<'a> {
    result: &'a DeploymentResult,
    address_key: &'a str,
}

impl DeploymentReport<'_> {
    pub const L1_TX_HASH_KEY: &'static str = "L1_TX_HASH";
}

impl fmt::Display for DeploymentReport<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(formatter, "{}={:?}", self.address_key, self.result.l2_address)?;
        write!(
            formatter,
            "{}={:?}",
            Self::L1_TX_HASH_KEY,
            self.result.l1_tx_hash()
        )
    }
}
