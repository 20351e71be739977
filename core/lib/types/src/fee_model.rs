//! Fee model applied by the L1 Mailbox to priority transactions.
//!
//! The L1 contracts derive the L2 gas price from the L1 gas price and the chain fee parameters,
//! and validate the gas limit attached to every priority transaction. Both are reproduced here so
//! that a transaction can be priced and checked before it is sent.

use serde::{Deserialize, Serialize};
use zksync_system_constants::{
    L1_GAS_PER_PUBDATA_BYTE, L1_TX_DELTA_544_ENCODING_BYTES, L1_TX_DELTA_FACTORY_DEPS_L2_GAS,
    L1_TX_DELTA_FACTORY_DEPS_PUBDATA, L1_TX_INTRINSIC_L2_GAS, L1_TX_INTRINSIC_PUBDATA,
    L1_TX_MIN_L2_GAS_BASE, MEMORY_OVERHEAD_GAS, PRIORITY_TX_MAX_PUBDATA, TX_SLOT_OVERHEAD_L2_GAS,
};

use crate::{ceil_div_u256, U256};

/// How pubdata of the chain is paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PubdataPricingMode {
    /// Pubdata is published on L1 and charged at `L1_GAS_PER_PUBDATA_BYTE` per byte.
    #[default]
    Rollup,
    /// Pubdata is published elsewhere and is free from the L1 perspective.
    Validium,
}

/// Fee parameters of a chain as stored in its diamond proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeParams {
    pub pubdata_pricing_mode: PubdataPricingMode,
    /// The constant amount of L1 gas that is used as the overhead for the batch.
    pub batch_overhead_l1_gas: u64,
    pub max_pubdata_per_batch: u64,
    pub max_l2_gas_per_batch: u64,
    pub priority_tx_max_pubdata: u64,
    pub minimal_l2_gas_price: u64,
    /// Base token / ETH price ratio applied to the L1 gas price. `1 / 1` for ETH-based chains.
    pub base_token_gas_price_multiplier_nominator: u64,
    pub base_token_gas_price_multiplier_denominator: u64,
}

impl Default for FeeParams {
    fn default() -> Self {
        Self {
            pubdata_pricing_mode: PubdataPricingMode::Rollup,
            batch_overhead_l1_gas: 1_000_000,
            max_pubdata_per_batch: 120_000,
            max_l2_gas_per_batch: 80_000_000,
            priority_tx_max_pubdata: PRIORITY_TX_MAX_PUBDATA,
            minimal_l2_gas_price: 250_000_000,
            base_token_gas_price_multiplier_nominator: 1,
            base_token_gas_price_multiplier_denominator: 1,
        }
    }
}

impl FeeParams {
    /// Derives the L2 gas price the Mailbox charges for a priority transaction,
    /// given the L1 gas price of the request transaction.
    pub fn derive_l2_gas_price(&self, l1_gas_price: U256, gas_per_pubdata: u64) -> U256 {
        let l1_gas_price = l1_gas_price * self.base_token_gas_price_multiplier_nominator
            / self.base_token_gas_price_multiplier_denominator.max(1);

        let pubdata_price = match self.pubdata_pricing_mode {
            PubdataPricingMode::Rollup => l1_gas_price * L1_GAS_PER_PUBDATA_BYTE,
            PubdataPricingMode::Validium => U256::zero(),
        };
        let batch_overhead = l1_gas_price * self.batch_overhead_l1_gas;
        let full_pubdata_price = pubdata_price + batch_overhead / self.max_pubdata_per_batch;

        let l2_gas_price =
            U256::from(self.minimal_l2_gas_price) + batch_overhead / self.max_l2_gas_per_batch;
        let min_l2_gas_price = ceil_div_u256(full_pubdata_price, gas_per_pubdata.into());
        l2_gas_price.max(min_l2_gas_price)
    }

    /// Returns the amount of base token the sender has to mint for a priority transaction.
    pub fn l2_transaction_base_cost(
        &self,
        l1_gas_price: U256,
        l2_gas_limit: u64,
        gas_per_pubdata: u64,
    ) -> U256 {
        self.derive_l2_gas_price(l1_gas_price, gas_per_pubdata) * l2_gas_limit
    }
}

/// Overhead charged for a transaction with the given ABI encoding length.
pub fn tx_overhead(encoding_len: u64) -> u64 {
    TX_SLOT_OVERHEAD_L2_GAS.max(MEMORY_OVERHEAD_GAS * encoding_len)
}

/// Minimal gas limit of the transaction body, i.e. excluding the overhead.
pub fn minimal_priority_tx_body_gas_limit(
    encoding_len: u64,
    factory_deps: u64,
    gas_per_pubdata: u64,
) -> u64 {
    let computation = L1_TX_INTRINSIC_L2_GAS
        + (encoding_len * L1_TX_DELTA_544_ENCODING_BYTES).div_ceil(544)
        + factory_deps * L1_TX_DELTA_FACTORY_DEPS_L2_GAS;
    let computation = computation.max(L1_TX_MIN_L2_GAS_BASE);
    let pubdata =
        (L1_TX_INTRINSIC_PUBDATA + factory_deps * L1_TX_DELTA_FACTORY_DEPS_PUBDATA) * gas_per_pubdata;
    computation + pubdata
}

/// Minimal total gas limit the L1 contracts accept for a priority transaction.
pub fn minimal_priority_tx_gas_limit(
    encoding_len: u64,
    factory_deps: u64,
    gas_per_pubdata: u64,
) -> u64 {
    tx_overhead(encoding_len)
        + minimal_priority_tx_body_gas_limit(encoding_len, factory_deps, gas_per_pubdata)
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PriorityTxGasError {
    #[error("gas limit {gas_limit} is below the minimum of {min}")]
    GasLimitTooLow { gas_limit: u64, min: u64 },
    #[error("gas limit {gas_limit} exceeds the maximum of {max}")]
    GasLimitTooHigh { gas_limit: u64, max: u64 },
    #[error("transaction may publish up to {pubdata} bytes of pubdata, while at most {max} are allowed")]
    PubdataTooHigh { pubdata: u64, max: u64 },
}

/// Limits applied to the shape of a priority transaction.
#[derive(Debug, Clone, Copy)]
pub struct PriorityTxShape {
    pub encoding_len: u64,
    pub factory_deps: u64,
    pub gas_per_pubdata: u64,
}

impl PriorityTxShape {
    pub fn min_gas_limit(&self) -> u64 {
        minimal_priority_tx_gas_limit(self.encoding_len, self.factory_deps, self.gas_per_pubdata)
    }

    /// Checks `gas_limit` the same way the Mailbox does when accepting the transaction.
    pub fn validate_gas_limit(
        &self,
        gas_limit: u64,
        max_gas_limit: u64,
        max_pubdata: u64,
    ) -> Result<(), PriorityTxGasError> {
        let min = self.min_gas_limit();
        if gas_limit < min {
            return Err(PriorityTxGasError::GasLimitTooLow { gas_limit, min });
        }
        if gas_limit > max_gas_limit {
            return Err(PriorityTxGasError::GasLimitTooHigh {
                gas_limit,
                max: max_gas_limit,
            });
        }
        let body_gas = gas_limit - tx_overhead(self.encoding_len);
        let pubdata = body_gas / self.gas_per_pubdata;
        if pubdata > max_pubdata {
            return Err(PriorityTxGasError::PubdataTooHigh {
                pubdata,
                max: max_pubdata,
            });
        }
        Ok(())
    }
}
