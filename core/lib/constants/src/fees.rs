//! Constants used by the L1 Mailbox when validating and pricing priority transactions.

/// The amount of gas per pubdata byte that L1->L2 transactions must attach.
pub const REQUIRED_L1_TO_L2_GAS_PER_PUBDATA_BYTE: u64 = 800;

/// Number of L1 gas units charged per byte of pubdata in rollup mode.
pub const L1_GAS_PER_PUBDATA_BYTE: u32 = 17;

/// The intrinsic L2 gas cost of an L1->L2 transaction.
pub const L1_TX_INTRINSIC_L2_GAS: u64 = 167_157;

/// The L2 gas charged for every 544 bytes of the encoded transaction.
pub const L1_TX_DELTA_544_ENCODING_BYTES: u64 = 1_656;

/// The L2 gas charged for every factory dependency.
pub const L1_TX_DELTA_FACTORY_DEPS_L2_GAS: u64 = 2_473;

/// The minimal L2 gas (excluding pubdata and overhead) an L1->L2 transaction may request.
pub const L1_TX_MIN_L2_GAS_BASE: u64 = 173_484;

/// The intrinsic pubdata of an L1->L2 transaction, in bytes.
pub const L1_TX_INTRINSIC_PUBDATA: u64 = 88;

/// The pubdata charged for every factory dependency, in bytes.
pub const L1_TX_DELTA_FACTORY_DEPS_PUBDATA: u64 = 64;

/// The overhead for a single transaction slot in the batch.
pub const TX_SLOT_OVERHEAD_L2_GAS: u64 = 10_000;

/// The overhead per byte of the encoded transaction in the bootloader memory.
pub const MEMORY_OVERHEAD_GAS: u64 = 10;

/// Default upper bound on the L2 gas limit of a priority transaction.
pub const PRIORITY_TX_MAX_GAS_LIMIT: u64 = 72_000_000;

/// Default upper bound on the pubdata a priority transaction may publish.
pub const PRIORITY_TX_MAX_PUBDATA: u64 = 99_000;
