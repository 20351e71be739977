pub use crate::{contracts::*, fees::*};

pub mod contracts;
pub mod fees;

/// Transaction type used by L1->L2 priority operations.
pub const PRIORITY_OPERATION_L2_TX_TYPE: u8 = 255;

/// Offset added to an L1 contract address to obtain its L2 alias.
pub const L1_TO_L2_ALIAS_OFFSET: zksync_basic_types::Address = zksync_basic_types::H160([
    0x11, 0x11, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x11, 0x11,
]);
