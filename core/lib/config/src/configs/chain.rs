use serde::Deserialize;
use zksync_basic_types::L2ChainId;

/// Target L2 chain of the deployment.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct L2ChainConfig {
    /// ZKsync chain ID (e.g. `270` for localhost).
    pub zksync_network_id: u64,
    /// Address of the L2 node API. Only required for live gas estimation.
    #[serde(default)]
    pub l2_web3_url: Option<String>,
}

impl L2ChainConfig {
    pub fn chain_id(&self) -> L2ChainId {
        L2ChainId(self.zksync_network_id)
    }

    pub fn for_tests() -> Self {
        Self {
            zksync_network_id: 270,
            l2_web3_url: None,
        }
    }
}
