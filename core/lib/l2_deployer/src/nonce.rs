use std::sync::Arc;

use tokio::sync::Mutex;
use zksync_eth_client::EthInterface;
use zksync_types::{Address, BlockNumber};

use crate::errors::DeploymentError;

/// Allocates nonces of a single sending account. Clones share the allocation state, so a single
/// sequencer should be used for all concurrent deployments from the same account.
#[derive(Debug, Clone)]
pub struct NonceSequencer {
    account: Address,
    next_nonce: Arc<Mutex<Option<u64>>>,
}

impl NonceSequencer {
    pub fn new(account: Address) -> Self {
        Self {
            account,
            next_nonce: Arc::default(),
        }
    }

    pub fn account(&self) -> Address {
        self.account
    }

    /// Returns a nonce that was not handed out by this sequencer before. The pending nonce
    /// is queried on each call, so that transactions sent by other processes are accounted for.
    pub async fn next_nonce(&self, client: &dyn EthInterface) -> Result<u64, DeploymentError> {
        // The lock is held across the query so that allocations are serialized.
        let mut next_nonce = self.next_nonce.lock().await;
        let pending_nonce = client
            .nonce_at_for_account(self.account, BlockNumber::Pending)
            .await
            .map_err(DeploymentError::NetworkUnavailable)?
            .low_u64();

        let nonce = match *next_nonce {
            None => pending_nonce,
            Some(local_nonce) => {
                if pending_nonce > local_nonce {
                    tracing::info!(
                        local_nonce,
                        pending_nonce,
                        "Pending nonce of {:?} is ahead of the local one",
                        self.account
                    );
                }
                local_nonce.max(pending_nonce)
            }
        };
        *next_nonce = Some(nonce + 1);
        tracing::debug!(nonce, "Allocated nonce for {:?}", self.account);
        Ok(nonce)
    }
}
