use zksync_contracts::{bridgehub_contract, deployer_contract};
use zksync_types::ethabi::{Contract, Function};

/// Contract functions invoked by the deployment transaction.
#[derive(Debug, Clone)]
pub(crate) struct DeploymentFunctions {
    /// `IContractDeployer.create2(bytes32,bytes32,bytes)`
    pub(crate) create2: Function,
    pub(crate) request_l2_transaction_direct: Function,
    /// `IBridgehub.l2TransactionBaseCost(uint256,uint256,uint256,uint256)`
    pub(crate) l2_transaction_base_cost: Function,
    pub(crate) base_token: Function,
}

fn get_function(contract: &Contract, name: &str) -> Function {
    contract
        .functions
        .get(name)
        .cloned()
        .unwrap_or_else(|| panic!("{name} function not found"))
        .pop()
        .unwrap_or_else(|| panic!("{name} function entry not found"))
}

impl DeploymentFunctions {
    pub(crate) fn new() -> Self {
        Self {
            create2: get_function(deployer_contract(), "create2"),
            request_l2_transaction_direct: get_function(
                bridgehub_contract(),
                "requestL2TransactionDirect",
            ),
            l2_transaction_base_cost: get_function(bridgehub_contract(), "l2TransactionBaseCost"),
            base_token: get_function(bridgehub_contract(), "baseToken"),
        }
    }
}
