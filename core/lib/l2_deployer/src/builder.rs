//! Assembling the L1 transaction that deploys a contract on L2.

use zksync_config::{ContractsConfig, DeploymentConfig};
use zksync_eth_client::{Eip712Meta, L1ToL2EstimateRequest};
use zksync_system_constants::{CONTRACT_DEPLOYER_ADDRESS, REQUIRED_L1_TO_L2_GAS_PER_PUBDATA_BYTE};
use zksync_types::{
    ethabi::Token,
    fee_model::{FeeParams, PriorityTxShape},
    h256_to_u256, Address, L2CanonicalTransaction, L2ChainId, L2TransactionRequestDirect, H256,
    U256,
};
use zksync_utils::bytecode::hash_bytecode;

use crate::{
    address::AddressDeriver,
    errors::{DeploymentError, InvalidInputError},
    functions::DeploymentFunctions,
    gas::{GasEstimationRequest, GasPriceParams, L2Pricing},
};

/// L1 gas spent by `requestL2TransactionDirect` regardless of its payload.
const L1_TX_BASE_GAS: u64 = 600_000;
/// L1 gas per byte of calldata, covering calldata cost together with hashing and copying it.
const L1_GAS_PER_CALLDATA_BYTE: u64 = 40;

/// What to deploy.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentRequest {
    pub bytecode: Vec<u8>,
    pub salt: H256,
    pub constructor_input: Vec<u8>,
    /// Bytecodes of contracts the deployed contract may itself deploy.
    pub extra_factory_deps: Vec<Vec<u8>>,
}

impl DeploymentRequest {
    /// Creates a request with zero salt and empty constructor input.
    pub fn new(bytecode: Vec<u8>) -> Self {
        Self {
            bytecode,
            salt: H256::zero(),
            constructor_input: vec![],
            extra_factory_deps: vec![],
        }
    }

    pub fn with_salt(mut self, salt: H256) -> Self {
        self.salt = salt;
        self
    }

    pub fn with_constructor_input(mut self, constructor_input: Vec<u8>) -> Self {
        self.constructor_input = constructor_input;
        self
    }

    pub fn with_factory_deps(mut self, factory_deps: Vec<Vec<u8>>) -> Self {
        self.extra_factory_deps = factory_deps;
        self
    }

    fn factory_deps(&self) -> impl Iterator<Item = &[u8]> + '_ {
        std::iter::once(self.bytecode.as_slice())
            .chain(self.extra_factory_deps.iter().map(Vec::as_slice))
    }
}

/// L1 transaction calling `Bridgehub.requestL2TransactionDirect`, without a nonce.
#[derive(Debug, Clone, PartialEq)]
pub struct PriorityTransaction {
    /// L1 account sending the transaction.
    pub sender: Address,
    pub chain_id: L2ChainId,
    /// Bridgehub address, i.e. the recipient of the L1 transaction.
    pub bridgehub: Address,
    pub l2_contract: Address,
    /// Calldata of the L1 transaction.
    pub calldata: Vec<u8>,
    pub l2_gas_limit: u64,
    pub gas_per_pubdata_limit: u64,
    pub gas_price: GasPriceParams,
    /// Value of the L1 transaction; equals `mint_value` for ETH-based chains.
    pub value: U256,
    /// Amount of base token minted on L2 to pay for the transaction.
    pub mint_value: U256,
    pub l1_gas_limit: u64,
    pub bytecode_hash: H256,
}

/// Data derived from a [`DeploymentRequest`] that does not depend on gas parameters.
#[derive(Debug, Clone)]
struct PreparedDeployment {
    l2_sender: Address,
    bytecode_hash: H256,
    l2_calldata: Vec<u8>,
    factory_dep_hashes: Vec<U256>,
}

/// Assembles L1 transactions that deploy contracts on L2 via `ContractDeployer.create2`.
#[derive(Debug, Clone)]
pub struct PriorityTransactionBuilder {
    chain_id: L2ChainId,
    bridgehub: Address,
    fee_params: FeeParams,
    max_gas_limit: u64,
    address_deriver: AddressDeriver,
    functions: DeploymentFunctions,
}

impl PriorityTransactionBuilder {
    pub fn new(
        chain_id: L2ChainId,
        contracts: &ContractsConfig,
        fee_params: FeeParams,
        address_deriver: AddressDeriver,
    ) -> Self {
        Self {
            chain_id,
            bridgehub: contracts.bridgehub_proxy_addr,
            fee_params,
            max_gas_limit: contracts.priority_tx_max_gas_limit,
            address_deriver,
            functions: DeploymentFunctions::new(),
        }
    }

    pub fn from_config(config: &DeploymentConfig) -> Result<Self, DeploymentError> {
        let fee_params = config
            .fee_params
            .fee_params()
            .map_err(|_| InvalidInputError::Config("fee params contain zero divisors"))?;
        Ok(Self::new(
            config.l2_chain.chain_id(),
            &config.contracts,
            fee_params,
            AddressDeriver::new(config.deployer.apply_l1_to_l2_alias),
        ))
    }

    pub fn chain_id(&self) -> L2ChainId {
        self.chain_id
    }

    fn prepare(
        &self,
        sender: Address,
        request: &DeploymentRequest,
    ) -> Result<PreparedDeployment, DeploymentError> {
        let bytecode_hash = hash_bytecode(&request.bytecode)?;
        let mut factory_dep_hashes = vec![h256_to_u256(bytecode_hash)];
        for (index, dep) in request.extra_factory_deps.iter().enumerate() {
            let hash = hash_bytecode(dep)
                .map_err(|source| InvalidInputError::FactoryDep { index, source })?;
            factory_dep_hashes.push(h256_to_u256(hash));
        }

        let l2_calldata = self
            .functions
            .create2
            .encode_input(&[
                Token::FixedBytes(request.salt.as_bytes().to_vec()),
                Token::FixedBytes(bytecode_hash.as_bytes().to_vec()),
                Token::Bytes(request.constructor_input.clone()),
            ])
            .unwrap();

        Ok(PreparedDeployment {
            l2_sender: self.address_deriver.l2_sender(sender),
            bytecode_hash,
            l2_calldata,
            factory_dep_hashes,
        })
    }

    /// Returns data required to choose the L2 gas limit for the deployment. Validates the bytecode
    /// and factory dependencies.
    pub fn gas_estimation_request(
        &self,
        sender: Address,
        request: &DeploymentRequest,
    ) -> Result<GasEstimationRequest, DeploymentError> {
        let prepared = self.prepare(sender, request)?;
        Ok(GasEstimationRequest {
            chain_id: self.chain_id,
            shape: Self::shape(&prepared),
            l2_call: L1ToL2EstimateRequest {
                from: prepared.l2_sender,
                to: CONTRACT_DEPLOYER_ADDRESS,
                data: prepared.l2_calldata.into(),
                value: U256::zero(),
                eip712_meta: Eip712Meta {
                    gas_per_pubdata: REQUIRED_L1_TO_L2_GAS_PER_PUBDATA_BYTE.into(),
                    factory_deps: request.factory_deps().map(<[u8]>::to_vec).collect(),
                },
            },
        })
    }

    /// The length of the ABI-encoded canonical transaction doesn't depend on the values of its
    /// static fields, so placeholders are used for them.
    fn shape(prepared: &PreparedDeployment) -> PriorityTxShape {
        let tx = L2CanonicalTransaction::new(
            prepared.l2_sender,
            CONTRACT_DEPLOYER_ADDRESS,
            U256::zero(),
            REQUIRED_L1_TO_L2_GAS_PER_PUBDATA_BYTE.into(),
            U256::zero(),
            U256::zero(),
            U256::zero(),
            Address::zero(),
            prepared.l2_calldata.clone(),
            prepared.factory_dep_hashes.clone(),
        );
        PriorityTxShape {
            encoding_len: tx.encoding_len() as u64,
            factory_deps: prepared.factory_dep_hashes.len() as u64,
            gas_per_pubdata: REQUIRED_L1_TO_L2_GAS_PER_PUBDATA_BYTE,
        }
    }

    /// Builds the deployment transaction. The refund recipient on L2 is `sender`.
    pub fn build(
        &self,
        sender: Address,
        request: &DeploymentRequest,
        l2_gas_limit: u64,
        gas_price: GasPriceParams,
        pricing: L2Pricing,
    ) -> Result<PriorityTransaction, DeploymentError> {
        let prepared = self.prepare(sender, request)?;
        let shape = Self::shape(&prepared);
        shape.validate_gas_limit(
            l2_gas_limit,
            self.max_gas_limit,
            self.fee_params.priority_tx_max_pubdata,
        )?;

        let mint_value = pricing.mint_value;
        let value = if pricing.base_token_is_eth {
            mint_value
        } else {
            U256::zero()
        };

        let direct_request = L2TransactionRequestDirect {
            chain_id: self.chain_id.0.into(),
            mint_value,
            l2_contract: CONTRACT_DEPLOYER_ADDRESS,
            l2_value: U256::zero(),
            l2_calldata: prepared.l2_calldata,
            l2_gas_limit: l2_gas_limit.into(),
            l2_gas_per_pubdata_byte_limit: REQUIRED_L1_TO_L2_GAS_PER_PUBDATA_BYTE.into(),
            factory_deps: request.factory_deps().map(<[u8]>::to_vec).collect(),
            refund_recipient: sender,
        };
        let calldata = self
            .functions
            .request_l2_transaction_direct
            .encode_input(&[direct_request.into_token()])
            .unwrap();
        let l1_gas_limit = L1_TX_BASE_GAS + L1_GAS_PER_CALLDATA_BYTE * calldata.len() as u64;

        tracing::debug!(
            %mint_value,
            l2_gas_limit,
            l1_gas_limit,
            calldata_len = calldata.len(),
            "Built deployment transaction"
        );
        Ok(PriorityTransaction {
            sender,
            chain_id: self.chain_id,
            bridgehub: self.bridgehub,
            l2_contract: CONTRACT_DEPLOYER_ADDRESS,
            calldata,
            l2_gas_limit,
            gas_per_pubdata_limit: REQUIRED_L1_TO_L2_GAS_PER_PUBDATA_BYTE,
            gas_price,
            value,
            mint_value,
            l1_gas_limit,
            bytecode_hash: prepared.bytecode_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use zksync_system_constants::PRIORITY_TX_MAX_GAS_LIMIT;
    use zksync_types::fee_model::PriorityTxGasError;
    use zksync_utils::bytecode::InvalidBytecodeError;

    use super::*;

    fn test_bytecode() -> Vec<u8> {
        let mut bytecode = vec![0x60, 0x01, 0x60, 0x01, 0x55];
        bytecode.resize(32, 0);
        bytecode
    }

    fn builder(contracts: &ContractsConfig) -> PriorityTransactionBuilder {
        PriorityTransactionBuilder::new(
            L2ChainId(270),
            contracts,
            FeeParams::default(),
            AddressDeriver::default(),
        )
    }

    fn gas_price() -> GasPriceParams {
        GasPriceParams {
            max_fee_per_gas: 10_000_000_000_u64.into(),
            max_priority_fee_per_gas: 1_000_000_000_u64.into(),
        }
    }

    fn eth_pricing() -> L2Pricing {
        L2Pricing {
            mint_value: U256::from(123_456_789_u64),
            base_token_is_eth: true,
        }
    }

    fn decode_direct_request(calldata: &[u8]) -> Vec<Token> {
        let function = DeploymentFunctions::new().request_l2_transaction_direct;
        assert_eq!(calldata[..4], function.short_signature());
        let tokens = function.decode_input(&calldata[4..]).unwrap();
        match tokens.into_iter().next() {
            Some(Token::Tuple(fields)) => fields,
            other => panic!("unexpected tokens: {other:?}"),
        }
    }

    #[test]
    fn estimation_request_for_deployment() {
        let sender = Address::repeat_byte(0xaa);
        let request = DeploymentRequest::new(test_bytecode());
        let estimation = builder(&ContractsConfig::for_tests())
            .gas_estimation_request(sender, &request)
            .unwrap();

        assert_eq!(estimation.chain_id, L2ChainId(270));
        assert_eq!(estimation.shape.encoding_len, 992);
        assert_eq!(estimation.shape.factory_deps, 1);
        assert_eq!(estimation.shape.min_gas_limit(), 305_084);
        assert_eq!(estimation.l2_call.from, sender);
        assert_eq!(estimation.l2_call.to, CONTRACT_DEPLOYER_ADDRESS);
        assert_eq!(estimation.l2_call.data.0.len(), 132);
        assert_eq!(estimation.l2_call.data.0[..4], [0x3c, 0xda, 0x33, 0x51]);
        assert_eq!(estimation.l2_call.eip712_meta.factory_deps, [test_bytecode()]);
    }

    #[test]
    fn building_transaction_for_eth_based_chain() {
        let sender = Address::repeat_byte(0xaa);
        let request = DeploymentRequest::new(test_bytecode());
        let tx = builder(&ContractsConfig::for_tests())
            .build(sender, &request, PRIORITY_TX_MAX_GAS_LIMIT, gas_price(), eth_pricing())
            .unwrap();

        assert_eq!(tx.bridgehub, Address::repeat_byte(0x44));
        assert_eq!(tx.l2_contract, CONTRACT_DEPLOYER_ADDRESS);
        assert_eq!(tx.calldata[..4], [0xd5, 0x24, 0x71, 0xc1]);
        let expected_mint_value = eth_pricing().mint_value;
        assert_eq!(tx.mint_value, expected_mint_value);
        assert_eq!(tx.value, expected_mint_value);
        assert_eq!(
            tx.bytecode_hash,
            "0x01000001e25da0a691a014cf019f594528058021098f689426170ad929d2fa4e"
                .parse::<H256>()
                .unwrap()
        );
        assert!(tx.l1_gas_limit > L1_TX_BASE_GAS);

        let fields = decode_direct_request(&tx.calldata);
        assert_eq!(fields[0], Token::Uint(270.into()));
        assert_eq!(fields[1], Token::Uint(expected_mint_value));
        assert_eq!(fields[2], Token::Address(CONTRACT_DEPLOYER_ADDRESS));
        assert_eq!(fields[3], Token::Uint(U256::zero()));
        assert_eq!(fields[5], Token::Uint(PRIORITY_TX_MAX_GAS_LIMIT.into()));
        assert_eq!(fields[6], Token::Uint(800.into()));
        assert_eq!(fields[7], Token::Array(vec![Token::Bytes(test_bytecode())]));
        assert_eq!(fields[8], Token::Address(sender));
    }

    #[test]
    fn building_transaction_for_custom_base_token() {
        let pricing = L2Pricing {
            base_token_is_eth: false,
            ..eth_pricing()
        };
        let request = DeploymentRequest::new(test_bytecode());
        let tx = builder(&ContractsConfig::for_tests())
            .build(Address::repeat_byte(0xaa), &request, 1_000_000, gas_price(), pricing)
            .unwrap();
        assert_eq!(tx.mint_value, pricing.mint_value);
        assert_eq!(tx.value, U256::zero());
        let fields = decode_direct_request(&tx.calldata);
        assert_eq!(fields[1], Token::Uint(pricing.mint_value));
    }

    #[test]
    fn constructor_input_and_factory_deps_are_encoded() {
        let extra_dep = vec![0xfe; 96];
        let request = DeploymentRequest::new(test_bytecode())
            .with_salt(H256::repeat_byte(1))
            .with_constructor_input(vec![0xaa; 20])
            .with_factory_deps(vec![extra_dep.clone()]);
        let tx = builder(&ContractsConfig::for_tests())
            .build(Address::repeat_byte(0xaa), &request, 1_000_000, gas_price(), eth_pricing())
            .unwrap();

        let fields = decode_direct_request(&tx.calldata);
        assert_eq!(
            fields[7],
            Token::Array(vec![Token::Bytes(test_bytecode()), Token::Bytes(extra_dep)])
        );
        let Token::Bytes(l2_calldata) = &fields[4] else {
            panic!("unexpected L2 calldata: {:?}", fields[4]);
        };
        let create2 = DeploymentFunctions::new().create2;
        let args = create2.decode_input(&l2_calldata[4..]).unwrap();
        assert_eq!(args[0], Token::FixedBytes(vec![1; 32]));
        assert_eq!(args[1], Token::FixedBytes(tx.bytecode_hash.as_bytes().to_vec()));
        assert_eq!(args[2], Token::Bytes(vec![0xaa; 20]));
    }

    #[test]
    fn invalid_bytecode_is_rejected() {
        let builder = builder(&ContractsConfig::for_tests());
        let sender = Address::repeat_byte(0xaa);

        let request = DeploymentRequest::new(vec![0; 64]);
        let err = builder
            .build(sender, &request, 1_000_000, gas_price(), eth_pricing())
            .unwrap_err();
        assert_matches!(
            err,
            DeploymentError::InvalidInput(InvalidInputError::Bytecode(
                InvalidBytecodeError::BytecodeLengthInWordsIsEven
            ))
        );

        let request = DeploymentRequest::new(test_bytecode()).with_factory_deps(vec![vec![0; 33]]);
        let err = builder.gas_estimation_request(sender, &request).unwrap_err();
        assert_matches!(
            err,
            DeploymentError::InvalidInput(InvalidInputError::FactoryDep { index: 0, .. })
        );
    }

    #[test]
    fn gas_limit_is_validated() {
        let builder = builder(&ContractsConfig::for_tests());
        let sender = Address::repeat_byte(0xaa);
        let request = DeploymentRequest::new(test_bytecode());

        let err = builder
            .build(sender, &request, 100_000, gas_price(), eth_pricing())
            .unwrap_err();
        assert_matches!(
            err,
            DeploymentError::InvalidInput(InvalidInputError::GasLimit(
                PriorityTxGasError::GasLimitTooLow { min: 305_084, .. }
            ))
        );

        let err = builder
            .build(
                sender,
                &request,
                PRIORITY_TX_MAX_GAS_LIMIT + 1,
                gas_price(),
                eth_pricing(),
            )
            .unwrap_err();
        assert_matches!(
            err,
            DeploymentError::InvalidInput(InvalidInputError::GasLimit(
                PriorityTxGasError::GasLimitTooHigh { .. }
            ))
        );
    }

    #[test]
    fn pubdata_limit_is_validated() {
        let fee_params = FeeParams {
            priority_tx_max_pubdata: 1_000,
            ..FeeParams::default()
        };
        let builder = PriorityTransactionBuilder::new(
            L2ChainId(270),
            &ContractsConfig::for_tests(),
            fee_params,
            AddressDeriver::default(),
        );
        let request = DeploymentRequest::new(test_bytecode());
        let err = builder
            .build(Address::repeat_byte(0xaa), &request, 10_000_000, gas_price(), eth_pricing())
            .unwrap_err();
        assert_matches!(
            err,
            DeploymentError::InvalidInput(InvalidInputError::GasLimit(
                PriorityTxGasError::PubdataTooHigh { .. }
            ))
        );
    }

    #[test]
    fn aliased_sender_is_used_on_l2() {
        let builder = PriorityTransactionBuilder::new(
            L2ChainId(270),
            &ContractsConfig::for_tests(),
            FeeParams::default(),
            AddressDeriver::new(true),
        );
        let sender = Address::repeat_byte(0xaa);
        let estimation = builder
            .gas_estimation_request(sender, &DeploymentRequest::new(test_bytecode()))
            .unwrap();
        assert_eq!(
            estimation.l2_call.from,
            crate::address::apply_l1_to_l2_alias(sender)
        );
    }
}
