//! Choosing the L2 gas limit and fees of the deployment transaction.

use std::sync::Arc;

use zksync_config::{
    BaseCostSource, DeploymentConfig, GasLimitStrategy, GasPriceSource, L2DeployerConfig,
};
use zksync_eth_client::{
    EnrichedClientError, EthInterface, L1ToL2EstimateRequest, L2GasEstimator,
};
use zksync_system_constants::{ETH_TOKEN_ADDRESS, REQUIRED_L1_TO_L2_GAS_PER_PUBDATA_BYTE};
use zksync_types::{
    ethabi::{self, Function, Token},
    fee_model::{FeeParams, PriorityTxGasError, PriorityTxShape},
    web3::types::{Bytes, CallRequest},
    Address, L2ChainId, U256,
};

use crate::{
    errors::{DeploymentError, EstimationError, InvalidInputError},
    functions::DeploymentFunctions,
    metrics::METRICS,
};

/// L1 fees of the deployment transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasPriceParams {
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
}

/// Everything known about the priority transaction when its L2 gas limit is chosen.
#[derive(Debug, Clone)]
pub struct GasEstimationRequest {
    pub chain_id: L2ChainId,
    /// Shape of the canonical L2 transaction, which determines the minimal gas limit.
    pub shape: PriorityTxShape,
    /// L2 call performed by the transaction; used for live estimation.
    pub l2_call: L1ToL2EstimateRequest,
}

/// Cost of the L2 part of the deployment transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct L2Pricing {
    /// Base token minted on L2 to pay for the L2 gas limit.
    pub mint_value: U256,
    /// If set, `mint_value` is attached to the L1 transaction as its value.
    pub base_token_is_eth: bool,
}

/// Where [`L2Pricing`] comes from.
#[derive(Debug, Clone)]
pub enum PricingSource {
    /// Base cost is computed from the fee params; the base token kind is known in advance.
    Local {
        fee_params: FeeParams,
        base_token_is_eth: bool,
    },
    /// Base cost and base token are queried from the Bridgehub contract on L1.
    Bridgehub { address: Address },
}

impl PricingSource {
    pub fn from_config(config: &DeploymentConfig) -> Result<Self, DeploymentError> {
        Ok(match config.deployer.base_cost_source {
            BaseCostSource::Config => Self::Local {
                fee_params: config
                    .fee_params
                    .fee_params()
                    .map_err(|_| InvalidInputError::Config("fee params contain zero divisors"))?,
                base_token_is_eth: config.contracts.is_eth_based(),
            },
            BaseCostSource::Bridgehub => Self::Bridgehub {
                address: config.contracts.bridgehub_proxy_addr,
            },
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum GasPriceMode {
    Fixed(GasPriceParams),
    Live { priority_fee: U256 },
    Misconfigured,
}

/// Determines the L2 gas budget of the priority transaction and the L1 gas price parameters.
#[derive(Debug)]
pub struct GasEstimator {
    strategy: GasLimitStrategy,
    scale_factor: f64,
    max_gas_limit: u64,
    price_mode: GasPriceMode,
    pricing: PricingSource,
    functions: DeploymentFunctions,
    l1_client: Arc<dyn EthInterface>,
    l2_client: Option<Arc<dyn L2GasEstimator>>,
}

impl GasEstimator {
    pub fn new(
        config: &L2DeployerConfig,
        max_gas_limit: u64,
        pricing: PricingSource,
        l1_client: Arc<dyn EthInterface>,
        l2_client: Option<Arc<dyn L2GasEstimator>>,
    ) -> Self {
        let priority_fee = U256::from(config.max_priority_fee_per_gas);
        let price_mode = match (config.gas_price_source, config.max_fee_per_gas) {
            (GasPriceSource::Fixed, Some(max_fee)) => GasPriceMode::Fixed(GasPriceParams {
                max_fee_per_gas: max_fee.into(),
                max_priority_fee_per_gas: priority_fee,
            }),
            (GasPriceSource::Fixed, None) => GasPriceMode::Misconfigured,
            (GasPriceSource::Live, _) => GasPriceMode::Live { priority_fee },
        };

        Self {
            strategy: config.gas_limit_strategy,
            scale_factor: config.gas_limit_scale_factor,
            max_gas_limit,
            price_mode,
            pricing,
            functions: DeploymentFunctions::new(),
            l1_client,
            l2_client,
        }
    }

    pub fn from_config(
        config: &DeploymentConfig,
        l1_client: Arc<dyn EthInterface>,
        l2_client: Option<Arc<dyn L2GasEstimator>>,
    ) -> Result<Self, DeploymentError> {
        Ok(Self::new(
            &config.deployer,
            config.contracts.priority_tx_max_gas_limit,
            PricingSource::from_config(config)?,
            l1_client,
            l2_client,
        ))
    }

    /// Returns the L2 gas limit to attach to the priority transaction. The returned value is never
    /// below the minimum accepted by the L1 contracts, and never above the configured maximum.
    pub async fn estimate(&self, request: &GasEstimationRequest) -> Result<u64, DeploymentError> {
        let floor = request.shape.min_gas_limit();
        if floor > self.max_gas_limit {
            return Err(PriorityTxGasError::GasLimitTooHigh {
                gas_limit: floor,
                max: self.max_gas_limit,
            }
            .into());
        }

        let gas_limit = match self.strategy {
            GasLimitStrategy::Static => self.max_gas_limit,
            GasLimitStrategy::Live => self.live_estimate(request, floor).await?,
            GasLimitStrategy::LiveWithFallback => {
                match self.live_estimate(request, floor).await {
                    Ok(gas_limit) => gas_limit,
                    Err(err @ EstimationError::AboveCeiling { .. }) => return Err(err.into()),
                    Err(err) => {
                        tracing::warn!(
                            "Live L2 gas estimation failed, using the static gas limit {}: {err}",
                            self.max_gas_limit
                        );
                        self.max_gas_limit
                    }
                }
            }
        };

        tracing::info!(
            chain_id = request.chain_id.0,
            floor,
            gas_limit,
            strategy = ?self.strategy,
            "Chose L2 gas limit for the priority transaction"
        );
        METRICS.l2_gas_limit.set(gas_limit);
        Ok(gas_limit)
    }

    async fn live_estimate(
        &self,
        request: &GasEstimationRequest,
        floor: u64,
    ) -> Result<u64, EstimationError> {
        let l2_client = self.l2_client.as_ref().ok_or(EstimationError::NoL2Client)?;
        let estimate = l2_client
            .estimate_gas_l1_to_l2(request.l2_call.clone())
            .await?;
        if estimate.is_zero() {
            return Err(EstimationError::ZeroEstimate);
        }
        let estimate = if estimate > U256::from(u64::MAX) {
            u64::MAX
        } else {
            estimate.as_u64()
        };
        tracing::debug!(estimate, "Received L2 gas estimate");

        // `as` conversion saturates for floats.
        let scaled = (estimate as f64 * self.scale_factor).ceil() as u64;
        let gas_limit = scaled.max(floor);
        if gas_limit > self.max_gas_limit {
            return Err(EstimationError::AboveCeiling {
                estimate: gas_limit,
                max: self.max_gas_limit,
            });
        }
        Ok(gas_limit)
    }

    /// Returns fees for the L1 transaction.
    pub async fn gas_price_params(&self) -> Result<GasPriceParams, DeploymentError> {
        match self.price_mode {
            GasPriceMode::Fixed(params) => Ok(params),
            GasPriceMode::Live { priority_fee } => {
                let base_fee = self
                    .l1_client
                    .get_pending_block_base_fee_per_gas()
                    .await
                    .map_err(DeploymentError::NetworkUnavailable)?;
                let params = GasPriceParams {
                    max_fee_per_gas: base_fee * 2 + priority_fee,
                    max_priority_fee_per_gas: priority_fee,
                };
                tracing::debug!(%base_fee, ?params, "Derived L1 fees from the pending block");
                Ok(params)
            }
            GasPriceMode::Misconfigured => Err(InvalidInputError::Config(
                "`max_fee_per_gas` must be set for the fixed gas price source",
            )
            .into()),
        }
    }

    /// Returns the amount of base token to mint on L2 so that `l2_gas_limit` is paid for
    /// at the L2 gas price corresponding to `gas_price`.
    pub async fn l2_pricing(
        &self,
        chain_id: L2ChainId,
        l2_gas_limit: u64,
        gas_price: &GasPriceParams,
    ) -> Result<L2Pricing, DeploymentError> {
        let pricing = match &self.pricing {
            PricingSource::Local {
                fee_params,
                base_token_is_eth,
            } => L2Pricing {
                mint_value: fee_params.l2_transaction_base_cost(
                    gas_price.max_fee_per_gas,
                    l2_gas_limit,
                    REQUIRED_L1_TO_L2_GAS_PER_PUBDATA_BYTE,
                ),
                base_token_is_eth: *base_token_is_eth,
            },
            PricingSource::Bridgehub { address } => {
                let chain_id = Token::Uint(chain_id.0.into());
                let base_cost = self
                    .call_bridgehub(
                        *address,
                        &self.functions.l2_transaction_base_cost,
                        &[
                            chain_id.clone(),
                            Token::Uint(gas_price.max_fee_per_gas),
                            Token::Uint(l2_gas_limit.into()),
                            Token::Uint(REQUIRED_L1_TO_L2_GAS_PER_PUBDATA_BYTE.into()),
                        ],
                    )
                    .await?
                    .into_uint();
                let base_token = self
                    .call_bridgehub(*address, &self.functions.base_token, &[chain_id])
                    .await?
                    .into_address();

                let (Some(mint_value), Some(base_token)) = (base_cost, base_token) else {
                    let err = ethabi::Error::InvalidData;
                    return Err(EstimationError::Decoding(err).into());
                };
                tracing::debug!(
                    %mint_value,
                    ?base_token,
                    "Queried L2 transaction cost from Bridgehub"
                );
                L2Pricing {
                    mint_value,
                    base_token_is_eth: base_token == ETH_TOKEN_ADDRESS,
                }
            }
        };
        Ok(pricing)
    }

    async fn call_bridgehub(
        &self,
        bridgehub: Address,
        function: &Function,
        args: &[Token],
    ) -> Result<Token, DeploymentError> {
        let request = CallRequest {
            to: Some(bridgehub),
            data: Some(Bytes(function.encode_input(args).unwrap())),
            ..CallRequest::default()
        };
        let output = self
            .l1_client
            .call_contract_function(request, None)
            .await
            .map_err(Self::map_call_error)?;
        let mut tokens = function
            .decode_output(&output.0)
            .map_err(EstimationError::Decoding)?;
        tokens
            .pop()
            .ok_or_else(|| EstimationError::Decoding(ethabi::Error::InvalidData).into())
    }

    fn map_call_error(err: EnrichedClientError) -> DeploymentError {
        if err.is_retryable() {
            DeploymentError::NetworkUnavailable(err)
        } else {
            EstimationError::BaseCost(err).into()
        }
    }
}
