use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use tokio::sync::watch;
use url::Url;
use zksync_config::{DeploymentConfig, ObservabilityConfig, Wallet};
use zksync_contracts::read_bytecode_from_path;
use zksync_env_config::FromEnv;
use zksync_eth_client::{clients::build_http_client, EthInterface, L2GasEstimator};
use zksync_eth_signer::PrivateKeySigner;
use zksync_l2_deployer::{DeploymentOrchestrator, DeploymentRequest, NonceSequencer};
use zksync_types::{Address, L1ChainId, H256};

#[derive(Debug, Parser)]
#[command(
    author = "Matter Labs",
    version,
    about = "Deploys a contract to a ZKsync chain via an L1 priority transaction",
    long_about = None
)]
struct Cli {
    /// Path to the contract bytecode: compiler artifact (JSON), hex file or `.zbin` file.
    #[arg(long)]
    bytecode: PathBuf,
    /// ZKsync chain ID. Overrides `CHAIN_ETH_ZKSYNC_NETWORK_ID`.
    #[arg(long)]
    chain_id: Option<u64>,
    /// Private key of the deployer. Overrides `DEPLOYER_PRIVATE_KEY`.
    #[arg(long)]
    private_key: Option<H256>,
    /// CREATE2 salt. Zero if not specified.
    #[arg(long)]
    salt: Option<H256>,
    /// Hex-encoded constructor input.
    #[arg(long, conflicts_with = "deployer_address_as_input")]
    constructor_input: Option<String>,
    /// Uses the raw 20-byte address of the deployer as constructor input.
    #[arg(long)]
    deployer_address_as_input: bool,
    /// Bytecode of a contract that the deployed contract may deploy itself. Can be repeated.
    #[arg(long = "factory-dep")]
    factory_deps: Vec<PathBuf>,
    /// Key under which the deployed contract address is printed. Overrides `L2_DEPLOYER_ADDRESS_KEY`.
    #[arg(long)]
    address_key: Option<String>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut DeploymentConfig) {
        if let Some(chain_id) = self.chain_id {
            config.l2_chain.zksync_network_id = chain_id;
        }
        if let Some(address_key) = &self.address_key {
            config.deployer.address_key.clone_from(address_key);
        }
    }

    fn wallet(&self) -> anyhow::Result<Wallet> {
        match self.private_key {
            Some(private_key) => Wallet::from_private_key_bytes(private_key, None),
            None => Wallet::from_env().context("Wallet::from_env()"),
        }
    }

    fn deployment_request(&self, deployer: Address) -> anyhow::Result<DeploymentRequest> {
        let bytecode = read_bytecode_from_path(&self.bytecode)?;
        let constructor_input = if self.deployer_address_as_input {
            deployer.as_bytes().to_vec()
        } else if let Some(input) = &self.constructor_input {
            let input = input.strip_prefix("0x").unwrap_or(input);
            hex::decode(input).context("constructor input is not hex")?
        } else {
            vec![]
        };
        let factory_deps = self
            .factory_deps
            .iter()
            .map(read_bytecode_from_path)
            .collect::<anyhow::Result<_>>()?;

        Ok(DeploymentRequest::new(bytecode)
            .with_salt(self.salt.unwrap_or_default())
            .with_constructor_input(constructor_input)
            .with_factory_deps(factory_deps))
    }

    async fn run(self, mut config: DeploymentConfig) -> anyhow::Result<()> {
        self.apply_overrides(&mut config);
        let wallet = self.wallet()?;
        let deployer = wallet.address();
        tracing::info!("Using deployer wallet: {deployer:?}");
        let request = self.deployment_request(deployer)?;

        let rpc_timeout = config.deployer.rpc_timeout();
        let l1_url: Url = config
            .eth_client
            .web3_url
            .parse()
            .context("invalid L1 Web3 URL")?;
        let l1_client =
            build_http_client(&l1_url, rpc_timeout).context("failed building L1 client")?;
        let l1_chain_id = l1_client
            .fetch_chain_id()
            .await
            .context("failed fetching L1 chain ID")?;
        anyhow::ensure!(
            l1_chain_id == L1ChainId(config.eth_client.chain_id),
            "L1 node reports chain ID {l1_chain_id:?}, while {} is configured",
            config.eth_client.chain_id
        );

        let l2_client = match &config.l2_chain.l2_web3_url {
            Some(url) => {
                let url: Url = url.parse().context("invalid L2 Web3 URL")?;
                let client =
                    build_http_client(&url, rpc_timeout).context("failed building L2 client")?;
                Some(Arc::new(client) as Arc<dyn L2GasEstimator>)
            }
            None => None,
        };

        let signer = PrivateKeySigner::new(wallet.private_key().clone());
        let orchestrator = DeploymentOrchestrator::from_config(
            &config,
            Arc::new(l1_client),
            l2_client,
            Arc::new(signer),
            NonceSequencer::new(deployer),
        )
        .await?;

        let (stop_sender, stop_receiver) = watch::channel(false);
        ctrlc::set_handler(move || {
            stop_sender.send_replace(true);
        })
        .context("Error setting Ctrl+C handler")?;

        let result = match orchestrator.deploy(&request, stop_receiver).await {
            Ok(result) => result,
            Err(err) => {
                if let Some(tx_hash) = err.pending_tx_hash() {
                    tracing::warn!(
                        "Transaction {tx_hash:?} may still be included; check its receipt before \
                         deploying again"
                    );
                }
                return Err(err).context("deployment failed");
            }
        };
        println!("{}", result.report(&config.deployer.address_key));
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let observability_config =
        ObservabilityConfig::from_env().context("ObservabilityConfig::from_env()")?;
    let _observability_guard = observability_config.install()?;

    let config = DeploymentConfig::from_env().context("DeploymentConfig::from_env()")?;
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed initializing Tokio runtime")?
        .block_on(cli.run(config))
}
