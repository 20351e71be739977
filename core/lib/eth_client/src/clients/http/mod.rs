use std::time::Duration;

use jsonrpsee::{core::ClientError, http_client::HttpClientBuilder};
use url::Url;
use vise::{Buckets, EncodeLabelSet, EncodeLabelValue, Family, Histogram, Metrics};

pub use jsonrpsee::http_client::HttpClient;

mod decl;
mod query;

/// Builds a JSON-RPC client for the provided node URL. The same client type serves both L1 and L2
/// nodes: the implemented namespaces are selected by the trait used.
pub fn build_http_client(url: &Url, request_timeout: Duration) -> Result<HttpClient, ClientError> {
    tracing::debug!("Creating JSON-RPC client for {}", url.host_str().unwrap_or("<unknown host>"));
    HttpClientBuilder::default()
        .request_timeout(request_timeout)
        .build(url.as_str())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EncodeLabelValue, EncodeLabelSet)]
#[metrics(label = "method", rename_all = "snake_case")]
enum Method {
    ChainId,
    NonceAtForAccount,
    PendingBlockBaseFee,
    CallContractFunction,
    SendRawTx,
    TxReceipt,
    EstimateGasL1ToL2,
}

#[derive(Debug, Metrics)]
#[metrics(prefix = "eth_client")]
struct ClientLatencies {
    /// Latency of interacting with the Ethereum client.
    #[metrics(buckets = Buckets::LATENCIES)]
    direct: Family<Method, Histogram<Duration>>,
}

#[vise::register]
static LATENCIES: vise::Global<ClientLatencies> = vise::Global::new();
