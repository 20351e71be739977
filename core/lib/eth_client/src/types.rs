use std::{
    collections::HashMap,
    fmt,
    future::Future,
    mem,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use jsonrpsee::{core::ClientError, types::error::ErrorCode};
use pin_project_lite::pin_project;
use serde::{Deserialize, Serialize};
use zksync_types::{
    web3::{self, types::TransactionReceipt},
    Address, H256, U256,
};

/// Raw transaction bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTransactionBytes(pub(crate) Vec<u8>);

impl RawTransactionBytes {
    /// Converts raw transaction bytes. It is caller's responsibility to ensure that these bytes
    /// were actually obtained by signing a transaction.
    pub fn new_unchecked(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for RawTransactionBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// State of the executed Ethereum transaction.
#[derive(Debug, Clone)]
pub struct ExecutedTxStatus {
    /// The hash of the executed L1 transaction.
    pub tx_hash: H256,
    /// Whether transaction was executed successfully or failed.
    pub success: bool,
    /// Receipt for a transaction.
    pub receipt: TransactionReceipt,
}

/// ZKsync-specific metadata of an L2 call request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eip712Meta {
    pub gas_per_pubdata: U256,
    #[serde(default)]
    pub factory_deps: Vec<Vec<u8>>,
}

/// Request for `zks_estimateGasL1ToL2`: the L2 call that an L1->L2 transaction will perform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L1ToL2EstimateRequest {
    /// L2 sender of the transaction, i.e. the (possibly aliased) L1 sender.
    pub from: Address,
    pub to: Address,
    pub data: web3::types::Bytes,
    pub value: U256,
    pub eip712_meta: Eip712Meta,
}

pub type EnrichedClientResult<T> = Result<T, EnrichedClientError>;

/// Client RPC error with additional details: the method name and arguments of the called method.
#[derive(Debug)]
pub struct EnrichedClientError {
    inner_error: Arc<ClientError>,
    operation: &'static str,
    args: HashMap<&'static str, String>,
}

impl EnrichedClientError {
    pub fn new(inner_error: ClientError, operation: &'static str) -> Self {
        Self {
            inner_error: Arc::new(inner_error),
            operation,
            args: HashMap::new(),
        }
    }

    pub fn custom(message: impl Into<String>, operation: &'static str) -> Self {
        Self::new(ClientError::Custom(message.into()), operation)
    }

    pub fn with_arg(mut self, name: &'static str, value: &dyn fmt::Debug) -> Self {
        self.args.insert(name, format!("{value:?}"));
        self
    }

    /// Whether the error should be considered transient: the request might succeed
    /// if it is repeated.
    pub fn is_retryable(&self) -> bool {
        match self.as_ref() {
            ClientError::Transport(_) | ClientError::RequestTimeout => true,
            ClientError::Call(err) => err.code() == ErrorCode::InternalError.code(),
            _ => false,
        }
    }

    /// Whether the server might have processed the request despite the error, e.g. because
    /// the response timed out or the node failed after receiving the request.
    pub fn has_unknown_outcome(&self) -> bool {
        match self.as_ref() {
            ClientError::RequestTimeout => true,
            ClientError::Call(err) => err.code() == ErrorCode::InternalError.code(),
            _ => false,
        }
    }
}

impl AsRef<ClientError> for EnrichedClientError {
    fn as_ref(&self) -> &ClientError {
        &self.inner_error
    }
}

impl std::error::Error for EnrichedClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner_error.as_ref())
    }
}

impl fmt::Display for EnrichedClientError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct DebugArgs<'a>(&'a HashMap<&'static str, String>);

        impl fmt::Debug for DebugArgs<'_> {
            fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("(")?;
                for (i, (name, value)) in self.0.iter().enumerate() {
                    write!(formatter, "{name}={value}")?;
                    if i + 1 < self.0.len() {
                        formatter.write_str(", ")?;
                    }
                }
                formatter.write_str(")")
            }
        }

        write!(
            formatter,
            "{operation}{args:?} failed: {err}",
            operation = self.operation,
            args = DebugArgs(&self.args),
            err = self.inner_error
        )
    }
}

/// Extension trait allowing to add context to client RPC calls.
pub trait ClientRpcContext: Sized {
    /// Adds basic context information: the name of the invoked RPC method.
    fn rpc_context(self, method: &'static str) -> ClientCallWrapper<Self>;
}

impl<T, F> ClientRpcContext for F
where
    F: Future<Output = Result<T, ClientError>>,
{
    fn rpc_context(self, method: &'static str) -> ClientCallWrapper<Self> {
        ClientCallWrapper {
            inner: self,
            method,
            args: HashMap::new(),
        }
    }
}

pin_project! {
    /// Wrapper for a client call future enriching the returned error with the call context.
    #[derive(Debug)]
    pub struct ClientCallWrapper<F> {
        #[pin]
        inner: F,
        method: &'static str,
        args: HashMap<&'static str, String>,
    }
}

impl<F> ClientCallWrapper<F> {
    /// Adds a tracked argument. The argument value will be output via the `Debug` implementation.
    pub fn with_arg(mut self, name: &'static str, value: &dyn fmt::Debug) -> Self {
        self.args.insert(name, format!("{value:?}"));
        self
    }
}

impl<T, F> Future for ClientCallWrapper<F>
where
    F: Future<Output = Result<T, ClientError>>,
{
    type Output = Result<T, EnrichedClientError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let projection = self.project();
        match projection.inner.poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(value)) => Poll::Ready(Ok(value)),
            Poll::Ready(Err(err)) => Poll::Ready(Err(EnrichedClientError {
                inner_error: Arc::new(err),
                operation: projection.method,
                args: mem::take(projection.args),
            })),
        }
    }
}
