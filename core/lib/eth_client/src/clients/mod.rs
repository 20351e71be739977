//! Various Ethereum client implementations.

mod http;
mod mock;

pub use self::{
    http::{build_http_client, HttpClient},
    mock::{MockEthereum, MockSendFailure, MockTx},
};
