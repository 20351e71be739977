use std::time::Duration;

use vise::{Buckets, Counter, Family, Gauge, Histogram, Metrics};

use crate::{errors::DeploymentErrorKind, orchestrator::DeploymentStep};

#[derive(Debug, Metrics)]
#[metrics(prefix = "l2_deployer")]
pub(crate) struct DeployerMetrics {
    /// Latency of individual deployment steps.
    #[metrics(buckets = Buckets::LATENCIES)]
    pub step_latency: Family<DeploymentStep, Histogram<Duration>>,
    /// Number of failed deployments grouped by the error kind.
    pub failures: Family<DeploymentErrorKind, Counter>,
    /// L2 gas limit attached to the latest priority transaction.
    pub l2_gas_limit: Gauge<u64>,
    /// Transient errors encountered while polling transaction receipts.
    pub receipt_poll_errors: Counter,
}

#[vise::register]
pub(crate) static METRICS: vise::Global<DeployerMetrics> = vise::Global::new();
