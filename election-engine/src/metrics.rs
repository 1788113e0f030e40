//! Metrics collection for observability
//!
//! Prometheus metrics for the election node, kept in a registry owned by the
//! node rather than the process-global one.
//!
//! # Metrics
//!
//! - `election_invocations_total{operation, outcome}` - Invocations by operation and result class
//! - `election_votes_recorded_total` - Ballots written to the ledger
//! - `election_invocation_duration_seconds` - Histogram of invocation latencies

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::fmt;
use std::sync::Arc;

/// Outcome label of a successful invocation
pub const OUTCOME_OK: &str = "ok";

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Invocations by operation and outcome
    pub invocations_total: IntCounterVec,

    /// Ballots recorded
    pub votes_recorded: IntCounter,

    /// Invocation duration histogram
    pub invocation_duration: Histogram,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl fmt::Debug for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metrics")
            .field("votes_recorded", &self.votes_recorded.get())
            .finish_non_exhaustive()
    }
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let invocations_total = IntCounterVec::new(
            Opts::new(
                "election_invocations_total",
                "Invocations by operation and outcome",
            ),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(invocations_total.clone()))?;

        let votes_recorded = IntCounter::new(
            "election_votes_recorded_total",
            "Ballots written to the ledger",
        )?;
        registry.register(Box::new(votes_recorded.clone()))?;

        let invocation_duration = Histogram::with_opts(
            HistogramOpts::new(
                "election_invocation_duration_seconds",
                "Histogram of invocation latencies",
            )
            .buckets(vec![0.0005, 0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 1.0]),
        )?;
        registry.register(Box::new(invocation_duration.clone()))?;

        Ok(Self {
            invocations_total,
            votes_recorded,
            invocation_duration,
            registry,
        })
    }

    /// Record one invocation
    pub fn record_invocation(&self, operation: &str, outcome: &str, duration_seconds: f64) {
        self.invocations_total
            .with_label_values(&[operation, outcome])
            .inc();
        self.invocation_duration.observe(duration_seconds);
    }

    /// Record a stored ballot
    pub fn record_vote(&self) {
        self.votes_recorded.inc();
    }

    /// Invocations seen for `operation` with `outcome`
    pub fn invocation_count(&self, operation: &str, outcome: &str) -> u64 {
        self.invocations_total
            .with_label_values(&[operation, outcome])
            .get()
    }

    /// Render the registry in the Prometheus text format
    pub fn gather_text(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
