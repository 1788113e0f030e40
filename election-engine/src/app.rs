//! Election application
//!
//! Front door for signed invocations. Mirrors the check/deliver split of a
//! replicated state machine: `check_tx` validates an envelope without touching
//! the ledger, `deliver_tx` verifies it, resolves the caller and runs it
//! against the engine.

use crate::envelope::SignedInvocation;
use crate::identity::IdentityRegistry;
use crate::metrics::{Metrics, OUTCOME_OK};
use crate::router::{InvocationResponse, Operation};
use crate::{ElectionEngine, Error, Result};
use std::time::Instant;
use tracing::{info, warn};
use vote_ledger::LedgerStore;

/// Metrics label for names the router does not know
const UNKNOWN_OPERATION: &str = "unknown";

/// Election application over a ledger `L`
#[derive(Debug)]
pub struct ElectionApp<L> {
    engine: ElectionEngine<L>,
    registry: IdentityRegistry,
    metrics: Metrics,
}

impl<L: LedgerStore> ElectionApp<L> {
    /// Create new application
    pub fn new(engine: ElectionEngine<L>, registry: IdentityRegistry) -> Result<Self> {
        let metrics = Metrics::new()
            .map_err(|e| Error::Config(format!("Failed to create metrics: {}", e)))?;

        Ok(Self {
            engine,
            registry,
            metrics,
        })
    }

    /// Engine
    pub fn engine(&self) -> &ElectionEngine<L> {
        &self.engine
    }

    /// Metrics
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// CheckTx - validate an encoded envelope before it is scheduled
    ///
    /// On success the payload is the hex transaction hash.
    pub fn check_tx(&self, tx: &[u8]) -> InvocationResponse {
        let checked = SignedInvocation::from_bytes(tx).and_then(|tx| {
            tx.verify()?;
            tx.operation.parse::<Operation>()?;
            tx.hash()
        });

        match checked {
            Ok(hash) => InvocationResponse::ok(hex::encode(hash)),
            Err(e) => {
                warn!(error = %e, "CheckTx rejected");
                InvocationResponse::error(&e)
            }
        }
    }

    /// DeliverTx - execute an encoded envelope
    pub fn deliver_tx(&self, tx: &[u8]) -> InvocationResponse {
        match SignedInvocation::from_bytes(tx) {
            Ok(tx) => self.deliver(&tx),
            Err(e) => {
                warn!(error = %e, "Failed to decode transaction");
                InvocationResponse::error(&e)
            }
        }
    }

    /// Execute a decoded envelope
    pub fn deliver(&self, tx: &SignedInvocation) -> InvocationResponse {
        let started = Instant::now();
        let operation = tx.operation.parse::<Operation>().ok();
        let result = self.execute(tx);

        let label = operation.map_or(UNKNOWN_OPERATION, Operation::name);
        let elapsed = started.elapsed().as_secs_f64();

        match result {
            Ok(payload) => {
                self.metrics.record_invocation(label, OUTCOME_OK, elapsed);
                if operation == Some(Operation::Vote) {
                    self.metrics.record_vote();
                }

                info!(tx_id = %tx.tx_id, operation = label, "DeliverTx success");
                InvocationResponse::ok(payload)
            }
            Err(e) => {
                self.metrics.record_invocation(label, e.class().as_str(), elapsed);

                info!(
                    tx_id = %tx.tx_id,
                    operation = label,
                    class = e.class().as_str(),
                    error = %e,
                    "DeliverTx rejected"
                );
                InvocationResponse::error(&e)
            }
        }
    }

    fn execute(&self, tx: &SignedInvocation) -> Result<Vec<u8>> {
        let public_key = tx.verify()?;
        let identity = self.registry.resolve(public_key);
        let operation: Operation = tx.operation.parse()?;

        self.engine.execute(operation, &identity, &tx.args)
    }
}
