//! Election Engine
//!
//! Election state machine on top of a replicated, ordered key-value ledger.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │            Signed invocation (JSON / bincode)        │
//! └────────────────────┬────────────────────────────────┘
//!                      │ verify signature, resolve caller
//!                      ↓
//! ┌─────────────────────────────────────────────────────┐
//! │              ElectionApp                             │
//! │  CheckTx → DeliverTx → metrics                      │
//! └────────────────────┬────────────────────────────────┘
//!                      │ operation name + args
//!                      ↓
//! ┌─────────────────────────────────────────────────────┐
//! │              ElectionEngine                          │
//! │  initialize | submit_vote | queries | destroy        │
//! └────────────────────┬────────────────────────────────┘
//!                      │ get / put / scan_range
//!                      ↓
//! ┌─────────────────────────────────────────────────────┐
//! │              vote-ledger (memory | RocksDB)          │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Operations
//!
//! - **initializationInvokation**: store the election configuration (admin only, once)
//! - **voteInvokation**: record one ballot per caller while the election is open
//! - **allVotesQuery**, **ownVoteQuery**: read ballots
//! - **electionStatusQuery**, **electionPhaseQuery**: derive the phase
//! - **electionDataQuery**, **initStatusQuery**: read the configuration
//! - **destructionInvokation**: admin reset trigger
//!
//! # Determinism
//!
//! - The phase is derived on every call, never stored
//! - Percentages use exact integer arithmetic
//! - The only time input is the engine's [`Clock`]

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod admission;
pub mod app;
pub mod clock;
pub mod config;
pub mod crypto;
pub mod election;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod identity;
pub mod metrics;
pub mod queries;
pub mod router;
pub mod status;

// Re-exports
pub use app::ElectionApp;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, EngineSettings, InitStatusFallback};
pub use election::{ElectionConfig, EndCondition};
pub use engine::ElectionEngine;
pub use envelope::SignedInvocation;
pub use error::{Error, ErrorClass, Result};
pub use identity::{Identity, IdentityRegistry, StaticIdentity};
pub use router::{InvocationResponse, Operation};
pub use status::{ElectionStatus, Phase};
