//! Operation routing
//!
//! Maps an operation name and its string arguments onto an engine handler and
//! folds the outcome into an [`InvocationResponse`]. Names are matched exactly,
//! case included.

use crate::engine::ElectionEngine;
use crate::identity::Identity;
use crate::{Error, Result};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};
use vote_ledger::LedgerStore;

/// Response code of a successful invocation
pub const CODE_OK: u32 = 0;

/// Invocable operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Store the election configuration
    Initialize,
    /// Record a ballot
    Vote,
    /// List every ballot
    AllVotes,
    /// `running` / `ended`
    ElectionStatus,
    /// `notStarted` / `open` / `closed`
    ElectionPhase,
    /// Caller's own ballot
    OwnVote,
    /// Stored configuration
    ElectionData,
    /// Whether a configuration is stored
    InitStatus,
    /// Admin reset trigger
    Destroy,
}

impl Operation {
    /// Every operation, in routing table order
    pub const ALL: [Operation; 9] = [
        Operation::Initialize,
        Operation::Vote,
        Operation::AllVotes,
        Operation::ElectionStatus,
        Operation::ElectionPhase,
        Operation::OwnVote,
        Operation::ElectionData,
        Operation::InitStatus,
        Operation::Destroy,
    ];

    /// Wire name
    pub fn name(self) -> &'static str {
        match self {
            Operation::Initialize => "initializationInvokation",
            Operation::Vote => "voteInvokation",
            Operation::AllVotes => "allVotesQuery",
            Operation::ElectionStatus => "electionStatusQuery",
            Operation::ElectionPhase => "electionPhaseQuery",
            Operation::OwnVote => "ownVoteQuery",
            Operation::ElectionData => "electionDataQuery",
            Operation::InitStatus => "initStatusQuery",
            Operation::Destroy => "destructionInvokation",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        Operation::ALL
            .into_iter()
            .find(|op| op.name() == name)
            .ok_or(Error::InvalidOperation)
    }
}

/// Outcome of one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResponse {
    /// [`CODE_OK`] or the failing error's class code
    pub code: u32,
    /// Operation payload, empty on failure
    pub payload: Vec<u8>,
    /// Error message, empty on success
    pub log: String,
}

impl InvocationResponse {
    /// Successful response
    pub fn ok(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            code: CODE_OK,
            payload: payload.into(),
            log: String::new(),
        }
    }

    /// Failed response for `err`
    pub fn error(err: &Error) -> Self {
        Self {
            code: err.code(),
            payload: Vec::new(),
            log: err.to_string(),
        }
    }

    /// Whether the invocation succeeded
    pub fn is_ok(&self) -> bool {
        self.code == CODE_OK
    }

    /// Payload as text
    pub fn payload_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

impl<L: LedgerStore> ElectionEngine<L> {
    /// Route an invocation by name
    pub fn invoke(
        &self,
        identity: &dyn Identity,
        operation: &str,
        args: &[String],
    ) -> InvocationResponse {
        let result = operation
            .parse::<Operation>()
            .and_then(|op| self.execute(op, identity, args));

        match result {
            Ok(payload) => {
                debug!(operation, bytes = payload.len(), "Invocation succeeded");
                InvocationResponse::ok(payload)
            }
            Err(e) => {
                info!(
                    operation,
                    class = e.class().as_str(),
                    error = %e,
                    "Invocation rejected"
                );
                InvocationResponse::error(&e)
            }
        }
    }

    /// Run a parsed operation and return its payload
    pub fn execute(
        &self,
        operation: Operation,
        identity: &dyn Identity,
        args: &[String],
    ) -> Result<Vec<u8>> {
        match operation {
            Operation::Initialize => self.initialize(identity, args).map(|()| Vec::new()),
            Operation::Vote => self.submit_vote(identity, args).map(|()| Vec::new()),
            Operation::AllVotes => self.all_votes_json(),
            Operation::ElectionStatus => Ok(self.election_phase()?.status_label().into()),
            Operation::ElectionPhase => Ok(self.election_phase()?.as_str().into()),
            Operation::OwnVote => self.own_vote(identity),
            Operation::ElectionData => self.election_data(),
            Operation::InitStatus => Ok(self.init_status()?.to_string().into_bytes()),
            Operation::Destroy => self.destroy(identity).map(|()| Vec::new()),
        }
    }
}
