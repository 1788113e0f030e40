//! Vote admission

use crate::election::vote_key;
use crate::engine::{single_arg, ElectionEngine};
use crate::identity::Identity;
use crate::status::{evaluate_ledger, Phase};
use crate::{Error, Result};
use tracing::info;
use vote_ledger::LedgerStore;

impl<L: LedgerStore> ElectionEngine<L> {
    /// Record the caller's ballot
    ///
    /// Checks run in a fixed order and the first failure wins: the election
    /// must be open, the caller must not be an admin, exactly one argument is
    /// required, the caller must resolve to an id and must not have voted yet.
    /// The ballot is stored verbatim under the caller's vote key.
    pub fn submit_vote(&self, identity: &dyn Identity, args: &[String]) -> Result<()> {
        let status = evaluate_ledger(&self.ledger, self.now())?;
        if status.phase() != Phase::Open {
            return Err(Error::ElectionNotRunning);
        }

        if self.is_admin(identity)? {
            return Err(Error::Unauthorized("User is admin".to_string()));
        }

        let ballot = single_arg(args)?;
        let caller_id = identity.caller_id()?;
        let key = vote_key(&caller_id);

        if self.ledger.get(&key)?.is_some() {
            return Err(Error::AlreadyVoted);
        }

        self.ledger.put(&key, ballot.as_bytes())?;

        info!(caller = %caller_id, "Vote recorded");
        Ok(())
    }
}
