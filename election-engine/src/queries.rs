//! Read-only invocations
//!
//! None of these write to the ledger. Extra arguments are ignored.

use crate::config::InitStatusFallback;
use crate::election::{vote_key, vote_key_range, INIT_KEY};
use crate::engine::ElectionEngine;
use crate::identity::Identity;
use crate::status::{evaluate_ledger, Phase};
use crate::{Error, Result};
use tracing::warn;
use vote_ledger::LedgerStore;

impl<L: LedgerStore> ElectionEngine<L> {
    /// Every stored ballot, in vote key order
    pub fn all_votes(&self) -> Result<Vec<String>> {
        let (start, end) = vote_key_range();

        self.ledger
            .scan_range(&start, &end)?
            .map(|entry| {
                let entry = entry?;
                Ok(String::from_utf8_lossy(&entry.value).into_owned())
            })
            .collect()
    }

    /// `allVotesQuery` payload: the ballots as a JSON array of strings
    pub fn all_votes_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.all_votes()?).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Current phase
    pub fn election_phase(&self) -> Result<Phase> {
        Ok(evaluate_ledger(&self.ledger, self.now())?.phase())
    }

    /// The caller's ballot, empty if they have not voted
    pub fn own_vote(&self, identity: &dyn Identity) -> Result<Vec<u8>> {
        let caller_id = identity.caller_id()?;
        Ok(self.ledger.get(&vote_key(&caller_id))?.unwrap_or_default())
    }

    /// Stored configuration bytes
    pub fn election_data(&self) -> Result<Vec<u8>> {
        self.ledger.get(INIT_KEY)?.ok_or(Error::NotInitialized)
    }

    /// Whether a configuration has been stored
    ///
    /// With [`InitStatusFallback::ReportInitialized`] a failed ledger read
    /// answers `true`, which keeps a broken ledger from being initialized again.
    pub fn init_status(&self) -> Result<bool> {
        match self.ledger.get(INIT_KEY) {
            Ok(value) => Ok(value.is_some()),
            Err(e) => match self.settings.init_status_on_read_error {
                InitStatusFallback::ReportInitialized => {
                    warn!(error = %e, "Ledger read failed, reporting election as initialized");
                    Ok(true)
                }
                InitStatusFallback::Propagate => Err(e.into()),
            },
        }
    }
}
