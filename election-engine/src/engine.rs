//! Election engine
//!
//! Owns the ledger port and the time source, and implements the two
//! admin-gated invocations: initialization and destruction. Vote admission
//! lives in [`crate::admission`], read-only handlers in [`crate::queries`].
//!
//! The engine keeps no state of its own between invocations. Two engines
//! over the same ledger, given the same clock, answer every call identically.

use crate::clock::Clock;
use crate::config::EngineSettings;
use crate::election::{ElectionConfig, INIT_KEY};
use crate::identity::Identity;
use crate::{Error, Result};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};
use vote_ledger::LedgerStore;

/// Election state engine over a ledger `L`
pub struct ElectionEngine<L> {
    pub(crate) ledger: L,
    clock: Arc<dyn Clock>,
    pub(crate) settings: EngineSettings,
}

impl<L> fmt::Debug for ElectionEngine<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElectionEngine")
            .field("now", &self.clock.now())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<L: LedgerStore> ElectionEngine<L> {
    /// Create engine with default settings
    pub fn new(ledger: L, clock: impl Clock + 'static) -> Self {
        Self {
            ledger,
            clock: Arc::new(clock),
            settings: EngineSettings::default(),
        }
    }

    /// Replace the engine settings
    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Underlying ledger
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Engine settings
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Current time according to the engine's clock
    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Whether the caller carries the configured admin attribute
    pub(crate) fn is_admin(&self, identity: &dyn Identity) -> Result<bool> {
        identity.has_attribute(&self.settings.admin_attribute, &self.settings.admin_value)
    }

    fn require_admin(&self, identity: &dyn Identity) -> Result<()> {
        if self.is_admin(identity)? {
            Ok(())
        } else {
            Err(Error::Unauthorized("User isn't admin".to_string()))
        }
    }

    /// Store the election configuration
    ///
    /// Takes exactly one argument, the configuration JSON, which is written
    /// verbatim once it validates. Fails without writing if a configuration
    /// already exists, whatever the new payload looks like.
    pub fn initialize(&self, identity: &dyn Identity, args: &[String]) -> Result<()> {
        self.require_admin(identity)?;
        let raw = single_arg(args)?;

        if self.ledger.get(INIT_KEY)?.is_some() {
            return Err(Error::AlreadyInitialized);
        }

        let config = ElectionConfig::parse(raw.as_bytes())?;
        if config.start_date >= config.end_date {
            warn!(
                start_date = config.start_date,
                end_date = config.end_date,
                "Election start date is not before its end date"
            );
        }

        self.ledger.put(INIT_KEY, raw.as_bytes())?;

        info!(
            start_date = config.start_date,
            end_date = config.end_date,
            voter_count = config.voter_count,
            end_condition = %config.end_condition,
            "Election initialized"
        );

        Ok(())
    }

    /// Admin-gated reset trigger
    ///
    /// Clearing the world state is the ledger platform's job; this only
    /// checks that the caller may ask for it.
    pub fn destroy(&self, identity: &dyn Identity) -> Result<()> {
        self.require_admin(identity)?;
        info!("Election destruction requested");
        Ok(())
    }
}

/// The single argument of a one-argument invocation
pub(crate) fn single_arg(args: &[String]) -> Result<&str> {
    match args {
        [only] => Ok(only.as_str()),
        _ => Err(Error::Arity {
            expected: 1,
            actual: args.len(),
        }),
    }
}
