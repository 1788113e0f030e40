//! Election status evaluator
//!
//! The phase is never stored. Every caller derives it from the configuration,
//! the supplied time and the vote records currently on the ledger, so all
//! replicas that see the same ledger and time agree on it.
//!
//! # Boundary policy
//!
//! - started: `now >= startDate`
//! - closed by time: `now > endDate` (checked before any percentile rule)
//! - closed by percentile: `floor(count * 100 / voterCount) >= percentage`
//!
//! Percentages use exact integer arithmetic; no floating point is involved.

use crate::election::{vote_key_range, ElectionConfig, EndCondition, INIT_KEY};
use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use vote_ledger::LedgerStore;

/// Lifecycle phase of the election
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Start date not reached yet
    NotStarted,
    /// Accepting votes
    Open,
    /// End date passed or an end condition was met
    Closed,
}

impl Phase {
    /// Binary label of `electionStatusQuery`: not-started elections report as running
    pub fn status_label(self) -> &'static str {
        match self {
            Phase::NotStarted | Phase::Open => "running",
            Phase::Closed => "ended",
        }
    }

    /// Three-way label of `electionPhaseQuery`
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::NotStarted => "notStarted",
            Phase::Open => "open",
            Phase::Closed => "closed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw evaluator output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElectionStatus {
    /// Start date reached
    pub started: bool,
    /// End date passed or end condition met
    pub ended: bool,
}

impl ElectionStatus {
    /// Phase implied by the flags
    pub fn phase(&self) -> Phase {
        if !self.started {
            Phase::NotStarted
        } else if self.ended {
            Phase::Closed
        } else {
            Phase::Open
        }
    }
}

/// `floor(count * 100 / voter_count)` without overflow or rounding drift
pub fn percentage_of(count: u64, voter_count: u64) -> u128 {
    u128::from(count) * 100 / u128::from(voter_count.max(1))
}

/// Evaluate the election at time `now`
///
/// The vote set is only scanned when a percentile condition needs it and the
/// end date has not already closed the election.
pub fn evaluate<L>(config: &ElectionConfig, now: i64, ledger: &L) -> Result<ElectionStatus>
where
    L: LedgerStore + ?Sized,
{
    let started = now >= config.start_date;

    if now > config.end_date {
        return Ok(ElectionStatus {
            started,
            ended: true,
        });
    }

    let ended = match config.end_condition {
        EndCondition::TimeOnly => false,
        EndCondition::VoterPercentile { percentage } => {
            voter_threshold_reached(config.voter_count, percentage, ledger)?
        }
        EndCondition::CandidatePercentile { percentage } => {
            candidate_threshold_reached(config.voter_count, percentage, ledger)?
        }
    };

    Ok(ElectionStatus { started, ended })
}

/// Load the stored configuration and evaluate it
///
/// Any failure, including a missing configuration, is reported as
/// [`Error::Evaluation`] so callers can never mistake it for a phase.
pub fn evaluate_ledger<L>(ledger: &L, now: i64) -> Result<ElectionStatus>
where
    L: LedgerStore + ?Sized,
{
    let status = load_config(ledger)
        .and_then(|config| evaluate(&config, now, ledger))
        .map_err(Error::evaluation)?;

    tracing::debug!(
        now,
        started = status.started,
        ended = status.ended,
        phase = %status.phase(),
        "Election status evaluated"
    );

    Ok(status)
}

/// Read and parse the stored election configuration
pub fn load_config<L>(ledger: &L) -> Result<ElectionConfig>
where
    L: LedgerStore + ?Sized,
{
    let raw = ledger.get(INIT_KEY)?.ok_or(Error::NotInitialized)?;
    ElectionConfig::parse(&raw)
}

fn voter_threshold_reached<L>(voter_count: u64, percentage: u8, ledger: &L) -> Result<bool>
where
    L: LedgerStore + ?Sized,
{
    let (start, end) = vote_key_range();

    let mut votes = 0u64;
    for entry in ledger.scan_range(&start, &end)? {
        entry?;
        votes += 1;
    }

    let actual = percentage_of(votes, voter_count);
    tracing::trace!(votes, voter_count, actual = %actual, needed = percentage, "Voter turnout");

    Ok(actual >= u128::from(percentage))
}

fn candidate_threshold_reached<L>(voter_count: u64, percentage: u8, ledger: &L) -> Result<bool>
where
    L: LedgerStore + ?Sized,
{
    let (start, end) = vote_key_range();
    let needed = u128::from(percentage);

    // Zero votes is still a share of 0%
    if percentage_of(0, voter_count) >= needed {
        return Ok(true);
    }

    let mut tally: HashMap<Vec<u8>, u64> = HashMap::new();
    for entry in ledger.scan_range(&start, &end)? {
        let entry = entry?;
        let count = tally.entry(entry.value).or_insert(0);
        *count += 1;

        if percentage_of(*count, voter_count) >= needed {
            tracing::trace!(
                count = *count,
                voter_count,
                needed = percentage,
                "Candidate threshold reached"
            );
            return Ok(true);
        }
    }

    Ok(false)
}
