//! Property-based tests for the election engine

use election_engine::election::{vote_key, INIT_KEY};
use election_engine::status::evaluate;
use election_engine::{
    ElectionConfig, ElectionEngine, EndCondition, Error, ManualClock, Phase, StaticIdentity,
};
use proptest::prelude::*;
use std::collections::HashMap;
use vote_ledger::{LedgerStore, MemoryLedger};

fn end_condition_strategy() -> impl Strategy<Value = EndCondition> {
    prop_oneof![
        Just(EndCondition::TimeOnly),
        (0u8..=100).prop_map(|percentage| EndCondition::VoterPercentile { percentage }),
        (0u8..=100).prop_map(|percentage| EndCondition::CandidatePercentile { percentage }),
    ]
}

fn config_strategy() -> impl Strategy<Value = ElectionConfig> {
    (
        -1_000_000i64..1_000_000,
        0i64..1_000_000,
        1u64..10_000,
        end_condition_strategy(),
    )
        .prop_map(|(start_date, length, voter_count, end_condition)| ElectionConfig {
            start_date,
            end_date: start_date + length,
            voter_count,
            end_condition,
        })
}

fn config_json(config: &ElectionConfig) -> String {
    let end_condition = match config.end_condition {
        EndCondition::TimeOnly => serde_json::json!({ "type": "TimeOnly" }),
        EndCondition::VoterPercentile { percentage } => {
            serde_json::json!({ "type": "VoterPercentile", "percentage": percentage })
        }
        EndCondition::CandidatePercentile { percentage } => {
            serde_json::json!({ "type": "CandidatePercentile", "percentage": percentage })
        }
    };

    serde_json::json!({
        "startDate": config.start_date,
        "endDate": config.end_date,
        "voterCount": config.voter_count,
        "endCondition": end_condition,
    })
    .to_string()
}

fn admin() -> StaticIdentity {
    StaticIdentity::new("registrar").with_attribute("admin", "true")
}

fn voter(index: u8) -> StaticIdentity {
    StaticIdentity::new(format!("voter-{}", index))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: a stored configuration parses back to the values it was built from
    #[test]
    fn prop_config_parse_matches_source(config in config_strategy()) {
        let parsed = ElectionConfig::parse(config_json(&config).as_bytes()).unwrap();
        prop_assert_eq!(parsed, config);
    }

    /// Property: once initialized, the configuration never changes
    #[test]
    fn prop_initialize_is_write_once(
        first in config_strategy(),
        second in config_strategy(),
        junk in ".{0,40}",
    ) {
        let engine = ElectionEngine::new(MemoryLedger::new(), ManualClock::at(0));
        let stored = config_json(&first);
        engine.initialize(&admin(), &[stored.clone()]).unwrap();

        for payload in [config_json(&second), junk] {
            let err = engine.initialize(&admin(), &[payload]).unwrap_err();
            prop_assert!(matches!(err, Error::AlreadyInitialized));
        }

        prop_assert_eq!(engine.election_data().unwrap(), stored.into_bytes());
    }

    /// Property: each caller keeps exactly their first ballot
    #[test]
    fn prop_votes_are_write_once(
        attempts in prop::collection::vec((0u8..8, "[A-D]"), 1..40),
    ) {
        let engine = ElectionEngine::new(MemoryLedger::new(), ManualClock::at(50));
        engine
            .initialize(
                &admin(),
                &[r#"{"startDate":0,"endDate":100,"voterCount":8,"endCondition":{"type":"TimeOnly"}}"#.to_string()],
            )
            .unwrap();

        let mut first_ballot: HashMap<u8, String> = HashMap::new();
        for (index, ballot) in &attempts {
            let result = engine.submit_vote(&voter(*index), &[ballot.clone()]);
            if first_ballot.contains_key(index) {
                prop_assert!(matches!(result, Err(Error::AlreadyVoted)));
            } else {
                prop_assert!(result.is_ok());
                first_ballot.insert(*index, ballot.clone());
            }
        }

        for (index, ballot) in &first_ballot {
            prop_assert_eq!(engine.own_vote(&voter(*index)).unwrap(), ballot.clone().into_bytes());
        }
        prop_assert_eq!(engine.all_votes().unwrap().len(), first_ballot.len());
    }

    /// Property: an admin never ends up with a vote record
    #[test]
    fn prop_admin_never_votes(now in 0i64..200, ballot in "[A-Z]{1,3}") {
        let engine = ElectionEngine::new(MemoryLedger::new(), ManualClock::at(now));
        engine
            .initialize(
                &admin(),
                &[r#"{"startDate":50,"endDate":150,"voterCount":3,"endCondition":{"type":"TimeOnly"}}"#.to_string()],
            )
            .unwrap();

        prop_assert!(engine.submit_vote(&admin(), &[ballot]).is_err());
        prop_assert!(engine.ledger().get(&vote_key("registrar")).unwrap().is_none());
    }

    /// Property: past the end date the election is closed whatever the votes
    #[test]
    fn prop_time_ceiling(
        config in config_strategy(),
        overshoot in 1i64..1_000_000,
        ballots in prop::collection::vec("[A-C]", 0..20),
    ) {
        let ledger = MemoryLedger::new();
        for (i, ballot) in ballots.iter().enumerate() {
            ledger.put(&vote_key(&format!("v{}", i)), ballot.as_bytes()).unwrap();
        }

        let status = evaluate(&config, config.end_date + overshoot, &ledger).unwrap();
        prop_assert!(status.ended);
        prop_assert_eq!(status.phase(), Phase::Closed);
    }

    /// Property: adding ballots never reopens a percentile-closed election
    #[test]
    fn prop_percentile_closure_is_monotonic(
        voter_count in 1u64..30,
        condition in end_condition_strategy(),
        ballots in prop::collection::vec("[A-C]", 0..40),
    ) {
        let config = ElectionConfig {
            start_date: 0,
            end_date: 1_000,
            voter_count,
            end_condition: condition,
        };
        let ledger = MemoryLedger::new();
        ledger.put(INIT_KEY, config_json(&config).as_bytes()).unwrap();

        let mut closed = evaluate(&config, 10, &ledger).unwrap().ended;
        for (i, ballot) in ballots.iter().enumerate() {
            ledger.put(&vote_key(&format!("v{}", i)), ballot.as_bytes()).unwrap();

            let now_closed = evaluate(&config, 10, &ledger).unwrap().ended;
            prop_assert!(!closed || now_closed, "election reopened after {} ballots", i + 1);
            closed = now_closed;
        }
    }
}
