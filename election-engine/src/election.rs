//! Election configuration model
//!
//! The configuration is written once by an administrator and stored verbatim
//! under [`INIT_KEY`]. Every reader re-parses the stored bytes; nothing parsed
//! from the ledger is cached between invocations.
//!
//! # Payload
//!
//! ```json
//! {
//!   "startDate": 1700000000,
//!   "endDate": 1700600000,
//!   "voterCount": 10,
//!   "endCondition": { "type": "VoterPercentile", "percentage": 50 }
//! }
//! ```
//!
//! Numeric fields may be JSON integers or strings holding a base-10 integer.
//! Unknown fields are ignored.

use crate::{Error, Result};
use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::Deserialize;
use std::fmt;
use vote_ledger::prefix_range_end;

/// Reserved ledger key of the election configuration
pub const INIT_KEY: &str = "init";

/// Prefix shared by every vote record key
pub const VOTE_KEY_PREFIX: &str = "vote_";

/// Ledger key of the vote record cast by `caller_id`
pub fn vote_key(caller_id: &str) -> String {
    format!("{}{}", VOTE_KEY_PREFIX, caller_id)
}

/// `[start, end)` key range holding exactly the vote records
pub fn vote_key_range() -> (String, String) {
    let end = prefix_range_end(VOTE_KEY_PREFIX).unwrap_or_else(|| char::MAX.to_string());
    (VOTE_KEY_PREFIX.to_string(), end)
}

/// Rule that can close the election before its end date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum EndCondition {
    /// Closes only when the end date passes
    #[serde(alias = "TimeOnlyCondition")]
    TimeOnly,

    /// Closes once `votes / voterCount` reaches the percentage
    #[serde(alias = "VoterPercentileCondition")]
    VoterPercentile {
        /// Threshold in percent (0..=100)
        #[serde(deserialize_with = "percentage")]
        percentage: u8,
    },

    /// Closes once a single ballot payload's share of `voterCount` reaches the percentage
    #[serde(alias = "CandidatePercentileCondition")]
    CandidatePercentile {
        /// Threshold in percent (0..=100)
        #[serde(deserialize_with = "percentage")]
        percentage: u8,
    },
}

impl fmt::Display for EndCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndCondition::TimeOnly => write!(f, "TimeOnly"),
            EndCondition::VoterPercentile { percentage } => {
                write!(f, "VoterPercentile({}%)", percentage)
            }
            EndCondition::CandidatePercentile { percentage } => {
                write!(f, "CandidatePercentile({}%)", percentage)
            }
        }
    }
}

/// Parsed election configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionConfig {
    /// Opening time (Unix seconds)
    #[serde(deserialize_with = "integer")]
    pub start_date: i64,

    /// Closing time (Unix seconds); the election is closed once `now > end_date`
    #[serde(deserialize_with = "integer")]
    pub end_date: i64,

    /// Eligible voters, the percentile denominator
    #[serde(deserialize_with = "positive_count")]
    pub voter_count: u64,

    /// Early-closing rule
    pub end_condition: EndCondition,
}

impl ElectionConfig {
    /// Parse and validate a raw configuration payload
    pub fn parse(raw: &[u8]) -> Result<Self> {
        serde_json::from_slice(raw)
            .map_err(|e| Error::Validation(format!("Json couldn't be parsed: {}", e)))
    }
}

/// Base-10 integer given either as a JSON integer or a numeric string
struct IntegerVisitor;

impl<'de> Visitor<'de> for IntegerVisitor {
    type Value = i64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer or a string holding a base-10 integer")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<i64, E> {
        Ok(value)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<i64, E> {
        i64::try_from(value).map_err(|_| E::invalid_value(Unexpected::Unsigned(value), &self))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<i64, E> {
        value
            .parse()
            .map_err(|_| E::invalid_value(Unexpected::Str(value), &self))
    }
}

fn integer<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
    deserializer.deserialize_any(IntegerVisitor)
}

fn positive_count<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let count = integer(deserializer)?;
    u64::try_from(count)
        .ok()
        .filter(|count| *count > 0)
        .ok_or_else(|| de::Error::custom(format!("voterCount must be positive, got {}", count)))
}

fn percentage<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u8, D::Error> {
    let percentage = integer(deserializer)?;
    u8::try_from(percentage)
        .ok()
        .filter(|p| *p <= 100)
        .ok_or_else(|| {
            de::Error::custom(format!(
                "percentage must be within 0..=100, got {}",
                percentage
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<ElectionConfig> {
        ElectionConfig::parse(json.as_bytes())
    }

    #[test]
    fn test_parse_time_only() {
        let config = parse(
            r#"{"startDate":100,"endDate":200,"voterCount":3,"endCondition":{"type":"TimeOnly"}}"#,
        )
        .unwrap();

        assert_eq!(
            config,
            ElectionConfig {
                start_date: 100,
                end_date: 200,
                voter_count: 3,
                end_condition: EndCondition::TimeOnly,
            }
        );
    }

    #[test]
    fn test_parse_percentile_variants() {
        let voter = parse(
            r#"{"startDate":1,"endDate":2,"voterCount":10,
                "endCondition":{"type":"VoterPercentile","percentage":50}}"#,
        )
        .unwrap();
        assert_eq!(
            voter.end_condition,
            EndCondition::VoterPercentile { percentage: 50 }
        );

        let candidate = parse(
            r#"{"startDate":1,"endDate":2,"voterCount":5,
                "endCondition":{"type":"CandidatePercentile","percentage":"60"}}"#,
        )
        .unwrap();
        assert_eq!(
            candidate.end_condition,
            EndCondition::CandidatePercentile { percentage: 60 }
        );
    }

    #[test]
    fn test_parse_accepts_legacy_condition_tags() {
        let config = parse(
            r#"{"startDate":1,"endDate":2,"voterCount":5,
                "endCondition":{"type":"VoterPercentileCondition","percentage":20}}"#,
        )
        .unwrap();
        assert_eq!(
            config.end_condition,
            EndCondition::VoterPercentile { percentage: 20 }
        );

        let config = parse(
            r#"{"startDate":1,"endDate":2,"voterCount":5,"endCondition":{"type":"TimeOnlyCondition"}}"#,
        )
        .unwrap();
        assert_eq!(config.end_condition, EndCondition::TimeOnly);
    }

    #[test]
    fn test_parse_numeric_strings() {
        let config = parse(
            r#"{"startDate":"-5","endDate":"1700000000","voterCount":"7","endCondition":{"type":"TimeOnly"}}"#,
        )
        .unwrap();

        assert_eq!(config.start_date, -5);
        assert_eq!(config.end_date, 1_700_000_000);
        assert_eq!(config.voter_count, 7);
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        for json in [
            r#"{"endDate":2,"voterCount":1,"endCondition":{"type":"TimeOnly"}}"#,
            r#"{"startDate":1,"voterCount":1,"endCondition":{"type":"TimeOnly"}}"#,
            r#"{"startDate":1,"endDate":2,"endCondition":{"type":"TimeOnly"}}"#,
            r#"{"startDate":1,"endDate":2,"voterCount":1}"#,
            r#"{"startDate":1,"endDate":2,"voterCount":1,"endCondition":{}}"#,
        ] {
            let err = parse(json).unwrap_err();
            assert!(
                err.to_string().contains("missing field"),
                "{} -> {}",
                json,
                err
            );
        }
    }

    #[test]
    fn test_parse_rejects_percentile_without_percentage() {
        let err = parse(
            r#"{"startDate":1,"endDate":2,"voterCount":1,"endCondition":{"type":"CandidatePercentile"}}"#,
        )
        .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("missing field `percentage`"));
    }

    #[test]
    fn test_parse_rejects_bad_numbers() {
        for json in [
            r#"{"startDate":"soon","endDate":2,"voterCount":1,"endCondition":{"type":"TimeOnly"}}"#,
            r#"{"startDate":1.5,"endDate":2,"voterCount":1,"endCondition":{"type":"TimeOnly"}}"#,
            r#"{"startDate":1,"endDate":true,"voterCount":1,"endCondition":{"type":"TimeOnly"}}"#,
            r#"{"startDate":1,"endDate":2,"voterCount":0,"endCondition":{"type":"TimeOnly"}}"#,
            r#"{"startDate":1,"endDate":2,"voterCount":-3,"endCondition":{"type":"TimeOnly"}}"#,
            r#"{"startDate":1,"endDate":2,"voterCount":1,"endCondition":{"type":"VoterPercentile","percentage":101}}"#,
            r#"{"startDate":1,"endDate":2,"voterCount":1,"endCondition":{"type":"VoterPercentile","percentage":-1}}"#,
            r#"{"startDate":1,"endDate":2,"voterCount":1,"endCondition":{"type":"VoterPercentile","percentage":"half"}}"#,
        ] {
            assert!(
                matches!(parse(json), Err(Error::Validation(_))),
                "accepted {}",
                json
            );
        }
    }

    #[test]
    fn test_parse_rejects_unknown_condition() {
        let err = parse(
            r#"{"startDate":1,"endDate":2,"voterCount":1,"endCondition":{"type":"Quorum"}}"#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("unknown variant `Quorum`"));
    }

    #[test]
    fn test_parse_error_names_the_bad_value() {
        let err = parse(
            r#"{"startDate":1,"endDate":2,"voterCount":"0","endCondition":{"type":"TimeOnly"}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("voterCount must be positive, got 0"));

        let err = parse(r#"{"startDate":"soon","endDate":2}"#).unwrap_err();
        assert!(err.to_string().contains("invalid value: string \"soon\""));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(matches!(parse("[]"), Err(Error::Validation(_))));
        assert!(matches!(parse("not json"), Err(Error::Validation(_))));
        assert!(matches!(
            parse(r#"{"startDate":1,"endDate":2,"voterCount":1,"endCondition":"TimeOnly"}"#),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_start_after_end_is_accepted() {
        let config = parse(
            r#"{"startDate":500,"endDate":100,"voterCount":1,"endCondition":{"type":"TimeOnly"}}"#,
        )
        .unwrap();
        assert!(config.start_date > config.end_date);
    }

    #[test]
    fn test_vote_key() {
        assert_eq!(vote_key("x509::alice"), "vote_x509::alice");
        assert!(vote_key("anyone").starts_with(VOTE_KEY_PREFIX));
        assert!(!INIT_KEY.starts_with(VOTE_KEY_PREFIX));
    }

    #[test]
    fn test_vote_key_range() {
        let (start, end) = vote_key_range();
        assert_eq!(start, "vote_");
        assert_eq!(end, "vote`");
        assert!(INIT_KEY < start.as_str());
    }
}
