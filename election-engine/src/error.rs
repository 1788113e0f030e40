//! Error types for the election engine
//!
//! Every variant belongs to one [`ErrorClass`]; the class decides the response
//! code an invocation fails with.

use thiserror::Error;

/// Result type for election operations
pub type Result<T> = std::result::Result<T, Error>;

/// Election errors
#[derive(Error, Debug)]
pub enum Error {
    /// Caller lacks a required attribute, or carries a forbidden one
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Malformed payload, missing field or unparseable number
    #[error("Invalid payload: {0}")]
    Validation(String),

    /// Wrong number of invocation arguments
    #[error("Incorrect number of arguments: expected {expected}, got {actual}")]
    Arity {
        /// Arguments the operation takes
        expected: usize,
        /// Arguments supplied
        actual: usize,
    },

    /// Operation name not recognized by the router
    #[error("Invalid operation")]
    InvalidOperation,

    /// Election configuration already present
    #[error("Election already initialized")]
    AlreadyInitialized,

    /// No election configuration present
    #[error("Election not initialized")]
    NotInitialized,

    /// Caller already has a vote record
    #[error("User already voted once")]
    AlreadyVoted,

    /// Election is not in its open phase
    #[error("Election isn't running")]
    ElectionNotRunning,

    /// Status could not be derived from the ledger
    #[error("Election status evaluation failed: {0}")]
    Evaluation(#[source] Box<Error>),

    /// Caller identity could not be resolved
    #[error("Identity error: {0}")]
    Identity(String),

    /// Ledger error
    #[error("Ledger error: {0}")]
    Ledger(#[from] vote_ledger::Error),

    /// Envelope decoding or signature failure
    #[error("Invalid envelope: {0}")]
    Envelope(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error taxonomy exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Caller lacks or has a required attribute
    Authorization,
    /// Malformed input
    Validation,
    /// Operation invalid for the current lifecycle state
    State,
    /// Ledger, identity or evaluation failure
    Collaborator,
}

impl ErrorClass {
    /// Response code carried by a failed invocation
    pub fn code(self) -> u32 {
        match self {
            ErrorClass::Authorization => 1,
            ErrorClass::Validation => 2,
            ErrorClass::State => 3,
            ErrorClass::Collaborator => 4,
        }
    }

    /// Stable label for logs and metrics
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorClass::Authorization => "authorization",
            ErrorClass::Validation => "validation",
            ErrorClass::State => "state",
            ErrorClass::Collaborator => "collaborator",
        }
    }
}

impl Error {
    /// Taxonomy class of this error
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::Unauthorized(_) => ErrorClass::Authorization,
            Error::Validation(_)
            | Error::Arity { .. }
            | Error::InvalidOperation
            | Error::Envelope(_) => ErrorClass::Validation,
            Error::AlreadyInitialized
            | Error::NotInitialized
            | Error::AlreadyVoted
            | Error::ElectionNotRunning => ErrorClass::State,
            Error::Evaluation(_)
            | Error::Identity(_)
            | Error::Ledger(_)
            | Error::Serialization(_)
            | Error::Config(_)
            | Error::Io(_) => ErrorClass::Collaborator,
        }
    }

    /// Response code for this error
    pub fn code(&self) -> u32 {
        self.class().code()
    }

    pub(crate) fn evaluation(cause: Error) -> Self {
        Error::Evaluation(Box::new(cause))
    }
}
