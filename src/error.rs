//! Error taxonomy for the scheduling core.
//!
//! These are the only failures the scheduler knows how to recover from. Everything
//! around the core (configuration, lock file, signals) uses `anyhow` instead.

use chrono::NaiveDate;
use std::fmt;

/// Failures raised by the location resolver and the solar time provider.
#[derive(Debug, Clone, PartialEq)]
pub enum PhaseError {
    /// Transport failure or non-success response from an external provider.
    Network {
        /// Which collaborator failed ("resolver" or "solar provider").
        provider: &'static str,
        /// Description of the failure.
        message: String,
    },
    /// The resolver returned no usable candidate for the query.
    LocationNotFound {
        /// The free-text query as entered by the user.
        query: String,
    },
    /// The provider returned no data, or data violating the solar ordering.
    NoSolarData {
        /// The calendar date that was requested.
        date: NaiveDate,
        /// What was missing or malformed.
        reason: String,
    },
}

impl PhaseError {
    /// Whether retrying the same request later might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

impl fmt::Display for PhaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network { provider, message } => {
                write!(f, "network error from {provider}: {message}")
            }
            Self::LocationNotFound { query } => {
                write!(f, "could not find city \"{query}\"")
            }
            Self::NoSolarData { date, reason } => {
                write!(f, "no solar data for {date}: {reason}")
            }
        }
    }
}

impl std::error::Error for PhaseError {}
