//! Error types for configuring and running a population.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SimError>;

/// Parameters rejected before a run starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("round count must be positive")]
    ZeroRounds,

    #[error("states per action must be positive")]
    ZeroStates,

    #[error("states per action must be at most {max}, got {states}")]
    StatesTooLarge { states: u32, max: u32 },

    #[error("population size must be positive")]
    ZeroPopulation,

    #[error("feedback rule is calibrated for {expected} automata, population is {actual}")]
    FeedbackPopulationMismatch { expected: usize, actual: usize },

    #[error("reward probability for M={index} must be finite and in [0, 1], got {value}")]
    InvalidProbability { index: usize, value: f64 },

    #[error("initial state {state} outside [1, {max}]")]
    StateOutOfRange { state: u32, max: u32 },

    #[error("invalid value for {flag}: {value}")]
    Parse { flag: String, value: String },
}

/// Logic defects: the feedback rule was asked about a count it does not cover.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("collective count M={m} outside [0, {population}]")]
    CountOutOfRange { m: usize, population: usize },
}

/// Umbrella error for library entry points.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_values() {
        let e = ConfigError::FeedbackPopulationMismatch {
            expected: 5,
            actual: 7,
        };
        assert_eq!(
            e.to_string(),
            "feedback rule is calibrated for 5 automata, population is 7"
        );

        let e = DomainError::CountOutOfRange { m: 6, population: 5 };
        assert_eq!(e.to_string(), "collective count M=6 outside [0, 5]");
    }

    #[test]
    fn sim_error_wraps_sources() {
        let e: SimError = ConfigError::ZeroRounds.into();
        assert!(matches!(e, SimError::Config(ConfigError::ZeroRounds)));
        assert_eq!(
            e.to_string(),
            "configuration error: round count must be positive"
        );
    }
}
