//! Environment feedback: maps the collective decision count `M` to the
//! probability that each automaton is rewarded this round.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, DomainError};

pub trait Environment: Send + Sync + std::fmt::Debug {
    /// Number of automata this rule is defined for.
    fn population_size(&self) -> usize;

    /// Reward probability when `m` automata report the high action.
    fn reward_probability(&self, m: usize) -> Result<f64, DomainError>;
}

fn check_count(m: usize, population: usize) -> Result<(), DomainError> {
    if m > population {
        return Err(DomainError::CountOutOfRange { m, population });
    }
    Ok(())
}

/// Unimodal rule favouring a 3-of-5 majority.
///
/// `M = 0..=3` yields `0.2 * M`; `M = 4, 5` decays as `0.6 - 0.2 * (M - 3)`.
/// Only defined for five automata; other sizes go through [`TableFeedback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MajorityFeedback;

impl MajorityFeedback {
    pub const POPULATION: usize = 5;

    pub fn new(population_size: usize) -> Result<Self, ConfigError> {
        if population_size != Self::POPULATION {
            return Err(ConfigError::FeedbackPopulationMismatch {
                expected: Self::POPULATION,
                actual: population_size,
            });
        }
        Ok(Self)
    }
}

impl Environment for MajorityFeedback {
    fn population_size(&self) -> usize {
        Self::POPULATION
    }

    fn reward_probability(&self, m: usize) -> Result<f64, DomainError> {
        check_count(m, Self::POPULATION)?;
        // Computed in fifths so 0.6 comes out as the nearest f64, not 0.6000000000000001.
        let fifths = if m <= 3 { m } else { 6 - m };
        Ok(fifths as f64 / 5.0)
    }
}

/// Explicit per-`M` lookup table of length `population_size + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableFeedback {
    probabilities: Vec<f64>,
}

impl TableFeedback {
    pub fn new(population_size: usize, probabilities: Vec<f64>) -> Result<Self, ConfigError> {
        if probabilities.len() != population_size + 1 {
            return Err(ConfigError::FeedbackPopulationMismatch {
                expected: probabilities.len().saturating_sub(1),
                actual: population_size,
            });
        }
        for (index, &value) in probabilities.iter().enumerate() {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { index, value });
            }
        }
        Ok(Self { probabilities })
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }
}

impl Environment for TableFeedback {
    fn population_size(&self) -> usize {
        self.probabilities.len() - 1
    }

    fn reward_probability(&self, m: usize) -> Result<f64, DomainError> {
        check_count(m, self.population_size())?;
        Ok(self.probabilities[m])
    }
}

/// Configurable choice of feedback rule.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FeedbackRule {
    #[default]
    Majority,
    Table(Vec<f64>),
}

impl FeedbackRule {
    /// Build the rule for a population, rejecting sizes it is not defined for.
    pub fn build(&self, population_size: usize) -> Result<Box<dyn Environment>, ConfigError> {
        match self {
            FeedbackRule::Majority => Ok(Box::new(MajorityFeedback::new(population_size)?)),
            FeedbackRule::Table(p) => Ok(Box::new(TableFeedback::new(population_size, p.clone())?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn majority_values() {
        let env = MajorityFeedback::new(5).unwrap();
        let expected = [0.0, 0.2, 0.4, 0.6, 0.4, 0.2];
        for (m, want) in expected.iter().enumerate() {
            let got = env.reward_probability(m).unwrap();
            assert!(approx(got, *want), "m={m} got={got}");
        }
        assert_eq!(env.reward_probability(3).unwrap(), 0.6);
    }

    #[test]
    fn majority_peaks_at_three() {
        let env = MajorityFeedback::new(5).unwrap();
        let p: Vec<f64> = (0..=5).map(|m| env.reward_probability(m).unwrap()).collect();
        let peak = p.iter().cloned().fold(f64::MIN, f64::max);
        assert_eq!(peak, p[3]);
        // Rising up to the peak, falling after it.
        assert!(p[..=3].windows(2).all(|w| w[0] < w[1]));
        assert!(p[3..].windows(2).all(|w| w[0] > w[1]));
        assert!(p.iter().all(|x| (0.0..=1.0).contains(x)));
    }

    #[test]
    fn majority_rejects_other_population_sizes() {
        assert_eq!(
            MajorityFeedback::new(4).unwrap_err(),
            ConfigError::FeedbackPopulationMismatch {
                expected: 5,
                actual: 4
            }
        );
    }

    #[test]
    fn count_outside_population_is_domain_error() {
        let env = MajorityFeedback::new(5).unwrap();
        assert_eq!(
            env.reward_probability(6).unwrap_err(),
            DomainError::CountOutOfRange { m: 6, population: 5 }
        );
    }

    #[test]
    fn table_lookup() {
        let env = TableFeedback::new(2, vec![0.1, 0.9, 0.5]).unwrap();
        assert_eq!(env.population_size(), 2);
        assert_eq!(env.reward_probability(1).unwrap(), 0.9);
        assert!(env.reward_probability(3).is_err());
    }

    #[test]
    fn table_validation() {
        assert!(matches!(
            TableFeedback::new(3, vec![0.0, 1.0]),
            Err(ConfigError::FeedbackPopulationMismatch { .. })
        ));
        assert_eq!(
            TableFeedback::new(1, vec![0.5, 1.5]).unwrap_err(),
            ConfigError::InvalidProbability {
                index: 1,
                value: 1.5
            }
        );
        assert!(TableFeedback::new(1, vec![f64::NAN, 0.5]).is_err());
    }

    #[test]
    fn rule_builds_boxed_environment() {
        let env = FeedbackRule::Majority.build(5).unwrap();
        assert_eq!(env.population_size(), 5);
        assert!(FeedbackRule::Majority.build(3).is_err());

        let env = FeedbackRule::Table(vec![0.0, 0.5, 1.0]).build(2).unwrap();
        assert_eq!(env.reward_probability(2).unwrap(), 1.0);
    }
}
