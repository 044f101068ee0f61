use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::automaton::ActionLabels;
use crate::simulation::Simulation;

/// A read-only summary of a run.
///
/// Design intent:
/// - Observers cannot mutate or steer the population.
/// - Building a report allocates; the round loop stays unchanged.
/// - No randomness is consumed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunReport {
    pub rounds: usize,
    pub seed: u64,
    pub states_per_action: u32,
    pub population_size: usize,
    pub labels: ActionLabels,

    pub history_tail: Vec<usize>,
    pub final_decisions: Vec<String>,
    pub mean_high_count: Option<f64>,
    pub high_fractions: Vec<f64>,
    pub m_distribution: Vec<f64>,
}

pub struct SimulationObserver<'a> {
    sim: &'a Simulation,
}

impl<'a> SimulationObserver<'a> {
    pub fn new(sim: &'a Simulation) -> Self {
        Self { sim }
    }

    pub fn report(&self) -> RunReport {
        let cfg = self.sim.config();
        let stats = self.sim.stats();

        RunReport {
            rounds: stats.rounds(),
            seed: self.sim.seed(),
            states_per_action: cfg.states_per_action,
            population_size: cfg.population_size,
            labels: cfg.labels.clone(),

            history_tail: stats.tail(cfg.history_tail).to_vec(),
            final_decisions: self
                .sim
                .decisions()
                .into_iter()
                .map(str::to_string)
                .collect(),
            mean_high_count: stats.mean_high_count(),
            high_fractions: stats.high_fractions(),
            m_distribution: stats.m_distribution(),
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Steps: {}", self.rounds)?;
        writeln!(
            f,
            "Distribution of M over last {} steps: {:?}",
            self.history_tail.len(),
            self.history_tail
        )?;
        writeln!(
            f,
            "Final decisions of the {} automata: [{}]",
            self.population_size,
            self.final_decisions.join(", ")
        )?;
        match self.mean_high_count {
            Some(mean) => writeln!(f, "Average {}: {:.2}", self.labels.high, mean)?,
            None => writeln!(f, "Average {}: n/a", self.labels.high)?,
        }
        let fractions: Vec<String> = self
            .high_fractions
            .iter()
            .map(|x| format!("{x:.3}"))
            .collect();
        write!(
            f,
            "Per-automaton fraction of '{}' during run: [{}]",
            self.labels.high,
            fractions.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::SimConfig;

    #[test]
    fn report_reflects_simulation_state() {
        let mut sim = Simulation::new(SimConfig::default().with_seed(5).with_rounds(300)).unwrap();
        sim.run().unwrap();
        let report = SimulationObserver::new(&sim).report();

        assert_eq!(report.rounds, 300);
        assert_eq!(report.history_tail, sim.stats().tail(100));
        assert_eq!(report.final_decisions, sim.decisions());
        assert_eq!(report.mean_high_count, sim.stats().mean_high_count());
        let total: f64 = report.m_distribution.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn reporting_does_not_advance_the_run() {
        let mut sim = Simulation::new(SimConfig::default().with_seed(5).with_rounds(10)).unwrap();
        sim.run().unwrap();
        let first = sim.report();
        let second = sim.report();
        assert_eq!(first, second);
        assert_eq!(sim.rounds_completed(), 10);
    }

    #[test]
    fn display_before_any_round() {
        let sim = Simulation::new(SimConfig::default().with_seed(1)).unwrap();
        let text = sim.report().to_string();
        assert!(text.starts_with("Steps: 0\n"));
        assert!(text.contains("Distribution of M over last 0 steps: []"));
        assert!(text.contains("Average Yes: n/a"));
        assert!(text.contains("[0.000, 0.000, 0.000, 0.000, 0.000]"));
    }

    #[test]
    fn display_formats_numbers() {
        let report = RunReport {
            rounds: 4,
            seed: 1,
            states_per_action: 4,
            population_size: 2,
            labels: ActionLabels::default(),
            history_tail: vec![1, 2],
            final_decisions: vec!["No".into(), "Yes".into()],
            mean_high_count: Some(1.25),
            high_fractions: vec![0.5, 0.125],
            m_distribution: vec![0.0, 0.5, 0.5],
        };
        let text = report.to_string();
        assert_eq!(
            text,
            "Steps: 4\n\
             Distribution of M over last 2 steps: [1, 2]\n\
             Final decisions of the 2 automata: [No, Yes]\n\
             Average Yes: 1.25\n\
             Per-automaton fraction of 'Yes' during run: [0.500, 0.125]"
        );
    }
}
