//! Round-based driver for a population of automata sharing one environment.
//!
//! Each round: every automaton decides, the high decisions are tallied into
//! `M`, the environment turns `M` into a reward probability `p`, and each
//! automaton is independently rewarded with probability `p` (penalised
//! otherwise). A round always completes before the next one starts.

use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use tracing::{debug, info};

use crate::automaton::{check_states, Action, ActionLabels, Automaton, Feedback};
use crate::environment::{Environment, FeedbackRule};
use crate::error::{ConfigError, Result};
use crate::observer::{RunReport, SimulationObserver};
use crate::prng::Prng;
use crate::stats::RunStats;

/// How the feedback phase of a round is executed.
///
/// Every automaton owns its own random stream, so both tiers produce
/// identical runs for the same seed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ExecutionTier {
    /// Single-threaded (default, works everywhere).
    #[default]
    Scalar,
    /// Feedback applied across automata via rayon (requires `parallel` feature).
    Parallel,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    pub rounds: usize,
    pub states_per_action: u32,
    pub population_size: usize,

    // If unset, runs are seeded with 1.
    pub seed: Option<u64>,

    pub labels: ActionLabels,
    pub feedback: FeedbackRule,

    // How many trailing history values a report keeps.
    pub history_tail: usize,

    pub tier: ExecutionTier,
}

impl Default for SimConfig {
    /// Five automata with four states per action, 10k rounds, majority feedback.
    fn default() -> Self {
        Self {
            rounds: 10_000,
            states_per_action: 4,
            population_size: MAJORITY_POPULATION,
            seed: None,
            labels: ActionLabels::default(),
            feedback: FeedbackRule::Majority,
            history_tail: 100,
            tier: ExecutionTier::Scalar,
        }
    }
}

const MAJORITY_POPULATION: usize = crate::environment::MajorityFeedback::POPULATION;

impl SimConfig {
    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_states_per_action(mut self, n: u32) -> Self {
        self.states_per_action = n;
        self
    }

    /// Set the population size. The default majority rule only covers five
    /// automata, so other sizes also need [`SimConfig::with_feedback`].
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_labels(mut self, labels: ActionLabels) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_feedback(mut self, feedback: FeedbackRule) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn with_history_tail(mut self, tail: usize) -> Self {
        self.history_tail = tail;
        self
    }

    pub fn with_tier(mut self, tier: ExecutionTier) -> Self {
        self.tier = tier;
        self
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.rounds == 0 {
            return Err(ConfigError::ZeroRounds);
        }
        check_states(self.states_per_action)?;
        if self.population_size == 0 {
            return Err(ConfigError::ZeroPopulation);
        }
        self.feedback.build(self.population_size)?;
        Ok(())
    }
}

/// Outcome of a single round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundRecord {
    /// Zero-based round index.
    pub round: usize,
    /// Collective high count `M`.
    pub decisions_high: usize,
    pub reward_probability: f64,
    /// Automata that drew a reward this round.
    pub rewarded: usize,
}

#[derive(Debug)]
pub struct Simulation {
    cfg: SimConfig,
    seed: u64,
    env: Box<dyn Environment>,
    automata: Vec<Automaton>,
    // One independent stream per automaton, index-aligned with `automata`.
    streams: Vec<Prng>,
    stats: RunStats,
    scratch_high: Vec<bool>,
}

impl Simulation {
    pub fn new(cfg: SimConfig) -> Result<Self> {
        cfg.validate()?;
        let env = cfg.feedback.build(cfg.population_size)?;
        let seed = cfg.seed.unwrap_or(1);

        let labels = Arc::new(cfg.labels.clone());
        let mut master = Prng::new(seed);
        let mut automata = Vec::with_capacity(cfg.population_size);
        let mut streams = Vec::with_capacity(cfg.population_size);
        for _ in 0..cfg.population_size {
            let mut stream = master.fork();
            automata.push(Automaton::new(
                cfg.states_per_action,
                Arc::clone(&labels),
                &mut stream,
            )?);
            streams.push(stream);
        }

        info!(
            seed,
            population = cfg.population_size,
            states_per_action = cfg.states_per_action,
            rounds = cfg.rounds,
            "simulation initialised"
        );

        Ok(Self {
            stats: RunStats::with_capacity(cfg.population_size, cfg.rounds),
            scratch_high: Vec::with_capacity(cfg.population_size),
            cfg,
            seed,
            env,
            automata,
            streams,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.cfg
    }

    /// Seed actually used (the configured one, or the fallback).
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn automata(&self) -> &[Automaton] {
        &self.automata
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn environment(&self) -> &dyn Environment {
        self.env.as_ref()
    }

    pub fn rounds_completed(&self) -> usize {
        self.stats.rounds()
    }

    pub fn actions(&self) -> Vec<Action> {
        self.automata.iter().map(Automaton::action).collect()
    }

    /// Current label reported by each automaton.
    pub fn decisions(&self) -> Vec<&str> {
        self.automata.iter().map(Automaton::decide).collect()
    }

    /// Requested tier adjusted for what this build supports.
    pub fn effective_execution_tier(&self) -> ExecutionTier {
        match self.cfg.tier {
            ExecutionTier::Scalar => ExecutionTier::Scalar,
            ExecutionTier::Parallel => {
                #[cfg(feature = "parallel")]
                {
                    ExecutionTier::Parallel
                }
                #[cfg(not(feature = "parallel"))]
                {
                    ExecutionTier::Scalar
                }
            }
        }
    }

    /// Run one full round.
    pub fn step(&mut self) -> Result<RoundRecord> {
        self.scratch_high.clear();
        self.scratch_high
            .extend(self.automata.iter().map(|a| a.action().is_high()));

        let m = self.scratch_high.iter().filter(|&&h| h).count();
        let p = self.env.reward_probability(m)?;
        let recorded = self.stats.record_round(&self.scratch_high);
        debug_assert_eq!(recorded, m);

        let rewarded = self.apply_feedback(p);

        Ok(RoundRecord {
            round: self.stats.rounds() - 1,
            decisions_high: m,
            reward_probability: p,
            rewarded,
        })
    }

    /// Run `rounds` rounds back to back. Zero rounds is a no-op.
    pub fn run_rounds(&mut self, rounds: usize) -> Result<()> {
        for _ in 0..rounds {
            let rec = self.step()?;
            if (rec.round + 1) % 1000 == 0 {
                debug!(
                    round = rec.round + 1,
                    m = rec.decisions_high,
                    p = rec.reward_probability,
                    window_mean = self.stats.windowed_mean(1000).unwrap_or(0.0),
                    "progress"
                );
            }
        }
        Ok(())
    }

    /// Run the configured number of rounds.
    pub fn run(&mut self) -> Result<()> {
        self.run_rounds(self.cfg.rounds)?;
        info!(
            rounds = self.stats.rounds(),
            mean_high = self.stats.mean_high_count().unwrap_or(0.0),
            "run finished"
        );
        Ok(())
    }

    pub fn report(&self) -> RunReport {
        SimulationObserver::new(self).report()
    }

    fn apply_feedback(&mut self, p: f64) -> usize {
        match self.effective_execution_tier() {
            #[cfg(feature = "parallel")]
            ExecutionTier::Parallel => self
                .automata
                .par_iter_mut()
                .zip(self.streams.par_iter_mut())
                .map(|(a, rng)| apply_draw(a, rng, p))
                .sum(),
            _ => self
                .automata
                .iter_mut()
                .zip(self.streams.iter_mut())
                .map(|(a, rng)| apply_draw(a, rng, p))
                .sum(),
        }
    }
}

// Returns 1 when the automaton was rewarded.
#[inline]
fn apply_draw(automaton: &mut Automaton, rng: &mut Prng, p: f64) -> usize {
    let feedback = if rng.gen_bool(p) {
        Feedback::Reward
    } else {
        Feedback::Penalty
    };
    automaton.apply(feedback);
    usize::from(feedback == Feedback::Reward)
}

/// Build, run and summarise a simulation in one call.
pub fn run_experiment(cfg: SimConfig) -> Result<RunReport> {
    let mut sim = Simulation::new(cfg)?;
    sim.run()?;
    Ok(sim.report())
}
