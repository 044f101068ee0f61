//! # tsetlin
//!
//! A population of two-action Tsetlin automata driven by a shared,
//! state-dependent environment.
//!
//! Each round every automaton reports an action, the environment turns the
//! number of "high" reports into a reward probability, and each automaton is
//! independently rewarded or penalised. The crate records how the collective
//! choice evolves and summarises it.
//!
//! ## Quick Start
//!
//! ```
//! use tsetlin::prelude::*;
//!
//! let cfg = SimConfig::default().with_rounds(1_000).with_seed(42);
//! let mut sim = Simulation::new(cfg).unwrap();
//! sim.run().unwrap();
//!
//! let report = sim.report();
//! assert_eq!(report.rounds, 1_000);
//! println!("{report}");
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Serialization of configs and reports
//! - `parallel`: Apply per-round feedback across automata via rayon
//!
//! ## Modules
//!
//! - [`automaton`]: The bounded state machine
//! - [`environment`]: Feedback rules mapping `M` to a reward probability
//! - [`simulation`]: The round driver
//! - [`stats`]: Per-run history and counters
//! - [`observer`]: Read-only reports
//! - [`experiments`]: Parameter sweeps

#[path = "core/automaton.rs"]
pub mod automaton;

#[path = "core/environment.rs"]
pub mod environment;

#[path = "core/error.rs"]
pub mod error;

#[path = "core/prng.rs"]
pub mod prng;

#[path = "core/simulation.rs"]
pub mod simulation;

#[path = "core/stats.rs"]
pub mod stats;

pub mod experiments;

pub mod observer;

/// Prelude module for convenient imports.
///
/// ```
/// use tsetlin::prelude::*;
/// ```
pub mod prelude {
    pub use crate::automaton::{Action, ActionLabels, Automaton, Feedback};
    pub use crate::environment::{Environment, FeedbackRule, MajorityFeedback, TableFeedback};
    pub use crate::error::{ConfigError, DomainError, SimError};
    pub use crate::observer::{RunReport, SimulationObserver};
    pub use crate::prng::Prng;
    pub use crate::simulation::{run_experiment, ExecutionTier, RoundRecord, SimConfig, Simulation};
    pub use crate::stats::RunStats;
}
