//! Depth sweep: rerun one configuration with several `states_per_action`
//! values and compare how the collective count settles.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use tracing::info;

use crate::error::Result;
use crate::simulation::{SimConfig, Simulation};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SweepRow {
    pub states_per_action: u32,
    pub rounds: usize,
    pub mean_high_count: Option<f64>,
    /// Mean over the report tail (`history_tail` rounds).
    pub late_mean_high_count: Option<f64>,
    pub m_distribution: Vec<f64>,
}

/// Run `base` once per entry of `states`, keeping every other setting
/// (seed included) fixed.
pub fn sweep_states(base: &SimConfig, states: &[u32]) -> Result<Vec<SweepRow>> {
    let mut rows = Vec::with_capacity(states.len());
    for &n in states {
        let cfg = base.clone().with_states_per_action(n);
        let mut sim = Simulation::new(cfg)?;
        sim.run()?;

        let stats = sim.stats();
        let row = SweepRow {
            states_per_action: n,
            rounds: stats.rounds(),
            mean_high_count: stats.mean_high_count(),
            late_mean_high_count: stats.windowed_mean(base.history_tail),
            m_distribution: stats.m_distribution(),
        };
        info!(
            states_per_action = n,
            mean_high = row.mean_high_count.unwrap_or(0.0),
            "sweep point done"
        );
        rows.push(row);
    }
    Ok(rows)
}

pub fn print_rows(rows: &[SweepRow]) {
    println!("tsetlin depth sweep");
    for r in rows {
        let dist: Vec<String> = r.m_distribution.iter().map(|p| format!("{p:.3}")).collect();
        println!(
            "n={} rounds={} mean_M={} late_mean_M={} p(M)=[{}]",
            r.states_per_action,
            r.rounds,
            fmt_opt(r.mean_high_count),
            fmt_opt(r.late_mean_high_count),
            dist.join(", ")
        );
    }
}

fn fmt_opt(x: Option<f64>) -> String {
    match x {
        Some(v) => format!("{v:.3}"),
        None => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, SimError};

    #[test]
    fn one_row_per_depth() {
        let base = SimConfig::default().with_seed(17).with_rounds(400);
        let rows = sweep_states(&base, &[1, 2, 4]).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows.iter().map(|r| r.states_per_action).collect::<Vec<_>>(),
            vec![1, 2, 4]
        );
        for r in &rows {
            assert_eq!(r.rounds, 400);
            assert_eq!(r.m_distribution.len(), 6);
            let m = r.mean_high_count.unwrap();
            assert!((0.0..=5.0).contains(&m));
        }
    }

    #[test]
    fn sweep_matches_individual_runs() {
        let base = SimConfig::default().with_seed(3).with_rounds(200);
        let rows = sweep_states(&base, &[3]).unwrap();

        let mut sim = Simulation::new(base.with_states_per_action(3)).unwrap();
        sim.run().unwrap();
        assert_eq!(rows[0].mean_high_count, sim.stats().mean_high_count());
    }

    #[test]
    fn zero_depth_aborts_sweep() {
        let base = SimConfig::default().with_seed(3).with_rounds(10);
        let err = sweep_states(&base, &[2, 0]).unwrap_err();
        assert!(matches!(err, SimError::Config(ConfigError::ZeroStates)));
    }
}
