//! Run history and per-automaton counters, plus the derived summaries.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-run statistics, updated once per round.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunStats {
    /// Collective high count `M`, one entry per round.
    history: Vec<usize>,
    /// Rounds in which each automaton reported the high action.
    high_counts: Vec<u64>,
    /// How often each `M` in `0..=population` occurred.
    m_histogram: Vec<u64>,
}

impl RunStats {
    /// Upper bound on history preallocated up front; longer runs grow on demand.
    pub const MAX_PREALLOCATED_ROUNDS: usize = 1 << 20;

    pub fn new(population_size: usize) -> Self {
        Self {
            history: Vec::new(),
            high_counts: vec![0; population_size],
            m_histogram: vec![0; population_size + 1],
        }
    }

    pub fn with_capacity(population_size: usize, rounds: usize) -> Self {
        let mut s = Self::new(population_size);
        s.history.reserve(rounds.min(Self::MAX_PREALLOCATED_ROUNDS));
        s
    }

    /// Record one round from the per-automaton "reported high" flags.
    /// Returns the collective count `M`.
    pub fn record_round(&mut self, high: &[bool]) -> usize {
        debug_assert_eq!(high.len(), self.high_counts.len());
        let mut m = 0;
        for (count, &is_high) in self.high_counts.iter_mut().zip(high) {
            if is_high {
                *count += 1;
                m += 1;
            }
        }
        self.history.push(m);
        self.m_histogram[m] += 1;
        m
    }

    pub fn rounds(&self) -> usize {
        self.history.len()
    }

    pub fn population_size(&self) -> usize {
        self.high_counts.len()
    }

    pub fn history(&self) -> &[usize] {
        &self.history
    }

    pub fn high_counts(&self) -> &[u64] {
        &self.high_counts
    }

    /// The last `k` values of the history (all of it when shorter).
    pub fn tail(&self, k: usize) -> &[usize] {
        let start = self.history.len().saturating_sub(k);
        &self.history[start..]
    }

    /// Average collective high count, `None` before the first round.
    pub fn mean_high_count(&self) -> Option<f64> {
        mean(&self.history)
    }

    /// Average over the last `k` rounds, `None` before the first round.
    pub fn windowed_mean(&self, k: usize) -> Option<f64> {
        mean(self.tail(k))
    }

    /// Fraction of rounds each automaton reported high (0.0 with no rounds).
    pub fn high_fractions(&self) -> Vec<f64> {
        let rounds = self.rounds();
        self.high_counts
            .iter()
            .map(|&c| {
                if rounds == 0 {
                    0.0
                } else {
                    c as f64 / rounds as f64
                }
            })
            .collect()
    }

    /// Empirical frequency of each `M` value (0.0 everywhere with no rounds).
    pub fn m_distribution(&self) -> Vec<f64> {
        let rounds = self.rounds();
        self.m_histogram
            .iter()
            .map(|&c| {
                if rounds == 0 {
                    0.0
                } else {
                    c as f64 / rounds as f64
                }
            })
            .collect()
    }
}

fn mean(values: &[usize]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: usize = values.iter().sum();
    Some(sum as f64 / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stats_do_not_divide_by_zero() {
        let s = RunStats::new(5);
        assert_eq!(s.rounds(), 0);
        assert!(s.history().is_empty());
        assert_eq!(s.mean_high_count(), None);
        assert_eq!(s.windowed_mean(100), None);
        assert_eq!(s.high_fractions(), vec![0.0; 5]);
        assert_eq!(s.m_distribution(), vec![0.0; 6]);
        assert!(s.tail(100).is_empty());
    }

    #[test]
    fn record_round_counts_high() {
        let mut s = RunStats::new(3);
        assert_eq!(s.record_round(&[true, false, true]), 2);
        assert_eq!(s.record_round(&[false, false, true]), 1);
        assert_eq!(s.history(), &[2, 1]);
        assert_eq!(s.high_counts(), &[1, 0, 2]);
        assert_eq!(s.high_fractions(), vec![0.5, 0.0, 1.0]);
        assert_eq!(s.mean_high_count(), Some(1.5));
        assert_eq!(s.m_distribution(), vec![0.0, 0.5, 0.5, 0.0]);
    }

    #[test]
    fn huge_round_count_reserves_a_bounded_history() {
        let s = RunStats::with_capacity(5, usize::MAX);
        assert_eq!(s.rounds(), 0);
        assert!(s.history.capacity() >= RunStats::MAX_PREALLOCATED_ROUNDS);
        assert!(s.history.capacity() < usize::MAX / 2);
    }

    #[test]
    fn tail_and_window() {
        let mut s = RunStats::with_capacity(1, 10);
        for i in 0..10 {
            s.record_round(&[i % 2 == 0]);
        }
        assert_eq!(s.tail(3), &[0, 1, 0]);
        assert_eq!(s.tail(50).len(), 10);
        assert_eq!(s.windowed_mean(4), Some(0.5));
    }
}
