// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outcome tallies for abuse simulation results.

#![allow(dead_code)]

use contact_gate::error::SubmissionError;
use contact_gate::gate::SubmissionResult;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Collects outcomes during a simulation.
#[derive(Debug, Default)]
pub struct AttackMetrics {
    /// Wall-clock start of the run
    start_time: Option<Instant>,
    /// Wall-clock end of the run
    end_time: Option<Instant>,
    /// Count of submissions by outcome
    outcomes: HashMap<Outcome, usize>,
    /// Count of submissions by session id
    requests_per_session: HashMap<String, usize>,
    /// Gate latency samples (microseconds)
    latencies: Vec<u64>,
}

/// Possible outcomes for a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Delivered,
    Received,
    RateLimitedShort,
    RateLimitedHourly,
    Invalid,
}

impl From<&SubmissionResult> for Outcome {
    fn from(result: &SubmissionResult) -> Self {
        match result {
            SubmissionResult::Delivered { .. } => Outcome::Delivered,
            SubmissionResult::Received { .. } => Outcome::Received,
            SubmissionResult::Rejected(SubmissionError::RateLimitedShort { .. }) => {
                Outcome::RateLimitedShort
            }
            SubmissionResult::Rejected(SubmissionError::RateLimitedHourly { .. }) => {
                Outcome::RateLimitedHourly
            }
            SubmissionResult::Rejected(SubmissionError::Invalid(_)) => Outcome::Invalid,
        }
    }
}

impl AttackMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    pub fn finish(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Record a submission outcome.
    pub fn record(&mut self, outcome: Outcome, session: &str, latency: Duration) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        *self
            .requests_per_session
            .entry(session.to_string())
            .or_insert(0) += 1;
        self.latencies.push(latency.as_micros() as u64);
    }

    pub fn total_requests(&self) -> usize {
        self.outcomes.values().sum()
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    pub fn accepted(&self) -> usize {
        self.count(Outcome::Delivered) + self.count(Outcome::Received)
    }

    pub fn duration(&self) -> Duration {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => end.duration_since(start),
            (Some(start), None) => start.elapsed(),
            _ => Duration::ZERO,
        }
    }

    /// Ratio of rejected to total.
    pub fn block_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            return 0.0;
        }
        (total - self.accepted()) as f64 / total as f64
    }

    pub fn median_latency_us(&self) -> u64 {
        if self.latencies.is_empty() {
            return 0;
        }
        let mut sorted = self.latencies.clone();
        sorted.sort_unstable();
        sorted[sorted.len() / 2]
    }

    pub fn unique_sessions(&self) -> usize {
        self.requests_per_session.len()
    }

    /// Generate a summary report.
    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            total_requests: self.total_requests(),
            accepted: self.accepted(),
            delivered: self.count(Outcome::Delivered),
            rate_limited_short: self.count(Outcome::RateLimitedShort),
            rate_limited_hourly: self.count(Outcome::RateLimitedHourly),
            validation_failed: self.count(Outcome::Invalid),
            duration_ms: self.duration().as_millis() as u64,
            block_rate: self.block_rate(),
            median_latency_us: self.median_latency_us(),
            unique_sessions: self.unique_sessions(),
        }
    }
}

/// Summary report of a simulation.
#[derive(Debug, Clone)]
pub struct MetricsReport {
    pub total_requests: usize,
    pub accepted: usize,
    pub delivered: usize,
    pub rate_limited_short: usize,
    pub rate_limited_hourly: usize,
    pub validation_failed: usize,
    pub duration_ms: u64,
    pub block_rate: f64,
    pub median_latency_us: u64,
    pub unique_sessions: usize,
}

impl std::fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Abuse Simulation Report ===")?;
        writeln!(f, "Duration:          {} ms", self.duration_ms)?;
        writeln!(f, "Total Submissions: {}", self.total_requests)?;
        writeln!(f)?;
        writeln!(f, "--- Outcomes ---")?;
        writeln!(f, "Accepted:          {} ({} delivered)", self.accepted, self.delivered)?;
        writeln!(f, "Cooldown:          {}", self.rate_limited_short)?;
        writeln!(f, "Hourly Cap:        {}", self.rate_limited_hourly)?;
        writeln!(f, "Validation Failed: {}", self.validation_failed)?;
        writeln!(f, "Block Rate:        {:.1}%", self.block_rate * 100.0)?;
        writeln!(f)?;
        writeln!(f, "Median Latency:    {} us", self.median_latency_us)?;
        writeln!(f, "Unique Sessions:   {}", self.unique_sessions)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_rate() {
        let mut metrics = AttackMetrics::new();
        for _ in 0..3 {
            metrics.record(Outcome::Received, "s1", Duration::ZERO);
        }
        for _ in 0..7 {
            metrics.record(Outcome::RateLimitedShort, "s1", Duration::ZERO);
        }

        assert_eq!(metrics.accepted(), 3);
        assert_eq!(metrics.unique_sessions(), 1);
        assert!((metrics.block_rate() - 0.7).abs() < 0.01);
    }
}
