//! Tick budget monitoring
//!
//! Tracks how long each simulation tick takes against the nominal budget
//! (one frame at the tick rate) and classifies the rolling average.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Performance status levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceStatus {
    /// Well under budget
    Excellent,
    /// Normal operation
    Good,
    /// Most of the budget in use
    Warning,
    /// At or over budget
    Critical,
}

/// Aggregate timings for a whole match
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceReport {
    pub ticks: u64,
    pub over_budget_ticks: u64,
    pub avg_tick_micros: f64,
    pub p95_tick_micros: f64,
    pub status: PerformanceStatus,
}

impl PerformanceReport {
    /// True when more than half the ticks blew the budget
    pub fn mostly_over_budget(&self) -> bool {
        self.ticks > 0 && self.over_budget_ticks * 2 > self.ticks
    }
}

/// Performance monitor that tracks tick durations
pub struct PerformanceMonitor {
    /// Rolling window of tick durations
    tick_durations: VecDeque<Duration>,
    max_samples: usize,
    /// Target tick duration (budget)
    target_tick_duration: Duration,
    /// Fractions of the budget separating the status levels
    excellent_threshold: f32,
    warning_threshold: f32,
    critical_threshold: f32,
    status: PerformanceStatus,
    tick_start: Option<Instant>,
    total_ticks: u64,
    over_budget_ticks: u64,
    total_duration: Duration,
}

impl PerformanceMonitor {
    pub fn new(tick_rate: u32) -> Self {
        let target_tick_duration = Duration::from_secs_f32(1.0 / tick_rate.max(1) as f32);

        Self {
            tick_durations: VecDeque::with_capacity(120), // ~2 seconds at 60Hz
            max_samples: 120,
            target_tick_duration,
            excellent_threshold: 0.3,
            warning_threshold: 0.7,
            critical_threshold: 0.9,
            status: PerformanceStatus::Excellent,
            tick_start: None,
            total_ticks: 0,
            over_budget_ticks: 0,
            total_duration: Duration::ZERO,
        }
    }

    /// Start timing a tick
    pub fn tick_start(&mut self) {
        self.tick_start = Some(Instant::now());
    }

    /// End timing a tick and record the duration
    pub fn tick_end(&mut self) {
        if let Some(start) = self.tick_start.take() {
            self.record_tick(start.elapsed());
        }
    }

    /// Record a tick duration
    pub fn record_tick(&mut self, duration: Duration) {
        self.total_ticks += 1;
        self.total_duration += duration;
        if duration > self.target_tick_duration {
            self.over_budget_ticks += 1;
        }

        self.tick_durations.push_back(duration);
        while self.tick_durations.len() > self.max_samples {
            self.tick_durations.pop_front();
        }
        self.update_status();
    }

    fn update_status(&mut self) {
        if self.tick_durations.len() < 10 {
            // Not enough data yet
            return;
        }

        let ratio = self.budget_usage_percent() / 100.0;

        self.status = if ratio < self.excellent_threshold {
            PerformanceStatus::Excellent
        } else if ratio < self.warning_threshold {
            PerformanceStatus::Good
        } else if ratio < self.critical_threshold {
            PerformanceStatus::Warning
        } else {
            PerformanceStatus::Critical
        };
    }

    /// Average over the rolling window
    pub fn average_tick_duration(&self) -> Duration {
        if self.tick_durations.is_empty() {
            return Duration::ZERO;
        }
        let sum: Duration = self.tick_durations.iter().sum();
        sum / self.tick_durations.len() as u32
    }

    /// 95th percentile over the rolling window
    pub fn p95_tick_duration(&self) -> Duration {
        if self.tick_durations.is_empty() {
            return Duration::ZERO;
        }
        let mut sorted: Vec<_> = self.tick_durations.iter().copied().collect();
        sorted.sort();
        let idx = (sorted.len() as f32 * 0.95) as usize;
        sorted.get(idx.min(sorted.len() - 1)).copied().unwrap_or(Duration::ZERO)
    }

    pub fn status(&self) -> PerformanceStatus {
        self.status
    }

    /// Budget usage of the rolling average as a percentage (0-100+)
    pub fn budget_usage_percent(&self) -> f32 {
        let avg = self.average_tick_duration();
        (avg.as_secs_f32() / self.target_tick_duration.as_secs_f32()) * 100.0
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Whole-run report; the average covers every tick, not just the window
    pub fn report(&self) -> PerformanceReport {
        let avg = if self.total_ticks == 0 {
            0.0
        } else {
            self.total_duration.as_secs_f64() * 1e6 / self.total_ticks as f64
        };
        PerformanceReport {
            ticks: self.total_ticks,
            over_budget_ticks: self.over_budget_ticks,
            avg_tick_micros: avg,
            p95_tick_micros: self.p95_tick_duration().as_secs_f64() * 1e6,
            status: self.status,
        }
    }

    pub fn status_message(&self) -> String {
        format!(
            "{:?} - {:.1}% budget, {} ticks",
            self.status,
            self.budget_usage_percent(),
            self.total_ticks
        )
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new(crate::game::constants::sim::TICK_RATE)
    }
}
