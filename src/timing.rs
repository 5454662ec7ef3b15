//! Wall-clock timing.
//!
//! [`Stopwatch`] brackets a single interval. [`PhaseTiming`] holds the
//! per-phase breakdown an algorithm reports about its own execution; which
//! phases count towards the headline runtime is decided by an explicit
//! allow-list, never by summing everything.

use std::time::{Duration, Instant};

/// Single-interval wall-clock timer with `Instant` resolution.
#[derive(Debug, Default)]
pub struct Stopwatch {
    started: Option<Instant>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Stopwatch { started: None }
    }

    /// Create and start in one step.
    pub fn started() -> Self {
        Stopwatch { started: Some(Instant::now()) }
    }

    pub fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    /// Stop and return the elapsed interval.
    ///
    /// # Panics
    ///
    /// Panics if the stopwatch is not running. Stopping twice without an
    /// intervening `start` is a bug in the caller.
    pub fn stop(&mut self) -> Duration {
        match self.started.take() {
            Some(t0) => t0.elapsed(),
            None => panic!("Stopwatch::stop called without a matching start"),
        }
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }

    pub fn sum(durations: &[Duration]) -> Duration {
        durations.iter().sum()
    }
}

/// Run `f` between a start/stop pair.
pub fn timed<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let mut sw = Stopwatch::started();
    let out = f();
    (out, sw.stop())
}

/// Milliseconds with sub-millisecond precision, for reporting.
pub fn as_millis_f64(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Ordered, named phase durations reported by an algorithm.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhaseTiming {
    phases: Vec<(String, Vec<Duration>)>,
}

impl PhaseTiming {
    pub fn new() -> Self {
        PhaseTiming::default()
    }

    /// Append one occurrence of `phase`. First-seen order is preserved.
    pub fn record(&mut self, phase: &str, elapsed: Duration) {
        match self.phases.iter_mut().find(|(name, _)| name == phase) {
            Some((_, list)) => list.push(elapsed),
            None => self.phases.push((phase.to_string(), vec![elapsed])),
        }
    }

    /// Time `f` and record it under `phase`.
    pub fn measure<T>(&mut self, phase: &str, f: impl FnOnce() -> T) -> T {
        let (out, d) = timed(f);
        self.record(phase, d);
        out
    }

    pub fn get(&self, phase: &str) -> Option<&[Duration]> {
        self.phases
            .iter()
            .find(|(name, _)| name == phase)
            .map(|(_, list)| list.as_slice())
    }

    pub fn phases(&self) -> impl Iterator<Item = (&str, &[Duration])> {
        self.phases.iter().map(|(n, l)| (n.as_str(), l.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Sum of every duration in the allow-listed phases. Other phases never contribute.
    pub fn total(&self, allow: &[&str]) -> Duration {
        self.phases
            .iter()
            .filter(|(name, _)| allow.contains(&name.as_str()))
            .map(|(_, list)| Stopwatch::sum(list))
            .sum()
    }
}
