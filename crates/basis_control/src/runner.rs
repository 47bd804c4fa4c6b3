//! Synchronous fixed-period driver for control-basis actions.
//!
//! The runner calls [`ControlBasisAction::update_action`] on the caller's
//! thread once per period. A failed cycle is counted and logged; the runner
//! moves on to the next cycle unless the configured number of consecutive
//! failures is reached.

use crate::action::ControlBasisAction;
use crate::clock::{Clock, ClockProvider};
use crate::error::ControllerError;
use std::sync::Arc;
use std::time::Duration;

/// Summary of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Cycles attempted.
    pub cycles: usize,
    /// Cycles whose update failed.
    pub failed_cycles: usize,
    /// Time from the first cycle to the end of the run.
    pub elapsed: Duration,
}

/// Drives a [`ControlBasisAction`] at a fixed period.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use basis_control::{ActionRunner, Controller};
/// # fn controller() -> Controller { unimplemented!() }
///
/// let mut controller = controller();
/// let stats = ActionRunner::new(Duration::from_millis(10))
///     .with_post_every(100)
///     .run_cycles(&mut controller, 1_000)
///     .unwrap();
/// println!("{} of {} cycles failed", stats.failed_cycles, stats.cycles);
/// ```
#[derive(Debug, Clone)]
pub struct ActionRunner {
    period: Duration,
    clock: Clock,
    max_consecutive_failures: Option<usize>,
    post_every: Option<usize>,
}

impl ActionRunner {
    /// Creates a runner with the given cycle period and the system clock.
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            clock: Clock::system(),
            max_consecutive_failures: None,
            post_every: None,
        }
    }

    /// Uses a custom time source.
    #[must_use]
    pub fn with_clock(mut self, provider: Arc<dyn ClockProvider>) -> Self {
        self.clock = Clock::with_provider(provider);
        self
    }

    /// Stops the action and aborts the run after `limit` failed cycles in a row.
    #[must_use]
    pub fn with_max_consecutive_failures(mut self, limit: usize) -> Self {
        self.max_consecutive_failures = Some(limit.max(1));
        self
    }

    /// Calls [`ControlBasisAction::post_data`] every `cycles` cycles.
    #[must_use]
    pub fn with_post_every(mut self, cycles: usize) -> Self {
        self.post_every = Some(cycles.max(1));
        self
    }

    /// Returns the cycle period.
    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Runs exactly `cycles` cycles, starting the action first if needed.
    ///
    /// The action is left running afterwards.
    ///
    /// # Errors
    ///
    /// Returns the start error, or the last cycle error once the
    /// consecutive-failure limit is hit.
    pub fn run_cycles(
        &self,
        action: &mut dyn ControlBasisAction,
        cycles: usize,
    ) -> Result<RunStats, ControllerError> {
        self.run_while(action, |stats| stats.cycles < cycles)
    }

    /// Runs cycles for as long as `keep_going` returns `true`.
    ///
    /// `keep_going` sees the stats so far before each cycle.
    ///
    /// # Errors
    ///
    /// See [`run_cycles`](Self::run_cycles).
    pub fn run_while<F>(
        &self,
        action: &mut dyn ControlBasisAction,
        mut keep_going: F,
    ) -> Result<RunStats, ControllerError>
    where
        F: FnMut(&RunStats) -> bool,
    {
        if !action.is_running() {
            action.start_action()?;
        }

        let started = self.clock.now();
        let mut stats = RunStats::default();
        let mut consecutive_failures = 0;

        tracing::debug!(action = action.name(), period = ?self.period, "runner started");

        while keep_going(&stats) {
            let cycle_start = self.clock.now();
            stats.cycles += 1;

            match action.update_action() {
                Ok(()) => consecutive_failures = 0,
                Err(err) => {
                    stats.failed_cycles += 1;
                    consecutive_failures += 1;
                    tracing::warn!(
                        action = action.name(),
                        cycle = stats.cycles,
                        consecutive_failures,
                        error = %err,
                        "action cycle failed"
                    );
                    if self
                        .max_consecutive_failures
                        .is_some_and(|limit| consecutive_failures >= limit)
                    {
                        action.stop_action()?;
                        return Err(err);
                    }
                }
            }

            if self.post_every.is_some_and(|every| stats.cycles % every == 0) {
                action.post_data();
            }

            let busy = self.clock.elapsed_since(cycle_start);
            self.clock.sleep(self.period.saturating_sub(busy));
        }

        stats.elapsed = self.clock.elapsed_since(started);
        tracing::debug!(
            action = action.name(),
            cycles = stats.cycles,
            failed = stats.failed_cycles,
            "runner finished"
        );
        Ok(stats)
    }
}
