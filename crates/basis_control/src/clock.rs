//! Time source for the action runner, mockable for tests.

use std::sync::Arc;
use std::time::{Duration, Instant};

// ─────────────────────────────────────────────────────────────────────────────
// ClockProvider Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for providing the current time and waiting.
///
/// Implement this for custom time sources; [`MockClock`] is one that never
/// actually waits.
pub trait ClockProvider: Send + Sync + 'static {
    /// Returns the current instant.
    fn now(&self) -> Instant;

    /// Blocks the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Wall-clock provider backed by [`Instant::now`] and [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockProvider for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Clock
// ─────────────────────────────────────────────────────────────────────────────

/// Shared handle to a [`ClockProvider`]; the system clock by default.
#[derive(Clone)]
pub struct Clock {
    provider: Arc<dyn ClockProvider>,
}

impl core::fmt::Debug for Clock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Clock").finish_non_exhaustive()
    }
}

impl Clock {
    /// Creates a clock using the system time.
    #[must_use]
    pub fn system() -> Self {
        Self {
            provider: Arc::new(SystemClock),
        }
    }

    /// Creates a clock with a custom provider.
    #[must_use]
    pub fn with_provider(provider: Arc<dyn ClockProvider>) -> Self {
        Self { provider }
    }

    /// Returns the current instant.
    #[must_use]
    pub fn now(&self) -> Instant {
        self.provider.now()
    }

    /// Returns the duration elapsed since `earlier`.
    #[must_use]
    pub fn elapsed_since(&self, earlier: Instant) -> Duration {
        self.now().saturating_duration_since(earlier)
    }

    /// Waits for `duration`; zero returns immediately.
    pub fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            self.provider.sleep(duration);
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MockClock for Testing
// ─────────────────────────────────────────────────────────────────────────────

/// Clock whose time only moves when told to. Sleeping advances it instantly.
///
/// # Example
///
/// ```
/// # #[cfg(any(test, feature = "test-utils"))]
/// # {
/// use std::sync::Arc;
/// use std::time::{Duration, Instant};
/// use basis_control::{Clock, MockClock};
///
/// let start = Instant::now();
/// let mock = Arc::new(MockClock::new(start));
/// let clock = Clock::with_provider(mock.clone());
///
/// clock.sleep(Duration::from_millis(10));
/// mock.advance(Duration::from_secs(1));
///
/// assert_eq!(clock.elapsed_since(start), Duration::from_millis(1010));
/// assert_eq!(mock.sleeps(), vec![Duration::from_millis(10)]);
/// # }
/// ```
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug)]
pub struct MockClock {
    current: parking_lot::RwLock<Instant>,
    slept: parking_lot::Mutex<Vec<Duration>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockClock {
    /// Creates a mock clock set to the given instant.
    #[must_use]
    pub fn new(start: Instant) -> Self {
        Self {
            current: parking_lot::RwLock::new(start),
            slept: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Advances the clock by the given duration.
    pub fn advance(&self, duration: Duration) {
        *self.current.write() += duration;
    }

    /// Sets the clock to a specific instant.
    pub fn set(&self, instant: Instant) {
        *self.current.write() = instant;
    }

    /// Returns the current instant.
    #[must_use]
    pub fn current(&self) -> Instant {
        *self.current.read()
    }

    /// Returns every duration passed to `sleep`, in order.
    #[must_use]
    pub fn sleeps(&self) -> Vec<Duration> {
        self.slept.lock().clone()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl ClockProvider for MockClock {
    fn now(&self) -> Instant {
        self.current()
    }

    fn sleep(&self, duration: Duration) {
        self.slept.lock().push(duration);
        self.advance(duration);
    }
}
