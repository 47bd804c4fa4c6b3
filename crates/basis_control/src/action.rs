//! The lifecycle surface an action runner drives.

use crate::error::ControllerError;

/// A control-basis action: anything with a start/update/stop lifecycle.
///
/// [`Controller`](crate::Controller) is the primitive implementation;
/// [`ActionRunner`](crate::ActionRunner) drives any implementation at a fixed
/// period.
pub trait ControlBasisAction {
    /// The action's name, used in logs.
    fn name(&self) -> &str;

    /// Begins running.
    ///
    /// # Errors
    ///
    /// Returns an error if the action cannot start from its current state.
    fn start_action(&mut self) -> Result<(), ControllerError>;

    /// Runs one cycle.
    ///
    /// # Errors
    ///
    /// Returns an error if the cycle failed. A failed cycle does not stop the
    /// action; the caller decides whether to retry.
    fn update_action(&mut self) -> Result<(), ControllerError>;

    /// Stops running.
    ///
    /// # Errors
    ///
    /// Returns an error if the action is not running.
    fn stop_action(&mut self) -> Result<(), ControllerError>;

    /// Publishes diagnostic state.
    fn post_data(&self);

    /// Returns `true` between a successful start and the next stop.
    fn is_running(&self) -> bool;
}
