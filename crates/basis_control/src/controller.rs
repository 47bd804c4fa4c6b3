//! The primitive task-space controller.
//!
//! Each cycle a [`Controller`] reads its sensor (and reference, if any),
//! evaluates its potential function, and turns the potential φ into an
//! effector command through its task Jacobian J:
//!
//! - pseudo-inverse mode: Δτ = κ · J⁺ · φ
//! - transpose mode: Δτ = −κ · Jᵗ · φ
//!
//! The sign differs on purpose. Transpose mode is a descent step on the
//! potential, while pseudo-inverse mode is a local inversion of the task map
//! and relies on φ already carrying the direction.

use crate::action::ControlBasisAction;
use crate::config::{ControllerConfig, validate_gain};
use crate::diagnostics::{ControllerReport, DiagnosticsSink, TracingSink};
use crate::error::ControllerError;
use crate::linalg::damped_pseudo_inverse;
use crate::state::ControllerState;
use basis_functions::{
    Jacobian, JacobianRegistry, JacobianShape, Potential, PotentialFunction,
    PotentialFunctionRegistry,
};
use basis_resource::{LocalAccessor, Resource, ResourceAccessor, ResourceName, ResourceResolver};
use nalgebra::{DMatrix, DVector};
use std::collections::VecDeque;
use std::sync::Arc;

// ─────────────────────────────────────────────────────────────────────────────
// Resource bindings
// ─────────────────────────────────────────────────────────────────────────────

/// Where the controller's resources come from, fixed at construction.
enum ResourceSource {
    Local {
        sensor: Arc<dyn Resource>,
        reference: Option<Arc<dyn Resource>>,
        effector: Arc<dyn Resource>,
    },
    Distributed {
        resolver: Arc<dyn ResourceResolver>,
        sensor: String,
        reference: Option<String>,
        effector: String,
    },
}

impl ResourceSource {
    fn has_reference(&self) -> bool {
        match self {
            Self::Local { reference, .. } => reference.is_some(),
            Self::Distributed { reference, .. } => reference.is_some(),
        }
    }

    fn effector_name(&self) -> &str {
        match self {
            Self::Local { effector, .. } => effector.name(),
            Self::Distributed { effector, .. } => effector,
        }
    }

    fn connect(&self) -> Result<Accessors, ControllerError> {
        match self {
            Self::Local {
                sensor,
                reference,
                effector,
            } => Ok(Accessors {
                sensor: local(sensor),
                reference: reference.as_ref().map(local),
                effector: local(effector),
            }),
            Self::Distributed {
                resolver,
                sensor,
                reference,
                effector,
            } => Ok(Accessors {
                sensor: resolver.resolve(sensor)?,
                reference: reference
                    .as_deref()
                    .map(|name| resolver.resolve(name))
                    .transpose()?,
                effector: resolver.resolve(effector)?,
            }),
        }
    }
}

fn local(resource: &Arc<dyn Resource>) -> Box<dyn ResourceAccessor> {
    Box::new(LocalAccessor::new(Arc::clone(resource)))
}

struct Accessors {
    sensor: Box<dyn ResourceAccessor>,
    reference: Option<Box<dyn ResourceAccessor>>,
    effector: Box<dyn ResourceAccessor>,
}

impl Accessors {
    fn check_dimensions(&self) -> Result<(), ControllerError> {
        if let Some(reference) = &self.reference
            && reference.size() != self.sensor.size()
        {
            return Err(ControllerError::DimensionMismatch {
                what: format!("reference '{}'", reference.name()),
                expected: self.sensor.size(),
                actual: reference.size(),
            });
        }
        Ok(())
    }

    fn read_reference(&self, sensor_dim: usize) -> Result<Option<DVector<f64>>, ControllerError> {
        let Some(reference) = &self.reference else {
            return Ok(None);
        };
        let values = reference.read()?;
        if values.len() != sensor_dim {
            return Err(ControllerError::DimensionMismatch {
                what: format!("reference '{}'", reference.name()),
                expected: sensor_dim,
                actual: values.len(),
            });
        }
        Ok(Some(values))
    }
}

/// Everything a connected controller runs on.
struct Bindings {
    accessors: Accessors,
    potential_function: Box<dyn PotentialFunction>,
    jacobian: Box<dyn Jacobian>,
    shape: JacobianShape,
}

impl Bindings {
    fn compute_jacobian(
        &self,
        effector_state: &DVector<f64>,
    ) -> Result<DMatrix<f64>, ControllerError> {
        let matrix = self.jacobian.compute(effector_state)?;
        self.shape.check(&matrix)?;
        Ok(matrix)
    }
}

/// Outcome of one successful cycle, committed all at once.
struct Cycle {
    potential: Potential,
    jacobian: Option<DMatrix<f64>>,
    inverse: Option<DMatrix<f64>>,
    output: DVector<f64>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Controller
// ─────────────────────────────────────────────────────────────────────────────

/// A primitive control-basis controller.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use basis_control::{Controller, ControllerConfig};
/// use basis_functions::{JacobianRegistry, PotentialFunctionRegistry};
/// use basis_resource::SharedResource;
/// use nalgebra::DVector;
///
/// let position = Arc::new(SharedResource::with_values(
///     "/cb/configuration/arm",
///     "configuration",
///     DVector::from_vec(vec![1.0, 1.0]),
/// ));
/// let target = Arc::new(SharedResource::with_values(
///     "/cb/configuration/target",
///     "configuration",
///     DVector::from_vec(vec![0.0, 0.0]),
/// ));
///
/// let mut controller = Controller::local_with_reference(
///     position.clone(),
///     target,
///     position,
///     "difference",
/// )
/// .with_config(ControllerConfig::new().with_gain(0.5));
///
/// controller
///     .connect(&PotentialFunctionRegistry::with_defaults(), &JacobianRegistry::new())
///     .unwrap();
/// controller.start().unwrap();
/// controller.update().unwrap();
///
/// assert_eq!(controller.control_output().as_slice(), &[0.5, 0.5]);
/// ```
pub struct Controller {
    name: String,
    source: ResourceSource,
    potential_type: String,
    config: ControllerConfig,
    state: ControllerState,
    connect_failed: bool,
    bindings: Option<Bindings>,
    task_jacobian: DMatrix<f64>,
    jacobian_inverse: Option<DMatrix<f64>>,
    control_output: DVector<f64>,
    potential: DVector<f64>,
    potential_last: DVector<f64>,
    potential_dot: DVector<f64>,
    potential_history: VecDeque<f64>,
    potential_dot_history: VecDeque<f64>,
    cycles: usize,
    sink: Arc<dyn DiagnosticsSink>,
}

impl core::fmt::Debug for Controller {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Controller")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("potential_type", &self.potential_type)
            .field("distributed", &self.in_distributed_mode())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Controller {
    /// Creates a local-mode controller without a reference signal.
    #[must_use]
    pub fn local(
        sensor: Arc<dyn Resource>,
        effector: Arc<dyn Resource>,
        potential_type: impl Into<String>,
    ) -> Self {
        Self::new(
            ResourceSource::Local {
                sensor,
                reference: None,
                effector,
            },
            potential_type.into(),
        )
    }

    /// Creates a local-mode controller that tracks `reference`.
    #[must_use]
    pub fn local_with_reference(
        sensor: Arc<dyn Resource>,
        reference: Arc<dyn Resource>,
        effector: Arc<dyn Resource>,
        potential_type: impl Into<String>,
    ) -> Self {
        Self::new(
            ResourceSource::Local {
                sensor,
                reference: Some(reference),
                effector,
            },
            potential_type.into(),
        )
    }

    /// Creates a distributed-mode controller; resource names are resolved
    /// through `resolver` on [`connect`](Self::connect).
    #[must_use]
    pub fn distributed(
        resolver: Arc<dyn ResourceResolver>,
        sensor: impl Into<String>,
        effector: impl Into<String>,
        potential_type: impl Into<String>,
    ) -> Self {
        Self::new(
            ResourceSource::Distributed {
                resolver,
                sensor: sensor.into(),
                reference: None,
                effector: effector.into(),
            },
            potential_type.into(),
        )
    }

    /// Creates a distributed-mode controller that tracks the named reference.
    #[must_use]
    pub fn distributed_with_reference(
        resolver: Arc<dyn ResourceResolver>,
        sensor: impl Into<String>,
        reference: impl Into<String>,
        effector: impl Into<String>,
        potential_type: impl Into<String>,
    ) -> Self {
        Self::new(
            ResourceSource::Distributed {
                resolver,
                sensor: sensor.into(),
                reference: Some(reference.into()),
                effector: effector.into(),
            },
            potential_type.into(),
        )
    }

    fn new(source: ResourceSource, potential_type: String) -> Self {
        let name = format!("{}:{}", potential_type, source.effector_name());
        Self {
            name,
            source,
            potential_type,
            config: ControllerConfig::default(),
            state: ControllerState::Created,
            connect_failed: false,
            bindings: None,
            task_jacobian: DMatrix::zeros(0, 0),
            jacobian_inverse: None,
            control_output: DVector::zeros(0),
            potential: DVector::zeros(0),
            potential_last: DVector::zeros(0),
            potential_dot: DVector::zeros(0),
            potential_history: VecDeque::new(),
            potential_dot_history: VecDeque::new(),
            cycles: 0,
            sink: Arc::new(TracingSink),
        }
    }

    /// Replaces the configuration. Values are validated on [`connect`](Self::connect).
    #[must_use]
    pub fn with_config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the name used in logs and reports.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets where [`post_data`](Self::post_data) sends reports.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.sink = sink;
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Resolves resources and creates the potential function and Jacobian.
    ///
    /// Constant Jacobians are computed here, once, from the effector's current
    /// state (or zeros if the effector has not produced a value yet). A
    /// constant Jacobian that fails to compute fails the connection.
    ///
    /// # Errors
    ///
    /// - [`ControllerError::InvalidStateTransition`] unless the controller is
    ///   freshly created.
    /// - Connection, type, space, reference, and dimension errors. Any of
    ///   these leaves the controller in `Created` and unusable.
    pub fn connect(
        &mut self,
        potentials: &PotentialFunctionRegistry,
        jacobians: &JacobianRegistry,
    ) -> Result<(), ControllerError> {
        if self.state != ControllerState::Created || self.connect_failed {
            return Err(self.invalid_transition("connect"));
        }

        match self.bind(potentials, jacobians) {
            Ok((bindings, constant)) => {
                self.install(bindings, constant);
                self.state = ControllerState::Connected;
                tracing::info!(
                    controller = %self.name,
                    distributed = self.in_distributed_mode(),
                    potential_type = %self.potential_type,
                    "controller connected"
                );
                Ok(())
            }
            Err(err) => {
                self.connect_failed = true;
                tracing::warn!(
                    controller = %self.name,
                    error = %err,
                    "controller failed to connect"
                );
                Err(err)
            }
        }
    }

    fn bind(
        &self,
        potentials: &PotentialFunctionRegistry,
        jacobians: &JacobianRegistry,
    ) -> Result<(Bindings, Option<DMatrix<f64>>), ControllerError> {
        self.config.validate()?;

        let accessors = self.source.connect()?;
        accessors.check_dimensions()?;

        let potential_function =
            potentials.create(&self.potential_type, accessors.sensor.size())?;
        if potential_function.requires_reference() != self.source.has_reference() {
            return Err(ControllerError::ReferenceMismatch {
                function: self.potential_type.clone(),
                required: potential_function.requires_reference(),
            });
        }

        let shape = JacobianShape::new(
            potential_function.output_dimension(),
            accessors.effector.size(),
        );
        let jacobian = jacobians.create(
            accessors.sensor.space(),
            accessors.effector.space(),
            shape,
        )?;
        let declared = jacobian.shape();
        if declared.potential_dim != shape.potential_dim {
            return Err(ControllerError::DimensionMismatch {
                what: "jacobian rows".into(),
                expected: shape.potential_dim,
                actual: declared.potential_dim,
            });
        }
        if declared.effector_dim != shape.effector_dim {
            return Err(ControllerError::DimensionMismatch {
                what: "jacobian columns".into(),
                expected: shape.effector_dim,
                actual: declared.effector_dim,
            });
        }

        let bindings = Bindings {
            accessors,
            potential_function,
            jacobian,
            shape,
        };
        if bindings.jacobian.needs_recompute() {
            return Ok((bindings, None));
        }

        let effector_state = bindings.accessors.effector.read().unwrap_or_else(|err| {
            tracing::debug!(
                controller = %self.name,
                error = %err,
                "effector has no state yet, evaluating constant jacobian at zero"
            );
            DVector::zeros(shape.effector_dim)
        });
        let constant = bindings.compute_jacobian(&effector_state)?;
        Ok((bindings, Some(constant)))
    }

    fn install(&mut self, bindings: Bindings, constant: Option<DMatrix<f64>>) {
        let shape = bindings.shape;
        self.jacobian_inverse = None;
        match constant {
            Some(matrix) => {
                if !self.config.use_jacobian_transpose {
                    self.jacobian_inverse = Some(self.pseudo_inverse(&matrix));
                }
                self.task_jacobian = matrix;
            }
            None => {
                self.task_jacobian = DMatrix::zeros(shape.potential_dim, shape.effector_dim);
            }
        }

        self.control_output = DVector::zeros(shape.effector_dim);
        self.potential = DVector::zeros(shape.potential_dim);
        self.potential_last = DVector::zeros(shape.potential_dim);
        self.potential_dot = DVector::zeros(shape.potential_dim);
        self.bindings = Some(bindings);
    }

    /// Starts (or restarts) the controller and clears its history.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::InvalidStateTransition`] unless the
    /// controller is `Connected` or `Stopped`.
    pub fn start(&mut self) -> Result<(), ControllerError> {
        match self.state {
            ControllerState::Connected | ControllerState::Stopped => {
                self.reset_history();
                self.cycles = 0;
                self.state = ControllerState::Running;
                tracing::info!(controller = %self.name, "controller started");
                Ok(())
            }
            ControllerState::Created | ControllerState::Running => {
                Err(self.invalid_transition("start"))
            }
        }
    }

    /// Runs one control cycle.
    ///
    /// On failure nothing is committed: the previous output and potential
    /// stay readable and the controller stays `Running`.
    ///
    /// # Errors
    ///
    /// - [`ControllerError::InvalidStateTransition`] unless `Running`.
    /// - Resource read, reference, and dimension errors from this cycle.
    /// - [`ControllerError::NonFiniteCommand`] if the command is not finite.
    pub fn update(&mut self) -> Result<(), ControllerError> {
        if self.state != ControllerState::Running {
            return Err(self.invalid_transition("update"));
        }

        match self.cycle() {
            Ok(cycle) => {
                self.commit(cycle);
                tracing::debug!(
                    controller = %self.name,
                    cycle = self.cycles,
                    potential = self.potential.norm(),
                    output = ?self.control_output.as_slice(),
                    "control cycle"
                );
                Ok(())
            }
            Err(err) => {
                tracing::warn!(controller = %self.name, error = %err, "control cycle failed");
                Err(err)
            }
        }
    }

    fn cycle(&self) -> Result<Cycle, ControllerError> {
        let Some(bindings) = &self.bindings else {
            return Err(self.invalid_transition("update"));
        };
        let accessors = &bindings.accessors;

        let sigma = accessors.sensor.read()?;
        let reference = accessors.read_reference(sigma.len())?;
        let potential = bindings
            .potential_function
            .evaluate(&sigma, reference.as_ref())?;
        if potential.phi.len() != bindings.shape.potential_dim {
            return Err(ControllerError::DimensionMismatch {
                what: "potential".into(),
                expected: bindings.shape.potential_dim,
                actual: potential.phi.len(),
            });
        }

        let jacobian = if bindings.jacobian.needs_recompute() {
            let effector_state = accessors.effector.read()?;
            Some(bindings.compute_jacobian(&effector_state)?)
        } else {
            None
        };
        let current = jacobian.as_ref().unwrap_or(&self.task_jacobian);

        let gain = self.config.gain;
        let (output, inverse) = if self.config.use_jacobian_transpose {
            (current.transpose() * &potential.phi * -gain, None)
        } else {
            let inverse = match (&jacobian, &self.jacobian_inverse) {
                (None, Some(cached)) => cached.clone(),
                _ => self.pseudo_inverse(current),
            };
            (&inverse * &potential.phi * gain, Some(inverse))
        };

        if output.iter().any(|value| !value.is_finite()) {
            return Err(ControllerError::NonFiniteCommand);
        }

        Ok(Cycle {
            potential,
            jacobian,
            inverse,
            output,
        })
    }

    fn commit(&mut self, cycle: Cycle) {
        let Cycle {
            potential,
            jacobian,
            inverse,
            output,
        } = cycle;

        let magnitude = potential.magnitude();
        self.potential_last = core::mem::replace(&mut self.potential, potential.phi);
        self.potential_dot = potential.phi_dot;
        push_bounded(
            &mut self.potential_history,
            magnitude,
            self.config.history_capacity,
        );
        push_bounded(
            &mut self.potential_dot_history,
            self.potential_dot.norm(),
            self.config.history_capacity,
        );

        if let Some(matrix) = jacobian {
            self.task_jacobian = matrix;
            self.jacobian_inverse = inverse;
        } else if inverse.is_some() {
            self.jacobian_inverse = inverse;
        }

        self.control_output = output;
        self.cycles += 1;
    }

    fn pseudo_inverse(&self, matrix: &DMatrix<f64>) -> DMatrix<f64> {
        let inverse =
            damped_pseudo_inverse(matrix, self.config.singular_threshold, self.config.damping);
        if inverse.damped {
            tracing::debug!(
                controller = %self.name,
                rank = inverse.rank,
                "singular jacobian, damping pseudo-inverse"
            );
        }
        inverse.matrix
    }

    /// Stops the controller. The last output and potential stay readable.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::InvalidStateTransition`] unless `Running`.
    pub fn stop(&mut self) -> Result<(), ControllerError> {
        if self.state != ControllerState::Running {
            return Err(self.invalid_transition("stop"));
        }
        self.state = ControllerState::Stopped;
        tracing::info!(controller = %self.name, cycles = self.cycles, "controller stopped");
        Ok(())
    }

    /// Builds a report of the current state.
    #[must_use]
    pub fn report(&self) -> ControllerReport {
        ControllerReport {
            name: self.name.clone(),
            state: self.state,
            cycles: self.cycles,
            potential: self.potential.norm(),
            potential_dot: self.potential_dot.norm(),
            output: self.control_output.iter().copied().collect(),
            gain: self.config.gain,
            use_jacobian_transpose: self.config.use_jacobian_transpose,
            distributed: self.in_distributed_mode(),
        }
    }

    /// Publishes a report to the diagnostics sink.
    pub fn post_data(&self) {
        self.sink.publish(&self.report());
    }

    /// Empties both history buffers.
    pub fn reset_history(&mut self) {
        self.potential_history.clear();
        self.potential_dot_history.clear();
    }

    fn invalid_transition(&self, operation: &'static str) -> ControllerError {
        ControllerError::InvalidStateTransition {
            from: self.state,
            operation,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // State reads
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the controller name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Returns `true` if a `connect` attempt failed; such a controller can
    /// never run.
    #[must_use]
    pub fn has_failed(&self) -> bool {
        self.connect_failed
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Returns the last computed command Δτ.
    #[must_use]
    pub fn control_output(&self) -> &DVector<f64> {
        &self.control_output
    }

    /// Returns the task Jacobian used in the last cycle, or the one computed
    /// at connect time for constant Jacobians.
    #[must_use]
    pub fn task_jacobian(&self) -> &DMatrix<f64> {
        &self.task_jacobian
    }

    /// Returns the current potential φ.
    #[must_use]
    pub fn potential(&self) -> &DVector<f64> {
        &self.potential
    }

    /// Returns the potential from the cycle before the last.
    #[must_use]
    pub fn potential_last(&self) -> &DVector<f64> {
        &self.potential_last
    }

    /// Returns the current potential derivative φ̇.
    #[must_use]
    pub fn potential_dot(&self) -> &DVector<f64> {
        &self.potential_dot
    }

    /// Returns the norms of φ recorded since the last start, oldest first.
    #[must_use]
    pub fn potential_history(&self) -> &VecDeque<f64> {
        &self.potential_history
    }

    /// Returns the norms of φ̇ recorded since the last start, oldest first.
    #[must_use]
    pub fn potential_dot_history(&self) -> &VecDeque<f64> {
        &self.potential_dot_history
    }

    /// Returns the effector dimension (zero before connecting).
    #[must_use]
    pub fn output_size(&self) -> usize {
        self.control_output.len()
    }

    /// Returns the effector's space once connected.
    #[must_use]
    pub fn output_space(&self) -> Option<&str> {
        self.bindings
            .as_ref()
            .map(|bindings| bindings.accessors.effector.space())
    }

    /// Returns the effector's device name.
    ///
    /// For names of the form `/cb/<space>/<device>` this is the device
    /// segment with its leading `/`; any other name is returned whole.
    #[must_use]
    pub fn output_device_name(&self) -> String {
        let effector = self.source.effector_name();
        ResourceName::parse(effector)
            .map(|name| name.device().to_string())
            .unwrap_or_else(|_| effector.to_string())
    }

    /// Returns `true` if resources are reached through a resolver.
    #[must_use]
    pub fn in_distributed_mode(&self) -> bool {
        matches!(self.source, ResourceSource::Distributed { .. })
    }

    /// Returns the gain κ.
    #[must_use]
    pub fn gain(&self) -> f64 {
        self.config.gain
    }

    /// Sets the gain κ for subsequent cycles.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::InvalidConfig`] if `gain` is negative or not finite.
    pub fn set_gain(&mut self, gain: f64) -> Result<(), ControllerError> {
        validate_gain(gain)?;
        self.config.gain = gain;
        Ok(())
    }

    /// Returns `true` if transpose mode is active.
    #[must_use]
    pub fn using_jacobian_transpose(&self) -> bool {
        self.config.use_jacobian_transpose
    }

    /// Switches between transpose and pseudo-inverse mode for subsequent cycles.
    pub fn use_transpose(&mut self, enabled: bool) {
        self.config.use_jacobian_transpose = enabled;
    }
}

fn push_bounded(history: &mut VecDeque<f64>, value: f64, capacity: Option<usize>) {
    history.push_back(value);
    if let Some(capacity) = capacity {
        while history.len() > capacity {
            history.pop_front();
        }
    }
}

impl ControlBasisAction for Controller {
    fn name(&self) -> &str {
        &self.name
    }

    fn start_action(&mut self) -> Result<(), ControllerError> {
        self.start()
    }

    fn update_action(&mut self) -> Result<(), ControllerError> {
        self.update()
    }

    fn stop_action(&mut self) -> Result<(), ControllerError> {
        self.stop()
    }

    fn post_data(&self) {
        Controller::post_data(self);
    }

    fn is_running(&self) -> bool {
        self.state == ControllerState::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basis_resource::SharedResource;

    fn resource(name: &str, values: &[f64]) -> Arc<SharedResource> {
        Arc::new(SharedResource::with_values(
            name,
            "configuration",
            DVector::from_row_slice(values),
        ))
    }

    fn connected(gain: f64) -> (Controller, Arc<SharedResource>) {
        let sensor = resource("/cb/configuration/arm", &[1.0, 1.0]);
        let target = resource("/cb/configuration/target", &[0.0, 0.0]);
        let mut controller =
            Controller::local_with_reference(sensor.clone(), target, sensor.clone(), "difference")
                .with_config(ControllerConfig::new().with_gain(gain));
        controller
            .connect(&PotentialFunctionRegistry::with_defaults(), &JacobianRegistry::new())
            .unwrap();
        (controller, sensor)
    }

    #[test]
    fn connect_sizes_buffers() {
        let (controller, _) = connected(1.0);
        assert_eq!(controller.state(), ControllerState::Connected);
        assert_eq!(controller.output_size(), 2);
        assert_eq!(controller.potential().len(), 2);
        assert_eq!(controller.task_jacobian(), &DMatrix::identity(2, 2));
        assert_eq!(controller.output_space(), Some("configuration"));
        assert_eq!(controller.output_device_name(), "/arm");
        assert!(!controller.in_distributed_mode());
    }

    #[test]
    fn potential_last_trails_potential() {
        let (mut controller, sensor) = connected(1.0);
        controller.start().unwrap();
        controller.update().unwrap();
        sensor.set_values(DVector::from_vec(vec![0.5, 0.25])).unwrap();
        controller.update().unwrap();

        assert_eq!(controller.potential_last().as_slice(), &[1.0, 1.0]);
        assert_eq!(controller.potential().as_slice(), &[0.5, 0.25]);
        assert_eq!(controller.potential_history().len(), 2);
        assert!((controller.potential_history()[0] - 2f64.sqrt()).abs() < 1e-12);
        assert!((controller.potential_history()[1] - 0.3125f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn history_respects_capacity() {
        let sensor = resource("/cb/configuration/arm", &[1.0, 1.0]);
        let target = resource("/cb/configuration/target", &[0.0, 0.0]);
        let mut controller =
            Controller::local_with_reference(sensor.clone(), target, sensor, "difference")
                .with_config(ControllerConfig::new().with_history_capacity(3));
        controller
            .connect(&PotentialFunctionRegistry::with_defaults(), &JacobianRegistry::new())
            .unwrap();
        controller.start().unwrap();
        for _ in 0..5 {
            controller.update().unwrap();
        }

        assert_eq!(controller.potential_history().len(), 3);
        assert_eq!(controller.potential_dot_history().len(), 3);
    }

    #[test]
    fn gain_must_be_non_negative() {
        let (mut controller, _) = connected(1.0);
        assert!(controller.set_gain(-0.1).is_err());
        assert_eq!(controller.gain(), 1.0);
        controller.set_gain(0.0).unwrap();
        assert_eq!(controller.gain(), 0.0);
    }

    #[test]
    fn invalid_config_fails_connect() {
        let sensor = resource("/cb/configuration/arm", &[1.0, 1.0]);
        let target = resource("/cb/configuration/target", &[0.0, 0.0]);
        let mut controller =
            Controller::local_with_reference(sensor.clone(), target, sensor, "difference")
                .with_config(ControllerConfig::new().with_damping(-1.0));

        let err = controller
            .connect(&PotentialFunctionRegistry::with_defaults(), &JacobianRegistry::new())
            .unwrap_err();
        assert!(matches!(err, ControllerError::InvalidConfig(_)));
        assert!(controller.has_failed());
        assert_eq!(controller.state(), ControllerState::Created);
    }

    #[test]
    fn report_reflects_last_cycle() {
        let (mut controller, _) = connected(0.5);
        controller.start().unwrap();
        controller.update().unwrap();

        let report = controller.report();
        assert_eq!(report.state, ControllerState::Running);
        assert_eq!(report.cycles, 1);
        assert_eq!(report.output, vec![0.5, 0.5]);
        assert!((report.potential - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn default_name_combines_type_and_effector() {
        let (controller, _) = connected(1.0);
        assert_eq!(controller.name(), "difference:/cb/configuration/arm");
        assert_eq!(controller.with_name("reach").name(), "reach");
    }
}
