//! Lifecycle state machine and connection failures.


use basis_control::{
    ActionRunner, ControlBasisAction, Controller, ControllerConfig, ControllerError,
    ControllerState, MemorySink,
};
use basis_functions::{
    EvaluationError, Jacobian, JacobianRegistry, JacobianShape, PotentialFunctionRegistry,
};
use nalgebra::{DMatrix, DVector};
use std::sync::Arc;
use std::time::Duration;
use test_utils::*;

fn identity_jacobian() -> JacobianRegistry {
    constant_jacobian(DMatrix::identity(2, 2))
}

fn connected_controller() -> Controller {
    let sensor = resource(SENSOR, "task", &[1.0, 2.0]);
    let effector = resource(EFFECTOR, "joint", &[0.0, 0.0]);
    let mut controller = Controller::local(sensor, effector, "regulate");
    controller.connect(&potentials(), &identity_jacobian()).unwrap();
    controller
}

fn assert_invalid(result: Result<(), ControllerError>, from: ControllerState, operation: &str) {
    match result {
        Err(ControllerError::InvalidStateTransition {
            from: actual_from,
            operation: actual_operation,
        }) => {
            assert_eq!(actual_from, from);
            assert_eq!(actual_operation, operation);
        }
        other => panic!("expected invalid transition, got {other:?}"),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATE MACHINE
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn full_lifecycle() {
    let mut controller = connected_controller();
    assert_eq!(controller.state(), ControllerState::Connected);

    controller.start().unwrap();
    assert_eq!(controller.state(), ControllerState::Running);
    assert!(controller.is_running());

    controller.update().unwrap();
    controller.stop().unwrap();
    assert_eq!(controller.state(), ControllerState::Stopped);
    assert!(!controller.is_running());
}

#[test]
fn update_before_start_is_rejected() {
    let mut controller = connected_controller();
    assert_invalid(controller.update(), ControllerState::Connected, "update");
}

#[test]
fn update_before_connect_is_rejected() {
    let sensor = resource(SENSOR, "task", &[1.0, 2.0]);
    let effector = resource(EFFECTOR, "joint", &[0.0, 0.0]);
    let mut controller = Controller::local(sensor, effector, "regulate");

    assert_invalid(controller.update(), ControllerState::Created, "update");
    assert_invalid(controller.start(), ControllerState::Created, "start");
    assert_eq!(controller.output_size(), 0);
}

#[test]
fn update_after_stop_is_rejected_and_state_is_kept() {
    let mut controller = connected_controller();
    controller.start().unwrap();
    controller.update().unwrap();
    controller.stop().unwrap();

    let output = controller.control_output().clone();
    let potential = controller.potential().clone();
    let potential_dot = controller.potential_dot().clone();

    assert_invalid(controller.update(), ControllerState::Stopped, "update");
    assert_eq!(controller.control_output(), &output);
    assert_eq!(controller.potential(), &potential);
    assert_eq!(controller.potential_dot(), &potential_dot);
    assert_eq!(controller.potential_dot(), &vector(&[2.0, 4.0]));
}

#[test]
fn restart_after_stop_clears_history() {
    let mut controller = connected_controller();
    controller.start().unwrap();
    controller.update().unwrap();
    controller.update().unwrap();
    assert_eq!(controller.potential_history().len(), 2);
    assert_eq!(controller.potential_dot_history().len(), 2);

    controller.stop().unwrap();
    assert_eq!(controller.potential_history().len(), 2);

    controller.start().unwrap();
    assert!(controller.potential_history().is_empty());
    assert!(controller.potential_dot_history().is_empty());

    controller.update().unwrap();
    assert_eq!(controller.potential_history().len(), 1);
}

#[test]
fn double_start_and_stop_are_rejected() {
    let mut controller = connected_controller();
    assert_invalid(controller.stop(), ControllerState::Connected, "stop");

    controller.start().unwrap();
    assert_invalid(controller.start(), ControllerState::Running, "start");

    controller.stop().unwrap();
    assert_invalid(controller.stop(), ControllerState::Stopped, "stop");
}

#[test]
fn connect_twice_is_rejected() {
    let mut controller = connected_controller();
    assert_invalid(
        controller.connect(&potentials(), &identity_jacobian()),
        ControllerState::Connected,
        "connect",
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONNECTION FAILURES
// ═══════════════════════════════════════════════════════════════════════════════

fn assert_terminal(controller: &mut Controller) {
    assert_eq!(controller.state(), ControllerState::Created);
    assert!(controller.has_failed());
    assert_invalid(controller.start(), ControllerState::Created, "start");
    assert_invalid(
        controller.connect(&potentials(), &identity_jacobian()),
        ControllerState::Created,
        "connect",
    );
}

#[test]
fn unknown_potential_type_is_terminal() {
    let sensor = resource(SENSOR, "task", &[1.0, 2.0]);
    let effector = resource(EFFECTOR, "joint", &[0.0, 0.0]);
    let mut controller = Controller::local(sensor, effector, "squared_error");

    assert_eq!(
        controller.connect(&potentials(), &identity_jacobian()),
        Err(ControllerError::UnknownPotentialFunctionType(
            "squared_error".into()
        ))
    );
    assert_terminal(&mut controller);
}

#[test]
fn unsupported_space_pair_is_terminal() {
    let sensor = resource(SENSOR, "task", &[1.0, 2.0]);
    let effector = resource(EFFECTOR, "joint", &[0.0, 0.0]);
    let mut controller = Controller::local(sensor, effector, "regulate");

    assert_eq!(
        controller.connect(&potentials(), &JacobianRegistry::new()),
        Err(ControllerError::UnsupportedSpacePair {
            input: "task".into(),
            output: "joint".into(),
        })
    );
    assert_terminal(&mut controller);
}

#[test]
fn missing_reference_is_terminal() {
    let sensor = resource("/cb/configuration/arm", "configuration", &[1.0, 1.0]);
    let mut controller = Controller::local(sensor.clone(), sensor, "difference");

    let err = controller
        .connect(&PotentialFunctionRegistry::with_defaults(), &JacobianRegistry::new())
        .unwrap_err();
    assert_eq!(
        err,
        ControllerError::ReferenceMismatch {
            function: "difference".into(),
            required: true,
        }
    );
    assert_eq!(controller.state(), ControllerState::Created);
    assert!(controller.has_failed());
}

#[test]
fn unexpected_reference_is_terminal() {
    let sensor = resource(SENSOR, "task", &[1.0, 2.0]);
    let target = resource("/cb/task/target", "task", &[0.0, 0.0]);
    let effector = resource(EFFECTOR, "joint", &[0.0, 0.0]);
    let mut controller = Controller::local_with_reference(sensor, target, effector, "regulate");

    assert!(matches!(
        controller.connect(&potentials(), &identity_jacobian()),
        Err(ControllerError::ReferenceMismatch {
            required: false,
            ..
        })
    ));
    assert_terminal(&mut controller);
}

#[test]
fn reference_dimension_mismatch_is_terminal() {
    let sensor = resource("/cb/configuration/arm", "configuration", &[1.0, 1.0]);
    let target = resource("/cb/configuration/target", "configuration", &[0.0, 0.0, 0.0]);
    let mut controller =
        Controller::local_with_reference(sensor.clone(), target, sensor, "difference");

    assert!(matches!(
        controller.connect(&PotentialFunctionRegistry::with_defaults(), &JacobianRegistry::new()),
        Err(ControllerError::DimensionMismatch {
            expected: 2,
            actual: 3,
            ..
        })
    ));
    assert!(controller.has_failed());
}

#[test]
fn wrongly_shaped_constant_jacobian_is_terminal() {
    let sensor = resource(SENSOR, "task", &[1.0, 2.0]);
    let effector = resource(EFFECTOR, "joint", &[0.0, 0.0]);
    let mut controller = Controller::local(sensor, effector, "regulate");

    let err = controller
        .connect(&potentials(), &constant_jacobian(DMatrix::identity(3, 2)))
        .unwrap_err();
    assert!(matches!(
        err,
        ControllerError::DimensionMismatch { ref what, expected: 2, actual: 3 } if what == "jacobian rows"
    ));
    assert_terminal(&mut controller);
}

/// Constant Jacobian whose evaluation always fails.
struct UnevaluableJacobian {
    shape: JacobianShape,
}

impl Jacobian for UnevaluableJacobian {
    fn input_space(&self) -> &str {
        "task"
    }

    fn output_space(&self) -> &str {
        "joint"
    }

    fn shape(&self) -> JacobianShape {
        self.shape
    }

    fn needs_recompute(&self) -> bool {
        false
    }

    fn compute(&self, effector_state: &DVector<f64>) -> Result<DMatrix<f64>, EvaluationError> {
        Err(EvaluationError::DimensionMismatch {
            what: "effector state",
            expected: self.shape.effector_dim + 1,
            actual: effector_state.len(),
        })
    }
}

#[test]
fn failing_constant_jacobian_is_terminal() {
    let sensor = resource(SENSOR, "task", &[1.0, 2.0]);
    let effector = resource(EFFECTOR, "joint", &[0.0, 0.0]);
    let mut jacobians = JacobianRegistry::new();
    jacobians.register("task", "joint", |shape: JacobianShape| {
        Box::new(UnevaluableJacobian { shape })
    });
    let mut controller = Controller::local(sensor, effector, "regulate");

    let err = controller.connect(&potentials(), &jacobians).unwrap_err();
    assert!(matches!(
        err,
        ControllerError::DimensionMismatch { ref what, expected: 3, actual: 2 } if what == "effector state"
    ));
    assert_terminal(&mut controller);
}

// ═══════════════════════════════════════════════════════════════════════════════
// DIAGNOSTICS AND RUNNER
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn post_data_publishes_report() {
    let sink = Arc::new(MemorySink::new());
    let sensor = resource(SENSOR, "task", &[1.0, 0.0]);
    let effector = resource(EFFECTOR, "joint", &[0.0, 0.0]);
    let mut controller = Controller::local(sensor, effector, "regulate")
        .with_name("hold")
        .with_config(ControllerConfig::new().with_gain(0.5))
        .with_sink(sink.clone());
    controller.connect(&potentials(), &identity_jacobian()).unwrap();
    controller.start().unwrap();
    controller.update().unwrap();

    ControlBasisAction::post_data(&controller);

    let report = sink.last().unwrap();
    assert_eq!(report.name, "hold");
    assert_eq!(report.state, ControllerState::Running);
    assert_eq!(report.output, vec![0.5, 0.0]);
    assert_eq!(report.cycles, 1);
    assert!(!report.distributed);
}

#[test]
fn runner_drives_controller() {
    let sink = Arc::new(MemorySink::new());
    let sensor = resource(SENSOR, "task", &[1.0, 2.0]);
    let effector = resource(EFFECTOR, "joint", &[0.0, 0.0]);
    let mut controller = Controller::local(sensor, effector, "regulate").with_sink(sink.clone());
    controller.connect(&potentials(), &identity_jacobian()).unwrap();

    let stats = ActionRunner::new(Duration::ZERO)
        .with_post_every(2)
        .run_cycles(&mut controller, 6)
        .unwrap();

    assert_eq!(stats.cycles, 6);
    assert_eq!(stats.failed_cycles, 0);
    assert_eq!(controller.state(), ControllerState::Running);
    assert_eq!(controller.potential_history().len(), 6);
    assert_eq!(sink.len(), 3);
}

#[test]
fn runner_reports_start_failure() {
    let sensor = resource(SENSOR, "task", &[1.0, 2.0]);
    let effector = resource(EFFECTOR, "joint", &[0.0, 0.0]);
    let mut controller = Controller::local(sensor, effector, "regulate");

    let err = ActionRunner::new(Duration::ZERO)
        .run_cycles(&mut controller, 3)
        .unwrap_err();
    assert!(matches!(err, ControllerError::InvalidStateTransition { .. }));
}
