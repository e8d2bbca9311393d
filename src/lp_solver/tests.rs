use std::path::PathBuf;
use std::time::Duration;

use super::*;
use crate::constraint;
use crate::lp_model_builder;

fn minilp_config() -> SolverConfig {
    SolverConfig {
        name: Some("minilp".to_string()),
        ..SolverConfig::default()
    }
}

#[test]
fn test_constraint_normalisation() {
    let mut builder = lp_model_builder!();
    let x = builder.add_variable("x", 0.0, 10.0);
    let y = builder.add_variable("y", 0.0, 10.0);

    let c = constraint!("merged", (x + 2.0 * y - x * 3.0 + 5.0 + y * 0.0 - y * 2.0) <= 9.0);
    assert_eq!(c.rhs(), 4.0);
    assert_eq!(c.expression().terms.len(), 1);
    assert_eq!(c.coefficient(x), -2.0);
    assert_eq!(c.coefficient(y), 0.0);
    assert_eq!(c.expression().constant, 0.0);
}

#[test]
fn test_constraint_violation() {
    let mut builder = lp_model_builder!();
    let x = builder.add_variable("x", 0.0, 10.0);

    let le = Constraint::le("le", x, 4.0);
    let eq = Constraint::eq("eq", x, 4.0);
    let ge = Constraint::ge("ge", x, 4.0);

    assert_eq!(le.violation(&[5.0]), 1.0);
    assert_eq!(le.violation(&[3.0]), 0.0);
    assert_eq!(eq.violation(&[3.0]), 1.0);
    assert_eq!(ge.violation(&[3.0]), 1.0);
    assert_eq!(ge.violation(&[5.0]), 0.0);
}

#[test]
fn test_build_is_deterministic() {
    let make = || {
        let mut builder = LPModelBuilder::<()>::new();
        let x = builder.add_variable("x", 0.0, f64::INFINITY);
        let y = builder.add_variable("y", 0.0, f64::INFINITY);
        builder.add_constraint(constraint!("cap", (x + y) <= 10.0));
        builder.set_objective(x + y, OptimisationSense::Maximise);
        builder.build()
    };
    assert_eq!(make(), make());
}

#[test]
fn test_formulation_without_objective_minimises_zero() {
    let mut builder = lp_model_builder!();
    builder.add_variable("x", 0.0, 1.0);
    let formulation = builder.build();
    assert_eq!(formulation.objective().sense, OptimisationSense::Minimise);
    assert!(formulation.objective().expression.is_constant());
}

#[test]
fn test_max_violation_includes_bounds() {
    let mut builder = lp_model_builder!();
    let x = builder.add_variable("x", 0.0, 5.0);
    builder.add_constraint(constraint!("cap", (x) <= 10.0));
    let formulation = builder.build();

    assert_eq!(formulation.max_violation(&[3.0]), 0.0);
    assert_eq!(formulation.max_violation(&[7.0]), 2.0);
    assert_eq!(formulation.max_violation(&[-1.0]), 1.0);
}

#[test]
fn test_missing_solver_name_is_a_configuration_error() {
    let mut builder = lp_model_builder!();
    builder.add_variable("x", 0.0, 1.0);
    let formulation = builder.build();

    for name in [None, Some(String::new()), Some("   ".to_string())] {
        let config = SolverConfig {
            name,
            ..SolverConfig::default()
        };
        let err = solve(&formulation, &config).unwrap_err();
        assert!(matches!(
            err,
            SolverError::Configuration(ConfigurationError::NoSolver)
        ));
    }
}

#[test]
fn test_backend_resolution() {
    let config = |name: &str| SolverConfig {
        name: Some(name.to_string()),
        ..SolverConfig::default()
    };

    assert_eq!(
        SolverBackend::from_config(&config("glpsol")).unwrap(),
        SolverBackend::Glpk
    );
    assert_eq!(
        SolverBackend::from_config(&config("CBC")).unwrap(),
        SolverBackend::Cbc
    );
    assert!(matches!(
        SolverBackend::from_config(&config("simplex-9000")),
        Err(ConfigurationError::UnknownSolver { .. })
    ));
}

#[cfg(not(feature = "coin_cbc"))]
#[test]
fn test_disabled_backend_is_reported() {
    let config = SolverConfig {
        name: Some("coin_cbc".to_string()),
        ..SolverConfig::default()
    };
    assert!(matches!(
        SolverBackend::from_config(&config),
        Err(ConfigurationError::BackendDisabled {
            feature: "coin_cbc",
            ..
        })
    ));
}

#[test]
fn test_explicit_executable_must_exist() {
    let config = SolverConfig {
        name: Some("glpk".to_string()),
        executable: Some(PathBuf::from("/nonexistent/bin/glpsol")),
        time_limit: None,
    };
    assert!(matches!(
        SolverBackend::from_config(&config),
        Err(ConfigurationError::ExecutableNotFound { .. })
    ));

    // Bare names are resolved on PATH when spawning.
    let bare = SolverConfig {
        executable: Some(PathBuf::from("glpsol")),
        ..config
    };
    assert_eq!(SolverBackend::from_config(&bare).unwrap(), SolverBackend::Glpk);
}

#[test]
fn test_zero_time_limit_is_rejected() {
    let config = SolverConfig {
        name: Some("cbc".to_string()),
        executable: None,
        time_limit: Some(Duration::ZERO),
    };
    assert!(matches!(
        SolverBackend::from_config(&config),
        Err(ConfigurationError::InvalidTimeLimit { .. })
    ));
}

#[test]
fn test_violated_constant_row_is_infeasible_without_solver() {
    let mut builder = lp_model_builder!();
    let x = builder.add_variable("x", 0.0, 1.0);
    builder.add_constraint(constraint!("window", (LinearExpression::new(3.0)) >= 6.0));
    builder.set_objective(x.into(), OptimisationSense::Maximise);
    let formulation = builder.build();

    // An external solver that does not exist is never spawned.
    let config = SolverConfig {
        name: Some("glpk".to_string()),
        executable: Some(PathBuf::from("blendplan-missing-glpsol")),
        time_limit: None,
    };
    let result = solve(&formulation, &config).unwrap();
    assert_eq!(result.status, SolveStatus::Infeasible);
    assert!(result.objective_value.is_none());
    assert!(result.values().is_none());
    assert!(result.log.contains("window"));
    assert!(matches!(
        result.optimum(),
        Err(SolveError {
            status: SolveStatus::Infeasible
        })
    ));
}

#[cfg(feature = "minilp")]
mod minilp_backend {
    use super::*;

    #[test]
    fn test_small_maximisation() {
        let mut builder = lp_model_builder!(Production);
        let x = builder.add_variable("x", 0.0, f64::INFINITY);
        let y = builder.add_variable("y", 0.0, f64::INFINITY);
        builder.add_constraint(constraint!("capacity", (x + y) <= 100.0));
        builder.add_constraint(constraint!("ratio", (x - 2.0 * y) <= 0.0));
        builder.set_objective(40.0 * x + 30.0 * y, OptimisationSense::Maximise);
        let formulation = builder.build();

        let result = solve(&formulation, &minilp_config()).unwrap();
        assert!(result.is_optimal());
        let objective = result.optimum().unwrap();
        assert!((objective - 3666.6667).abs() < 1e-3, "objective {objective}");
        assert!((result.get_value(x).unwrap() - 66.6667).abs() < 1e-3);
        assert!((result.get_value(y).unwrap() - 33.3333).abs() < 1e-3);
        assert!(formulation.max_violation(result.values().unwrap()) < 1e-6);
    }

    #[test]
    fn test_satisfied_constant_rows_are_dropped() {
        let mut builder = lp_model_builder!();
        let x = builder.add_variable("x", 0.0, 4.0);
        builder.add_constraint(constraint!("window", (LinearExpression::new(6.0)) >= 3.0));
        builder.set_objective(x.into(), OptimisationSense::Maximise);

        let result = solve(&builder.build(), &minilp_config()).unwrap();
        assert_eq!(result.optimum().unwrap(), 4.0);
    }

    #[test]
    fn test_infeasible_model() {
        let mut builder = lp_model_builder!();
        let x = builder.add_variable("x", 0.0, f64::INFINITY);
        builder.add_constraint(constraint!("low", (x) <= 1.0));
        builder.add_constraint(constraint!("high", (x) >= 2.0));
        builder.set_objective(x.into(), OptimisationSense::Minimise);

        let result = solve(&builder.build(), &minilp_config()).unwrap();
        assert_eq!(result.status, SolveStatus::Infeasible);
        assert!(result.get_value(x).is_none());
    }

    #[test]
    fn test_unbounded_model() {
        let mut builder = lp_model_builder!();
        let x = builder.add_variable("x", 0.0, f64::INFINITY);
        let y = builder.add_variable("y", 0.0, f64::INFINITY);
        builder.add_constraint(constraint!("gap", (x - y) <= 1.0));
        builder.set_objective(x + y, OptimisationSense::Maximise);

        let result = solve(&builder.build(), &minilp_config()).unwrap();
        assert_eq!(result.status, SolveStatus::Unbounded);
        assert!(result.objective_value.is_none());
    }

    #[test]
    fn test_generous_time_limit_runs_on_worker() {
        let mut builder = lp_model_builder!();
        let x = builder.add_variable("x", 0.0, 8.0);
        builder.set_objective(x.into(), OptimisationSense::Maximise);

        let config = SolverConfig {
            time_limit: Some(Duration::from_secs(30)),
            ..minilp_config()
        };
        let result = solve(&builder.build(), &config).unwrap();
        assert_eq!(result.optimum().unwrap(), 8.0);
    }
}

#[test]
fn test_log_tail() {
    let log = "presolve\nrow 1\nrow 2\nstopped\n\n";
    assert_eq!(log_tail(log, 2), "row 2\nstopped");
    assert_eq!(log_tail(log, 10), "presolve\nrow 1\nrow 2\nstopped");
    assert_eq!(log_tail(log, 0), "");
    assert_eq!(log_tail("", 3), "");
    assert_eq!(log_tail("single line", 1), "single line");
}

fn sleeping_backend(
    delay: Duration,
) -> impl FnOnce(&Formulation<()>) -> Result<RawOutcome, SolverInvocationError> + Send + 'static {
    move |_| {
        std::thread::sleep(delay);
        Ok(RawOutcome {
            status: SolveStatus::Infeasible,
            values: None,
            log: "stopped\n".to_string(),
        })
    }
}

#[test]
fn test_worker_timeout_is_reported() {
    let formulation = LPModelBuilder::<()>::new().build();
    let limit = Duration::from_millis(10);
    let err = run_in_process(
        formulation,
        Some(limit),
        Duration::ZERO,
        sleeping_backend(Duration::from_millis(500)),
    )
    .unwrap_err();
    assert!(err.is_timeout());
    assert!(matches!(err, SolverInvocationError::TimedOut { limit: reported } if reported == limit));
}

#[test]
fn test_self_limited_backend_result_is_awaited_within_grace() {
    // The backend returns after its limit but inside the grace period, as a
    // solver that checks its own clock does.
    let formulation = LPModelBuilder::<()>::new().build();
    let outcome = run_in_process(
        formulation,
        Some(Duration::from_millis(20)),
        Duration::from_secs(5),
        sleeping_backend(Duration::from_millis(100)),
    )
    .unwrap();
    assert_eq!(outcome.status, SolveStatus::Infeasible);
    assert_eq!(outcome.log, "stopped\n");
}

#[test]
fn test_backend_overrunning_grace_is_abandoned() {
    let formulation = LPModelBuilder::<()>::new().build();
    let started = std::time::Instant::now();
    let err = run_in_process(
        formulation,
        Some(Duration::from_millis(10)),
        Duration::from_millis(40),
        sleeping_backend(Duration::from_secs(2)),
    )
    .unwrap_err();
    assert!(err.is_timeout());
    assert!(started.elapsed() < Duration::from_secs(2));
}
