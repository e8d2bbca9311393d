//! Error taxonomy shared by the schema, model builders and the solver boundary.
//!
//! The kinds are deliberately separate types so that callers can tell a bad
//! data file from a bad solver configuration, from a solver that could not be
//! run at all, and from a solver that ran and found no optimum:
//!
//! - [`ValidationError`]: the input data is malformed or inconsistent.
//! - [`ConfigurationError`]: no usable solver is designated.
//! - [`SolverInvocationError`]: the solver could not be started, failed while
//!   talking to us, or ran out of time.
//! - [`SolveError`]: the solver finished with a non-optimal status. This is an
//!   ordinary outcome, produced on request by
//!   [`SolveResult::optimum`](crate::lp_solver::SolveResult::optimum).
//!
//! [`SolverError`] is what the adapter itself returns: everything that can go
//! wrong before or while a solver runs.

use std::{io, path::PathBuf, time::Duration};

use thiserror::Error;

use crate::lp_solver::SolveStatus;
use crate::schema::{Label, ModelKind};

/// Malformed or inconsistent input data. Always raised before a solver runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("malformed data file: {0}")]
    Malformed(String),

    #[error("missing required data `{key}`")]
    MissingData { key: String },

    #[error("type `{commodity_type}` is used in O_BY_TYPE but not declared in OTYPE")]
    UndeclaredType { commodity_type: Label },

    #[error("commodity `{commodity}` listed under type `{commodity_type}` is not declared in O")]
    UnknownCommodity {
        commodity: Label,
        commodity_type: Label,
    },

    #[error("commodity `{commodity}` is assigned to both `{first}` and `{second}`")]
    DuplicateAssignment {
        commodity: Label,
        first: Label,
        second: Label,
    },

    #[error("commodity `{commodity}` is not assigned to any type")]
    UnassignedCommodity { commodity: Label },

    #[error("label `{label}` appears more than once in set {set}")]
    DuplicateLabel { set: &'static str, label: Label },

    #[error("the period sequence T is empty")]
    EmptyPeriods,

    #[error("period `{period}` is not part of the planning horizon")]
    UnknownPeriod { period: Label },

    #[error("parameter `{table}` has an entry for undeclared index `{key}`")]
    UnknownKey { table: String, key: Label },

    #[error("the cost table is shaped for {found} data but a {expected} model was selected")]
    CostShapeMismatch {
        expected: ModelKind,
        found: ModelKind,
    },

    #[error("the data file declares schema {declared} but a {selected} model was selected")]
    SchemaMismatch {
        declared: ModelKind,
        selected: ModelKind,
    },
}

/// The run configuration does not designate a usable solver.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("no solver designated: set `solver.name` in the configuration")]
    NoSolver,

    #[error("unknown solver `{name}` (valid options: minilp, coin_cbc, glpk, cbc)")]
    UnknownSolver { name: String },

    #[error("solver `{name}` requires the `{feature}` cargo feature")]
    BackendDisabled {
        name: String,
        feature: &'static str,
    },

    #[error("solver executable `{}` does not exist", path.display())]
    ExecutableNotFound { path: PathBuf },

    #[error("solver time limit must be a positive number of seconds, got {value}")]
    InvalidTimeLimit { value: f64 },

    #[error("cannot read configuration file `{}`", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed configuration: {message}")]
    Malformed { message: String },
}

/// The solver could not be run to completion.
#[derive(Debug, Error)]
pub enum SolverInvocationError {
    #[error("failed to start solver `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("solver timed out after {:.3}s", limit.as_secs_f64())]
    TimedOut { limit: Duration },

    #[error("cannot read solver solution `{}`: {message}", path.display())]
    SolutionFile { path: PathBuf, message: String },

    #[error("solver backend failed: {0}")]
    Backend(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl SolverInvocationError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, SolverInvocationError::TimedOut { .. })
    }
}

/// Failures surfaced by [`lp_solver::solve`](crate::lp_solver::solve).
#[derive(Debug, Error)]
pub enum SolverError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Invocation(#[from] SolverInvocationError),
}

/// The solver ran but did not report an optimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("solver finished without an optimum: {status}")]
pub struct SolveError {
    pub status: SolveStatus,
}
