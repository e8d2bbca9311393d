//! Linear Programming (LP) modelling kernel and solver boundary
//!
//! This module provides the pieces every blending model is assembled from,
//! and the single entry point, [`solve`], through which a finished model is
//! handed to a solver backend.
//!
//! # Building a Formulation
//!
//! An [`LPModelBuilder`] collects named variables, named constraints and an
//! objective. [`LPModelBuilder::build`] freezes it into a [`Formulation`],
//! which is never mutated afterwards:
//!
//! ```rust
//! use blendplan::constraint;
//! use blendplan::lp_model_builder;
//! use blendplan::lp_solver::OptimisationSense;
//!
//! let mut builder = lp_model_builder!(Blend);
//! let x = builder.add_variable("x", 0.0, f64::INFINITY);
//! let y = builder.add_variable("y", 0.0, f64::INFINITY);
//!
//! builder.add_constraint(constraint!("capacity", (x + y) <= 100.0));
//! builder.add_constraint(constraint!("ratio", (x - 2.0 * y) <= 0.0));
//! builder.set_objective(40.0 * x + 30.0 * y, OptimisationSense::Maximise);
//!
//! let formulation = builder.build();
//! assert_eq!(formulation.num_variables(), 2);
//! assert!(formulation.constraint_named("capacity").is_some());
//! ```
//!
//! # Type Safety with Branded Types
//!
//! [`VariableId`], [`LinearExpression`], [`Constraint`], [`Formulation`] and
//! [`SolveResult`] carry a zero-sized `Brand` type parameter. A variable from
//! one model cannot be used in the constraints of another, and a solution can
//! only be queried with ids of the formulation it was solved from. The blending
//! models use the public brands [`SinglePeriod`](crate::model::SinglePeriod)
//! and [`MultiPeriod`](crate::model::MultiPeriod); ad-hoc models can use the
//! [`lp_model_builder!`](crate::lp_model_builder) macro.
//!
//! Constraints are normalised on construction: the expression's constant is
//! moved to the right-hand side and repeated variables are merged. A
//! constraint with no variable terms left is a *constant row*; the adapter
//! evaluates those itself before any solver is invoked.
//!
//! # Solver Selection
//!
//! [`SolverConfig::name`] selects the backend:
//! - `"minilp"` - pure-Rust simplex, in process (requires `minilp` feature, on by default)
//! - `"coin_cbc"` or `"coin-cbc"` - COIN-OR CBC library, in process (requires `coin_cbc` feature)
//! - `"glpk"` or `"glpsol"` - GLPK `glpsol` executable
//! - `"cbc"` - COIN-OR CBC executable
//!
//! Executables are resolved from [`SolverConfig::executable`] or, if absent,
//! by name on `PATH`. When [`SolverConfig::time_limit`] is set the call is
//! bounded: child processes are killed, CBC stops on its own `sec` limit,
//! minilp solves are abandoned, and [`SolverInvocationError::TimedOut`] is
//! returned.

use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{ConfigurationError, SolveError, SolverError, SolverInvocationError};

/// Tolerance used when evaluating constant rows and constraint violations.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// Constraint sense for linear constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintSense {
    /// Less than or equal to (≤)
    LessEqual,
    /// Equal to (=)
    Equal,
    /// Greater than or equal to (≥)
    GreaterEqual,
}

impl fmt::Display for ConstraintSense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintSense::LessEqual => write!(f, "<="),
            ConstraintSense::Equal => write!(f, "="),
            ConstraintSense::GreaterEqual => write!(f, ">="),
        }
    }
}

/// Optimisation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimisationSense {
    /// Minimise the objective function
    Minimise,
    /// Maximise the objective function
    Maximise,
}

/// Terminal status of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    /// Optimal solution found
    Optimal,
    /// No assignment satisfies every constraint
    Infeasible,
    /// The objective can be improved without limit
    Unbounded,
    /// The solver stopped without a usable answer
    Error,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "optimal"),
            SolveStatus::Infeasible => write!(f, "infeasible"),
            SolveStatus::Unbounded => write!(f, "unbounded"),
            SolveStatus::Error => write!(f, "error"),
        }
    }
}

/// A linear expression term: coefficient * variable
#[derive(Debug, Clone, PartialEq)]
pub struct LinearTerm<Brand> {
    pub coefficient: f64,
    pub variable: VariableId<Brand>,
}

/// A linear expression: sum of terms plus constant
#[derive(Debug, Clone, PartialEq)]
pub struct LinearExpression<Brand> {
    pub terms: Vec<LinearTerm<Brand>>,
    pub constant: f64,
}

impl<Brand> LinearExpression<Brand> {
    /// Create a new linear expression with a constant term
    pub fn new(constant: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant,
        }
    }

    /// Add a term to the expression
    pub fn add_term(&mut self, coefficient: f64, variable: VariableId<Brand>) {
        self.terms.push(LinearTerm {
            coefficient,
            variable,
        });
    }

    /// Create a linear expression from a single variable
    pub fn from_variable(variable: VariableId<Brand>) -> Self {
        Self {
            terms: vec![LinearTerm {
                coefficient: 1.0,
                variable,
            }],
            constant: 0.0,
        }
    }

    /// Σ coefficient * variable over the given pairs.
    pub fn weighted_sum(pairs: impl IntoIterator<Item = (f64, VariableId<Brand>)>) -> Self {
        let mut expression = Self::new(0.0);
        for (coefficient, variable) in pairs {
            expression.add_term(coefficient, variable);
        }
        expression
    }

    /// Merge repeated variables (first occurrence keeps its position) and drop
    /// zero coefficients.
    pub fn simplified(self) -> Self {
        let mut terms: Vec<LinearTerm<Brand>> = Vec::with_capacity(self.terms.len());
        for term in self.terms {
            match terms.iter_mut().find(|t| t.variable == term.variable) {
                Some(existing) => existing.coefficient += term.coefficient,
                None => terms.push(term),
            }
        }
        terms.retain(|t| t.coefficient != 0.0);
        Self {
            terms,
            constant: self.constant,
        }
    }

    /// Value of the expression for a full assignment of variable values.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|t| t.coefficient * values.get(t.variable.id).copied().unwrap_or(0.0))
            .sum::<f64>()
            + self.constant
    }

    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }
}

impl<Brand> From<VariableId<Brand>> for LinearExpression<Brand> {
    fn from(variable: VariableId<Brand>) -> Self {
        Self::from_variable(variable)
    }
}

impl<Brand> From<f64> for LinearExpression<Brand> {
    fn from(constant: f64) -> Self {
        Self::new(constant)
    }
}

/// Unique identifier for a variable in the LP model
///
/// The `Brand` type parameter ensures that variables can only be used with the
/// builder that created them. This is enforced at compile time.
pub struct VariableId<Brand> {
    id: usize,
    _brand: PhantomData<fn() -> Brand>,
}

impl<Brand> VariableId<Brand> {
    fn new(id: usize) -> Self {
        Self {
            id,
            _brand: PhantomData,
        }
    }

    /// Position of the variable in [`Formulation::variables`].
    pub fn index(self) -> usize {
        self.id
    }
}

// Manual trait implementations that don't require Brand to implement anything
impl<Brand> std::fmt::Debug for VariableId<Brand> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariableId").field("id", &self.id).finish()
    }
}

impl<Brand> Clone for VariableId<Brand> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Brand> Copy for VariableId<Brand> {}

impl<Brand> PartialEq for VariableId<Brand> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<Brand> Eq for VariableId<Brand> {}

impl<Brand> std::hash::Hash for VariableId<Brand> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Unique identifier for a constraint in the LP model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintId(usize);

/// A named linear constraint `expression (sense) rhs`.
///
/// # Examples
///
/// ```rust
/// use blendplan::constraint;
/// use blendplan::lp_model_builder;
/// use blendplan::lp_solver::{Constraint, ConstraintSense};
///
/// let mut builder = lp_model_builder!();
/// let x = builder.add_variable("x", 0.0, 10.0);
/// let y = builder.add_variable("y", 0.0, 10.0);
///
/// // Using the constraint! macro (recommended)
/// let c = constraint!("sum", (x + y) == 10.0);
///
/// // Using the constructor directly
/// let c2 = Constraint::new("sum", x + y, ConstraintSense::Equal, 10.0);
/// assert_eq!(c, c2);
///
/// // Constants move to the right-hand side
/// let c3 = constraint!("shifted", (x + 4.0) <= 10.0);
/// assert_eq!(c3.rhs(), 6.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint<Brand> {
    name: Arc<str>,
    expression: LinearExpression<Brand>,
    sense: ConstraintSense,
    rhs: f64,
}

impl<Brand> Constraint<Brand> {
    /// Create a new constraint
    pub fn new(
        name: impl Into<Arc<str>>,
        expression: impl Into<LinearExpression<Brand>>,
        sense: ConstraintSense,
        rhs: f64,
    ) -> Self {
        let mut expression = expression.into().simplified();
        let rhs = rhs - expression.constant;
        expression.constant = 0.0;
        Self {
            name: name.into(),
            expression,
            sense,
            rhs,
        }
    }

    /// Create an equality constraint: expression == rhs
    pub fn eq(name: impl Into<Arc<str>>, expression: impl Into<LinearExpression<Brand>>, rhs: f64) -> Self {
        Self::new(name, expression, ConstraintSense::Equal, rhs)
    }

    /// Create a less-than-or-equal constraint: expression <= rhs
    pub fn le(name: impl Into<Arc<str>>, expression: impl Into<LinearExpression<Brand>>, rhs: f64) -> Self {
        Self::new(name, expression, ConstraintSense::LessEqual, rhs)
    }

    /// Create a greater-than-or-equal constraint: expression >= rhs
    pub fn ge(name: impl Into<Arc<str>>, expression: impl Into<LinearExpression<Brand>>, rhs: f64) -> Self {
        Self::new(name, expression, ConstraintSense::GreaterEqual, rhs)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expression(&self) -> &LinearExpression<Brand> {
        &self.expression
    }

    pub fn sense(&self) -> ConstraintSense {
        self.sense
    }

    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    /// Coefficient of `variable` in the (normalised) left-hand side.
    pub fn coefficient(&self, variable: VariableId<Brand>) -> f64 {
        self.expression
            .terms
            .iter()
            .filter(|t| t.variable == variable)
            .map(|t| t.coefficient)
            .sum()
    }

    /// How far the assignment is from satisfying this constraint (0 when satisfied).
    pub fn violation(&self, values: &[f64]) -> f64 {
        let lhs = self.expression.evaluate(values);
        match self.sense {
            ConstraintSense::LessEqual => (lhs - self.rhs).max(0.0),
            ConstraintSense::Equal => (lhs - self.rhs).abs(),
            ConstraintSense::GreaterEqual => (self.rhs - lhs).max(0.0),
        }
    }
}

/// Variable information stored in the model
#[derive(Debug, Clone, PartialEq)]
pub struct VariableInfo {
    pub name: String,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// Objective function information
#[derive(Debug, Clone, PartialEq)]
pub struct Objective<Brand> {
    pub expression: LinearExpression<Brand>,
    pub sense: OptimisationSense,
}

/// A complete, immutable LP: variables, objective and named constraints.
///
/// Produced by [`LPModelBuilder::build`] and handed whole to [`solve`].
#[derive(Debug, Clone, PartialEq)]
pub struct Formulation<Brand> {
    variables: Vec<VariableInfo>,
    constraints: Vec<Constraint<Brand>>,
    objective: Objective<Brand>,
}

impl<Brand> Formulation<Brand> {
    pub fn variables(&self) -> &[VariableInfo] {
        &self.variables
    }

    pub fn variable(&self, id: VariableId<Brand>) -> &VariableInfo {
        &self.variables[id.id]
    }

    pub fn constraints(&self) -> &[Constraint<Brand>] {
        &self.constraints
    }

    pub fn constraint(&self, id: ConstraintId) -> &Constraint<Brand> {
        &self.constraints[id.0]
    }

    pub fn constraint_named(&self, name: &str) -> Option<&Constraint<Brand>> {
        self.constraints.iter().find(|c| c.name() == name)
    }

    pub fn objective(&self) -> &Objective<Brand> {
        &self.objective
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Largest constraint or bound violation of a full assignment.
    pub fn max_violation(&self, values: &[f64]) -> f64 {
        let bounds = self.variables.iter().zip(values).map(|(v, &x)| {
            (v.lower_bound - x).max(0.0).max(x - v.upper_bound)
        });
        self.constraints
            .iter()
            .map(|c| c.violation(values))
            .chain(bounds)
            .fold(0.0, f64::max)
    }
}

/// Result of handing a [`Formulation`] to a solver.
///
/// The objective value and variable values are present iff the status is
/// [`SolveStatus::Optimal`]. `log` holds whatever the solver printed; it is
/// kept for diagnostics and never parsed for correctness.
#[derive(Debug, Clone)]
pub struct SolveResult<Brand> {
    pub status: SolveStatus,
    pub objective_value: Option<f64>,
    variable_values: Option<Vec<f64>>,
    pub log: String,
    _brand: PhantomData<fn() -> Brand>,
}

impl<Brand> SolveResult<Brand> {
    fn without_solution(status: SolveStatus, log: String) -> Self {
        Self {
            status,
            objective_value: None,
            variable_values: None,
            log,
            _brand: PhantomData,
        }
    }

    /// Get the value of a variable from the solution
    pub fn get_value(&self, var_id: VariableId<Brand>) -> Option<f64> {
        self.variable_values.as_ref()?.get(var_id.id).copied()
    }

    /// All variable values, indexed like [`Formulation::variables`].
    pub fn values(&self) -> Option<&[f64]> {
        self.variable_values.as_deref()
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolveStatus::Optimal
    }

    /// The last `lines` lines of the solver output.
    pub fn log_tail(&self, lines: usize) -> &str {
        log_tail(&self.log, lines)
    }

    /// The optimal objective value, or the non-optimal status as an error.
    pub fn optimum(&self) -> Result<f64, SolveError> {
        match (self.status, self.objective_value) {
            (SolveStatus::Optimal, Some(value)) => Ok(value),
            (status, _) => Err(SolveError { status }),
        }
    }
}

/// The last `lines` lines of a solver log, trailing whitespace removed.
pub fn log_tail(log: &str, lines: usize) -> &str {
    let log = log.trim_end();
    if lines == 0 {
        return "";
    }
    match log.rmatch_indices('\n').nth(lines - 1) {
        Some((newline, _)) => &log[newline + 1..],
        None => log,
    }
}

/// What a backend reports before the adapter attaches the brand and objective.
#[derive(Debug)]
struct RawOutcome {
    status: SolveStatus,
    values: Option<Vec<f64>>,
    log: String,
}

/// Builder for LP models
///
/// The `Brand` type parameter ensures type safety - variables from one builder
/// cannot be accidentally used with another builder. This is enforced at compile time.
///
/// # Examples
///
/// ```rust
/// use blendplan::lp_model_builder;
/// use blendplan::lp_solver::LPModelBuilder;
///
/// // Each builder has its own brand
/// #[derive(Debug, Clone, PartialEq)]
/// struct MyModel;
/// let mut builder1 = LPModelBuilder::<MyModel>::new();
///
/// // Variables are branded with the builder type
/// let x = builder1.add_variable("x", 0.0, 10.0);
///
/// // For simple cases, use the macro to create a unique brand
/// let mut builder2 = lp_model_builder!();
/// ```
pub struct LPModelBuilder<Brand> {
    variables: Vec<VariableInfo>,
    constraints: Vec<Constraint<Brand>>,
    objective: Option<Objective<Brand>>,
    _brand: PhantomData<fn() -> Brand>,
}

impl<Brand> LPModelBuilder<Brand> {
    /// Create a new LP model builder
    pub fn new() -> Self {
        Self {
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: None,
            _brand: PhantomData,
        }
    }

    /// Add a continuous variable to the model
    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        lower_bound: f64,
        upper_bound: f64,
    ) -> VariableId<Brand> {
        let var_id = VariableId::new(self.variables.len());
        self.variables.push(VariableInfo {
            name: name.into(),
            lower_bound,
            upper_bound,
        });
        var_id
    }

    /// Add a constraint to the model
    pub fn add_constraint(&mut self, constraint: Constraint<Brand>) -> ConstraintId {
        let constr_id = ConstraintId(self.constraints.len());
        self.constraints.push(constraint);
        constr_id
    }

    /// Set the objective function
    pub fn set_objective(&mut self, expression: LinearExpression<Brand>, sense: OptimisationSense) {
        self.objective = Some(Objective {
            expression: expression.simplified(),
            sense,
        });
    }

    /// Freeze the model. A model without an objective minimises zero.
    pub fn build(self) -> Formulation<Brand> {
        Formulation {
            variables: self.variables,
            constraints: self.constraints,
            objective: self.objective.unwrap_or(Objective {
                expression: LinearExpression::new(0.0),
                sense: OptimisationSense::Minimise,
            }),
        }
    }
}

impl<Brand> Default for LPModelBuilder<Brand> {
    fn default() -> Self {
        Self::new()
    }
}

/// Which solver to use, where to find it and how long it may run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolverConfig {
    pub name: Option<String>,
    pub executable: Option<PathBuf>,
    pub time_limit: Option<Duration>,
}

/// Available LP solver backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverBackend {
    #[cfg(feature = "minilp")]
    /// Pure-Rust dense simplex, in process
    Minilp,
    #[cfg(feature = "coin_cbc")]
    /// COIN-OR CBC library, in process
    CoinCbc,
    /// GLPK `glpsol` executable
    Glpk,
    /// COIN-OR CBC executable
    Cbc,
}

impl SolverBackend {
    /// Resolve the configured solver. Nothing is spawned or loaded here.
    pub fn from_config(config: &SolverConfig) -> Result<Self, ConfigurationError> {
        let name = config
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(ConfigurationError::NoSolver)?;

        let backend = match name.to_lowercase().as_str() {
            #[cfg(feature = "minilp")]
            "minilp" => SolverBackend::Minilp,
            #[cfg(not(feature = "minilp"))]
            "minilp" => {
                return Err(ConfigurationError::BackendDisabled {
                    name: name.to_string(),
                    feature: "minilp",
                });
            }
            #[cfg(feature = "coin_cbc")]
            "coin_cbc" | "coin-cbc" => SolverBackend::CoinCbc,
            #[cfg(not(feature = "coin_cbc"))]
            "coin_cbc" | "coin-cbc" => {
                return Err(ConfigurationError::BackendDisabled {
                    name: name.to_string(),
                    feature: "coin_cbc",
                });
            }
            "glpk" | "glpsol" => SolverBackend::Glpk,
            "cbc" => SolverBackend::Cbc,
            _ => {
                return Err(ConfigurationError::UnknownSolver {
                    name: name.to_string(),
                });
            }
        };

        if let Some(path) = &config.executable {
            if backend.is_external() {
                if is_explicit_path(path) && !path.exists() {
                    return Err(ConfigurationError::ExecutableNotFound { path: path.clone() });
                }
            } else {
                warn!(
                    solver = %backend,
                    executable = %path.display(),
                    "solver runs in process, ignoring configured executable"
                );
            }
        }

        if let Some(limit) = config.time_limit {
            if limit.is_zero() {
                return Err(ConfigurationError::InvalidTimeLimit { value: 0.0 });
            }
        }

        Ok(backend)
    }

    /// Whether the backend runs as a separate process.
    pub fn is_external(self) -> bool {
        matches!(self, SolverBackend::Glpk | SolverBackend::Cbc)
    }
}

impl fmt::Display for SolverBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "minilp")]
            SolverBackend::Minilp => write!(f, "minilp"),
            #[cfg(feature = "coin_cbc")]
            SolverBackend::CoinCbc => write!(f, "coin_cbc"),
            SolverBackend::Glpk => write!(f, "glpk"),
            SolverBackend::Cbc => write!(f, "cbc"),
        }
    }
}

/// A bare program name is looked up on `PATH` at spawn time; anything with a
/// directory component must exist up front.
fn is_explicit_path(path: &Path) -> bool {
    path.is_absolute() || path.components().count() > 1
}

enum Presolved<Brand> {
    Infeasible(Arc<str>),
    Reduced(Formulation<Brand>),
}

/// Evaluate constant rows; drop the satisfied ones.
fn presolve<Brand: Clone>(formulation: &Formulation<Brand>) -> Presolved<Brand> {
    let mut constraints = Vec::with_capacity(formulation.constraints.len());
    for constraint in &formulation.constraints {
        if !constraint.expression.is_constant() {
            constraints.push(constraint.clone());
        } else if constraint.violation(&[]) > FEASIBILITY_TOLERANCE {
            return Presolved::Infeasible(constraint.name.clone());
        }
    }
    Presolved::Reduced(Formulation {
        variables: formulation.variables.clone(),
        constraints,
        objective: formulation.objective.clone(),
    })
}

/// Extra wait granted to a backend that enforces the time limit itself, so
/// that it can stop on its own and release what it holds.
const SELF_LIMITED_GRACE: Duration = Duration::from_secs(2);

/// Run an in-process backend, on a worker thread when a time limit applies.
///
/// The result is awaited for `time_limit + grace`. A backend that enforces
/// the limit itself gets a nonzero `grace` and normally returns before it
/// runs out; the wait is only a backstop. A solve that overruns it is
/// abandoned: its thread is left to finish on its own and the result is
/// discarded. minilp has no way to interrupt a running simplex and holds no
/// process-wide resource, so it is abandoned as soon as the limit passes.
fn run_in_process<Brand, F>(
    formulation: Formulation<Brand>,
    time_limit: Option<Duration>,
    grace: Duration,
    backend: F,
) -> Result<RawOutcome, SolverInvocationError>
where
    Brand: 'static,
    F: FnOnce(&Formulation<Brand>) -> Result<RawOutcome, SolverInvocationError> + Send + 'static,
{
    let Some(limit) = time_limit else {
        return backend(&formulation);
    };

    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("lp-solver".to_string())
        .spawn(move || {
            // The receiver is gone if we already timed out.
            let _ = tx.send(backend(&formulation));
        })?;

    match rx.recv_timeout(limit.saturating_add(grace)) {
        Ok(outcome) => outcome,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            warn!(
                limit = limit.as_secs_f64(),
                grace = grace.as_secs_f64(),
                "solver overran its time limit, abandoning worker thread"
            );
            Err(SolverInvocationError::TimedOut { limit })
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(SolverInvocationError::Backend(
            "solver thread terminated without a result".to_string(),
        )),
    }
}

/// Hand a formulation to the configured solver and collect its result.
///
/// Configuration problems are reported before anything is sent to a solver.
/// Infeasible and unbounded outcomes are ordinary `Ok` results; use
/// [`SolveResult::optimum`] when only an optimum is acceptable.
pub fn solve<Brand>(
    formulation: &Formulation<Brand>,
    config: &SolverConfig,
) -> Result<SolveResult<Brand>, SolverError>
where
    Brand: Clone + 'static,
{
    let backend = SolverBackend::from_config(config)?;

    let reduced = match presolve(formulation) {
        Presolved::Infeasible(row) => {
            info!(constraint = %row, "constant constraint violated, skipping solver");
            return Ok(SolveResult::without_solution(
                SolveStatus::Infeasible,
                format!("presolve: constant constraint `{row}` cannot be satisfied\n"),
            ));
        }
        Presolved::Reduced(reduced) => reduced,
    };

    info!(
        solver = %backend,
        variables = reduced.num_variables(),
        constraints = reduced.num_constraints(),
        "invoking LP solver"
    );

    let outcome = match backend {
        #[cfg(feature = "minilp")]
        SolverBackend::Minilp => run_in_process(
            reduced,
            config.time_limit,
            Duration::ZERO,
            minilp::solve_minilp,
        ),
        #[cfg(feature = "coin_cbc")]
        SolverBackend::CoinCbc => {
            // CBC gets the limit as its `sec` parameter and stops by itself.
            let time_limit = config.time_limit;
            run_in_process(reduced, time_limit, SELF_LIMITED_GRACE, move |f| {
                coin_cbc::solve_coin_cbc(f, time_limit)
            })
        }
        SolverBackend::Glpk => external::solve_external(
            &reduced,
            external::ExternalSolver::Glpk,
            config.executable.as_deref(),
            config.time_limit,
        ),
        SolverBackend::Cbc => external::solve_external(
            &reduced,
            external::ExternalSolver::Cbc,
            config.executable.as_deref(),
            config.time_limit,
        ),
    }
    .inspect_err(|err| {
        if err.is_timeout() {
            warn!(solver = %backend, "no result within the time limit");
        }
    })?;

    if !outcome.log.is_empty() {
        debug!(solver = %backend, "solver output:\n{}", outcome.log);
    }
    info!(solver = %backend, status = %outcome.status, "solver finished");

    let RawOutcome {
        status,
        values,
        log,
    } = outcome;
    match (status, values) {
        (SolveStatus::Optimal, Some(values)) if values.len() == formulation.num_variables() => {
            let objective_value = formulation.objective.expression.evaluate(&values);
            Ok(SolveResult {
                status,
                objective_value: Some(objective_value),
                variable_values: Some(values),
                log,
                _brand: PhantomData,
            })
        }
        (SolveStatus::Optimal, _) => Err(SolverInvocationError::Backend(format!(
            "{backend} reported an optimum without a complete set of variable values"
        ))
        .into()),
        (status, _) => Ok(SolveResult::without_solution(status, log)),
    }
}

// Macros for convenient syntax
pub mod macros;

// Operator overloading for linear expressions
pub mod ops;

// CPLEX LP text format, used by the external backends and `export`
pub mod lp_format;

mod external;

#[cfg(feature = "minilp")]
mod minilp;

#[cfg(feature = "coin_cbc")]
mod coin_cbc;

#[cfg(feature = "coin_cbc")]
pub mod output_capture;

#[cfg(test)]
mod tests;
