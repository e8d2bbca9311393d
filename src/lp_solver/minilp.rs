//! minilp backend: dense simplex in pure Rust, no external dependencies.

use ::minilp::{ComparisonOp, Error as MinilpError, LinearExpr, OptimizationDirection, Problem};
use tracing::trace;

use super::{ConstraintSense, Formulation, OptimisationSense, RawOutcome, SolveStatus};
use crate::error::SolverInvocationError;

pub(super) fn solve_minilp<Brand>(
    formulation: &Formulation<Brand>,
) -> Result<RawOutcome, SolverInvocationError> {
    let direction = match formulation.objective.sense {
        OptimisationSense::Minimise => OptimizationDirection::Minimize,
        OptimisationSense::Maximise => OptimizationDirection::Maximize,
    };
    let mut problem = Problem::new(direction);

    let mut objective = vec![0.0; formulation.variables.len()];
    for term in &formulation.objective.expression.terms {
        objective[term.variable.id] += term.coefficient;
    }

    let columns: Vec<_> = formulation
        .variables
        .iter()
        .zip(&objective)
        .map(|(info, &coefficient)| {
            problem.add_var(coefficient, (info.lower_bound, info.upper_bound))
        })
        .collect();

    for constraint in &formulation.constraints {
        let mut expr = LinearExpr::empty();
        for term in &constraint.expression.terms {
            expr.add(columns[term.variable.id], term.coefficient);
        }
        let op = match constraint.sense {
            ConstraintSense::LessEqual => ComparisonOp::Le,
            ConstraintSense::Equal => ComparisonOp::Eq,
            ConstraintSense::GreaterEqual => ComparisonOp::Ge,
        };
        trace!(constraint = %constraint.name, "adding row");
        problem.add_constraint(expr, op, constraint.rhs);
    }

    let outcome = match problem.solve() {
        Ok(solution) => {
            let values = columns.iter().map(|&column| solution[column]).collect();
            RawOutcome {
                status: SolveStatus::Optimal,
                values: Some(values),
                log: format!("minilp: optimal, objective {}\n", solution.objective()),
            }
        }
        Err(MinilpError::Infeasible) => RawOutcome {
            status: SolveStatus::Infeasible,
            values: None,
            log: "minilp: problem is infeasible\n".to_string(),
        },
        Err(MinilpError::Unbounded) => RawOutcome {
            status: SolveStatus::Unbounded,
            values: None,
            log: "minilp: problem is unbounded\n".to_string(),
        },
        #[allow(unreachable_patterns)]
        Err(other) => RawOutcome {
            status: SolveStatus::Error,
            values: None,
            log: format!("minilp: {other:?}\n"),
        },
    };
    Ok(outcome)
}
