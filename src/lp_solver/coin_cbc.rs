use std::time::Duration;

use ::coin_cbc::{Model, Sense};

use super::output_capture::capture_stdout;
use super::{ConstraintSense, Formulation, OptimisationSense, RawOutcome, SolveStatus};
use crate::error::SolverInvocationError;

/// Round a floating-point number to a specified number of significant digits
/// This is an workaround to mask floating point errors in CBC.
fn round_to_sig_digits(value: f64, digits: u32) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }

    let magnitude = value.abs().log10().floor() as i32;
    let scale = 10_f64.powi(digits as i32 - magnitude - 1);
    (value * scale).round() / scale
}

/// Solve a formulation with the CBC library linked into the process.
pub(super) fn solve_coin_cbc<Brand>(
    formulation: &Formulation<Brand>,
    time_limit: Option<Duration>,
) -> Result<RawOutcome, SolverInvocationError> {
    let mut model = Model::default();

    let columns: Vec<_> = formulation
        .variables
        .iter()
        .map(|info| {
            let col = model.add_col();
            model.set_col_lower(col, info.lower_bound);
            model.set_col_upper(col, info.upper_bound);
            col
        })
        .collect();

    for constraint in &formulation.constraints {
        let row = model.add_row();
        for term in &constraint.expression.terms {
            model.set_weight(row, columns[term.variable.id], term.coefficient);
        }
        match constraint.sense {
            ConstraintSense::LessEqual => model.set_row_upper(row, constraint.rhs),
            ConstraintSense::Equal => model.set_row_equal(row, constraint.rhs),
            ConstraintSense::GreaterEqual => model.set_row_lower(row, constraint.rhs),
        }
    }

    let objective = &formulation.objective;
    for term in &objective.expression.terms {
        model.set_obj_coeff(columns[term.variable.id], term.coefficient);
    }
    model.set_obj_sense(match objective.sense {
        OptimisationSense::Minimise => Sense::Minimize,
        OptimisationSense::Maximise => Sense::Maximize,
    });

    if let Some(limit) = time_limit {
        model.set_parameter("sec", &format!("{:.3}", limit.as_secs_f64()));
    }

    let (solution, log) = capture_stdout(|| model.solve());
    let raw = solution.raw();

    if raw.is_seconds_limit_reached() {
        if let Some(limit) = time_limit {
            return Err(SolverInvocationError::TimedOut { limit });
        }
    }

    let status = if raw.is_proven_optimal() {
        SolveStatus::Optimal
    } else if raw.is_proven_infeasible() {
        SolveStatus::Infeasible
    } else if raw.is_continuous_unbounded() {
        SolveStatus::Unbounded
    } else {
        SolveStatus::Error
    };

    let values = (status == SolveStatus::Optimal).then(|| {
        columns
            .iter()
            .map(|&col| round_to_sig_digits(solution.col(col), 8))
            .collect()
    });

    Ok(RawOutcome {
        status,
        values,
        log,
    })
}

#[cfg(test)]
mod tests {
    use super::round_to_sig_digits;

    #[test]
    fn test_round_to_sig_digits_masks_noise() {
        assert_eq!(round_to_sig_digits(66.666666666666, 8), 66.666667);
        assert_eq!(round_to_sig_digits(99.99999999997, 8), 100.0);
        assert_eq!(round_to_sig_digits(0.0, 8), 0.0);
        assert_eq!(round_to_sig_digits(-1234.56789012, 4), -1235.0);
    }
}
