//! CPLEX LP text format writer
//!
//! Columns are written as `c<i>` and rows as `r<i>`, where `i` is the index in
//! the [`Formulation`]. Model names such as `u[Feb,VEG1]` contain characters
//! that not every solver accepts in identifiers, so they are emitted as `\`
//! comments next to the generated names instead.
//!
//! The objective lists every column in index order, zero coefficients
//! included. Solvers number columns by first appearance, so this keeps their
//! numbering identical to ours when a solution file is read back.
//!
//! Constant rows carry no column and are written as comments only.

use std::fmt::Write as _;
use std::io::{self, Write};

use super::{ConstraintSense, Formulation, LinearTerm, OptimisationSense};

const TERMS_PER_LINE: usize = 8;

fn number(value: f64) -> String {
    if value == f64::INFINITY {
        "+inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        format!("{value}")
    }
}

fn write_terms(out: &mut String, terms: impl IntoIterator<Item = (f64, usize)>) {
    for (i, (coefficient, column)) in terms.into_iter().enumerate() {
        if i > 0 && i % TERMS_PER_LINE == 0 {
            out.push_str("\n   ");
        }
        let sign = if coefficient.is_sign_negative() { '-' } else { '+' };
        let _ = write!(out, " {sign} {} c{column}", number(coefficient.abs()));
    }
}

fn row_terms<Brand>(terms: &[LinearTerm<Brand>]) -> impl Iterator<Item = (f64, usize)> + '_ {
    terms.iter().map(|t| (t.coefficient, t.variable.id))
}

/// Render a formulation as CPLEX LP text.
pub fn to_lp_string<Brand>(formulation: &Formulation<Brand>) -> String {
    let mut out = String::new();

    out.push_str("\\ blendplan\n");
    for (i, variable) in formulation.variables.iter().enumerate() {
        let _ = writeln!(out, "\\ c{i} = {}", variable.name);
    }

    let objective = &formulation.objective;
    out.push_str(match objective.sense {
        OptimisationSense::Minimise => "Minimize\n",
        OptimisationSense::Maximise => "Maximize\n",
    });
    let mut coefficients = vec![0.0; formulation.variables.len()];
    for term in &objective.expression.terms {
        coefficients[term.variable.id] += term.coefficient;
    }
    out.push_str(" obj:");
    write_terms(&mut out, coefficients.iter().copied().zip(0..));
    out.push('\n');

    out.push_str("Subject To\n");
    for (i, constraint) in formulation.constraints.iter().enumerate() {
        let relation = match constraint.sense {
            ConstraintSense::LessEqual => "<=",
            ConstraintSense::Equal => "=",
            ConstraintSense::GreaterEqual => ">=",
        };
        if constraint.expression.is_constant() {
            let _ = writeln!(
                out,
                "\\ r{i}: {} (constant) 0 {relation} {}",
                constraint.name,
                number(constraint.rhs)
            );
            continue;
        }
        let _ = writeln!(out, "\\ {}", constraint.name);
        let _ = write!(out, " r{i}:");
        write_terms(&mut out, row_terms(&constraint.expression.terms));
        let _ = writeln!(out, " {relation} {}", number(constraint.rhs));
    }

    out.push_str("Bounds\n");
    for (i, variable) in formulation.variables.iter().enumerate() {
        let (lower, upper) = (variable.lower_bound, variable.upper_bound);
        let _ = match (lower == f64::NEG_INFINITY, upper == f64::INFINITY) {
            (true, true) => writeln!(out, " c{i} free"),
            (false, true) => writeln!(out, " c{i} >= {}", number(lower)),
            (true, false) => writeln!(out, " -inf <= c{i} <= {}", number(upper)),
            (false, false) => writeln!(out, " {} <= c{i} <= {}", number(lower), number(upper)),
        };
    }

    out.push_str("End\n");
    out
}

/// Write a formulation as CPLEX LP text.
pub fn write_lp<Brand, W: Write>(formulation: &Formulation<Brand>, mut writer: W) -> io::Result<()> {
    writer.write_all(to_lp_string(formulation).as_bytes())?;
    writer.flush()
}
