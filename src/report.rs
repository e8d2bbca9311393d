//! Presentation of solve results
//!
//! A [`Report`] maps the raw values of a [`SolveResult`] back onto the labels
//! of the model that produced it: which commodity, which period, which role
//! (bought, used, stored, produced). It is built from any model implementing
//! [`Reportable`] and never fails: for a non-optimal result it carries the
//! status alone.
//!
//! `Display` renders the report as plain-text tables; [`Report::write_csv`]
//! produces a machine-readable `variable,period,commodity,value` listing.

use std::fmt;
use std::io::{self, Write};

use itertools::Itertools;
use prettytable::*;

use crate::error::SolveError;
use crate::lp_solver::{SolveResult, SolveStatus, VariableId};
use crate::schema::{Label, ModelKind};

/// Values with a magnitude below this are shown as zero.
const DISPLAY_EPSILON: f64 = 1e-9;

/// Lines of solver output kept in the report of a non-optimal result.
const SOLVER_LOG_LINES: usize = 20;

/// What a decision variable stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VariableRole {
    Bought,
    Used,
    Stored,
    Production,
}

impl VariableRole {
    /// Short name used in CSV output, matching the model's variable names.
    pub fn symbol(self) -> &'static str {
        match self {
            VariableRole::Bought => "b",
            VariableRole::Used => "u",
            VariableRole::Stored => "s",
            VariableRole::Production => "prod",
        }
    }
}

/// A model variable together with the labels it is indexed by.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelledVariable<Brand> {
    pub id: VariableId<Brand>,
    pub role: VariableRole,
    pub period: Option<Label>,
    pub commodity: Option<Label>,
    pub commodity_type: Option<Label>,
}

/// A model whose variables can be reported by label.
pub trait Reportable<Brand> {
    fn kind(&self) -> ModelKind;

    /// Every reportable variable, in presentation order.
    fn labelled_variables(&self) -> Vec<LabelledVariable<Brand>>;
}

/// One reported value.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub role: VariableRole,
    pub period: Option<Label>,
    pub commodity: Option<Label>,
    pub commodity_type: Option<Label>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    kind: ModelKind,
    status: SolveStatus,
    objective: Option<f64>,
    entries: Vec<ReportEntry>,
    solver_log: Option<String>,
}

impl Report {
    pub fn new<Brand>(result: &SolveResult<Brand>, model: &impl Reportable<Brand>) -> Self {
        let entries = if result.is_optimal() {
            model
                .labelled_variables()
                .into_iter()
                .filter_map(|var| {
                    Some(ReportEntry {
                        value: result.get_value(var.id)?,
                        role: var.role,
                        period: var.period,
                        commodity: var.commodity,
                        commodity_type: var.commodity_type,
                    })
                })
                .collect()
        } else {
            Vec::new()
        };

        let solver_log = Some(result.log_tail(SOLVER_LOG_LINES))
            .filter(|tail| !result.is_optimal() && !tail.is_empty())
            .map(str::to_string);

        Self {
            kind: model.kind(),
            status: result.status,
            objective: result.objective_value,
            entries,
            solver_log,
        }
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn status(&self) -> SolveStatus {
        self.status
    }

    pub fn objective(&self) -> Option<f64> {
        self.objective
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// The end of the solver output, kept only for a non-optimal result.
    pub fn solver_log(&self) -> Option<&str> {
        self.solver_log.as_deref()
    }

    /// Look up one value by role and labels.
    pub fn value(&self, role: VariableRole, period: Option<&str>, commodity: Option<&str>) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| {
                e.role == role
                    && e.period.as_ref().map(Label::as_str) == period
                    && e.commodity.as_ref().map(Label::as_str) == commodity
            })
            .map(|e| e.value)
    }

    /// `Ok` for an optimal result, otherwise the status as an error.
    pub fn ensure_optimal(&self) -> Result<(), SolveError> {
        match self.status {
            SolveStatus::Optimal => Ok(()),
            status => Err(SolveError { status }),
        }
    }

    /// Write every value as `variable,period,commodity,value`.
    ///
    /// Only the header is written for a non-optimal result.
    pub fn write_csv<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writeln!(writer, "variable,period,commodity,value")?;
        for entry in &self.entries {
            writeln!(
                writer,
                "{},{},{},{}",
                entry.role.symbol(),
                entry.period.as_ref().map(Label::as_str).unwrap_or(""),
                entry.commodity.as_ref().map(Label::as_str).unwrap_or(""),
                entry.value
            )?;
        }
        writer.flush()
    }

    fn single_period_table(&self) -> Table {
        let mut table = Table::new();
        table.set_titles(row!["Commodity", "Type", "Used"]);
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

        for entry in self.entries.iter().filter(|e| e.role == VariableRole::Used) {
            table.add_row(row![
                label(&entry.commodity),
                label(&entry.commodity_type),
                r->number(entry.value),
            ]);
        }
        table
    }

    fn multi_period_table(&self) -> Table {
        let mut table = Table::new();
        table.set_titles(row!["Period", "Commodity", "Type", "Bought", "Used", "Stored"]);
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

        let cells = self
            .entries
            .iter()
            .filter(|e| e.commodity.is_some())
            .map(|e| (&e.period, &e.commodity))
            .unique();

        for (period, commodity) in cells {
            let in_cell = || {
                self.entries
                    .iter()
                    .filter(move |e| &e.period == period && &e.commodity == commodity)
            };
            let of = |role: VariableRole| {
                in_cell()
                    .find(|e| e.role == role)
                    .map(|e| number(e.value))
                    .unwrap_or_default()
            };
            let commodity_type = in_cell().find_map(|e| e.commodity_type.as_ref());
            table.add_row(row![
                label(period),
                label(commodity),
                commodity_type.map(Label::as_str).unwrap_or(""),
                r->of(VariableRole::Bought),
                r->of(VariableRole::Used),
                r->of(VariableRole::Stored),
            ]);
        }
        table
    }

    fn production_table(&self) -> Table {
        let mut table = Table::new();
        table.set_titles(match self.kind {
            ModelKind::SinglePeriod => row!["Production"],
            ModelKind::MultiPeriod => row!["Period", "Production"],
        });
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

        for entry in self.entries.iter().filter(|e| e.role == VariableRole::Production) {
            match self.kind {
                ModelKind::SinglePeriod => table.add_row(row![r->number(entry.value)]),
                ModelKind::MultiPeriod => {
                    table.add_row(row![label(&entry.period), r->number(entry.value)])
                }
            };
        }
        table
    }
}

fn label(label: &Option<Label>) -> &str {
    label.as_ref().map(Label::as_str).unwrap_or("")
}

fn number(value: f64) -> String {
    let value = if value.abs() < DISPLAY_EPSILON { 0.0 } else { value };
    format!("{value:.3}")
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model: {}", self.kind)?;
        writeln!(f, "Status: {}", self.status)?;
        let Some(objective) = self.objective.filter(|_| self.status == SolveStatus::Optimal) else {
            if let Some(log) = &self.solver_log {
                writeln!(f)?;
                writeln!(f, "Solver output (last lines):")?;
                for line in log.lines() {
                    writeln!(f, "  {line}")?;
                }
            }
            return Ok(());
        };
        writeln!(f, "Objective: {}", number(objective))?;

        let blend = match self.kind {
            ModelKind::SinglePeriod => self.single_period_table(),
            ModelKind::MultiPeriod => self.multi_period_table(),
        };
        writeln!(f)?;
        write!(f, "{blend}")?;
        writeln!(f)?;
        write!(f, "{}", self.production_table())
    }
}
