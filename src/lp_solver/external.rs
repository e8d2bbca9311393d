//! External solver executables: GLPK (`glpsol`) and COIN-OR CBC (`cbc`).
//!
//! The formulation is written to a scratch directory in CPLEX LP format, the
//! executable is spawned there, and its solution file is parsed back. Output is
//! drained on reader threads so a chatty solver cannot block on a full pipe
//! while we wait for it.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::lp_format::write_lp;
use super::{Formulation, RawOutcome, SolveStatus, log_tail};
use crate::error::SolverInvocationError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const MODEL_FILE: &str = "model.lp";
const SOLUTION_FILE: &str = "solution.txt";
/// Lines of solver output repeated in the warning for a failed run.
const FAILURE_LOG_LINES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ExternalSolver {
    Glpk,
    Cbc,
}

impl ExternalSolver {
    fn default_program(self) -> &'static str {
        match self {
            ExternalSolver::Glpk => "glpsol",
            ExternalSolver::Cbc => "cbc",
        }
    }

    fn arguments(self, time_limit: Option<Duration>) -> Vec<String> {
        let mut args = Vec::new();
        match self {
            ExternalSolver::Glpk => {
                args.extend(["--lp", MODEL_FILE, "-w", SOLUTION_FILE].map(String::from));
                if let Some(limit) = time_limit {
                    args.push("--tmlim".to_string());
                    // Whole seconds only; never stop earlier than asked.
                    args.push((limit.as_secs_f64().ceil() as u64).max(1).to_string());
                }
            }
            ExternalSolver::Cbc => {
                args.push(MODEL_FILE.to_string());
                if let Some(limit) = time_limit {
                    args.push("sec".to_string());
                    args.push(format!("{:.3}", limit.as_secs_f64()));
                }
                args.extend(["solve", "solu", SOLUTION_FILE].map(String::from));
            }
        }
        args
    }

    /// Whether the solver's own output says it stopped on its time limit.
    fn reports_time_limit(self, log: &str) -> bool {
        match self {
            ExternalSolver::Glpk => log.contains("TIME LIMIT EXCEEDED"),
            ExternalSolver::Cbc => log.contains("Stopped on time"),
        }
    }

    fn parse_solution(
        self,
        text: &str,
        num_columns: usize,
    ) -> Result<(SolveStatus, Option<Vec<f64>>), String> {
        match self {
            ExternalSolver::Glpk => parse_glpk_solution(text, num_columns),
            ExternalSolver::Cbc => parse_cbc_solution(text, num_columns),
        }
    }
}

fn drain<R: Read + Send + 'static>(stream: Option<R>) -> Option<JoinHandle<String>> {
    let mut stream = stream?;
    Some(thread::spawn(move || {
        let mut bytes = Vec::new();
        // A broken pipe just truncates the log.
        let _ = stream.read_to_end(&mut bytes);
        String::from_utf8_lossy(&bytes).into_owned()
    }))
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

/// Wait for the child until `deadline`, killing it once the deadline passes.
fn wait_until(
    child: &mut Child,
    deadline: Option<Instant>,
) -> Result<Option<ExitStatus>, SolverInvocationError> {
    let Some(deadline) = deadline else {
        return Ok(Some(child.wait()?));
    };
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let now = Instant::now();
        if now >= deadline {
            if let Err(err) = child.kill() {
                warn!("failed to kill timed-out solver: {err}");
            }
            // Reap the process so it does not linger as a zombie.
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

pub(super) fn solve_external<Brand>(
    formulation: &Formulation<Brand>,
    solver: ExternalSolver,
    executable: Option<&Path>,
    time_limit: Option<Duration>,
) -> Result<RawOutcome, SolverInvocationError> {
    let workdir = tempfile::Builder::new().prefix("blendplan-").tempdir()?;
    write_lp(formulation, fs::File::create(workdir.path().join(MODEL_FILE))?)?;

    let program: PathBuf = executable
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(solver.default_program()));
    let args = solver.arguments(time_limit);
    debug!(program = %program.display(), ?args, workdir = %workdir.path().display(), "spawning solver");

    let mut child = Command::new(&program)
        .args(&args)
        .current_dir(workdir.path())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| SolverInvocationError::Spawn {
            program: program.display().to_string(),
            source,
        })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let deadline = time_limit.map(|limit| Instant::now() + limit);
    let exit = wait_until(&mut child, deadline)?;

    let mut log = collect(stdout);
    let errors = collect(stderr);
    if !errors.is_empty() {
        log.push_str(&errors);
    }

    let Some(exit) = exit else {
        // Unreachable when `deadline` is None.
        let limit = time_limit.unwrap_or_default();
        return Err(SolverInvocationError::TimedOut { limit });
    };

    if let Some(limit) = time_limit {
        if solver.reports_time_limit(&log) {
            return Err(SolverInvocationError::TimedOut { limit });
        }
    }

    if !exit.success() {
        warn!(
            program = %program.display(),
            %exit,
            output = log_tail(&log, FAILURE_LOG_LINES),
            "solver exited unsuccessfully"
        );
        return Ok(RawOutcome {
            status: SolveStatus::Error,
            values: None,
            log,
        });
    }

    let solution_path = workdir.path().join(SOLUTION_FILE);
    let text = fs::read_to_string(&solution_path).map_err(|err| {
        SolverInvocationError::SolutionFile {
            path: solution_path.clone(),
            message: err.to_string(),
        }
    })?;
    let (status, values) = solver
        .parse_solution(&text, formulation.variables.len())
        .map_err(|message| SolverInvocationError::SolutionFile {
            path: solution_path,
            message,
        })?;

    Ok(RawOutcome {
        status,
        values,
        log,
    })
}

fn parse_number<T: std::str::FromStr>(field: Option<&str>, what: &str) -> Result<T, String> {
    let field = field.ok_or_else(|| format!("missing {what}"))?;
    field
        .parse()
        .map_err(|_| format!("invalid {what} `{field}`"))
}

/// Parse GLPK's `-w` plain text solution for a basic (simplex) solve.
///
/// ```text
/// c Problem:
/// s bas <rows> <cols> <primal status> <dual status> <objective>
/// i <row> <status> <activity> <dual>
/// j <col> <status> <value> <reduced cost>
/// e o f
/// ```
fn parse_glpk_solution(
    text: &str,
    num_columns: usize,
) -> Result<(SolveStatus, Option<Vec<f64>>), String> {
    let mut status = None;
    let mut values = vec![0.0; num_columns];

    for line in text.lines() {
        let mut fields = line.split_whitespace();
        match fields.next() {
            Some("s") => {
                if fields.next() != Some("bas") {
                    return Err("expected a basic solution".to_string());
                }
                let _rows: usize = parse_number(fields.next(), "row count")?;
                let cols: usize = parse_number(fields.next(), "column count")?;
                if cols != num_columns {
                    return Err(format!("expected {num_columns} columns, found {cols}"));
                }
                let primal = fields.next().ok_or("missing primal status")?;
                let dual = fields.next().ok_or("missing dual status")?;
                status = Some(match (primal, dual) {
                    ("f", "f") => SolveStatus::Optimal,
                    ("n", _) => SolveStatus::Infeasible,
                    ("f", "n") => SolveStatus::Unbounded,
                    _ => SolveStatus::Error,
                });
            }
            Some("j") => {
                let col: usize = parse_number(fields.next(), "column index")?;
                let _state = fields.next();
                let value: f64 = parse_number(fields.next(), "column value")?;
                let slot = col
                    .checked_sub(1)
                    .and_then(|i| values.get_mut(i))
                    .ok_or_else(|| format!("column index {col} out of range"))?;
                *slot = value;
            }
            _ => {}
        }
    }

    let status = status.ok_or("no solution status line")?;
    Ok((status, (status == SolveStatus::Optimal).then_some(values)))
}

/// Parse CBC's `solu` output.
///
/// The first line carries the status, e.g. `Optimal - objective value 3666.67`
/// or `Infeasible - objective value 0`. Each further line is
/// `<index> <name> <value> <reduced cost>`, optionally prefixed by `**` when
/// the value is infeasible. Columns at zero are omitted.
fn parse_cbc_solution(
    text: &str,
    num_columns: usize,
) -> Result<(SolveStatus, Option<Vec<f64>>), String> {
    let mut lines = text.lines();
    let header = lines.next().ok_or("empty solution file")?.trim();
    let lowered = header.to_lowercase();

    let status = if lowered.starts_with("optimal") {
        SolveStatus::Optimal
    } else if lowered.contains("infeasible") {
        SolveStatus::Infeasible
    } else if lowered.contains("unbounded") {
        SolveStatus::Unbounded
    } else {
        SolveStatus::Error
    };
    if status != SolveStatus::Optimal {
        return Ok((status, None));
    }

    let mut values = vec![0.0; num_columns];
    for line in lines {
        let line = line.trim().trim_start_matches("**").trim_start();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let _index = fields.next();
        let name = fields.next().ok_or("missing column name")?;
        let value: f64 = parse_number(fields.next(), "column value")?;
        let column: usize = name
            .strip_prefix('c')
            .and_then(|index| index.parse().ok())
            .ok_or_else(|| format!("unexpected column name `{name}`"))?;
        let slot = values
            .get_mut(column)
            .ok_or_else(|| format!("column `{name}` out of range"))?;
        *slot = value;
    }

    Ok((status, Some(values)))
}
