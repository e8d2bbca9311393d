//! Run configuration
//!
//! The run configuration is a small YAML file naming the LP solver to use:
//!
//! ```yaml
//! solver:
//!   name: glpk
//!   executable: /opt/glpk/bin/glpsol   # optional
//!   time_limit: 30                     # optional, seconds
//! ```
//!
//! The file is optional when the default location is used. The solver name
//! can also be supplied through the environment (see [`SOLVER_ENV_VAR`]); the
//! command-line front end reads the variable, this module only applies it.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigurationError;
use crate::lp_solver::SolverConfig;

/// Configuration file read when none is given explicitly.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Environment variable overriding `solver.name`.
pub const SOLVER_ENV_VAR: &str = "BLENDPLAN_LP_SOLVER";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolverSection {
    pub name: Option<String>,
    pub executable: Option<PathBuf>,
    /// Seconds
    pub time_limit: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub solver: SolverSection,
}

impl RunConfig {
    /// Read the configuration file.
    ///
    /// With `path = None` the default file is read if it exists and an empty
    /// configuration is returned otherwise. An explicitly requested file must
    /// exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigurationError> {
        let (path, explicit) = match path {
            Some(path) => (path, true),
            None => (Path::new(DEFAULT_CONFIG_FILE), false),
        };

        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if !explicit && err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no run configuration, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigurationError::Unreadable {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigurationError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(text).map_err(|err| ConfigurationError::Malformed {
            message: err.to_string(),
        })?;
        if let Some(value) = config.solver.time_limit {
            check_time_limit(value)?;
        }
        Ok(config)
    }

    /// Replace `solver.name` when an override is present and not blank.
    pub fn with_solver_override(mut self, name: Option<String>) -> Self {
        if let Some(name) = name.filter(|name| !name.trim().is_empty()) {
            debug!(solver = %name, "solver name overridden from the environment");
            self.solver.name = Some(name);
        }
        self
    }

    /// Replace the time limit, e.g. from the command line.
    pub fn with_time_limit(mut self, seconds: Option<f64>) -> Result<Self, ConfigurationError> {
        if let Some(value) = seconds {
            check_time_limit(value)?;
            self.solver.time_limit = Some(value);
        }
        Ok(self)
    }

    pub fn to_solver_config(&self) -> SolverConfig {
        SolverConfig {
            name: self.solver.name.clone(),
            executable: self.solver.executable.clone(),
            time_limit: self.solver.time_limit.map(Duration::from_secs_f64),
        }
    }
}

fn check_time_limit(value: f64) -> Result<(), ConfigurationError> {
    // Duration::from_secs_f64 panics past this point.
    if value.is_finite() && value > 0.0 && value < Duration::MAX.as_secs_f64() {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidTimeLimit { value })
    }
}
