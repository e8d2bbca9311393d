//! The `export` command: build a model and write it as an LP file without
//! solving it, for inspection or for running a solver by hand.

use std::{
    fs,
    io::{BufWriter, Write},
    path::PathBuf,
};

use anyhow::*;
use clap::Parser;
use tracing::info;

use crate::{model, read_data, schema::ModelKind};

/// Command-line arguments for the export command.
#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// YAML data file
    #[clap(long, alias = "data-file", default_value = "data.yaml")]
    pub data: PathBuf,

    /// Formulation to build
    #[clap(long, value_enum, default_value_t = ModelKind::SinglePeriod)]
    pub model_type: ModelKind,

    /// Build a single-period blend over one period of per-period data
    #[clap(long)]
    pub period: Option<String>,

    /// Output file in CPLEX LP format
    #[clap(long)]
    pub lp: PathBuf,
}

pub fn export_main(args: ExportArgs) -> Result<()> {
    let ExportArgs {
        ref data,
        model_type,
        ref period,
        ref lp,
    } = args;

    let raw = read_data(data)?;
    let model = model::build(&raw, model_type, period.as_deref())
        .with_context(|| format!("invalid data in {}", data.display()))?;

    let file = fs::File::create(lp).with_context(|| format!("cannot create {}", lp.display()))?;
    let mut writer = BufWriter::new(file);
    model.write_lp(&mut writer)?;
    writer.flush()?;

    info!(
        path = %lp.display(),
        variables = model.num_variables(),
        constraints = model.num_constraints(),
        "LP model written"
    );
    Ok(())
}
