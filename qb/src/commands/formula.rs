use std::path::PathBuf;

use clap::{Args, Subcommand};
use eyre::{Result, bail};
use qbcli_client::resources::formula::RunFormulaInput;

use super::{GlobalArgs, UnwrapOrExit};
use crate::ops::{
    self,
    formula::{DEFAULT_PROJECT_FILE, FormulaOptions},
};

#[derive(Args)]
pub struct FormulaCommand {
    #[command(subcommand)]
    command: FormulaSubcommand,
}

#[derive(Subcommand)]
enum FormulaSubcommand {
    /// Evaluate a formula in the context of one record
    Run(RunArgs),

    /// Run the test formulas of a project file against their records
    Test(ProjectArgs),

    /// Write the deploy formulas of a project file to their fields
    Deploy(ProjectArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Formula source, e.g. "[Estimate] * 2"
    #[arg(long)]
    formula: String,

    /// Record the formula is evaluated against
    #[arg(long)]
    record_id: u64,
}

#[derive(Args)]
struct ProjectArgs {
    /// Project file listing the formulas
    #[arg(long, default_value = DEFAULT_PROJECT_FILE)]
    file: PathBuf,
}

impl FormulaCommand {
    pub fn run(&self, global: &GlobalArgs) -> Result<()> {
        let client = global.client()?;
        match &self.command {
            FormulaSubcommand::Run(args) => {
                let input = RunFormulaInput {
                    formula: args.formula.clone(),
                    from: global.table_id()?,
                    rid: args.record_id,
                };
                global.render_value(&client.run_formula(&input).unwrap_or_exit())
            }
            FormulaSubcommand::Test(args) => {
                let report = ops::test_formulas(
                    &client,
                    FormulaOptions {
                        project_file: &args.file,
                    },
                )?;
                global.render(&report)?;
                if !report.failed.is_empty() {
                    bail!("{} formula tests failed", report.failed.len());
                }
                Ok(())
            }
            FormulaSubcommand::Deploy(args) => {
                let report = ops::deploy_formulas(
                    &client,
                    FormulaOptions {
                        project_file: &args.file,
                    },
                )?;
                global.render(&report)
            }
        }
    }
}
