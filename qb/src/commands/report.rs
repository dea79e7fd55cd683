use clap::{Args, Subcommand};
use eyre::Result;

use super::{GlobalArgs, UnwrapOrExit};
use crate::reports::RecordsReport;

#[derive(Args)]
pub struct ReportCommand {
    #[command(subcommand)]
    command: ReportSubcommand,
}

#[derive(Subcommand)]
enum ReportSubcommand {
    /// List the reports of a table
    List,

    /// Show a report's definition
    Get(IdArg),

    /// Run a report and show its records
    Run(RunArgs),
}

#[derive(Args)]
struct IdArg {
    #[arg(long)]
    report_id: String,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    id: IdArg,

    /// Records to skip
    #[arg(long, default_value_t = 0)]
    skip: u64,

    /// Maximum number of records to return
    #[arg(long)]
    top: Option<u64>,
}

impl ReportCommand {
    pub fn run(&self, global: &GlobalArgs) -> Result<()> {
        let client = global.client()?;
        let table_id = global.table_id()?;
        match &self.command {
            ReportSubcommand::List => {
                global.render_value(&client.list_reports(&table_id).unwrap_or_exit())
            }
            ReportSubcommand::Get(args) => {
                global.render_value(&client.get_report(&table_id, &args.report_id).unwrap_or_exit())
            }
            ReportSubcommand::Run(args) => {
                let result = client
                    .run_report(&table_id, &args.id.report_id, args.skip, args.top)
                    .unwrap_or_exit();
                global.render(&RecordsReport::new(&result))
            }
        }
    }
}
