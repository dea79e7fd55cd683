use clap::{Args, Subcommand};
use eyre::Result;

use super::{GlobalArgs, UnwrapOrExit};

#[derive(Args)]
pub struct VariableCommand {
    #[command(subcommand)]
    command: VariableSubcommand,
}

#[derive(Subcommand)]
enum VariableSubcommand {
    /// Read an app variable
    Get(GetArgs),

    /// Create or overwrite an app variable
    Set(SetArgs),
}

#[derive(Args)]
struct GetArgs {
    #[arg(long)]
    name: String,
}

#[derive(Args)]
struct SetArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    value: String,
}

impl VariableCommand {
    pub fn run(&self, global: &GlobalArgs) -> Result<()> {
        let client = global.client()?;
        let app_id = global.app_id()?;
        let variable = match &self.command {
            VariableSubcommand::Get(args) => client.get_variable(&app_id, &args.name),
            VariableSubcommand::Set(args) => client.set_variable(&app_id, &args.name, &args.value),
        }
        .unwrap_or_exit();
        global.render_value(&variable)
    }
}
