use std::{fs, path::PathBuf};

use clap::{Args, Subcommand};
use eyre::{Context, Result, eyre};
use qbcli_client::resources::files::CreateFileInput;
use qbcli_core::FieldId;

use super::{GlobalArgs, UnwrapOrExit};

#[derive(Args)]
pub struct FileCommand {
    #[command(subcommand)]
    command: FileSubcommand,
}

#[derive(Subcommand)]
enum FileSubcommand {
    /// Upload a file into a record's attachment field
    Create(CreateArgs),

    /// Delete one version of a file attachment
    Delete(DeleteArgs),
}

#[derive(Args)]
struct CreateArgs {
    #[arg(long)]
    record_id: u64,

    /// File attachment field
    #[arg(long)]
    field_id: FieldId,

    /// File to upload
    #[arg(long)]
    file: PathBuf,

    /// Name to store the file under (defaults to the file's name)
    #[arg(long)]
    file_name: Option<String>,
}

impl CreateArgs {
    fn file_name(&self) -> Result<String> {
        match &self.file_name {
            Some(name) => Ok(name.clone()),
            None => self
                .file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .ok_or_else(|| eyre!("cannot name '{}', pass --file-name", self.file.display())),
        }
    }
}

#[derive(Args)]
struct DeleteArgs {
    #[arg(long)]
    record_id: u64,

    /// File attachment field
    #[arg(long)]
    field_id: FieldId,

    /// Version number to delete
    #[arg(long)]
    version: u32,
}

impl FileCommand {
    pub fn run(&self, global: &GlobalArgs) -> Result<()> {
        let client = global.client()?;
        let table_id = global.table_id()?;
        match &self.command {
            FileSubcommand::Create(args) => {
                let file_name = args.file_name()?;
                let contents = fs::read(&args.file)
                    .wrap_err_with(|| format!("error reading {}", args.file.display()))?;
                let input = CreateFileInput {
                    record_id: args.record_id,
                    field_id: args.field_id,
                    file_name: &file_name,
                    contents: &contents,
                };
                global.render_value(&client.create_file(&table_id, &input).unwrap_or_exit())
            }
            FileSubcommand::Delete(args) => {
                let deleted = client
                    .delete_file(&table_id, args.record_id, args.field_id, args.version)
                    .unwrap_or_exit();
                global.render_value(&deleted)
            }
        }
    }
}
