use std::{
    fs::File,
    io::{self, BufReader, BufWriter},
    path::PathBuf,
    time::Duration,
};

use clap::{Args, Subcommand};
use eyre::{Context, Result};
use qbcli_client::{
    Client,
    query::{parse_field_list, parse_key_values, parse_query},
    resources::tables::TableInput,
};
use qbcli_core::FieldId;

use super::{GlobalArgs, UnwrapOrExit};
use crate::{
    ops::{self, export::ExportOptions, import::ImportOptions},
    reports::Output,
};

#[derive(Args)]
pub struct TableCommand {
    #[command(subcommand)]
    command: TableSubcommand,
}

#[derive(Subcommand)]
enum TableSubcommand {
    /// List the tables of an app
    List,

    /// Show a table
    Get,

    /// Create a table in an app
    Create(TableArgs),

    /// Update a table
    Update(TableArgs),

    /// Delete a table and all of its records
    Delete,

    /// Insert or upsert records from a CSV file
    Import(ImportArgs),

    /// Write the records of a table as CSV
    Export(ExportArgs),
}

#[derive(Args)]
struct TableArgs {
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    icon_name: Option<String>,

    /// What one record is called, e.g. "Task"
    #[arg(long)]
    singular_noun: Option<String>,

    /// What many records are called, e.g. "Tasks"
    #[arg(long)]
    plural_noun: Option<String>,
}

impl TableArgs {
    fn input(&self) -> TableInput {
        TableInput {
            name: self.name.clone(),
            description: self.description.clone(),
            icon_name: self.icon_name.clone(),
            singular_noun: self.singular_noun.clone(),
            plural_noun: self.plural_noun.clone(),
        }
    }
}

#[derive(Args)]
struct ImportArgs {
    /// CSV file to read (defaults to stdin)
    #[arg(long)]
    file: Option<PathBuf>,

    /// Rename CSV columns, e.g. "Name=Title 'Due date'=Due"
    #[arg(long)]
    map: Option<String>,

    /// Update records whose value in this field matches
    #[arg(long)]
    merge_field_id: Option<FieldId>,

    /// Records per insert request
    #[arg(long, default_value_t = 10_000)]
    batch_size: usize,

    /// Milliseconds to wait between batches
    #[arg(long, default_value_t = 0)]
    delay: u64,
}

#[derive(Args)]
struct ExportArgs {
    /// CSV file to write (defaults to stdout)
    #[arg(long)]
    file: Option<PathBuf>,

    /// Comma separated field IDs (defaults to every field)
    #[arg(long)]
    fields: Option<String>,

    /// Filter, either a query string or field=value pairs
    #[arg(long = "where")]
    filter: Option<String>,

    /// Records per page
    #[arg(long, default_value_t = 1000)]
    top: u64,

    /// Milliseconds to wait between pages
    #[arg(long, default_value_t = 0)]
    delay: u64,
}

impl TableCommand {
    pub fn run(&self, global: &GlobalArgs) -> Result<()> {
        let client = global.client()?;
        match &self.command {
            TableSubcommand::List => {
                let app_id = global.app_id()?;
                global.render_value(&client.list_tables(&app_id).unwrap_or_exit())
            }
            TableSubcommand::Get => {
                let (app_id, table_id) = (global.app_id()?, global.table_id()?);
                global.render_value(&client.get_table(&app_id, &table_id).unwrap_or_exit())
            }
            TableSubcommand::Create(args) => {
                let app_id = global.app_id()?;
                global.render_value(&client.create_table(&app_id, &args.input()).unwrap_or_exit())
            }
            TableSubcommand::Update(args) => {
                let (app_id, table_id) = (global.app_id()?, global.table_id()?);
                let table = client
                    .update_table(&app_id, &table_id, &args.input())
                    .unwrap_or_exit();
                global.render_value(&table)
            }
            TableSubcommand::Delete => {
                let (app_id, table_id) = (global.app_id()?, global.table_id()?);
                global.render_value(&client.delete_table(&app_id, &table_id).unwrap_or_exit())
            }
            TableSubcommand::Import(args) => Self::import(global, &client, args),
            TableSubcommand::Export(args) => Self::export(global, &client, args),
        }
    }

    fn import(global: &GlobalArgs, client: &Client, args: &ImportArgs) -> Result<()> {
        let table_id = global.table_id()?;
        let map = args.map.as_deref().map(parse_key_values).unwrap_or_default();
        let opts = ImportOptions {
            table_id: &table_id,
            map: &map,
            merge_field_id: args.merge_field_id,
            batch_size: args.batch_size,
            delay: Duration::from_millis(args.delay),
        };

        let report = match &args.file {
            Some(path) => {
                let file = File::open(path)
                    .wrap_err_with(|| format!("error opening file {}", path.display()))?;
                ops::import(client, opts, BufReader::new(file))?
            }
            None => ops::import(client, opts, io::stdin().lock())?,
        };
        global.render(&report)
    }

    fn export(global: &GlobalArgs, client: &Client, args: &ExportArgs) -> Result<()> {
        let table_id = global.table_id()?;
        let fields = match &args.fields {
            Some(list) => parse_field_list(list).unwrap_or_exit(),
            None => Vec::new(),
        };
        let opts = ExportOptions {
            table_id: &table_id,
            fields: &fields,
            filter: args.filter.as_deref().map(parse_query),
            top: args.top,
            delay: Duration::from_millis(args.delay),
        };

        match &args.file {
            Some(path) => {
                let file = File::create(path)
                    .wrap_err_with(|| format!("error opening file {}", path.display()))?;
                let report = ops::export(client, opts, BufWriter::new(file))?;
                global.render(&report)
            }
            None => {
                // Stdout carries the CSV, so the summary goes to stderr.
                let report = ops::export(client, opts, io::stdout().lock())?;
                global.output().message(&format!(
                    "exported {} records from {}",
                    report.records_exported, report.table_id
                ))
            }
        }
    }
}
