use clap::{Args, Subcommand};
use eyre::{Result, eyre};
use qbcli_client::{
    query::{parse_field_list, parse_group_by, parse_key_values, parse_query, parse_sort_by},
    resources::records::{InsertRecordsInput, QueryOptions, QueryRecordsInput},
};
use qbcli_core::{FieldId, TableSchema, build_record};

use super::{GlobalArgs, UnwrapOrExit};
use crate::reports::RecordsReport;

#[derive(Args)]
pub struct RecordCommand {
    #[command(subcommand)]
    command: RecordSubcommand,
}

#[derive(Subcommand)]
enum RecordSubcommand {
    /// Insert or upsert a record
    Insert(InsertArgs),

    /// Query records
    Query(QueryArgs),

    /// Delete the records matching a filter
    Delete(DeleteArgs),
}

#[derive(Args)]
struct InsertArgs {
    /// Values as field=value pairs, keyed by field ID or label,
    /// e.g. "6=Write 'Due date'=2024-06-30"
    #[arg(long)]
    data: String,

    /// Update the record whose value in this field matches
    #[arg(long)]
    merge_field_id: Option<FieldId>,

    /// Comma separated field IDs to return for the written record
    #[arg(long)]
    fields_to_return: Option<String>,
}

#[derive(Args)]
struct QueryArgs {
    /// Comma separated field IDs (defaults to the table's default columns)
    #[arg(long)]
    select: Option<String>,

    /// Filter, either a query string or field=value pairs
    #[arg(long = "where")]
    filter: Option<String>,

    /// Sort clauses, e.g. "7 DESC,8"
    #[arg(long)]
    sort_by: Option<String>,

    /// Group clauses, e.g. "6 same-value"
    #[arg(long)]
    group_by: Option<String>,

    /// Records to skip
    #[arg(long, default_value_t = 0)]
    skip: u64,

    /// Maximum number of records to return
    #[arg(long)]
    top: Option<u64>,
}

#[derive(Args)]
struct DeleteArgs {
    /// Filter, either a query string or field=value pairs
    #[arg(long = "where")]
    filter: String,
}

/// A field ID, or the label of a field in `schema`.
fn resolve_field(schema: &TableSchema, key: &str) -> Result<FieldId> {
    if let Ok(id) = key.trim().parse::<FieldId>() {
        return Ok(id);
    }
    schema
        .by_label(key)
        .map(|f| f.id)
        .ok_or_else(|| eyre!("field '{key}' not found in table '{}'", schema.table_id()))
}

impl RecordCommand {
    pub fn run(&self, global: &GlobalArgs) -> Result<()> {
        let client = global.client()?;
        let table_id = global.table_id()?;
        match &self.command {
            RecordSubcommand::Insert(args) => {
                let schema = client.table_schema(&table_id).unwrap_or_exit();
                let pairs = parse_key_values(&args.data)
                    .into_iter()
                    .map(|(key, value)| Ok((resolve_field(&schema, &key)?, value)))
                    .collect::<Result<Vec<_>>>()?;
                let record = build_record(&schema, pairs).unwrap_or_exit();

                let fields_to_return = match &args.fields_to_return {
                    Some(list) => parse_field_list(list).unwrap_or_exit(),
                    None => Vec::new(),
                };
                let input = InsertRecordsInput {
                    to: table_id,
                    data: vec![record],
                    merge_field_id: args.merge_field_id,
                    fields_to_return,
                };
                global.render_value(&client.insert_records(&input).unwrap_or_exit())
            }
            RecordSubcommand::Query(args) => {
                let input = QueryRecordsInput {
                    from: table_id,
                    select: match &args.select {
                        Some(list) => parse_field_list(list).unwrap_or_exit(),
                        None => Vec::new(),
                    },
                    filter: args.filter.as_deref().map(parse_query),
                    sort_by: match &args.sort_by {
                        Some(s) => parse_sort_by(s).unwrap_or_exit(),
                        None => Vec::new(),
                    },
                    group_by: match &args.group_by {
                        Some(s) => parse_group_by(s).unwrap_or_exit(),
                        None => Vec::new(),
                    },
                    options: (args.skip > 0 || args.top.is_some()).then_some(QueryOptions {
                        skip: args.skip,
                        top: args.top,
                    }),
                };
                let result = client.query_records(&input).unwrap_or_exit();
                global.render(&RecordsReport::new(&result))
            }
            RecordSubcommand::Delete(args) => {
                let filter = parse_query(&args.filter);
                global.render_value(&client.delete_records(&table_id, &filter).unwrap_or_exit())
            }
        }
    }
}
