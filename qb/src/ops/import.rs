//! Import operation - read CSV rows and insert them in batches.

use std::{collections::HashMap, io::Read, thread, time::Duration};

use eyre::{Context, Result, bail, eyre};
use qbcli_client::{Client, resources::records::InsertRecordsInput};
use qbcli_core::{FieldId, RECORD_ID_FIELD, Record, TableSchema, build_record};
use tracing::{debug, info};

use crate::reports::ImportReport;

/// Highest id of the fields Quick Base maintains itself.
const LAST_BUILTIN_FIELD: FieldId = 5;

/// Options for the import operation.
pub struct ImportOptions<'a> {
    pub table_id: &'a str,
    /// CSV header label to destination field label.
    pub map: &'a [(String, String)],
    /// Upsert on this field instead of always creating records.
    pub merge_field_id: Option<FieldId>,
    /// Records sent per insert request.
    pub batch_size: usize,
    /// Pause between batches.
    pub delay: Duration,
}

/// Execute the import operation.
///
/// The first CSV row names the destination fields by label. Built-in
/// fields are not writable and are dropped, except the record id when it
/// is the merge field.
pub fn import<R: Read>(client: &Client, opts: ImportOptions, reader: R) -> Result<ImportReport> {
    if opts.batch_size == 0 {
        bail!("batch size must be greater than zero");
    }

    let schema = client.table_schema(opts.table_id)?;
    let mut csv = csv::Reader::from_reader(reader);
    let header = csv.headers().wrap_err("failed to read CSV header")?.clone();
    let columns = resolve_columns(&schema, header.iter(), opts.map, opts.merge_field_id)?;
    debug!(table = opts.table_id, ?columns, "resolved import columns");

    let mut report = ImportReport {
        table_id: opts.table_id.to_string(),
        ..ImportReport::default()
    };
    let mut batch: Vec<Record> = Vec::with_capacity(opts.batch_size.min(1024));

    for (index, row) in csv.records().enumerate() {
        let line = index + 1;
        let row = row.wrap_err_with(|| format!("failed to read row {line}"))?;
        let pairs = columns
            .iter()
            .zip(row.iter())
            .filter_map(|(column, raw)| column.map(|id| (id, raw)));
        let record = build_record(&schema, pairs).map_err(|e| eyre!("row {line}: {e}"))?;
        batch.push(record);
        report.rows_read += 1;

        if batch.len() >= opts.batch_size {
            send_batch(client, &opts, &mut batch, &mut report)?;
            if !opts.delay.is_zero() {
                thread::sleep(opts.delay);
            }
        }
    }

    if !batch.is_empty() {
        send_batch(client, &opts, &mut batch, &mut report)?;
    }

    Ok(report)
}

/// Map each CSV column to the field it writes, or `None` when skipped.
fn resolve_columns<'h>(
    schema: &TableSchema,
    header: impl Iterator<Item = &'h str>,
    map: &[(String, String)],
    merge_field_id: Option<FieldId>,
) -> Result<Vec<Option<FieldId>>> {
    let map: HashMap<&str, &str> = map.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    header
        .map(|label| {
            let label = map.get(label).copied().unwrap_or(label);
            let field = schema
                .by_label(label)
                .ok_or_else(|| eyre!("'{label}' field not in destination table"))?;
            let writable = match field.id {
                RECORD_ID_FIELD => merge_field_id == Some(RECORD_ID_FIELD),
                id => id > LAST_BUILTIN_FIELD,
            };
            Ok(writable.then_some(field.id))
        })
        .collect()
}

fn send_batch(
    client: &Client,
    opts: &ImportOptions,
    batch: &mut Vec<Record>,
    report: &mut ImportReport,
) -> Result<()> {
    let input = InsertRecordsInput {
        to: opts.table_id.to_string(),
        data: std::mem::take(batch),
        merge_field_id: opts.merge_field_id,
        fields_to_return: Vec::new(),
    };
    let output = client
        .insert_records(&input)
        .wrap_err("error inserting records")?;
    report.batches += 1;
    report.metadata.merge(output.metadata);
    info!(
        table = opts.table_id,
        batch = report.batches,
        rows = report.rows_read,
        "imported batch"
    );
    Ok(())
}
