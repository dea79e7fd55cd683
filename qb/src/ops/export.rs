//! Export operation - page through a table and write it as CSV.

use std::{io::Write, thread, time::Duration};

use eyre::{Context, Result, bail, eyre};
use qbcli_client::{
    Client,
    resources::records::{QueryOptions, QueryRecordsInput, SortBy, SortOrder},
};
use qbcli_core::{FieldId, RECORD_ID_FIELD};
use tracing::info;

use crate::reports::ExportReport;

/// Options for the export operation.
pub struct ExportOptions<'a> {
    pub table_id: &'a str,
    /// Columns to export; every field of the table when empty.
    pub fields: &'a [FieldId],
    /// Optional query filter.
    pub filter: Option<String>,
    /// Records requested per page.
    pub top: u64,
    /// Pause between pages.
    pub delay: Duration,
}

/// Execute the export operation.
///
/// Records are requested in record id order so that paging is stable
/// while the table is being written to.
pub fn export<W: Write>(client: &Client, opts: ExportOptions, writer: W) -> Result<ExportReport> {
    if opts.top == 0 {
        bail!("page size must be greater than zero");
    }

    let schema = client.table_schema(opts.table_id)?;
    let field_ids: Vec<FieldId> = if opts.fields.is_empty() {
        schema.ids().collect()
    } else {
        opts.fields.to_vec()
    };

    let mut header = Vec::with_capacity(field_ids.len());
    for id in &field_ids {
        let field = schema
            .field(*id)
            .ok_or_else(|| eyre!("field {id} not found in table '{}'", opts.table_id))?;
        header.push(field.label.clone());
    }

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(&header).wrap_err("failed to write CSV header")?;

    let mut report = ExportReport {
        table_id: opts.table_id.to_string(),
        field_ids: field_ids.clone(),
        ..ExportReport::default()
    };

    let mut skip = 0;
    loop {
        let input = QueryRecordsInput {
            from: opts.table_id.to_string(),
            select: field_ids.clone(),
            filter: opts.filter.clone(),
            sort_by: vec![SortBy {
                field_id: RECORD_ID_FIELD,
                order: SortOrder::Asc,
            }],
            options: Some(QueryOptions {
                skip,
                top: Some(opts.top),
            }),
            ..QueryRecordsInput::default()
        };
        let page = client.query_records(&input)?;
        report.pages += 1;

        for record in &page.records {
            let row = field_ids
                .iter()
                .map(|id| record.get(*id).map(ToString::to_string).unwrap_or_default());
            csv.write_record(row).wrap_err("failed to write CSV row")?;
        }
        csv.flush().wrap_err("failed to write CSV")?;
        report.records_exported += page.records.len() as u64;

        info!(
            table = opts.table_id,
            exported = report.records_exported,
            total = page.metadata.total_records,
            "exported page"
        );

        skip += opts.top;
        if skip >= page.metadata.total_records || page.records.is_empty() {
            break;
        }
        if !opts.delay.is_zero() {
            thread::sleep(opts.delay);
        }
    }

    Ok(report)
}
