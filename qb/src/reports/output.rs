//! Output trait for rendering reports in the format picked with `--output`.

use std::io::Write;

use clap::ValueEnum;
use eyre::{Context, Result};
use serde_json::Value as Json;
use tabled::{builder::Builder, settings::Style};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
    Csv,
    Markdown,
}

/// Rows under a header line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rows {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Target output for reports.
///
/// Reports describe their data twice, as a JSON document and as rows.
/// The output picks whichever suits the selected format.
pub trait Output {
    fn render(&mut self, report: &dyn Report) -> Result<()>;

    /// A progress or status line for humans.
    fn message(&mut self, text: &str) -> Result<()>;
}

/// A report that can render itself to an output.
pub trait Report {
    fn json(&self) -> Json;

    fn rows(&self) -> Rows;
}

/// Writes reports to stdout, or to any writer in tests.
pub struct TerminalOutput<W> {
    writer: W,
    format: OutputFormat,
    quiet: bool,
}

impl<W: Write> TerminalOutput<W> {
    pub fn new(writer: W, format: OutputFormat, quiet: bool) -> Self {
        Self {
            writer,
            format,
            quiet,
        }
    }

    fn write_table(&mut self, rows: Rows, markdown: bool) -> Result<()> {
        let mut builder = Builder::default();
        builder.push_record(rows.headers);
        for row in rows.rows {
            builder.push_record(row);
        }
        let mut table = builder.build();
        if markdown {
            table.with(Style::markdown());
        } else {
            table.with(Style::rounded());
        }
        writeln!(self.writer, "{table}").wrap_err("failed to write output")
    }

    fn write_csv(&mut self, rows: Rows) -> Result<()> {
        let mut writer = csv::Writer::from_writer(&mut self.writer);
        writer.write_record(&rows.headers)?;
        for row in &rows.rows {
            writer.write_record(row)?;
        }
        writer.flush().wrap_err("failed to write output")
    }
}

impl<W: Write> Output for TerminalOutput<W> {
    fn render(&mut self, report: &dyn Report) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&report.json())?;
                writeln!(self.writer, "{json}").wrap_err("failed to write output")
            }
            OutputFormat::Table => self.write_table(report.rows(), false),
            OutputFormat::Markdown => self.write_table(report.rows(), true),
            OutputFormat::Csv => self.write_csv(report.rows()),
        }
    }

    fn message(&mut self, text: &str) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        eprintln!("{text}");
        Ok(())
    }
}
