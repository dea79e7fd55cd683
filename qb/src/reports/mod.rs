//! Report data structures for commands.
//!
//! Commands build reports, then render them to an [`Output`] in the format
//! selected with `--output`.

mod batch;
mod formula;
mod output;
mod records;
mod resource;

pub use batch::{ExportReport, ImportReport};
pub use formula::{FormulaDeployReport, FormulaTestReport};
pub use output::{Output, OutputFormat, Report, Rows, TerminalOutput};
pub use records::RecordsReport;
pub use resource::ResourceReport;
