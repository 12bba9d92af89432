//! Spreadsheet report built from the score cache.
//!
//! - [`table`]: [`ReportBuilder`] turns cached records into a normalized [`Table`]
//! - [`xlsx`]: [`XlsxReportWriter`] renders a table into an `.xlsx` file

pub mod table;
pub mod xlsx;

pub use table::{
    COLUMN_PADDING, Cell, LINK_COLOR, LINK_SYMBOL, LinkStyle, NameCell, REPORT_HEADERS,
    ROW_HEIGHT, ReportBuilder, ReportOptions, ReportRow, Table, coerce_score,
};
pub use xlsx::{ReportWriter, XlsxReportWriter, output_file_name};
