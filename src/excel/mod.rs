//! Excel import/export for tabular datasets
//!
//! - Import: workbook sheets (.xlsx, .xlsm, .xlsb, .xls, .ods) → datasets labelled `file:Sheet`
//! - Export: 1-D datasets → worksheets (.xlsx)

mod exporter;
mod importer;

pub use exporter::ExcelExporter;
pub use importer::{read_excel, sheet_names, ExcelImporter};
