//! Excel exporter implementation - 1-D datasets → worksheets

use crate::error::{SciportError, SciportResult};
use crate::subset::Subset;
use crate::types::{ComponentValues, Dataset};
use rust_xlsxwriter::{Note, Workbook, Worksheet};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Maximum worksheet name length allowed by Excel
const MAX_SHEET_NAME: usize = 31;

/// Excel exporter: one worksheet per dataset, header row of component labels
///
/// Units are written as a note on the header cell for people reading the
/// sheet. They are one-way: `ExcelImporter` does not read notes, so units do
/// not survive an xlsx round trip.
pub struct ExcelExporter<'a> {
    datasets: Vec<&'a Dataset>,
    subset: Option<&'a Subset>,
}

impl<'a> ExcelExporter<'a> {
    /// Create a new Excel exporter
    pub fn new(datasets: impl IntoIterator<Item = &'a Dataset>) -> Self {
        Self {
            datasets: datasets.into_iter().collect(),
            subset: None,
        }
    }

    /// Blank out entries outside `subset` (applied to every dataset)
    pub fn subset(mut self, subset: &'a Subset) -> Self {
        self.subset = Some(subset);
        self
    }

    /// Export the datasets to an Excel .xlsx file
    pub fn export(&self, output_path: &Path) -> SciportResult<()> {
        let mut workbook = Workbook::new();
        let mut used_names: HashSet<String> = HashSet::new();

        for dataset in &self.datasets {
            let name = unique_sheet_name(&sheet_name_for(&dataset.label), &mut used_names);
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&name)?;
            self.export_dataset(worksheet, dataset)?;
            debug!(dataset = %dataset.label, sheet = %name, "exported worksheet");
        }

        workbook.save(output_path)?;
        Ok(())
    }

    /// Export a single dataset to a worksheet
    fn export_dataset(&self, worksheet: &mut Worksheet, dataset: &Dataset) -> SciportResult<()> {
        if dataset.ndim() != 1 {
            return Err(SciportError::Shape(format!(
                "dataset '{}' has shape {:?}; only 1-D datasets can be written as a sheet",
                dataset.label,
                dataset.shape()
            )));
        }

        let mask = match self.subset {
            Some(subset) => Some(subset.to_mask(dataset)?),
            None => None,
        };
        let keep = |row: usize| mask.as_ref().map_or(true, |m| m[row]);

        for (col_idx, (id, component)) in dataset.components().enumerate() {
            let col = col_idx as u16;
            worksheet.write_string(0, col, id.label())?;

            // Units go into a note on the header cell; never read back
            if let Some(units) = component.units.as_deref().filter(|u| !u.is_empty()) {
                let note = Note::new(format!("units: {}", units)).set_author("sciport");
                worksheet.insert_note(0, col, &note)?;
            }

            match &component.values {
                ComponentValues::Numeric(values) => {
                    for (row, value) in values.iter().enumerate() {
                        // NaN and masked entries are left blank
                        if keep(row) && !value.is_nan() {
                            worksheet.write_number(row as u32 + 1, col, *value)?;
                        }
                    }
                }
                ComponentValues::Text(values) => {
                    for (row, value) in values.iter().enumerate() {
                        if keep(row) && !value.is_empty() {
                            worksheet.write_string(row as u32 + 1, col, value)?;
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

/// Sheet part of a `file:Sheet` label, or the whole label
fn sheet_name_for(label: &str) -> String {
    let base = label.rsplit_once(':').map_or(label, |(_, sheet)| sheet);
    sanitize_sheet_name(base)
}

/// Strip characters Excel forbids in sheet names and cap the length
fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .collect();
    let cleaned = cleaned.trim_matches('\'').trim();
    let cleaned: String = cleaned.chars().take(MAX_SHEET_NAME).collect();
    if cleaned.is_empty() {
        "Sheet".to_string()
    } else {
        cleaned
    }
}

/// Excel sheet names are case-insensitive; append ` (2)`, ` (3)`, ... on clashes
fn unique_sheet_name(base: &str, used: &mut HashSet<String>) -> String {
    let mut name = base.to_string();
    let mut n = 2;
    while used.contains(&name.to_lowercase()) {
        let suffix = format!(" ({})", n);
        let stem: String = base
            .chars()
            .take(MAX_SHEET_NAME - suffix.chars().count())
            .collect();
        name = format!("{}{}", stem, suffix);
        n += 1;
    }
    used.insert(name.to_lowercase());
    name
}
