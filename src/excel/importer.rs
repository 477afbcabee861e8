//! Excel importer implementation - workbook sheets → tabular datasets

use crate::error::{SciportError, SciportResult};
use crate::types::{file_stem, Component, ComponentValues, Dataset};
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

static EMPTY_CELL: Data = Data::Empty;

/// Excel importer: one dataset per sheet, labelled `file:Sheet`
pub struct ExcelImporter {
    path: PathBuf,
    sheet: Option<String>,
}

impl ExcelImporter {
    /// Create a new Excel importer loading every sheet
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            sheet: None,
        }
    }

    /// Only load the named sheet
    pub fn sheet(mut self, name: impl Into<String>) -> Self {
        self.sheet = Some(name.into());
        self
    }

    /// Import the workbook
    pub fn import(&self) -> SciportResult<Vec<Dataset>> {
        let mut workbook = open_workbook_auto(&self.path).map_err(|e| {
            SciportError::ExcelRead(format!("Failed to open {}: {}", self.path.display(), e))
        })?;

        let sheet_names = workbook.sheet_names().to_vec();
        let stem = file_stem(&self.path);

        if let Some(wanted) = &self.sheet {
            if !sheet_names.contains(wanted) {
                return Err(SciportError::SheetNotFound {
                    sheet: wanted.clone(),
                    available: sheet_names.join(", "),
                });
            }
        }

        let mut datasets = Vec::new();
        for sheet_name in &sheet_names {
            if self.sheet.as_ref().is_some_and(|wanted| wanted != sheet_name) {
                continue;
            }

            let range = workbook.worksheet_range(sheet_name).map_err(|e| {
                SciportError::ExcelRead(format!("Failed to read sheet '{}': {}", sheet_name, e))
            })?;

            // Skip empty sheets unless explicitly requested
            if range.is_empty() && self.sheet.is_none() {
                debug!(sheet = %sheet_name, "skipping empty sheet");
                continue;
            }

            let label = format!("{}:{}", stem, sheet_name);
            let dataset = self.process_sheet(&label, &range)?;
            debug!(
                sheet = %sheet_name,
                rows = dataset.size(),
                columns = dataset.num_components(),
                "loaded sheet"
            );
            datasets.push(dataset);
        }

        Ok(datasets)
    }

    /// Convert one worksheet: first row is the header, the rest are data
    fn process_sheet(&self, label: &str, range: &Range<Data>) -> SciportResult<Dataset> {
        let mut rows = range.rows();
        let header = match rows.next() {
            Some(header) => header,
            None => return Ok(Dataset::new(label, vec![0])),
        };
        let names = self.column_names(header);

        let body: Vec<&[Data]> = rows
            .filter(|row| !row.iter().all(is_blank))
            .collect();

        let mut dataset = Dataset::new(label, vec![body.len()]);
        for (col, name) in names.into_iter().enumerate() {
            let cells: Vec<&Data> = body
                .iter()
                .map(|row| row.get(col).unwrap_or(&EMPTY_CELL))
                .collect();
            dataset.add_component(name, Component::new(self.convert_column(&cells)))?;
        }
        Ok(dataset)
    }

    /// Header cell text, `Unnamed: N` for blanks, `.1`/`.2` suffixes for duplicates
    fn column_names(&self, header: &[Data]) -> Vec<String> {
        let mut seen: HashSet<String> = HashSet::new();
        header
            .iter()
            .enumerate()
            .map(|(col, cell)| {
                let base = match cell {
                    Data::Empty => format!("Unnamed: {}", col),
                    Data::String(s) if s.trim().is_empty() => format!("Unnamed: {}", col),
                    other => cell_text(other),
                };
                let mut name = base.clone();
                let mut suffix = 1;
                while seen.contains(&name) {
                    name = format!("{}.{}", base, suffix);
                    suffix += 1;
                }
                seen.insert(name.clone());
                name
            })
            .collect()
    }

    /// Numeric if every non-blank cell is numeric, text otherwise
    fn convert_column(&self, cells: &[&Data]) -> ComponentValues {
        let numeric = cells
            .iter()
            .all(|cell| is_blank(cell) || cell_number(cell).is_some());

        if numeric {
            ComponentValues::Numeric(
                cells
                    .iter()
                    .map(|cell| cell_number(cell).unwrap_or(f64::NAN))
                    .collect(),
            )
        } else {
            ComponentValues::Text(
                cells
                    .iter()
                    .map(|cell| if is_blank(cell) { String::new() } else { cell_text(cell) })
                    .collect(),
            )
        }
    }
}

/// Load every sheet (or only `sheet`) of a workbook
pub fn read_excel<P: AsRef<Path>>(path: P, sheet: Option<&str>) -> SciportResult<Vec<Dataset>> {
    let mut importer = ExcelImporter::new(path);
    if let Some(name) = sheet {
        importer = importer.sheet(name);
    }
    importer.import()
}

/// Sheet names in workbook order
pub fn sheet_names<P: AsRef<Path>>(path: P) -> SciportResult<Vec<String>> {
    let workbook = open_workbook_auto(path.as_ref()).map_err(|e| {
        SciportError::ExcelRead(format!("Failed to open {}: {}", path.as_ref().display(), e))
    })?;
    Ok(workbook.sheet_names().to_vec())
}

/// Empty and error cells carry no value
fn is_blank(cell: &Data) -> bool {
    matches!(cell, Data::Empty | Data::Error(_))
}

fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Data::DateTime(dt) => Some(dt.as_f64()),
        _ => None,
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        // Integral floats print without a fractional part: 1.0 → "1"
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(true) => "True".to_string(),
        Data::Bool(false) => "False".to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::Error(e) => format!("#{:?}", e),
        Data::Empty => String::new(),
    }
}
