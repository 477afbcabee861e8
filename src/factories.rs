//! Format detection and dispatch to the FITS and Excel adapters

use crate::error::{SciportError, SciportResult};
use crate::excel::{ExcelExporter, ExcelImporter};
use crate::fits::{FitsReader, FitsWriter};
use crate::subset::{Subset, SubsetState};
use crate::types::{ComponentId, Dataset};
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// First bytes of every FITS file
const FITS_MAGIC: &[u8] = b"SIMPLE  =";

/// Supported file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    Fits,
    Excel,
}

impl DataFormat {
    /// Detect from the extension, then from the FITS signature
    pub fn from_path(path: &Path) -> Option<Self> {
        Self::from_extension(path).or_else(|| Self::sniff(path))
    }

    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "fits" | "fit" | "fts" => Some(DataFormat::Fits),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(DataFormat::Excel),
            _ => None,
        }
    }

    fn sniff(path: &Path) -> Option<Self> {
        let mut head = [0u8; FITS_MAGIC.len()];
        let mut file = File::open(path).ok()?;
        file.read_exact(&mut head).ok()?;
        (head == FITS_MAGIC).then_some(DataFormat::Fits)
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataFormat::Fits => write!(f, "fits"),
            DataFormat::Excel => write!(f, "xlsx"),
        }
    }
}

impl FromStr for DataFormat {
    type Err = SciportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fits" | "fit" | "fts" => Ok(DataFormat::Fits),
            "xlsx" | "excel" => Ok(DataFormat::Excel),
            other => Err(SciportError::UnsupportedFormat(format!(
                "'{}' (expected fits or xlsx)",
                other
            ))),
        }
    }
}

/// Options for loading a file
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Force a format instead of detecting it
    pub format: Option<DataFormat>,
    /// Workbook sheet to load (Excel only)
    pub sheet: Option<String>,
}

/// Options for exporting a dataset
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub format: Option<DataFormat>,
    /// Components to export, in order; all when `None`
    pub components: Option<Vec<ComponentId>>,
    pub subset: Option<Subset>,
    pub overwrite: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: None,
            components: None,
            subset: None,
            overwrite: true,
        }
    }
}

/// Load every dataset in a file, detecting its format
pub fn load_data<P: AsRef<Path>>(path: P) -> SciportResult<Vec<Dataset>> {
    load_data_with(path, &LoadOptions::default())
}

pub fn load_data_with<P: AsRef<Path>>(path: P, options: &LoadOptions) -> SciportResult<Vec<Dataset>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SciportError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )));
    }

    let format = resolve_format(path, options.format)?;
    debug!(path = %path.display(), %format, "loading data");

    match format {
        DataFormat::Fits => {
            if options.sheet.is_some() {
                return Err(SciportError::UnsupportedFormat(
                    "sheet selection only applies to Excel workbooks".to_string(),
                ));
            }
            FitsReader::new(path).read()
        }
        DataFormat::Excel => {
            let mut importer = ExcelImporter::new(path);
            if let Some(sheet) = &options.sheet {
                importer = importer.sheet(sheet.clone());
            }
            importer.import()
        }
    }
}

/// Write one dataset to `path` in the requested or detected format.
///
/// Paths without a recognised extension default to FITS.
pub fn export_data<P: AsRef<Path>>(path: P, data: &Dataset, options: &ExportOptions) -> SciportResult<()> {
    let path = path.as_ref();
    let format = options
        .format
        .or_else(|| DataFormat::from_extension(path))
        .unwrap_or(DataFormat::Fits);
    debug!(path = %path.display(), %format, dataset = %data.label, "exporting data");

    match format {
        DataFormat::Fits => {
            let mut writer = FitsWriter::new(data).overwrite(options.overwrite);
            if let Some(ids) = &options.components {
                writer = writer.components(ids.iter().cloned());
            }
            if let Some(subset) = &options.subset {
                writer = writer.subset(subset);
            }
            writer.write(path)
        }
        DataFormat::Excel => {
            if !options.overwrite && path.exists() {
                return Err(SciportError::Io(std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    format!("{} already exists", path.display()),
                )));
            }
            // The subset may refer to components that are not exported
            let masked = match &options.subset {
                Some(subset) => Some(Subset::new(
                    subset.label.clone(),
                    SubsetState::Mask(subset.to_mask(data)?),
                )),
                None => None,
            };
            let selected;
            let data = match &options.components {
                Some(ids) => {
                    selected = select_components(data, ids)?;
                    &selected
                }
                None => data,
            };
            let mut exporter = ExcelExporter::new([data]);
            if let Some(subset) = &masked {
                exporter = exporter.subset(subset);
            }
            exporter.export(path)
        }
    }
}

fn resolve_format(path: &Path, forced: Option<DataFormat>) -> SciportResult<DataFormat> {
    forced
        .or_else(|| DataFormat::from_path(path))
        .ok_or_else(|| SciportError::UnsupportedFormat(format!("cannot detect format of {}", path.display())))
}

/// Copy of `data` holding only `ids`, in that order
fn select_components(data: &Dataset, ids: &[ComponentId]) -> SciportResult<Dataset> {
    let mut selected = Dataset::new(data.label.clone(), data.shape().to_vec());
    selected.coords = data.coords.clone();
    for id in ids {
        let component = data.get_component(id.label())?;
        selected.add_component(id.clone(), component.clone())?;
    }
    Ok(selected)
}
