//! Sciport - tabular and gridded scientific data import/export
//!
//! This library maps an in-memory dataset model (named, equally-shaped
//! components with optional units and WCS header cards) onto two file
//! formats, delegating the formats themselves to `fitsio` and `calamine`.
//!
//! # Features
//!
//! - Gridded FITS writer: one image HDU per component, `EXTNAME`/`BUNIT`
//! - Partial export of selected components
//! - Subset export: entries outside the subset are written as NaN
//! - Excel reader: one dataset per sheet, labelled `file:Sheet`
//! - Gridded FITS loader and tabular xlsx writer for round trips
//!
//! # Example
//!
//! ```no_run
//! use sciport::fits::FitsWriter;
//! use sciport::subset::{Subset, SubsetState};
//! use sciport::types::Dataset;
//! use std::path::Path;
//!
//! let data = Dataset::from_arrays(
//!     "grid",
//!     vec![2, 3],
//!     [
//!         ("x", vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]),
//!         ("y", vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]),
//!     ],
//! )?;
//!
//! let subset = Subset::new("bright", SubsetState::parse("x > 2")?);
//! FitsWriter::new(&data)
//!     .subset(&subset)
//!     .write(Path::new("grid.fits"))?;
//!
//! let sheets = sciport::excel::read_excel("simple_data.xlsx", None)?;
//! println!("Loaded {} sheets", sheets.len());
//! # Ok::<(), sciport::error::SciportError>(())
//! ```

pub mod cli;
pub mod error;
pub mod excel;
pub mod factories;
pub mod fits;
pub mod subset;
pub mod types;

// Re-export commonly used types
pub use error::{SciportError, SciportResult};
pub use factories::{export_data, load_data, DataFormat, ExportOptions, LoadOptions};
pub use subset::{Comparison, Subset, SubsetState};
pub use types::{Component, ComponentId, ComponentValues, Coordinates, Dataset};
