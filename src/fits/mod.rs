//! Gridded FITS import/export
//!
//! - Export: Dataset → one image HDU per numeric component (EXTNAME, BUNIT, WCS)
//! - Import: image HDUs → datasets grouped by shape

mod reader;
mod writer;

pub use reader::FitsReader;
pub use writer::{fits_writer, FitsWriter};
