//! Gridded FITS writer - Dataset → one image HDU per component

use crate::error::{SciportError, SciportResult};
use crate::subset::Subset;
use crate::types::{Component, ComponentId, Coordinates, Dataset, HeaderValue};
use fitsio::hdu::FitsHdu;
use fitsio::images::{ImageDescription, ImageType};
use fitsio::FitsFile;
use std::ffi::CString;
use std::path::Path;
use tracing::{debug, warn};

/// cfitsio status for a keyword missing from the header
const KEY_NO_EXIST: i32 = 202;

/// Writes the numeric components of a dataset as FITS images
pub struct FitsWriter<'a> {
    data: &'a Dataset,
    components: Option<Vec<ComponentId>>,
    subset: Option<&'a Subset>,
    overwrite: bool,
}

impl<'a> FitsWriter<'a> {
    /// Create a new writer exporting every component of `data`
    pub fn new(data: &'a Dataset) -> Self {
        Self {
            data,
            components: None,
            subset: None,
            overwrite: true,
        }
    }

    /// Only export these components, in this order
    pub fn components<I, C>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ComponentId>,
    {
        self.components = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Replace entries outside `subset` with NaN
    pub fn subset(mut self, subset: &'a Subset) -> Self {
        self.subset = Some(subset);
        self
    }

    /// Whether an existing file at the target path may be replaced
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Write the FITS file
    pub fn write(&self, path: &Path) -> SciportResult<()> {
        let selected = self.selected_components()?;
        let mask = match self.subset {
            Some(subset) => Some(subset.to_mask(self.data)?),
            None => None,
        };

        let mut images: Vec<(&ComponentId, &Component, Vec<f64>)> = Vec::new();
        for (id, component) in selected {
            match component.values.as_numeric() {
                Some(values) => images.push((id, component, masked(values, mask.as_deref()))),
                None => warn!(
                    component = %id,
                    dataset = %self.data.label,
                    "skipping non-numeric component in FITS export"
                ),
            }
        }

        if images.is_empty() || self.data.size() == 0 {
            return Err(SciportError::Empty(format!(
                "dataset '{}' has no numeric components to write",
                self.data.label
            )));
        }

        if path.exists() {
            if !self.overwrite {
                return Err(SciportError::Io(std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    format!("{} already exists", path.display()),
                )));
            }
            std::fs::remove_file(path)?;
        }

        let description = ImageDescription {
            data_type: ImageType::Double,
            dimensions: self.data.shape(),
        };

        // The first image lives in the primary HDU, so N components give N HDUs
        let mut fptr = FitsFile::create(path)
            .with_custom_primary(&description)
            .open()?;

        for (index, (id, component, values)) in images.iter().enumerate() {
            let hdu = if index == 0 {
                let primary = fptr.primary_hdu()?;
                name_primary(&mut fptr, &primary, id.label())?;
                primary
            } else {
                fptr.create_image(id.label(), &description)?
            };

            if let Some(coords) = &self.data.coords {
                write_coordinates(&mut fptr, &hdu, coords)?;
            }
            if let Some(units) = &component.units {
                hdu.write_key(&mut fptr, "BUNIT", units.as_str())?;
            }
            hdu.write_image(&mut fptr, values.as_slice())?;

            debug!(
                hdu = index,
                component = %id,
                shape = ?self.data.shape(),
                "wrote FITS image"
            );
        }

        Ok(())
    }

    fn selected_components(&self) -> SciportResult<Vec<(&'a ComponentId, &'a Component)>> {
        let data = self.data;
        match &self.components {
            None => Ok(data.components().collect()),
            Some(ids) => ids
                .iter()
                .map(|wanted| {
                    data.components()
                        .find(|(id, _)| *id == wanted)
                        .ok_or_else(|| {
                            SciportError::UnknownComponent(format!(
                                "'{}' in dataset '{}'",
                                wanted, data.label
                            ))
                        })
                })
                .collect(),
        }
    }
}

/// Write every component of `data` (or only `components`) to `path`
pub fn fits_writer(
    path: &Path,
    data: &Dataset,
    components: Option<&[ComponentId]>,
) -> SciportResult<()> {
    let mut writer = FitsWriter::new(data);
    if let Some(ids) = components {
        writer = writer.components(ids.iter().cloned());
    }
    writer.write(path)
}

/// Set EXTNAME on the primary HDU.
///
/// `with_custom_primary` already writes `EXTNAME = '_PRIMARY'` and `write_key`
/// only appends cards, so the existing card is updated in place.
fn name_primary(fptr: &mut FitsFile, primary: &FitsHdu, name: &str) -> SciportResult<()> {
    let keyname = CString::new("EXTNAME").map_err(std::io::Error::from)?;
    let value = CString::new(name).map_err(std::io::Error::from)?;
    let comment = CString::new("component name").map_err(std::io::Error::from)?;

    let mut status = 0;
    unsafe {
        fitsio::sys::ffukys(
            fptr.as_raw(),
            keyname.as_ptr(),
            value.as_ptr(),
            comment.as_ptr(),
            &mut status,
        );
    }
    if status == KEY_NO_EXIST {
        primary.write_key(fptr, "EXTNAME", name)?;
        return Ok(());
    }
    fitsio::errors::check_status(status)?;
    Ok(())
}

fn masked(values: &[f64], mask: Option<&[bool]>) -> Vec<f64> {
    match mask {
        None => values.to_vec(),
        Some(mask) => values
            .iter()
            .zip(mask)
            .map(|(v, keep)| if *keep { *v } else { f64::NAN })
            .collect(),
    }
}

fn write_coordinates(fptr: &mut FitsFile, hdu: &FitsHdu, coords: &Coordinates) -> SciportResult<()> {
    for card in &coords.cards {
        match &card.value {
            HeaderValue::Int(v) => hdu.write_key(fptr, &card.key, *v)?,
            HeaderValue::Float(v) => hdu.write_key(fptr, &card.key, *v)?,
            HeaderValue::Text(v) => hdu.write_key(fptr, &card.key, v.as_str())?,
        }
    }
    Ok(())
}
