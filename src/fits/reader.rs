//! Gridded FITS loader - image HDUs → datasets

use crate::error::SciportResult;
use crate::types::{file_stem, Component, Coordinates, Dataset, HeaderValue};
use fitsio::hdu::{FitsHdu, HduInfo};
use fitsio::FitsFile;
use std::path::{Path, PathBuf};
use tracing::debug;

/// cfitsio status when moving past the last HDU
const END_OF_FILE: i32 = 107;

/// Reads every non-empty image HDU of a FITS file
pub struct FitsReader {
    path: PathBuf,
}

impl FitsReader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load image HDUs, merging those of equal shape into one dataset
    pub fn read(&self) -> SciportResult<Vec<Dataset>> {
        let mut fptr = FitsFile::open(&self.path)?;
        let stem = file_stem(&self.path);
        let mut datasets: Vec<Dataset> = Vec::new();

        let mut index = 0;
        loop {
            let hdu = match fptr.hdu(index) {
                Ok(hdu) => hdu,
                Err(fitsio::errors::Error::Fits(e)) if e.status == END_OF_FILE => break,
                Err(e) => return Err(e.into()),
            };
            let shape = match &hdu.info {
                HduInfo::ImageInfo { shape, .. } => shape.clone(),
                _ => {
                    debug!(hdu = index, "skipping non-image HDU");
                    index += 1;
                    continue;
                }
            };
            if shape.is_empty() || shape.iter().product::<usize>() == 0 {
                debug!(hdu = index, "skipping empty image HDU");
                index += 1;
                continue;
            }

            let name = hdu
                .read_key::<String>(&mut fptr, "EXTNAME")
                .ok()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| default_name(index));
            let values: Vec<f64> = hdu.read_image(&mut fptr)?;
            let mut component = Component::new(values);
            component.units = hdu.read_key::<String>(&mut fptr, "BUNIT").ok();

            let position = datasets.iter().position(|d| d.shape() == shape.as_slice());
            let dataset = match position {
                Some(pos) => &mut datasets[pos],
                None => {
                    let label = if datasets.is_empty() {
                        stem.clone()
                    } else {
                        format!("{}[{}]", stem, name)
                    };
                    let mut dataset = Dataset::new(label, shape.clone());
                    dataset.coords = read_coordinates(&mut fptr, &hdu);
                    datasets.push(dataset);
                    let last = datasets.len() - 1;
                    &mut datasets[last]
                }
            };

            let name = unique_name(dataset, name, index);
            debug!(hdu = index, component = %name, dataset = %dataset.label, "read FITS image");
            dataset.add_component(name, component)?;

            index += 1;
        }

        Ok(datasets)
    }
}

/// `name`, or `name_{n}` for the first free `n >= index` when taken
fn unique_name(dataset: &Dataset, name: String, index: usize) -> String {
    if dataset.id(&name).is_none() {
        return name;
    }
    let mut n = index;
    loop {
        let candidate = format!("{}_{}", name, n);
        if dataset.id(&candidate).is_none() {
            return candidate;
        }
        n += 1;
    }
}

fn default_name(index: usize) -> String {
    if index == 0 {
        "PRIMARY".to_string()
    } else {
        format!("HDU{}", index)
    }
}

/// Per-axis WCS keywords, in the order `Coordinates::linear` emits them
const WCS_AXIS_KEYS: [(&str, bool); 5] = [
    ("CRPIX", false),
    ("CDELT", false),
    ("CUNIT", true),
    ("CTYPE", true),
    ("CRVAL", false),
];

/// Linear WCS cards, if the HDU declares WCSAXES
fn read_coordinates(fptr: &mut FitsFile, hdu: &FitsHdu) -> Option<Coordinates> {
    let naxes = hdu.read_key::<i64>(fptr, "WCSAXES").ok()?;
    let mut coords = Coordinates::default();
    coords.set("WCSAXES", HeaderValue::Int(naxes));

    for axis in 1..=naxes {
        for (prefix, textual) in WCS_AXIS_KEYS {
            let key = format!("{prefix}{axis}");
            let value = if textual {
                hdu.read_key::<String>(fptr, &key).ok().map(HeaderValue::Text)
            } else {
                hdu.read_key::<f64>(fptr, &key).ok().map(HeaderValue::Float)
            };
            if let Some(value) = value {
                coords.set(key, value);
            }
        }
    }
    Some(coords)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names() {
        assert_eq!(default_name(0), "PRIMARY");
        assert_eq!(default_name(3), "HDU3");
    }

    #[test]
    fn test_unique_name_skips_taken_suffixes() {
        let data = Dataset::from_arrays(
            "d",
            vec![1],
            [("x", vec![1.0]), ("x_2", vec![2.0]), ("x_3", vec![3.0])],
        )
        .unwrap();
        assert_eq!(unique_name(&data, "y".to_string(), 2), "y");
        assert_eq!(unique_name(&data, "x".to_string(), 2), "x_4");
        assert_eq!(unique_name(&data, "x_2".to_string(), 5), "x_2_5");
    }
}
