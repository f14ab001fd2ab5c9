//! Reader for CCMP daily wind analysis files.
//!
//! A daily file holds `uwnd`, `vwnd`, `ws` and `nobs`, each laid out as
//! `(latitude, longitude, time)` with four six-hourly slots. Files are read
//! with masking disabled: NaN marks a missing value, and so does a value equal
//! to the variable's `_FillValue` when the attribute is present.

use std::path::{Path, PathBuf};

use ccmp_common::{CcmpResult, DailyGrid, GridCell, WindVariable};
use tracing::debug;

use crate::error::{NetCdfError, NetCdfResult};
use crate::native::{
    get_f64_attr, get_string_attr, open_file, read_coordinate, read_point, read_row,
    require_variable, shape,
};

/// Variables printed by a cell dump, in order.
pub const DUMP_VARIABLES: [&str; 4] = ["uwnd", "vwnd", "ws", "nobs"];

/// An open CCMP daily file.
pub struct DailyGridFile {
    path: PathBuf,
    file: netcdf::File,
    slots: usize,
    fill_values: [Option<f64>; 3],
}

impl DailyGridFile {
    /// Open a daily file and check it carries the three wind variables.
    pub fn open(path: impl AsRef<Path>) -> NetCdfResult<Self> {
        let path = path.as_ref();
        let file = open_file(path)?;

        let mut slots = None;
        let mut fill_values = [None; 3];
        for (i, variable) in WindVariable::ALL.iter().enumerate() {
            let var = require_variable(&file, variable.name())?;
            let dims = shape(&var);
            if dims.len() != 3 {
                return Err(NetCdfError::InvalidFormat(format!(
                    "{} in {} has {} dimensions, expected (latitude, longitude, time)",
                    variable,
                    path.display(),
                    dims.len()
                )));
            }
            match slots {
                None => slots = Some(dims[2]),
                Some(n) if n != dims[2] => {
                    return Err(NetCdfError::InvalidFormat(format!(
                        "{} has {} time slots, other variables have {}",
                        variable, dims[2], n
                    )))
                }
                Some(_) => {}
            }
            fill_values[i] = get_f64_attr(&var, "_FillValue");
        }

        debug!(path = %path.display(), slots = ?slots, "Opened daily grid");

        Ok(Self {
            path: path.to_path_buf(),
            file,
            slots: slots.unwrap_or(0),
            fill_values,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw value of any 3-D daily variable, with no masking applied.
    pub fn raw_value(&self, name: &str, cell: GridCell, slot: usize) -> NetCdfResult<f64> {
        read_point(&self.file, name, [cell.lat, cell.lon, slot])
    }

    /// All raw slot values of `name` at `cell`.
    pub fn slot_series(&self, name: &str, cell: GridCell) -> NetCdfResult<Vec<f64>> {
        (0..self.slots)
            .map(|slot| self.raw_value(name, cell, slot))
            .collect()
    }

    /// `units` attribute of a variable, if any.
    pub fn units(&self, name: &str) -> Option<String> {
        self.string_attribute(name, "units")
    }

    /// `long_name` attribute of a variable, if any.
    pub fn long_name(&self, name: &str) -> Option<String> {
        self.string_attribute(name, "long_name")
    }

    fn string_attribute(&self, name: &str, attr: &str) -> Option<String> {
        self.file
            .variable(name)
            .and_then(|var| get_string_attr(&var, attr))
    }

    /// A whole 1-D variable such as `latitude`, `longitude` or `time`.
    pub fn coordinates(&self, name: &str) -> NetCdfResult<Vec<f64>> {
        read_coordinate(&self.file, name)
    }

    /// One latitude row of `name`, longitude-major, with NaN and `_FillValue`
    /// elements mapped to `None`.
    pub fn masked_row(&self, name: &str, lat: usize) -> NetCdfResult<Vec<Option<f64>>> {
        let fill = self
            .file
            .variable(name)
            .and_then(|var| get_f64_attr(&var, "_FillValue"));
        let raw = read_row(&self.file, name, lat)?;
        Ok(raw
            .into_iter()
            .map(|v| (!v.is_nan() && Some(v) != fill).then_some(v))
            .collect())
    }

    /// Index of an exact coordinate value in a 1-D coordinate variable.
    pub fn coordinate_index(&self, name: &str, value: f64) -> NetCdfResult<Option<usize>> {
        let coords = read_coordinate(&self.file, name)?;
        Ok(coords.iter().position(|c| (c - value).abs() < 1e-6))
    }

    /// Grid cell at an exact (latitude, longitude) coordinate pair.
    pub fn locate(&self, latitude: f64, longitude: f64) -> NetCdfResult<GridCell> {
        let lat = self.coordinate_index("latitude", latitude)?.ok_or_else(|| {
            NetCdfError::MissingData(format!("latitude {} in {}", latitude, self.path.display()))
        })?;
        let lon = self.coordinate_index("longitude", longitude)?.ok_or_else(|| {
            NetCdfError::MissingData(format!("longitude {} in {}", longitude, self.path.display()))
        })?;
        Ok(GridCell::new(lat, lon))
    }

    fn fill_value(&self, variable: WindVariable) -> Option<f64> {
        WindVariable::ALL
            .iter()
            .position(|v| *v == variable)
            .and_then(|i| self.fill_values[i])
    }
}

impl DailyGrid for DailyGridFile {
    fn value(&self, variable: WindVariable, cell: GridCell, slot: usize) -> CcmpResult<Option<f64>> {
        let raw = self.raw_value(variable.name(), cell, slot)?;
        if raw.is_nan() || self.fill_value(variable) == Some(raw) {
            return Ok(None);
        }
        Ok(Some(raw))
    }

    fn slots(&self) -> usize {
        self.slots
    }
}
