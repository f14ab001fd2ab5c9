//! Low-level helpers around the native netcdf library.
//!
//! Every reader in this crate goes through [`open_file`] and [`read_point`],
//! which keep HDF5 quiet and turn libnetcdf failures into [`NetCdfError`].

use std::path::Path;
use std::sync::Once;

use crate::error::{NetCdfError, NetCdfResult};

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when errors
/// are handled gracefully by the Rust code (e.g., when checking for optional
/// attributes that don't exist). This creates confusing log spam like:
///
/// ```text
/// HDF5-DIAG: Error detected in HDF5 (1.10.8) thread 3:
///   #003: ../../../src/H5Adense.c line 397 in H5A__dense_open(): can't locate attribute in name index
/// ```
///
/// This function disables that output by calling H5Eset_auto2 with null handlers.
/// It only needs to be called once per process, but is safe to call multiple times.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Open a NetCDF file read-only.
pub fn open_file(path: &Path) -> NetCdfResult<netcdf::File> {
    silence_hdf5_errors();

    if !path.exists() {
        return Err(NetCdfError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )));
    }

    netcdf::open(path).map_err(|e| {
        NetCdfError::InvalidFormat(format!("Failed to open {}: {}", path.display(), e))
    })
}

/// Look up a variable, failing with `MissingData` if absent.
pub fn require_variable<'f>(
    file: &'f netcdf::File,
    name: &str,
) -> NetCdfResult<netcdf::Variable<'f>> {
    file.variable(name)
        .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", name)))
}

/// Shape of a variable, one length per dimension.
pub fn shape(var: &netcdf::Variable) -> Vec<usize> {
    var.dimensions().iter().map(|d| d.len()).collect()
}

/// Read one element of a 3-D variable as f64, bounds-checked.
pub fn read_point(file: &netcdf::File, name: &str, index: [usize; 3]) -> NetCdfResult<f64> {
    let var = require_variable(file, name)?;
    let dims = shape(&var);

    if dims.len() != index.len() || index.iter().zip(&dims).any(|(i, len)| i >= len) {
        return Err(NetCdfError::OutOfBounds {
            variable: name.to_string(),
            index: index.to_vec(),
            shape: dims,
        });
    }

    Ok(var.get_value::<f64, _>(index)?)
}

/// Read the `(longitude, time)` slab of a 3-D variable at latitude row `lat`.
///
/// Values come back longitude-major: element `lon * slots + slot`.
pub fn read_row(file: &netcdf::File, name: &str, lat: usize) -> NetCdfResult<Vec<f64>> {
    let var = require_variable(file, name)?;
    let dims = shape(&var);

    if dims.len() != 3 || lat >= dims[0] {
        return Err(NetCdfError::OutOfBounds {
            variable: name.to_string(),
            index: vec![lat],
            shape: dims,
        });
    }

    Ok(var.get_values::<f64, _>([lat..lat + 1, 0..dims[1], 0..dims[2]])?)
}

/// Read a whole 1-D coordinate variable.
pub fn read_coordinate(file: &netcdf::File, name: &str) -> NetCdfResult<Vec<f64>> {
    let var = require_variable(file, name)?;
    Ok(var.get_values::<f64, _>(..)?)
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
pub fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

/// Helper to get f64 attribute.
pub fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}

/// Helper to get a string attribute.
pub fn get_string_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        netcdf::AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}
