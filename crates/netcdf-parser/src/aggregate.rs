//! Reader for yearly CCMP means files (`ccmp_means_<YYYY>.nc`).
//!
//! Each wind variable has a weekly mean laid out as `(time, latitude,
//! longitude)` and a companion `<variable>_nobs` count with the same shape.

use std::path::Path;

use ccmp_common::{AggregateGrid, CcmpResult, GridCell, GridExtent, WindVariable};
use tracing::info;

use crate::error::{NetCdfError, NetCdfResult};
use crate::native::{open_file, read_point, require_variable, shape};

/// An open yearly aggregate file.
pub struct AggregateGridFile {
    file: netcdf::File,
    extent: GridExtent,
    buckets: usize,
}

impl AggregateGridFile {
    /// Open an aggregate and check every mean and count variable agrees on shape.
    pub fn open(path: impl AsRef<Path>) -> NetCdfResult<Self> {
        let path = path.as_ref();
        let file = open_file(path)?;

        let mut expected: Option<Vec<usize>> = None;
        for variable in WindVariable::ALL {
            for name in [variable.name().to_string(), variable.nobs_name()] {
                let var = require_variable(&file, &name)?;
                let dims = shape(&var);
                if dims.len() != 3 {
                    return Err(NetCdfError::InvalidFormat(format!(
                        "{} in {} has {} dimensions, expected (time, latitude, longitude)",
                        name,
                        path.display(),
                        dims.len()
                    )));
                }
                match &expected {
                    None => expected = Some(dims),
                    Some(first) if *first != dims => {
                        return Err(NetCdfError::InvalidFormat(format!(
                            "{} has shape {:?}, expected {:?}",
                            name, dims, first
                        )))
                    }
                    Some(_) => {}
                }
            }
        }

        let dims = expected.unwrap_or_else(|| vec![0, 0, 0]);
        let extent = GridExtent::new(dims[1], dims[2]);

        info!(
            path = %path.display(),
            buckets = dims[0],
            n_lat = extent.n_lat,
            n_lon = extent.n_lon,
            "Opened aggregate grid"
        );

        Ok(Self {
            file,
            extent,
            buckets: dims[0],
        })
    }
}

impl AggregateGrid for AggregateGridFile {
    fn extent(&self) -> GridExtent {
        self.extent
    }

    fn buckets(&self) -> usize {
        self.buckets
    }

    fn mean(&self, variable: WindVariable, bucket: usize, cell: GridCell) -> CcmpResult<f64> {
        Ok(read_point(
            &self.file,
            variable.name(),
            [bucket, cell.lat, cell.lon],
        )?)
    }

    fn nobs(&self, variable: WindVariable, bucket: usize, cell: GridCell) -> CcmpResult<f64> {
        Ok(read_point(
            &self.file,
            &variable.nobs_name(),
            [bucket, cell.lat, cell.lon],
        )?)
    }
}
