//! Print every slot of one grid cell in a daily file.

use std::fmt;
use std::path::Path;

use ccmp_common::GridCell;
use netcdf_parser::{DailyGridFile, NetCdfResult, DUMP_VARIABLES};

/// Slot values of `uwnd`, `vwnd`, `ws` and `nobs` at one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellDump {
    pub latitude: f64,
    pub longitude: f64,
    pub cell: GridCell,
    pub series: Vec<(String, Vec<f64>)>,
}

impl CellDump {
    /// Read the cell at exact coordinates `(latitude, longitude)`.
    pub fn read(path: impl AsRef<Path>, latitude: f64, longitude: f64) -> NetCdfResult<Self> {
        let grid = DailyGridFile::open(path)?;
        let cell = grid.locate(latitude, longitude)?;
        let series = DUMP_VARIABLES
            .iter()
            .map(|name| Ok((name.to_string(), grid.slot_series(name, cell)?)))
            .collect::<NetCdfResult<Vec<_>>>()?;

        Ok(Self {
            latitude,
            longitude,
            cell,
            series,
        })
    }
}

impl fmt::Display for CellDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "latitude={} longitude={} ({})",
            self.latitude, self.longitude, self.cell
        )?;
        for (name, values) in &self.series {
            writeln!(f, "{:<5} {:?}", name, values)?;
        }
        Ok(())
    }
}
