//! Grid extent and cell addressing for the CCMP 0.25° global grid.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of six-hourly synoptic slots in one daily file.
pub const SLOTS_PER_DAY: usize = 4;

/// Size of a latitude/longitude grid in index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridExtent {
    /// Number of latitude rows
    pub n_lat: usize,
    /// Number of longitude columns
    pub n_lon: usize,
}

impl GridExtent {
    /// The full CCMP grid: 720 latitudes by 1440 longitudes.
    pub const CCMP_GLOBAL: GridExtent = GridExtent {
        n_lat: 720,
        n_lon: 1440,
    };

    pub fn new(n_lat: usize, n_lon: usize) -> Self {
        Self { n_lat, n_lon }
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        cell.lat < self.n_lat && cell.lon < self.n_lon
    }

    pub fn cell_count(&self) -> usize {
        self.n_lat * self.n_lon
    }
}

impl Default for GridExtent {
    fn default() -> Self {
        Self::CCMP_GLOBAL
    }
}

/// A single grid cell, by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub lat: usize,
    pub lon: usize,
}

impl GridCell {
    pub fn new(lat: usize, lon: usize) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lat={} lon={}", self.lat, self.lon)
    }
}

/// Latitude of a row center on the CCMP grid (-89.875 at row 0).
pub fn ccmp_latitude(lat_idx: usize) -> f64 {
    -89.875 + lat_idx as f64 * 0.25
}

/// Longitude of a column center on the CCMP grid (0.125 at column 0).
pub fn ccmp_longitude(lon_idx: usize) -> f64 {
    0.125 + lon_idx as f64 * 0.25
}

/// Map a longitude on [0, 360] to [-180, 180]. Values up to 180 are kept.
pub fn tidy_longitude(longitude: f64) -> f64 {
    if longitude <= 180.0 {
        longitude
    } else {
        longitude - 360.0
    }
}
