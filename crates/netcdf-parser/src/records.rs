//! Point records extracted from a daily file for loading into a document store.
//!
//! A daily file becomes one [`FileMetadata`] record (variable attributes and
//! the decoded time axis) plus one [`PointRecord`] per grid cell that has at
//! least one observed slot. Slots where every daily variable is missing are
//! dropped from the record.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use tracing::debug;

use ccmp_common::grid::tidy_longitude;
use ccmp_common::time::{decode_hours, hours_since_epoch};
use ccmp_common::DailyGrid;

use crate::daily::{DailyGridFile, DUMP_VARIABLES};
use crate::error::{NetCdfError, NetCdfResult};

/// Epoch of the daily `time` axis when its `units` attribute is absent.
pub fn ccmp_time_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1987, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableInfo {
    pub name: String,
    pub units: Option<String>,
    pub long_name: Option<String>,
}

/// Description of one daily file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileMetadata {
    pub source: String,
    pub variables: Vec<VariableInfo>,
    pub timeseries: Vec<DateTime<Utc>>,
}

/// Observed slots of one grid cell.
///
/// Each series is aligned with `timestamps`; `None` marks a variable missing
/// in a slot where some other variable was observed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointRecord {
    /// `<longitude>_<latitude>`
    pub id: String,
    pub latitude: f64,
    /// On [-180, 180].
    pub longitude: f64,
    pub timestamps: Vec<DateTime<Utc>>,
    pub uwnd: Vec<Option<f64>>,
    pub vwnd: Vec<Option<f64>>,
    pub ws: Vec<Option<f64>>,
    pub nobs: Vec<Option<f64>>,
}

impl PointRecord {
    fn new(latitude: f64, longitude: f64) -> Self {
        let longitude = tidy_longitude(longitude);
        Self {
            id: format!("{}_{}", longitude, latitude),
            latitude,
            longitude,
            timestamps: Vec::new(),
            uwnd: Vec::new(),
            vwnd: Vec::new(),
            ws: Vec::new(),
            nobs: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Decoded `time` axis of a daily file.
pub fn timeseries(grid: &DailyGridFile) -> NetCdfResult<Vec<DateTime<Utc>>> {
    let hours = grid.coordinates("time")?;
    let epoch = grid
        .units("time")
        .and_then(|units| hours_since_epoch(&units))
        .unwrap_or_else(ccmp_time_epoch);

    let times = decode_hours(epoch, &hours);
    if times.len() != grid.slots() {
        return Err(NetCdfError::InvalidFormat(format!(
            "time axis of {} has {} entries for {} slots",
            grid.path().display(),
            times.len(),
            grid.slots()
        )));
    }
    Ok(times)
}

/// Attributes and time axis of a daily file.
pub fn file_metadata(grid: &DailyGridFile) -> NetCdfResult<FileMetadata> {
    let variables = DUMP_VARIABLES
        .iter()
        .map(|name| VariableInfo {
            name: name.to_string(),
            units: grid.units(name),
            long_name: grid.long_name(name),
        })
        .collect();

    let source = grid
        .path()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(FileMetadata {
        source,
        variables,
        timeseries: timeseries(grid)?,
    })
}

/// Records for every cell of latitude row `lat` that has an observed slot.
///
/// `times` is the file's decoded time axis, as returned by [`timeseries`].
pub fn row_records(
    grid: &DailyGridFile,
    lat: usize,
    times: &[DateTime<Utc>],
) -> NetCdfResult<Vec<PointRecord>> {
    let latitudes = grid.coordinates("latitude")?;
    let longitudes = grid.coordinates("longitude")?;
    let latitude = *latitudes.get(lat).ok_or_else(|| NetCdfError::OutOfBounds {
        variable: "latitude".to_string(),
        index: vec![lat],
        shape: vec![latitudes.len()],
    })?;

    let slots = grid.slots();
    let [uwnd, vwnd, ws, nobs] = [
        grid.masked_row("uwnd", lat)?,
        grid.masked_row("vwnd", lat)?,
        grid.masked_row("ws", lat)?,
        grid.masked_row("nobs", lat)?,
    ];
    let expected = longitudes.len() * slots;
    if [&uwnd, &vwnd, &ws, &nobs].iter().any(|row| row.len() != expected) {
        return Err(NetCdfError::InvalidFormat(format!(
            "row {} of {} does not match the longitude axis",
            lat,
            grid.path().display()
        )));
    }

    let mut records = Vec::new();
    for (lon, &longitude) in longitudes.iter().enumerate() {
        let mut record = PointRecord::new(latitude, longitude);
        for (slot, &time) in times.iter().enumerate().take(slots) {
            let i = lon * slots + slot;
            let values = [uwnd[i], vwnd[i], ws[i], nobs[i]];
            if values.iter().all(Option::is_none) {
                continue;
            }
            record.timestamps.push(time);
            record.uwnd.push(values[0]);
            record.vwnd.push(values[1]);
            record.ws.push(values[2]);
            record.nobs.push(values[3]);
        }
        if !record.is_empty() {
            records.push(record);
        }
    }

    debug!(lat, records = records.len(), "Extracted row");
    Ok(records)
}
