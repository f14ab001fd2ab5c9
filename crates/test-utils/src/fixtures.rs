//! NetCDF fixture writers that mimic the CCMP file layouts.
//!
//! Fixtures use a small extent so they stay cheap to create, but keep the
//! real variable names, dimension order and directory layout.

use std::error::Error;
use std::path::{Path, PathBuf};

use ccmp_common::grid::{ccmp_latitude, ccmp_longitude};
use ccmp_common::naming::{aggregate_path, daily_path};
use ccmp_common::{GridCell, GridExtent, WindVariable, SLOTS_PER_DAY};
use chrono::NaiveDate;

type FixtureResult<T> = Result<T, Box<dyn Error>>;

/// A three-bucket lattice table for 1993 used by fixture-based tests.
pub const FIXTURE_LATTICE_YAML: &str = r#"
years:
  1993:
    - "1993-01-10T00:00:00Z"
    - "1993-01-17T00:00:00Z"
    - "1993-01-24T00:00:00Z"
"#;

/// Write a daily file under `<root>/y<YYYY>/m<MM>/`.
///
/// `value(name, cell, slot)` supplies every element of `uwnd`, `vwnd`, `ws`
/// and `nobs`.
pub fn write_daily_file<F>(
    root: &Path,
    date: NaiveDate,
    extent: GridExtent,
    value: F,
) -> FixtureResult<PathBuf>
where
    F: Fn(&str, GridCell, usize) -> f32,
{
    write_daily_file_with_fill(root, date, extent, None, value)
}

/// Like [`write_daily_file`], also tagging the wind variables with `_FillValue`.
pub fn write_daily_file_with_fill<F>(
    root: &Path,
    date: NaiveDate,
    extent: GridExtent,
    fill_value: Option<f32>,
    value: F,
) -> FixtureResult<PathBuf>
where
    F: Fn(&str, GridCell, usize) -> f32,
{
    let path = daily_path(root, date);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = netcdf::create(&path)?;
    file.add_attribute("title", "Synthetic CCMP daily fixture")?;
    file.add_dimension("latitude", extent.n_lat)?;
    file.add_dimension("longitude", extent.n_lon)?;
    file.add_dimension("time", SLOTS_PER_DAY)?;

    write_coordinates(&mut file, extent)?;
    write_time_axis(&mut file, date)?;

    let names = WindVariable::ALL
        .iter()
        .map(|v| v.name())
        .chain(std::iter::once("nobs"));
    for name in names {
        let mut data = Vec::with_capacity(extent.cell_count() * SLOTS_PER_DAY);
        for lat in 0..extent.n_lat {
            for lon in 0..extent.n_lon {
                for slot in 0..SLOTS_PER_DAY {
                    data.push(value(name, GridCell::new(lat, lon), slot));
                }
            }
        }

        let mut var = file.add_variable::<f32>(name, &["latitude", "longitude", "time"])?;
        if let (Some(fill), true) = (fill_value, name != "nobs") {
            var.put_attribute("_FillValue", fill)?;
        }
        if name != "nobs" {
            var.put_attribute("units", "m s-1")?;
        }
        var.put_attribute("long_name", long_name(name))?;
        var.put_values(&data, ..)?;
    }

    Ok(path)
}

/// Write `ccmp_means_<year>.nc` under `root`.
///
/// `mean` and `nobs` supply the recorded value and count for each
/// (variable, bucket, cell).
pub fn write_aggregate_file<M, N>(
    root: &Path,
    year: i32,
    buckets: usize,
    extent: GridExtent,
    mean: M,
    nobs: N,
) -> FixtureResult<PathBuf>
where
    M: Fn(WindVariable, usize, GridCell) -> f32,
    N: Fn(WindVariable, usize, GridCell) -> f32,
{
    std::fs::create_dir_all(root)?;
    let path = aggregate_path(root, year);

    let mut file = netcdf::create(&path)?;
    file.add_attribute("title", "Synthetic CCMP weekly means fixture")?;
    file.add_dimension("time", buckets)?;
    file.add_dimension("latitude", extent.n_lat)?;
    file.add_dimension("longitude", extent.n_lon)?;

    write_coordinates(&mut file, extent)?;

    for variable in WindVariable::ALL {
        let mut means = Vec::with_capacity(buckets * extent.cell_count());
        let mut counts = Vec::with_capacity(buckets * extent.cell_count());
        for bucket in 0..buckets {
            for lat in 0..extent.n_lat {
                for lon in 0..extent.n_lon {
                    let cell = GridCell::new(lat, lon);
                    means.push(mean(variable, bucket, cell));
                    counts.push(nobs(variable, bucket, cell));
                }
            }
        }

        {
            let mut var =
                file.add_variable::<f32>(variable.name(), &["time", "latitude", "longitude"])?;
            var.put_values(&means, ..)?;
        }
        {
            let mut var = file.add_variable::<f32>(
                &variable.nobs_name(),
                &["time", "latitude", "longitude"],
            )?;
            var.put_values(&counts, ..)?;
        }
    }

    Ok(path)
}

fn long_name(name: &str) -> &'static str {
    match name {
        "uwnd" => "u-wind vector component at 10 meters",
        "vwnd" => "v-wind vector component at 10 meters",
        "ws" => "wind speed at 10 meters",
        _ => "number of observations used to derive wind vector components",
    }
}

/// Six-hourly `time` axis in hours since 1987-01-01, as the archive writes it.
fn write_time_axis(file: &mut netcdf::FileMut, date: NaiveDate) -> FixtureResult<()> {
    let epoch = NaiveDate::from_ymd_opt(1987, 1, 1).ok_or("invalid epoch")?;
    let first = (date - epoch).num_hours() as f64;
    let hours: Vec<f64> = (0..SLOTS_PER_DAY).map(|slot| first + 6.0 * slot as f64).collect();

    let mut var = file.add_variable::<f64>("time", &["time"])?;
    var.put_attribute("units", "hours since 1987-01-01 00:00:00")?;
    var.put_values(&hours, ..)?;
    Ok(())
}

fn write_coordinates(file: &mut netcdf::FileMut, extent: GridExtent) -> FixtureResult<()> {
    {
        let lats: Vec<f32> = (0..extent.n_lat).map(|i| ccmp_latitude(i) as f32).collect();
        let mut var = file.add_variable::<f32>("latitude", &["latitude"])?;
        var.put_attribute("units", "degrees_north")?;
        var.put_values(&lats, ..)?;
    }
    {
        let lons: Vec<f32> = (0..extent.n_lon).map(|i| ccmp_longitude(i) as f32).collect();
        let mut var = file.add_variable::<f32>("longitude", &["longitude"])?;
        var.put_attribute("units", "degrees_east")?;
        var.put_values(&lons, ..)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_fixture_lands_in_layout() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(1993, 1, 17).unwrap();
        let path = write_daily_file(dir.path(), date, GridExtent::new(2, 3), |_, _, _| 1.0).unwrap();
        assert!(path.ends_with("y1993/m01/CCMP_Wind_Analysis_19930117_V03.0_L4.0.nc"));
        assert!(path.exists());
    }

    #[test]
    fn test_coordinates_written_with_ccmp_centres() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(1993, 1, 17).unwrap();
        let path = write_daily_file(dir.path(), date, GridExtent::new(2, 3), |_, _, _| 1.0).unwrap();

        let file = netcdf::open(&path).unwrap();
        let lats = file.variable("latitude").unwrap().get_values::<f32, _>(..).unwrap();
        let lons = file.variable("longitude").unwrap().get_values::<f32, _>(..).unwrap();
        assert_eq!(lats, vec![-89.875, -89.625]);
        assert_eq!(lons, vec![0.125, 0.375, 0.625]);
    }

    #[test]
    fn test_aggregate_fixture_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_aggregate_file(
            dir.path(),
            1993,
            3,
            GridExtent::new(2, 3),
            |_, _, _| 0.0,
            |_, _, _| 0.0,
        )
        .unwrap();
        assert!(path.ends_with("ccmp_means_1993.nc"));
    }
}
