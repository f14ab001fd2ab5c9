//! Round-trip tests against NetCDF fixtures written in the CCMP layout.

use ccmp_common::{AggregateGrid, DailyGrid, GridCell, GridExtent, ObservationArchive, WindVariable};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use netcdf_parser::{
    file_metadata, row_records, timeseries, AggregateGridFile, DailyGridFile, NetCdfArchive,
    NetCdfError,
};
use test_utils::{
    assert_approx_eq, require_test_file, write_aggregate_file, write_daily_file,
    write_daily_file_with_fill,
};

fn jan17() -> NaiveDate {
    NaiveDate::from_ymd_opt(1993, 1, 17).unwrap()
}

fn encoded(name: &str, cell: GridCell, slot: usize) -> f32 {
    let base = match name {
        "uwnd" => 0.0,
        "vwnd" => 1000.0,
        "ws" => 2000.0,
        _ => 3000.0,
    };
    base + (cell.lat * 100 + cell.lon * 10 + slot) as f32
}

// ============================================================================
// Daily grids
// ============================================================================

#[test]
fn test_daily_values_follow_lat_lon_slot_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_daily_file(dir.path(), jan17(), GridExtent::new(3, 4), encoded).unwrap();

    let grid = DailyGridFile::open(&path).unwrap();
    assert_eq!(grid.slots(), 4);

    let cell = GridCell::new(2, 3);
    assert_eq!(grid.value(WindVariable::Uwnd, cell, 1).unwrap(), Some(231.0));
    assert_eq!(grid.value(WindVariable::Vwnd, cell, 0).unwrap(), Some(1230.0));
    assert_eq!(grid.value(WindVariable::Ws, cell, 3).unwrap(), Some(2233.0));
    assert_eq!(
        grid.slot_series("nobs", cell).unwrap(),
        vec![3230.0, 3231.0, 3232.0, 3233.0]
    );
}

#[test]
fn test_daily_nan_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_daily_file(dir.path(), jan17(), GridExtent::new(2, 2), |name, _, slot| {
        if name == "vwnd" && slot == 2 {
            f32::NAN
        } else {
            4.5
        }
    })
    .unwrap();

    let grid = DailyGridFile::open(&path).unwrap();
    let cell = GridCell::new(1, 1);
    assert_eq!(grid.value(WindVariable::Vwnd, cell, 2).unwrap(), None);
    assert_eq!(grid.value(WindVariable::Vwnd, cell, 1).unwrap(), Some(4.5));
    assert!(grid.raw_value("vwnd", cell, 2).unwrap().is_nan());
}

#[test]
fn test_daily_fill_value_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_daily_file_with_fill(
        dir.path(),
        jan17(),
        GridExtent::new(2, 2),
        Some(-9999.0),
        |_, cell, _| if cell.lat == 0 { -9999.0 } else { 1.25 },
    )
    .unwrap();

    let grid = DailyGridFile::open(&path).unwrap();
    assert_eq!(grid.value(WindVariable::Ws, GridCell::new(0, 1), 0).unwrap(), None);
    assert_eq!(grid.value(WindVariable::Ws, GridCell::new(1, 1), 0).unwrap(), Some(1.25));
}

#[test]
fn test_daily_out_of_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_daily_file(dir.path(), jan17(), GridExtent::new(2, 2), encoded).unwrap();
    let grid = DailyGridFile::open(&path).unwrap();

    match grid.raw_value("uwnd", GridCell::new(2, 0), 0) {
        Err(NetCdfError::OutOfBounds { shape, .. }) => assert_eq!(shape, vec![2, 2, 4]),
        other => panic!("Expected OutOfBounds, got {:?}", other),
    }
    assert!(grid.value(WindVariable::Uwnd, GridCell::new(0, 0), 4).is_err());
}

#[test]
fn test_locate_exact_coordinates() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_daily_file(dir.path(), jan17(), GridExtent::new(4, 4), encoded).unwrap();
    let grid = DailyGridFile::open(&path).unwrap();

    assert_eq!(grid.locate(-89.625, 0.375).unwrap(), GridCell::new(1, 1));
    assert!(matches!(
        grid.locate(-78.375, 0.125),
        Err(NetCdfError::MissingData(_))
    ));
    assert_eq!(grid.units("uwnd").as_deref(), Some("m s-1"));
}

#[test]
fn test_archive_opens_fixture_by_date() {
    let dir = tempfile::tempdir().unwrap();
    write_daily_file(dir.path(), jan17(), GridExtent::new(2, 2), |_, _, _| 7.0).unwrap();

    let archive = NetCdfArchive::new(dir.path());
    let grid = archive.open_day(jan17()).unwrap();
    assert_eq!(grid.value(WindVariable::Ws, GridCell::new(0, 0), 0).unwrap(), Some(7.0));
    assert!(archive.open_day(jan17().succ_opt().unwrap()).is_err());
}

// ============================================================================
// Aggregates
// ============================================================================

#[test]
fn test_aggregate_shape_and_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_aggregate_file(
        dir.path(),
        1993,
        3,
        GridExtent::new(2, 5),
        |variable, bucket, cell| match variable {
            WindVariable::Uwnd => bucket as f32 + 0.5,
            WindVariable::Vwnd => -999.9,
            WindVariable::Ws => cell.lon as f32,
        },
        |_, bucket, _| (bucket * 4) as f32,
    )
    .unwrap();

    let agg = AggregateGridFile::open(&path).unwrap();
    assert_eq!(agg.extent(), GridExtent::new(2, 5));
    assert_eq!(agg.buckets(), 3);

    let cell = GridCell::new(1, 4);
    assert_eq!(agg.mean(WindVariable::Uwnd, 2, cell).unwrap(), 2.5);
    assert_eq!(agg.mean(WindVariable::Ws, 0, cell).unwrap(), 4.0);
    assert_eq!(agg.nobs(WindVariable::Ws, 2, cell).unwrap(), 8.0);
    assert!(ccmp_common::is_no_data(agg.mean(WindVariable::Vwnd, 1, cell).unwrap()));
    assert!(agg.mean(WindVariable::Uwnd, 3, cell).is_err());
}

#[test]
fn test_daily_file_is_not_an_aggregate() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_daily_file(dir.path(), jan17(), GridExtent::new(2, 2), encoded).unwrap();
    assert!(matches!(
        AggregateGridFile::open(&path),
        Err(NetCdfError::MissingData(_))
    ));
}

// ============================================================================
// Point records
// ============================================================================

#[test]
fn test_file_metadata_reads_attributes_and_time_axis() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_daily_file(dir.path(), jan17(), GridExtent::new(2, 2), encoded).unwrap();
    let grid = DailyGridFile::open(&path).unwrap();

    let meta = file_metadata(&grid).unwrap();
    assert_eq!(meta.source, "CCMP_Wind_Analysis_19930117_V03.0_L4.0.nc");

    let names: Vec<&str> = meta.variables.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["uwnd", "vwnd", "ws", "nobs"]);
    assert_eq!(meta.variables[0].units.as_deref(), Some("m s-1"));
    assert_eq!(meta.variables[3].units, None);
    assert!(meta.variables[3].long_name.as_deref().unwrap().contains("observations"));

    let first = Utc.with_ymd_and_hms(1993, 1, 17, 0, 0, 0).unwrap();
    assert_eq!(
        meta.timeseries,
        vec![
            first,
            first + Duration::hours(6),
            first + Duration::hours(12),
            first + Duration::hours(18)
        ]
    );
}

#[test]
fn test_row_records_drop_empty_slots_and_cells() {
    let dir = tempfile::tempdir().unwrap();
    let extent = GridExtent::new(2, 1440);
    let path = write_daily_file(dir.path(), jan17(), extent, |name, cell, slot| {
        match (cell.lon, slot, name) {
            (0, _, _) => 1.0,
            (1439, 0, _) => f32::NAN,
            (1439, 2, "vwnd") => f32::NAN,
            (1439, _, _) => 2.0,
            _ => f32::NAN,
        }
    })
    .unwrap();
    let grid = DailyGridFile::open(&path).unwrap();
    let times = timeseries(&grid).unwrap();

    let records = row_records(&grid, 1, &times).unwrap();
    assert_eq!(records.len(), 2);

    let west = &records[0];
    assert_eq!(west.longitude, 0.125);
    assert_eq!(west.latitude, -89.625);
    assert_eq!(west.timestamps, times);

    let east = &records[1];
    assert_eq!(east.longitude, -0.125);
    assert_eq!(east.id, "-0.125_-89.625");
    assert_eq!(east.timestamps, times[1..].to_vec());
    assert_eq!(east.vwnd, vec![Some(2.0), None, Some(2.0)]);
    assert_eq!(east.nobs, vec![Some(2.0); 3]);

    assert!(matches!(
        row_records(&grid, 2, &times),
        Err(NetCdfError::OutOfBounds { .. })
    ));
}

#[test]
fn test_row_records_respect_fill_value() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_daily_file_with_fill(
        dir.path(),
        jan17(),
        GridExtent::new(1, 2),
        Some(-9999.0),
        |name, cell, _| match (name, cell.lon) {
            ("nobs", _) => f32::NAN,
            (_, 0) => -9999.0,
            _ => 3.0,
        },
    )
    .unwrap();
    let grid = DailyGridFile::open(&path).unwrap();
    let times = timeseries(&grid).unwrap();

    let records = row_records(&grid, 0, &times).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].ws, vec![Some(3.0); 4]);
    assert_eq!(records[0].nobs, vec![None; 4]);
}

// ============================================================================
// Real data (skipped unless TEST_DATA_DIR provides it)
// ============================================================================

#[test]
fn test_real_daily_file_shape() {
    let path = require_test_file!("CCMP_Wind_Analysis_19930117_V03.0_L4.0.nc");
    let grid = DailyGridFile::open(&path).unwrap();
    assert_eq!(grid.slots(), 4);

    let cell = grid.locate(-78.375, 0.125).unwrap();
    assert_eq!(cell, GridCell::new(46, 0));

    for slot in 0..4 {
        let ws = grid.value(WindVariable::Ws, cell, slot).unwrap();
        let u = grid.value(WindVariable::Uwnd, cell, slot).unwrap();
        let v = grid.value(WindVariable::Vwnd, cell, slot).unwrap();
        if let (Some(ws), Some(u), Some(v)) = (ws, u, v) {
            assert!(ws >= 0.0);
            assert_approx_eq!(ws, (u * u + v * v).sqrt(), 0.1);
        }
    }
}
