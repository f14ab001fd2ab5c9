//! File naming and directory layout for the CCMP archive.
//!
//! Daily files live under `<root>/y<YYYY>/m<MM>/` both on the remote archive
//! and in the local mirror, so the same relative path serves both.

use chrono::{Datelike, NaiveDate};
use std::path::{Path, PathBuf};

/// Product version tag embedded in daily file names.
pub const PRODUCT_VERSION: &str = "V03.0_L4.0";

/// Default remote archive root for daily files.
pub const DEFAULT_BASE_URL: &str = "https://data.remss.com/ccmp/v03.0/daily";

/// `CCMP_Wind_Analysis_<YYYYMMDD>_V03.0_L4.0.nc`
pub fn daily_filename(date: NaiveDate) -> String {
    format!(
        "CCMP_Wind_Analysis_{}_{}.nc",
        date.format("%Y%m%d"),
        PRODUCT_VERSION
    )
}

/// `y<YYYY>/m<MM>`
pub fn month_dir(year: i32, month: u32) -> String {
    format!("y{:04}/m{:02}", year, month)
}

/// `y<YYYY>/m<MM>/<daily filename>`
pub fn daily_relative_path(date: NaiveDate) -> String {
    format!(
        "{}/{}",
        month_dir(date.year(), date.month()),
        daily_filename(date)
    )
}

/// Local path of a daily file under a mirror root.
pub fn daily_path(root: &Path, date: NaiveDate) -> PathBuf {
    root.join(month_dir(date.year(), date.month()))
        .join(daily_filename(date))
}

/// Remote URL of a daily file.
pub fn daily_url(base_url: &str, date: NaiveDate) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        daily_relative_path(date)
    )
}

/// `ccmp_means_<YYYY>.nc`
pub fn aggregate_filename(year: i32) -> String {
    format!("ccmp_means_{:04}.nc", year)
}

pub fn aggregate_path(root: &Path, year: i32) -> PathBuf {
    root.join(aggregate_filename(year))
}

/// Extract the date from a daily file name, if it follows the CCMP pattern.
pub fn parse_daily_filename(name: &str) -> Option<NaiveDate> {
    let stamp = name
        .strip_prefix("CCMP_Wind_Analysis_")?
        .strip_suffix(&format!("_{}.nc", PRODUCT_VERSION))?;
    if stamp.len() != 8 {
        return None;
    }
    NaiveDate::parse_from_str(stamp, "%Y%m%d").ok()
}
