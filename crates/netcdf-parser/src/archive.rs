//! Local mirror of the daily archive, laid out as `<root>/y<YYYY>/m<MM>/`.

use std::path::PathBuf;

use ccmp_common::naming::daily_path;
use ccmp_common::{ArchiveError, ObservationArchive};
use chrono::NaiveDate;

use crate::daily::DailyGridFile;

/// Opens daily files from a local directory tree.
#[derive(Debug, Clone)]
pub struct NetCdfArchive {
    root: PathBuf,
}

impl NetCdfArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ObservationArchive for NetCdfArchive {
    type Grid = DailyGridFile;

    fn open_day(&self, date: NaiveDate) -> Result<DailyGridFile, ArchiveError> {
        let path = daily_path(&self.root, date);
        if !path.is_file() {
            return Err(ArchiveError::Missing { date, path });
        }

        DailyGridFile::open(&path).map_err(|e| ArchiveError::Unreadable {
            date,
            message: e.to_string(),
        })
    }
}
