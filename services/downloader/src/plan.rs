//! Which calendar days a fetch run covers.
//!
//! Every plan is a list of real calendar days in ascending order; dates that
//! do not exist (February 30th, month 13) are rejected up front.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

use ccmp_common::time::{days_in_month, days_in_range};

pub fn single_day(year: i32, month: u32, day: u32) -> Result<Vec<NaiveDate>> {
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .with_context(|| format!("{:04}-{:02}-{:02} is not a calendar day", year, month, day))?;
    Ok(vec![date])
}

pub fn month(year: i32, month: u32) -> Result<Vec<NaiveDate>> {
    days_in_month(year, month)
        .with_context(|| format!("{:04}-{:02} is not a calendar month", year, month))
}

/// Every day of `year` starting at the first of `from_month`.
pub fn year(year: i32, from_month: u32) -> Result<Vec<NaiveDate>> {
    if !(1..=12).contains(&from_month) {
        bail!("--from-month must be in 1..=12, got {}", from_month);
    }
    let mut days = Vec::new();
    for m in from_month..=12 {
        days.extend(month(year, m)?);
    }
    Ok(days)
}

/// Inclusive range of days.
pub fn range(start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>> {
    if end < start {
        bail!("range end {} is before start {}", end, start);
    }
    Ok(days_in_range(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_single_day() {
        assert_eq!(single_day(1993, 1, 17).unwrap(), vec![date(1993, 1, 17)]);
        assert!(single_day(1993, 2, 30).is_err());
    }

    #[test]
    fn test_month_lengths() {
        assert_eq!(month(1993, 2).unwrap().len(), 28);
        assert_eq!(month(1996, 2).unwrap().len(), 29);
        assert_eq!(month(1993, 12).unwrap().last(), Some(&date(1993, 12, 31)));
        assert!(month(1993, 13).is_err());
    }

    #[test]
    fn test_year_from_june() {
        let days = year(1993, 6).unwrap();
        assert_eq!(days.len(), 214);
        assert_eq!(days[0], date(1993, 6, 1));
        assert_eq!(year(1993, 1).unwrap().len(), 365);
        assert!(year(1993, 0).is_err());
    }

    #[test]
    fn test_range() {
        let days = range(date(1993, 1, 30), date(1993, 2, 2)).unwrap();
        assert_eq!(days.len(), 4);
        assert!(range(date(1993, 2, 2), date(1993, 1, 30)).is_err());
    }
}
