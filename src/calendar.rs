//! The cells of a month's calendar grid, with weeks starting on Sunday.

use crate::Result;
use anyhow::{ensure, Context};
use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// One cell of the grid: either a placeholder before the 1st or a day of the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    Blank,
    Day(u32),
}

impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Blank => Ok(()),
            Cell::Day(d) => write!(f, "{d}"),
        }
    }
}

/// A calendar month. Always holds a valid year and month, so the 1st of the month exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CalendarMonth {
    first: NaiveDate,
}

impl CalendarMonth {
    /// # Errors
    /// - Returns an error if `month` is not in `1..=12` or the year is out of range.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        ensure!(
            (1..=12).contains(&month),
            "Month must be between 1 and 12, got {month}"
        );
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .with_context(|| format!("{year}-{month:02} is not a valid month"))?;
        Ok(Self { first })
    }

    /// The month that contains `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn days_in_month(&self) -> u32 {
        match self.first.checked_add_months(Months::new(1)) {
            Some(next) => (next - self.first).num_days() as u32,
            // Only December of the last representable year gets here
            None => 31,
        }
    }

    /// The weekday index of the 1st, Sunday = 0 through Saturday = 6. This is also the number of
    /// blank cells that lead the grid.
    pub fn first_weekday_offset(&self) -> u32 {
        self.first.weekday().num_days_from_sunday()
    }

    /// The cells to render in order: `first_weekday_offset` blanks, then days `1..=N`.
    pub fn cells(&self) -> Vec<Cell> {
        let blanks = std::iter::repeat(Cell::Blank).take(self.first_weekday_offset() as usize);
        let days = (1..=self.days_in_month()).map(Cell::Day);
        blanks.chain(days).collect()
    }

    /// The cell texts: `""` for blanks and `"1"` through `"N"` for days.
    pub fn labels(&self) -> Vec<String> {
        self.cells().iter().map(Cell::to_string).collect()
    }

    /// The date of `day` in this month, if the month has that day.
    pub fn date_of(&self, day: u32) -> Option<NaiveDate> {
        self.first.with_day(day)
    }

    pub fn previous(&self) -> Option<Self> {
        self.first
            .checked_sub_months(Months::new(1))
            .map(|first| Self { first })
    }

    pub fn next(&self) -> Option<Self> {
        self.first
            .checked_add_months(Months::new(1))
            .map(|first| Self { first })
    }
}

impl Display for CalendarMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.first.format("%B %Y"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_starting_wednesday() {
        // 2024-05-01 is a Wednesday
        let month = CalendarMonth::new(2024, 5).unwrap();
        assert_eq!(month.first_weekday_offset(), 3);
        let labels = month.labels();
        assert_eq!(&labels[..3], &["", "", ""]);
        let days: Vec<String> = (1..=31).map(|d| d.to_string()).collect();
        assert_eq!(&labels[3..], days.as_slice());
    }

    #[test]
    fn test_month_starting_sunday_has_no_blanks() {
        // 2024-09-01 is a Sunday
        let month = CalendarMonth::new(2024, 9).unwrap();
        assert_eq!(month.first_weekday_offset(), 0);
        assert_eq!(month.cells()[0], Cell::Day(1));
        assert_eq!(month.cells().len(), 30);
    }

    #[test]
    fn test_month_starting_saturday() {
        // 2024-06-01 is a Saturday
        let month = CalendarMonth::new(2024, 6).unwrap();
        assert_eq!(month.first_weekday_offset(), 6);
        assert_eq!(month.cells().len(), 6 + 30);
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(CalendarMonth::new(2024, 2).unwrap().days_in_month(), 29);
        assert_eq!(CalendarMonth::new(2023, 2).unwrap().days_in_month(), 28);
        assert_eq!(CalendarMonth::new(2024, 4).unwrap().days_in_month(), 30);
        assert_eq!(CalendarMonth::new(2024, 12).unwrap().days_in_month(), 31);
    }

    #[test]
    fn test_invalid_month() {
        assert!(CalendarMonth::new(2024, 0).is_err());
        assert!(CalendarMonth::new(2024, 13).is_err());
    }

    #[test]
    fn test_navigation_crosses_years() {
        let jan = CalendarMonth::new(2024, 1).unwrap();
        let dec = jan.previous().unwrap();
        assert_eq!((dec.year(), dec.month()), (2023, 12));
        assert_eq!(dec.next().unwrap(), jan);
    }

    #[test]
    fn test_containing_and_date_of() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
        let month = CalendarMonth::containing(date);
        assert_eq!(month, CalendarMonth::new(2024, 5).unwrap());
        assert_eq!(month.date_of(17), Some(date));
        assert_eq!(month.date_of(32), None);
        assert_eq!(month.to_string(), "May 2024");
    }
}
