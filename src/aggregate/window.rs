use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate};

/// Jan 1 of `year` through `end`, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub year: i32,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// The two like-for-like year-to-date windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YtdWindows {
    pub earlier: DateWindow,
    pub later: DateWindow,
}

impl YtdWindows {
    /// The later window ends at `today`, clamped to Dec 31 of
    /// `later_year`; the earlier one ends on the same month/day.
    pub fn new(today: NaiveDate, earlier_year: i32, later_year: i32) -> Result<Self> {
        let later_end = today.min(ymd(later_year, 12, 31)?);
        let earlier_end = same_month_day(earlier_year, later_end)?;
        Ok(Self {
            earlier: DateWindow {
                year: earlier_year,
                start: ymd(earlier_year, 1, 1)?,
                end: earlier_end,
            },
            later: DateWindow {
                year: later_year,
                start: ymd(later_year, 1, 1)?,
                end: later_end,
            },
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.earlier.contains(date) || self.later.contains(date)
    }
}

/// `reference`'s month and day in `year`; Feb 29 becomes Feb 28 when
/// `year` is not a leap year.
pub fn same_month_day(year: i32, reference: NaiveDate) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, reference.month(), reference.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, reference.month(), 28))
        .ok_or_else(|| anyhow!("no date for {}-{:02} in year {}", reference.month(), reference.day(), year))
}

fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| anyhow!("year {} is out of range", year))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn mid_year_cutoffs() {
        let w = YtdWindows::new(d(2025, 3, 10), 2024, 2025).unwrap();
        assert_eq!(w.later.start, d(2025, 1, 1));
        assert_eq!(w.later.end, d(2025, 3, 10));
        assert_eq!(w.earlier.start, d(2024, 1, 1));
        assert_eq!(w.earlier.end, d(2024, 3, 10));
    }

    #[test]
    fn today_after_later_year_clamps_to_dec_31() {
        let w = YtdWindows::new(d(2026, 10, 19), 2024, 2025).unwrap();
        assert_eq!(w.later.end, d(2025, 12, 31));
        assert_eq!(w.earlier.end, d(2024, 12, 31));
    }

    #[test]
    fn leap_day_rounds_down() {
        let w = YtdWindows::new(d(2028, 2, 29), 2027, 2028).unwrap();
        assert_eq!(w.later.end, d(2028, 2, 29));
        assert_eq!(w.earlier.end, d(2027, 2, 28));

        // leap to leap keeps the day
        assert_eq!(same_month_day(2024, d(2028, 2, 29)).unwrap(), d(2024, 2, 29));
    }

    #[test]
    fn windows_are_inclusive() {
        let w = YtdWindows::new(d(2025, 3, 10), 2024, 2025).unwrap();
        assert!(w.contains(d(2024, 1, 1)));
        assert!(w.contains(d(2024, 3, 10)));
        assert!(!w.contains(d(2024, 3, 11)));
        assert!(w.contains(d(2025, 3, 10)));
        assert!(!w.contains(d(2025, 3, 11)));
        assert!(!w.contains(d(2023, 12, 31)));
    }
}
