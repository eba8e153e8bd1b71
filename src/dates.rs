//! Diagnosis date arithmetic over partially known dates.
//!
//! Registry dates frequently miss the month or the day. Nothing here assumes a
//! value for a missing part: comparisons answer `Unknown` as soon as a needed
//! part is absent, and interval checks bracket the missing parts to their full
//! valid range before deciding.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::cmp::Ordering;

/// Year/month/day where month and day are independently optional.
///
/// A month outside `1..=12` or a day that does not exist in its month is
/// stored as unknown; a day without a known month is dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PartialDate {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
}

impl PartialDate {
    pub fn new(year: Option<i32>, month: Option<u32>, day: Option<u32>) -> Self {
        let month = month.filter(|m| (1..=12).contains(m));
        let day = match (year, month, day) {
            (Some(y), Some(m), Some(d)) => {
                last_day_of_month(y, m).filter(|last| (1..=*last).contains(&d)).map(|_| d)
            }
            _ => None,
        };

        Self { year, month, day }
    }

    pub fn from_parts(year: &str, month: &str, day: &str) -> Self {
        Self::new(parse_part(year), parse_part(month), parse_part(day))
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    pub fn day(&self) -> Option<u32> {
        self.day
    }

    /// The calendar date, only when every part is known.
    pub fn full(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year?, self.month?, self.day?)
    }

    /// Earliest calendar date consistent with the known parts.
    pub fn earliest(&self) -> Option<NaiveDate> {
        let year = self.year?;
        let month = self.month.unwrap_or(1);
        NaiveDate::from_ymd_opt(year, month, self.day.unwrap_or(1))
    }

    /// Latest calendar date consistent with the known parts.
    pub fn latest(&self) -> Option<NaiveDate> {
        let year = self.year?;
        let month = self.month.unwrap_or(12);
        let day = match self.day {
            Some(day) => day,
            None => last_day_of_month(year, month)?,
        };
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

fn parse_part<T: std::str::FromStr>(value: &str) -> Option<T> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}

fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?
        .pred_opt()
        .map(|date| date.day())
}

/// Which of two diagnoses happened later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    FirstLater,
    SecondLater,
    Same,
    Unknown,
}

/// Three-valued answer to "are these diagnoses more than N apart".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Apart {
    Apart,
    Within,
    Unknown,
}

fn known_years(first: &PartialDate, second: &PartialDate, current_year: i32) -> Option<(i32, i32)> {
    let (year1, year2) = (first.year?, second.year?);
    if year1 > current_year || year2 > current_year {
        return None;
    }
    Some((year1, year2))
}

fn order_from(ordering: Ordering) -> DateOrder {
    match ordering {
        Ordering::Greater => DateOrder::FirstLater,
        Ordering::Less => DateOrder::SecondLater,
        Ordering::Equal => DateOrder::Same,
    }
}

/// Compares year, then month, then day; any missing part needed to break a
/// tie makes the answer `Unknown`, as does a year after `current_year`.
pub fn compare_dx_date(first: &PartialDate, second: &PartialDate, current_year: i32) -> DateOrder {
    let Some((year1, year2)) = known_years(first, second, current_year) else {
        return DateOrder::Unknown;
    };
    if year1 != year2 {
        return order_from(year1.cmp(&year2));
    }

    let (Some(month1), Some(month2)) = (first.month, second.month) else {
        return DateOrder::Unknown;
    };
    if month1 != month2 {
        return order_from(month1.cmp(&month2));
    }

    let (Some(day1), Some(day2)) = (first.day, second.day) else {
        return DateOrder::Unknown;
    };
    order_from(day1.cmp(&day2))
}

/// Decides whether the diagnoses are more than `years` years apart.
///
/// Only when the year difference equals `years` exactly do month and day
/// matter; then the later diagnosis' month (and if equal, day) is compared
/// with the earlier one's.
pub fn verify_years_apart(
    first: &PartialDate,
    second: &PartialDate,
    years: u32,
    current_year: i32,
) -> Apart {
    let Some((year1, year2)) = known_years(first, second, current_year) else {
        return Apart::Unknown;
    };

    let difference = year1.abs_diff(year2);
    if difference > years {
        return Apart::Apart;
    }
    if difference < years {
        return Apart::Within;
    }

    if year1 == year2 {
        return match compare_dx_date(first, second, current_year) {
            DateOrder::Same => Apart::Within,
            DateOrder::Unknown => Apart::Unknown,
            DateOrder::FirstLater | DateOrder::SecondLater => Apart::Apart,
        };
    }

    let (later, earlier) = if year1 > year2 {
        (first, second)
    } else {
        (second, first)
    };

    let (Some(later_month), Some(earlier_month)) = (later.month, earlier.month) else {
        return Apart::Unknown;
    };
    match later_month.cmp(&earlier_month) {
        Ordering::Greater => return Apart::Apart,
        Ordering::Less => return Apart::Within,
        Ordering::Equal => {}
    }

    let (Some(later_day), Some(earlier_day)) = (later.day, earlier.day) else {
        return Apart::Unknown;
    };
    if later_day > earlier_day {
        Apart::Apart
    } else {
        Apart::Within
    }
}

/// Decides whether the diagnoses are more than `days` days apart; exactly
/// `days` apart counts as within.
///
/// With complete dates the exact gap is used. Otherwise each date is widened
/// to the span of calendar days it could denote and the smallest and largest
/// possible gaps decide: `Apart` if even the smallest exceeds `days`,
/// `Within` if even the largest does not, `Unknown` in between.
pub fn verify_days_apart(
    first: &PartialDate,
    second: &PartialDate,
    days: i64,
    current_year: i32,
) -> Apart {
    if known_years(first, second, current_year).is_none() {
        return Apart::Unknown;
    }
    if compare_dx_date(first, second, current_year) == DateOrder::Same {
        return Apart::Within;
    }

    if let (Some(date1), Some(date2)) = (first.full(), second.full()) {
        let gap = (date1 - date2).num_days().abs();
        return if gap > days { Apart::Apart } else { Apart::Within };
    }

    let (Some(min1), Some(max1), Some(min2), Some(max2)) = (
        first.earliest(),
        first.latest(),
        second.earliest(),
        second.latest(),
    ) else {
        return Apart::Unknown;
    };

    let (min_gap, max_gap) = gap_bracket((min1, max1), (min2, max2));
    if min_gap > days {
        Apart::Apart
    } else if max_gap <= days {
        Apart::Within
    } else {
        Apart::Unknown
    }
}

/// Smallest and largest day distance between a date in `first` and a date in
/// `second`, both given as inclusive spans.
pub fn gap_bracket(first: (NaiveDate, NaiveDate), second: (NaiveDate, NaiveDate)) -> (i64, i64) {
    let (min1, max1) = first;
    let (min2, max2) = second;

    let min_gap = if max1 < min2 {
        (min2 - max1).num_days()
    } else if max2 < min1 {
        (min1 - max2).num_days()
    } else {
        0
    };
    let max_gap = (max1 - min2).num_days().max((max2 - min1).num_days());

    (min_gap, max_gap)
}

/// True only when both dates are complete, valid and identical.
pub fn same_valid_dates(first: &PartialDate, second: &PartialDate) -> bool {
    match (first.full(), second.full()) {
        (Some(date1), Some(date2)) => date1 == date2,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YEAR: i32 = 2024;

    fn date(year: &str, month: &str, day: &str) -> PartialDate {
        PartialDate::from_parts(year, month, day)
    }

    #[test]
    fn invalid_parts_become_unknown() {
        let d = date("2021", "13", "5");
        assert_eq!(d.month(), None);
        assert_eq!(d.day(), None);

        let d = date("2021", "2", "29");
        assert_eq!(d.month(), Some(2));
        assert_eq!(d.day(), None);

        let d = date("2020", "2", "29");
        assert_eq!(d.full(), NaiveDate::from_ymd_opt(2020, 2, 29));
    }

    #[test]
    fn bracket_bounds_cover_missing_parts() {
        let d = date("2020", "2", "");
        assert_eq!(d.earliest(), NaiveDate::from_ymd_opt(2020, 2, 1));
        assert_eq!(d.latest(), NaiveDate::from_ymd_opt(2020, 2, 29));

        let d = date("2019", "", "");
        assert_eq!(d.earliest(), NaiveDate::from_ymd_opt(2019, 1, 1));
        assert_eq!(d.latest(), NaiveDate::from_ymd_opt(2019, 12, 31));
    }

    #[test]
    fn compare_stops_at_first_missing_part() {
        assert_eq!(
            compare_dx_date(&date("2020", "", ""), &date("2019", "5", "1"), YEAR),
            DateOrder::FirstLater
        );
        assert_eq!(
            compare_dx_date(&date("2020", "", ""), &date("2020", "5", "1"), YEAR),
            DateOrder::Unknown
        );
        assert_eq!(
            compare_dx_date(&date("2020", "3", ""), &date("2020", "5", ""), YEAR),
            DateOrder::SecondLater
        );
        assert_eq!(
            compare_dx_date(&date("2020", "5", "2"), &date("2020", "5", "2"), YEAR),
            DateOrder::Same
        );
        assert_eq!(
            compare_dx_date(&date("2030", "5", "2"), &date("2020", "5", "2"), YEAR),
            DateOrder::Unknown
        );
    }

    #[test]
    fn years_apart_falls_through_on_boundary_year() {
        assert_eq!(
            verify_years_apart(&date("2015", "", ""), &date("2018", "", ""), 1, YEAR),
            Apart::Apart
        );
        assert_eq!(
            verify_years_apart(&date("2015", "", ""), &date("2015", "", ""), 1, YEAR),
            Apart::Within
        );
        assert_eq!(
            verify_years_apart(&date("2015", "3", ""), &date("2016", "4", ""), 1, YEAR),
            Apart::Apart
        );
        assert_eq!(
            verify_years_apart(&date("2015", "5", ""), &date("2016", "4", ""), 1, YEAR),
            Apart::Within
        );
        assert_eq!(
            verify_years_apart(&date("2015", "4", "10"), &date("2016", "4", "10"), 1, YEAR),
            Apart::Within
        );
        assert_eq!(
            verify_years_apart(&date("2015", "4", "10"), &date("2016", "4", "11"), 1, YEAR),
            Apart::Apart
        );
        assert_eq!(
            verify_years_apart(&date("2015", "", ""), &date("2016", "4", ""), 1, YEAR),
            Apart::Unknown
        );
        assert_eq!(
            verify_years_apart(&date("2015", "4", ""), &date("2016", "4", ""), 1, YEAR),
            Apart::Unknown
        );
    }

    #[test]
    fn days_apart_boundary_is_inclusive() {
        let first = date("2020", "1", "1");
        let second = date("2020", "3", "1");
        assert_eq!(verify_days_apart(&first, &second, 60, YEAR), Apart::Within);
        assert_eq!(verify_days_apart(&first, &second, 59, YEAR), Apart::Apart);
        assert_eq!(verify_days_apart(&second, &first, 60, YEAR), Apart::Within);
    }

    #[test]
    fn days_apart_uses_bracket_for_partial_dates() {
        // March 2020 vs May 2020: gap between 31 and 91 days.
        let first = date("2020", "3", "");
        let second = date("2020", "5", "");
        assert_eq!(verify_days_apart(&first, &second, 30, YEAR), Apart::Apart);
        assert_eq!(verify_days_apart(&first, &second, 60, YEAR), Apart::Unknown);
        assert_eq!(verify_days_apart(&first, &second, 91, YEAR), Apart::Within);

        // Unknown ordering: same year, one month unknown.
        let first = date("2020", "", "");
        let second = date("2020", "6", "15");
        assert_eq!(compare_dx_date(&first, &second, YEAR), DateOrder::Unknown);
        assert_eq!(verify_days_apart(&first, &second, 365, YEAR), Apart::Within);
        assert_eq!(verify_days_apart(&first, &second, 60, YEAR), Apart::Unknown);

        assert_eq!(
            verify_days_apart(&date("", "", ""), &second, 60, YEAR),
            Apart::Unknown
        );
    }

    #[test]
    fn partial_bracket_is_consistent_with_explicit_bounds() {
        let first = date("2019", "11", "");
        let second = date("2020", "2", "");
        let (min_gap, max_gap) = gap_bracket(
            (first.earliest().unwrap(), first.latest().unwrap()),
            (second.earliest().unwrap(), second.latest().unwrap()),
        );
        assert_eq!(min_gap, 63);
        assert_eq!(max_gap, 120);
        for threshold in [10, 62, 63, 90, 119, 120, 200] {
            let expected = if min_gap > threshold {
                Apart::Apart
            } else if max_gap <= threshold {
                Apart::Within
            } else {
                Apart::Unknown
            };
            assert_eq!(verify_days_apart(&first, &second, threshold, YEAR), expected);
        }
    }

    #[test]
    fn same_valid_dates_requires_complete_dates() {
        assert!(same_valid_dates(&date("2020", "5", "2"), &date("2020", "05", "02")));
        assert!(!same_valid_dates(&date("2020", "5", ""), &date("2020", "5", "")));
        assert!(!same_valid_dates(&date("2020", "2", "30"), &date("2020", "2", "30")));
    }
}
