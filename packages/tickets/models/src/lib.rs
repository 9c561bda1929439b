#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Census tract demographics and parking ticket fact types.
//!
//! These are the two read-only tables every other crate works from: one
//! [`AreaRecord`] per census tract and one [`TicketFact`] per
//! `(tract, month, violation type)` combination. Ticket issue dates are
//! only ever tracked at calendar-month granularity ([`IssueMonth`]).

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{Datelike as _, NaiveDate, NaiveDateTime};
use geo::MultiPolygon;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString, IntoStaticStr};

/// Demographic groups tracked per census tract.
///
/// The catalog is fixed; every comparison chart lists exactly these groups
/// in declaration order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    IntoStaticStr,
)]
pub enum DemographicGroup {
    /// Non-Hispanic White residents
    White,
    /// Non-Hispanic Black residents
    Black,
    /// Non-Hispanic Asian residents
    Asian,
    /// Hispanic residents of any race
    Hispanic,
}

impl DemographicGroup {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::White, Self::Black, Self::Asian, Self::Hispanic]
    }
}

/// A calendar month in which tickets were issued.
///
/// Ordered chronologically. Displays as `Mon YYYY` (e.g. `Jan 2022`) and
/// serializes as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IssueMonth {
    year: i32,
    month: u32,
}

impl IssueMonth {
    /// Creates a month from a year and a 1-based month number.
    ///
    /// # Errors
    ///
    /// Returns an error if `month` is not in the range 1-12.
    pub fn new(year: i32, month: u32) -> Result<Self, InvalidMonthError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self::from)
            .ok_or_else(|| InvalidMonthError {
                value: format!("{year}-{month:02}"),
            })
    }

    /// Returns the calendar year.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Returns the 1-based month number.
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// Returns the first day of this month.
    #[must_use]
    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }
}

impl From<NaiveDate> for IssueMonth {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl From<NaiveDateTime> for IssueMonth {
    fn from(dt: NaiveDateTime) -> Self {
        dt.date().into()
    }
}

/// Timestamp layouts accepted when parsing a month. Anything finer than a
/// month is truncated.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

impl FromStr for IssueMonth {
    type Err = InvalidMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Ok(dt.into());
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(date.into());
        }

        NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
            .map(Self::from)
            .map_err(|_| InvalidMonthError {
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for IssueMonth {
    type Error = InvalidMonthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IssueMonth> for String {
    fn from(month: IssueMonth) -> Self {
        format!("{:04}-{:02}", month.year, month.month)
    }
}

impl std::fmt::Display for IssueMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.first_day().format("%b %Y"))
    }
}

/// Error returned when a string or number cannot be interpreted as a
/// calendar month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidMonthError {
    /// The value that failed to parse.
    pub value: String,
}

impl std::fmt::Display for InvalidMonthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid month '{}': expected YYYY-MM or YYYY-MM-DD",
            self.value
        )
    }
}

impl std::error::Error for InvalidMonthError {}

/// An inclusive range of issue months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawDateRange")]
pub struct DateRange {
    start: IssueMonth,
    end: IssueMonth,
}

/// Unordered bounds as they arrive over the wire.
#[derive(Deserialize)]
struct RawDateRange {
    start: IssueMonth,
    end: IssueMonth,
}

impl From<RawDateRange> for DateRange {
    fn from(raw: RawDateRange) -> Self {
        Self::new(raw.start, raw.end)
    }
}

impl DateRange {
    /// Creates a range covering `a` through `b`. Reversed bounds are
    /// swapped.
    #[must_use]
    pub fn new(a: IssueMonth, b: IssueMonth) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Creates a range from two arbitrary timestamps (e.g. the edges of a
    /// timeline brush), truncating each to its month.
    #[must_use]
    pub fn from_bounds(a: NaiveDateTime, b: NaiveDateTime) -> Self {
        Self::new(a.into(), b.into())
    }

    /// First month in the range.
    #[must_use]
    pub const fn start(&self) -> IssueMonth {
        self.start
    }

    /// Last month in the range.
    #[must_use]
    pub const fn end(&self) -> IssueMonth {
        self.end
    }

    /// Returns `true` if `month` falls within the range (inclusive).
    #[must_use]
    pub fn contains(&self, month: IssueMonth) -> bool {
        self.start <= month && month <= self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

/// A census tract with its population breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaRecord {
    /// Census GEOID (e.g. "36061000100").
    pub area_id: String,
    /// Total population from ACS estimates.
    pub population_total: u64,
    /// Population per demographic group. Groups missing from the map count
    /// as zero.
    pub population_by_group: BTreeMap<DemographicGroup, u64>,
    /// Tract boundary, only used for drawing and point lookups.
    #[serde(skip)]
    pub boundary: Option<MultiPolygon<f64>>,
}

impl AreaRecord {
    /// Returns the population of `group` in this tract.
    #[must_use]
    pub fn group_population(&self, group: DemographicGroup) -> u64 {
        self.population_by_group.get(&group).copied().unwrap_or(0)
    }
}

/// Number of tickets of one violation type issued in one tract in one
/// month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketFact {
    /// Census GEOID of the tract.
    pub area_id: String,
    /// Month the tickets were issued.
    pub issue_month: IssueMonth,
    /// Violation type label (e.g. "Street cleaning").
    pub violation_type: String,
    /// Ticket count.
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(s: &str) -> IssueMonth {
        s.parse().unwrap()
    }

    #[test]
    fn parses_month_layouts() {
        let expected = IssueMonth::new(2022, 3).unwrap();
        assert_eq!(month("2022-03"), expected);
        assert_eq!(month("2022-03-01"), expected);
        assert_eq!(month("2022-03-17"), expected);
        assert_eq!(month("2022-03-17 13:45:10.123"), expected);
        assert_eq!(month("2022-03-17T13:45:10"), expected);
        assert_eq!(month(" 2022-03-31 "), expected);
    }

    #[test]
    fn rejects_invalid_months() {
        assert!("2022-13".parse::<IssueMonth>().is_err());
        assert!("March 2022".parse::<IssueMonth>().is_err());
        assert!(IssueMonth::new(2022, 0).is_err());
    }

    #[test]
    fn months_order_chronologically() {
        assert!(month("2021-12") < month("2022-01"));
        assert!(month("2022-01") < month("2022-02"));
    }

    #[test]
    fn month_display_and_serialization() {
        let m = month("2023-01-01");
        assert_eq!(m.to_string(), "Jan 2023");
        assert_eq!(String::from(m), "2023-01");
    }

    #[test]
    fn date_range_swaps_reversed_bounds() {
        let range = DateRange::new(month("2022-06"), month("2022-01"));
        assert_eq!(range.start(), month("2022-01"));
        assert_eq!(range.end(), month("2022-06"));
        assert!(range.contains(month("2022-01")));
        assert!(range.contains(month("2022-06")));
        assert!(!range.contains(month("2022-07")));
        assert_eq!(range.to_string(), "Jan 2022 - Jun 2022");
    }

    #[test]
    fn date_range_from_brush_truncates_to_months() {
        let a = NaiveDateTime::parse_from_str("2022-02-14 08:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let b = NaiveDateTime::parse_from_str("2022-04-02 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let range = DateRange::from_bounds(a, b);
        assert_eq!(range.start(), month("2022-02"));
        assert_eq!(range.end(), month("2022-04"));
    }

    #[test]
    fn demographic_group_catalog() {
        assert_eq!(DemographicGroup::all().len(), 4);
        assert_eq!("Hispanic".parse::<DemographicGroup>().unwrap(), DemographicGroup::Hispanic);
        assert_eq!(DemographicGroup::White.to_string(), "White");
    }

    #[test]
    fn missing_group_counts_as_zero() {
        let area = AreaRecord {
            area_id: "A".to_string(),
            population_total: 10,
            population_by_group: BTreeMap::from([(DemographicGroup::White, 4)]),
            boundary: None,
        };
        assert_eq!(area.group_population(DemographicGroup::White), 4);
        assert_eq!(area.group_population(DemographicGroup::Asian), 0);
    }
}
