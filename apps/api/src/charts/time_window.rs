//! Calendar date ranges for time windows, plus navigation and labels.
//!
//! Every function here is pure. The only clock read happens in
//! [`compute_range`] for the `all` window; everything else takes "today"
//! as an explicit argument so callers and tests control it.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Label used for the `all` window everywhere it is displayed.
pub const ALL_TIME_LABEL: &str = "All Time";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    Week,
    Month,
    Quarter,
    Year,
    All,
}

impl TimeWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Week => "week",
            TimeWindow::Month => "month",
            TimeWindow::Quarter => "quarter",
            TimeWindow::Year => "year",
            TimeWindow::All => "all",
        }
    }

    /// Short name shown next to the window selector.
    pub fn label(&self) -> &'static str {
        match self {
            TimeWindow::Week => "Week",
            TimeWindow::Month => "Month",
            TimeWindow::Quarter => "Quarter",
            TimeWindow::Year => "Year",
            TimeWindow::All => ALL_TIME_LABEL,
        }
    }

    /// Calendar months covered by one unit of this window, if month-based.
    fn months(&self) -> Option<u32> {
        match self {
            TimeWindow::Month => Some(1),
            TimeWindow::Quarter => Some(3),
            TimeWindow::Year => Some(12),
            TimeWindow::Week | TimeWindow::All => None,
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(TimeWindow::Week),
            "month" => Ok(TimeWindow::Month),
            "quarter" => Ok(TimeWindow::Quarter),
            "year" => Ok(TimeWindow::Year),
            "all" => Ok(TimeWindow::All),
            other => Err(format!(
                "unknown time window '{other}' (expected week, month, quarter, year or all)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Prev,
    Next,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prev" => Ok(Direction::Prev),
            "next" => Ok(Direction::Next),
            other => Err(format!(
                "unknown direction '{other}' (expected prev or next)"
            )),
        }
    }
}

/// Inclusive calendar-date interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// First day covered by the `all` window.
pub fn all_time_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default()
}

/// Computes the window containing `reference`.
///
/// `all` ignores `reference` and runs from [`all_time_start`] through today.
pub fn compute_range(window: TimeWindow, reference: NaiveDate) -> DateRange {
    compute_range_at(window, reference, Utc::now().date_naive())
}

/// Same as [`compute_range`] with "today" supplied by the caller.
pub fn compute_range_at(window: TimeWindow, reference: NaiveDate, today: NaiveDate) -> DateRange {
    match window {
        TimeWindow::Week => {
            // Weeks straddling the representable calendar are clamped to it.
            let offset = i64::from(reference.weekday().num_days_from_monday());
            let start_date = reference
                .checked_sub_signed(Duration::days(offset))
                .unwrap_or(NaiveDate::MIN);
            DateRange {
                start_date,
                end_date: start_date
                    .checked_add_signed(Duration::days(6))
                    .unwrap_or(NaiveDate::MAX),
            }
        }
        TimeWindow::Month => month_block(reference, reference.month(), 1),
        TimeWindow::Quarter => month_block(reference, reference.month0() / 3 * 3 + 1, 3),
        TimeWindow::Year => month_block(reference, 1, 12),
        TimeWindow::All => DateRange {
            start_date: all_time_start(),
            end_date: today,
        },
    }
}

/// `months` whole calendar months of `reference`'s year starting at `first_month`.
fn month_block(reference: NaiveDate, first_month: u32, months: u32) -> DateRange {
    let start_date = reference
        .with_day(1)
        .and_then(|d| d.with_month(first_month))
        .unwrap_or(reference);
    let end_date = start_date
        .checked_add_months(Months::new(months))
        .and_then(|d| d.pred_opt())
        .unwrap_or(NaiveDate::MAX);
    DateRange {
        start_date,
        end_date,
    }
}

/// Moves `reference` by one unit of `window`.
///
/// Month-based steps keep the day of month, clamped to the last day of the
/// target month (Jan 31 + 1 month = Feb 29 in a leap year). `all` is a no-op.
pub fn step_window(reference: NaiveDate, window: TimeWindow, direction: Direction) -> NaiveDate {
    if window == TimeWindow::Week {
        let days = match direction {
            Direction::Prev => -7,
            Direction::Next => 7,
        };
        return reference
            .checked_add_signed(Duration::days(days))
            .unwrap_or(reference);
    }

    let Some(months) = window.months() else {
        return reference;
    };
    let shifted = match direction {
        Direction::Prev => reference.checked_sub_months(Months::new(months)),
        Direction::Next => reference.checked_add_months(Months::new(months)),
    };
    shifted.unwrap_or(reference)
}

/// Whether stepping `next` from `reference` stays at or before `today`.
///
/// The stepped reference date itself is compared, not the start of its
/// window. `all` has nothing to navigate and always answers `false`.
pub fn can_step_forward(reference: NaiveDate, window: TimeWindow, today: NaiveDate) -> bool {
    if window == TimeWindow::All {
        return false;
    }
    step_window(reference, window, Direction::Next) <= today
}

/// Human-readable label for a computed range.
///
/// Week labels use the ISO week of `reference` when given, otherwise of
/// `range.end_date`.
pub fn format_range_label(
    range: &DateRange,
    window: TimeWindow,
    reference: Option<NaiveDate>,
) -> String {
    match window {
        TimeWindow::All => ALL_TIME_LABEL.to_string(),
        TimeWindow::Week => {
            let iso = reference.unwrap_or(range.end_date).iso_week();
            format!("Week {}, {}", iso.week(), iso.year())
        }
        TimeWindow::Month => range.start_date.format("%B %Y").to_string(),
        TimeWindow::Quarter => format!(
            "Q{} {}",
            range.start_date.month0() / 3 + 1,
            range.start_date.year()
        ),
        TimeWindow::Year => format!("{:04}", range.start_date.year()),
    }
}

/// Plain "start – end" label, e.g. "Dec 9 – Dec 15". Year windows carry the year.
pub fn format_span_label(range: &DateRange, window: TimeWindow) -> String {
    if window == TimeWindow::All {
        return ALL_TIME_LABEL.to_string();
    }
    let pattern = if window == TimeWindow::Year {
        "%b %-d, %Y"
    } else {
        "%b %-d"
    };
    format!(
        "{} – {}",
        range.start_date.format(pattern),
        range.end_date.format(pattern)
    )
}
