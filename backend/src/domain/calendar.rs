//! Calendar domain logic for the scheduler.
//!
//! Builds the week-row matrix for a month and renders it with availability
//! markers. Everything here is pure date arithmetic; the UI only decides how
//! the cells look.

use chrono::{Datelike, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};
use shared::{CalendarCell, CalendarDayType, CalendarMonth};
use std::collections::BTreeSet;

/// One week row of the month grid. `None` marks a padding cell.
pub type WeekRow = [Option<u32>; 7];

/// Day shown in the first column of every week row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeekStart::Sunday => "sunday",
            WeekStart::Monday => "monday",
        }
    }
}

/// Calendar service that handles month layout and navigation
#[derive(Debug, Clone, Copy, Default)]
pub struct CalendarService {
    week_start: WeekStart,
}

impl CalendarService {
    pub fn new(week_start: WeekStart) -> Self {
        Self { week_start }
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    /// Build the week rows for a month (1 = January).
    ///
    /// The first row is left-padded up to the weekday of day 1 and the last row
    /// is right-padded once the month runs out, so every row has seven cells.
    pub fn build_month(&self, year: i32, month: u32) -> Vec<WeekRow> {
        let days_in_month = self.days_in_month(month, year);
        let first_day = self.first_day_of_month(month, year) as usize;

        let mut weeks = Vec::with_capacity(6);
        let mut week: WeekRow = [None; 7];
        let mut day = 1;

        for cell in week.iter_mut().skip(first_day) {
            *cell = Some(day);
            day += 1;
        }
        weeks.push(week);

        while day <= days_in_month {
            let mut week: WeekRow = [None; 7];
            for cell in week.iter_mut() {
                if day > days_in_month {
                    break;
                }
                *cell = Some(day);
                day += 1;
            }
            weeks.push(week);
        }

        debug!(
            "Built {}/{} with {} week rows, first column {}",
            month,
            year,
            weeks.len(),
            first_day
        );
        weeks
    }

    /// Render a month with booked, selected and today markers
    pub fn render_month(
        &self,
        year: i32,
        month: u32,
        booked: &BTreeSet<NaiveDate>,
        selected: Option<NaiveDate>,
        today: NaiveDate,
    ) -> CalendarMonth {
        let weeks = self
            .build_month(year, month)
            .into_iter()
            .enumerate()
            .map(|(row, week)| {
                week.iter()
                    .map(|cell| match cell {
                        Some(day) => {
                            let date = self.iso_date(year, month, *day);
                            CalendarCell {
                                day: Some(*day),
                                date,
                                day_type: CalendarDayType::MonthDay,
                                is_booked: date.is_some_and(|d| booked.contains(&d)),
                                is_selected: date.is_some() && date == selected,
                                is_today: date == Some(today),
                            }
                        }
                        None => CalendarCell {
                            day: None,
                            date: None,
                            day_type: if row == 0 {
                                CalendarDayType::PaddingBefore
                            } else {
                                CalendarDayType::PaddingAfter
                            },
                            is_booked: false,
                            is_selected: false,
                            is_today: false,
                        },
                    })
                    .collect()
            })
            .collect();

        CalendarMonth {
            year,
            month,
            month_name: self.month_name(month).to_string(),
            first_day_of_week: self.first_day_of_month(month, year),
            weeks,
        }
    }

    /// Get the number of days in a given month and year
    pub fn days_in_month(&self, month: u32, year: i32) -> u32 {
        match month {
            2 => {
                if self.is_leap_year(year) {
                    29
                } else {
                    28
                }
            }
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }

    pub fn is_leap_year(&self, year: i32) -> bool {
        year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
    }

    /// Column of the first day of the month (0 = first column of the week)
    pub fn first_day_of_month(&self, month: u32, year: i32) -> u32 {
        match NaiveDate::from_ymd_opt(year, month, 1) {
            Some(date) => match self.week_start {
                WeekStart::Sunday => date.weekday().num_days_from_sunday(),
                WeekStart::Monday => date.weekday().num_days_from_monday(),
            },
            // Out-of-range month: lay the grid out from the first column
            None => 0,
        }
    }

    pub fn month_name(&self, month: u32) -> &'static str {
        match month {
            1 => "January",
            2 => "February",
            3 => "March",
            4 => "April",
            5 => "May",
            6 => "June",
            7 => "July",
            8 => "August",
            9 => "September",
            10 => "October",
            11 => "November",
            12 => "December",
            _ => "Invalid Month",
        }
    }

    /// Navigate to the previous month
    pub fn previous_month(&self, current_month: u32, current_year: i32) -> (u32, i32) {
        if current_month <= 1 {
            (12, current_year - 1)
        } else {
            (current_month - 1, current_year)
        }
    }

    /// Navigate to the next month
    pub fn next_month(&self, current_month: u32, current_year: i32) -> (u32, i32) {
        if current_month >= 12 {
            (1, current_year + 1)
        } else {
            (current_month + 1, current_year)
        }
    }

    pub fn iso_date(&self, year: i32, month: u32, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, month, day)
    }

    /// Format a date for human-readable display
    pub fn format_date_for_display(&self, date: NaiveDate) -> String {
        format!("{} {}, {}", self.month_name(date.month()), date.day(), date.year())
    }
}
