use chrono::{Datelike, NaiveDate};
use thiserror::Error;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("month {0} is outside 1..=12")]
pub struct MonthOutOfRange(pub i64);

/// Short chart label such as `Mar 2024`. `month` is 1-based.
pub fn month_label(month: i64, year: i32) -> Result<String, MonthOutOfRange> {
    let name = usize::try_from(month)
        .ok()
        .and_then(|month| month.checked_sub(1))
        .and_then(|index| MONTH_NAMES.get(index))
        .ok_or(MonthOutOfRange(month))?;
    Ok(format!("{name} {year}"))
}

/// Long date as shown in the task table, e.g. `March 5th, 2024`.
pub fn long_date(date: NaiveDate) -> String {
    let day = date.day();
    format!("{} {}{}, {}", date.format("%B"), day, ordinal_suffix(day), date.year())
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
