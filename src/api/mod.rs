pub mod attendance;
pub mod employee;
pub mod leave_request;
pub mod payroll;

use chrono::NaiveDate;

/// Parses a `YYYY-MM` query value into the first day of that month.
pub(crate) fn parse_month(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d").ok()
}
