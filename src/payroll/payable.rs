use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::model::leave_request::LeaveRequest;

use super::calculator::round2;

/// Day accounting for one employee over one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PayableSummary {
    pub days_in_month: u32,
    pub present_days: u32,
    pub paid_leave_days: u32,
    /// Absent, unmarked, or on unpaid leave. Not payable.
    pub unpaid_days: u32,
}

impl PayableSummary {
    pub fn payable_days(&self) -> u32 {
        self.present_days + self.paid_leave_days
    }
}

/// Number of calendar days in the month containing `month`.
pub fn days_in_month(month: NaiveDate) -> u32 {
    let (year, mon) = (month.year(), month.month());
    let first = NaiveDate::from_ymd_opt(year, mon, 1).expect("valid month start");
    let next = if mon == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, mon + 1, 1)
    }
    .expect("valid month start");
    next.signed_duration_since(first).num_days() as u32
}

/// Classifies every calendar day of the month.
///
/// A day counts as present when its attendance record says Present, as paid
/// leave when an approved annual/sick request covers it, and as unpaid
/// otherwise. Unmarked days never count toward payable days.
pub fn summarize_month(
    month: NaiveDate,
    attendance: &[Attendance],
    leaves: &[LeaveRequest],
) -> PayableSummary {
    let total = days_in_month(month);
    let mut present_days = 0u32;
    let mut paid_leave_days = 0u32;

    for day in 1..=total {
        let date = NaiveDate::from_ymd_opt(month.year(), month.month(), day)
            .expect("day within month bounds");

        let marked_present = attendance
            .iter()
            .any(|a| a.date == date && a.status == AttendanceStatus::Present);

        if marked_present {
            present_days += 1;
        } else if leaves
            .iter()
            .any(|l| l.is_approved() && l.is_paid() && l.covers(date))
        {
            paid_leave_days += 1;
        }
    }

    PayableSummary {
        days_in_month: total,
        present_days,
        paid_leave_days,
        unpaid_days: total - present_days - paid_leave_days,
    }
}

/// Scales a monthly amount by the payable share of the month.
pub fn prorate(amount: f64, summary: &PayableSummary) -> f64 {
    round2(amount * f64::from(summary.payable_days()) / f64::from(summary.days_in_month))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave_request::LeaveType;
    use pretty_assertions::assert_eq;

    fn present(employee_id: i64, date: NaiveDate) -> Attendance {
        Attendance {
            id: 0,
            employee_id,
            date,
            check_in: None,
            check_out: None,
            status: AttendanceStatus::Present,
        }
    }

    fn leave(
        employee_id: i64,
        from: NaiveDate,
        to: NaiveDate,
        leave_type: LeaveType,
        status: &str,
    ) -> LeaveRequest {
        LeaveRequest {
            id: 0,
            employee_id,
            start_date: from,
            end_date: to,
            leave_type: leave_type.as_str().to_string(),
            status: status.to_string(),
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(d(2026, 4, 1)), 30);
        assert_eq!(days_in_month(d(2026, 12, 15)), 31);
        assert_eq!(days_in_month(d(2024, 2, 1)), 29);
        assert_eq!(days_in_month(d(2026, 2, 1)), 28);
    }

    #[test]
    fn twenty_present_two_paid_leave_in_a_thirty_day_month() {
        // April 2026 has 30 days: 20 present, 2 days approved sick leave,
        // everything else unmarked
        let month = d(2026, 4, 1);
        let attendance: Vec<_> = (1..=20).map(|day| present(7, d(2026, 4, day))).collect();
        let leaves = vec![leave(7, d(2026, 4, 21), d(2026, 4, 22), LeaveType::Sick, "approved")];

        let summary = summarize_month(month, &attendance, &leaves);
        assert_eq!(summary.present_days, 20);
        assert_eq!(summary.paid_leave_days, 2);
        assert_eq!(summary.unpaid_days, 8);
        assert_eq!(summary.payable_days(), 22);
        assert_ne!(summary.payable_days(), 30);
    }

    #[test]
    fn unpaid_and_pending_leave_do_not_count() {
        let month = d(2026, 4, 1);
        let leaves = vec![
            leave(7, d(2026, 4, 1), d(2026, 4, 2), LeaveType::Unpaid, "approved"),
            leave(7, d(2026, 4, 3), d(2026, 4, 4), LeaveType::Annual, "pending"),
        ];

        let summary = summarize_month(month, &[], &leaves);
        assert_eq!(summary.paid_leave_days, 0);
        assert_eq!(summary.payable_days(), 0);
    }

    #[test]
    fn leave_spanning_month_edges_is_clipped_to_the_month() {
        let month = d(2026, 4, 1);
        let leaves = vec![leave(7, d(2026, 3, 30), d(2026, 4, 2), LeaveType::Annual, "approved")];

        let summary = summarize_month(month, &[], &leaves);
        assert_eq!(summary.paid_leave_days, 2);
    }

    #[test]
    fn present_day_not_double_counted_as_leave() {
        let month = d(2026, 4, 1);
        let attendance = vec![present(7, d(2026, 4, 1))];
        let leaves = vec![leave(7, d(2026, 4, 1), d(2026, 4, 1), LeaveType::Annual, "approved")];

        let summary = summarize_month(month, &attendance, &leaves);
        assert_eq!(summary.present_days, 1);
        assert_eq!(summary.paid_leave_days, 0);
    }

    #[test]
    fn proration_scales_by_payable_share() {
        let summary = PayableSummary {
            days_in_month: 30,
            present_days: 20,
            paid_leave_days: 2,
            unpaid_days: 8,
        };
        assert_eq!(prorate(45_550.0, &summary), 33_403.33);

        let full = PayableSummary {
            days_in_month: 30,
            present_days: 30,
            paid_leave_days: 0,
            unpaid_days: 0,
        };
        assert_eq!(prorate(45_550.0, &full), 45_550.0);
    }
}
