use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Day classification recorded on an attendance row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Leave,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Attendance {
    pub id: i64,
    pub employee_id: i64,
    pub date: NaiveDate,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    pub status: AttendanceStatus,
}

impl Attendance {
    /// Hours between check-in and check-out, never negative, zero while
    /// either timestamp is missing. Derived, not stored.
    pub fn working_hours(&self) -> f64 {
        match (self.check_in, self.check_out) {
            (Some(start), Some(end)) => {
                let seconds = (end - start).num_seconds();
                seconds.max(0) as f64 / 3600.0
            }
            _ => 0.0,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttendanceError {
    #[error("already checked in today")]
    AlreadyCheckedIn,

    #[error("no check-in record found for today")]
    NoCheckInRecord,

    #[error("already checked out today")]
    AlreadyCheckedOut,
}

/// Progress of a single employee's day. One check-in/check-out pair per day;
/// checked-out is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayState {
    NoRecord,
    CheckedIn,
    CheckedOut,
}

impl DayState {
    pub fn of(record: Option<&Attendance>) -> Self {
        match record {
            None => DayState::NoRecord,
            Some(r) if r.check_out.is_some() => DayState::CheckedOut,
            Some(_) => DayState::CheckedIn,
        }
    }

    pub fn check_in(self) -> Result<DayState, AttendanceError> {
        match self {
            DayState::NoRecord => Ok(DayState::CheckedIn),
            DayState::CheckedIn | DayState::CheckedOut => Err(AttendanceError::AlreadyCheckedIn),
        }
    }

    pub fn check_out(self) -> Result<DayState, AttendanceError> {
        match self {
            DayState::CheckedIn => Ok(DayState::CheckedOut),
            DayState::NoRecord => Err(AttendanceError::NoCheckInRecord),
            DayState::CheckedOut => Err(AttendanceError::AlreadyCheckedOut),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(check_in: Option<&str>, check_out: Option<&str>) -> Attendance {
        let parse = |s: &str| NaiveTime::parse_from_str(s, "%H:%M:%S").unwrap();
        Attendance {
            id: 1,
            employee_id: 1,
            date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            check_in: check_in.map(parse),
            check_out: check_out.map(parse),
            status: AttendanceStatus::Present,
        }
    }

    #[test]
    fn full_day_transitions() {
        let state = DayState::of(None);
        assert_eq!(state, DayState::NoRecord);

        let state = state.check_in().unwrap();
        assert_eq!(state, DayState::CheckedIn);

        let state = state.check_out().unwrap();
        assert_eq!(state, DayState::CheckedOut);
    }

    #[test]
    fn check_out_without_check_in_fails() {
        assert_eq!(
            DayState::of(None).check_out(),
            Err(AttendanceError::NoCheckInRecord)
        );
    }

    #[test]
    fn double_check_in_fails() {
        let open = record(Some("09:00:00"), None);
        assert_eq!(
            DayState::of(Some(&open)).check_in(),
            Err(AttendanceError::AlreadyCheckedIn)
        );
    }

    #[test]
    fn re_check_in_after_check_out_fails() {
        let done = record(Some("09:00:00"), Some("18:00:00"));
        assert_eq!(
            DayState::of(Some(&done)).check_in(),
            Err(AttendanceError::AlreadyCheckedIn)
        );
        assert_eq!(
            DayState::of(Some(&done)).check_out(),
            Err(AttendanceError::AlreadyCheckedOut)
        );
    }

    #[test]
    fn working_hours_from_timestamps() {
        assert_eq!(record(Some("09:00:00"), Some("18:00:00")).working_hours(), 9.0);
        assert_eq!(record(Some("09:00:00"), Some("09:00:00")).working_hours(), 0.0);
        // clock skew must not go negative
        assert_eq!(record(Some("18:00:00"), Some("09:00:00")).working_hours(), 0.0);
        assert_eq!(record(Some("09:00:00"), None).working_hours(), 0.0);
        assert_eq!(record(None, None).working_hours(), 0.0);
    }
}
