use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::model::attendance::Attendance;
use crate::model::leave_request::LeaveRequest;
use crate::model::wage_profile::WageProfile;

use super::{PayBreakdown, PayableSummary, PayrollError, calculator, payable};

/// Data-access contract for pay-run assembly.
///
/// The calculator and the day-accounting policy stay pure; everything they
/// need for a month is pulled through this trait, so the payroll core never
/// sees a concrete store.
#[allow(async_fn_in_trait)]
pub trait PayrollSource {
    async fn wage_profile(&self, employee_id: i64) -> anyhow::Result<Option<WageProfile>>;

    /// Attendance records falling inside the month containing `month`.
    async fn month_attendance(
        &self,
        employee_id: i64,
        month: NaiveDate,
    ) -> anyhow::Result<Vec<Attendance>>;

    /// Approved leave requests overlapping the month containing `month`.
    async fn approved_leaves(
        &self,
        employee_id: i64,
        month: NaiveDate,
    ) -> anyhow::Result<Vec<LeaveRequest>>;
}

#[derive(Debug, Error)]
pub enum PayRunError {
    #[error("no wage profile for employee {0}")]
    WageProfileNotFound(i64),

    #[error(transparent)]
    Payroll(#[from] PayrollError),

    #[error("payroll source failure: {0}")]
    Source(#[from] anyhow::Error),
}

/// One employee's pay run for one month: the unscaled breakdown plus the
/// attendance-scaled amount actually disbursed.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PayRun {
    pub employee_id: i64,

    #[schema(value_type = String, format = "date")]
    pub month: NaiveDate,

    pub monthly_wage: f64,
    pub breakdown: PayBreakdown,
    pub attendance: PayableSummary,

    /// `net_salary` scaled by payable days over calendar days of the month.
    pub pay_run_amount: f64,
}

/// Assembles a pay run for `employee_id` over the month containing `month`.
///
/// The breakdown itself is independent of attendance; only the disbursed
/// amount is scaled by the payable-day share.
pub async fn compute_pay_run<S: PayrollSource>(
    source: &S,
    employee_id: i64,
    month: NaiveDate,
) -> Result<PayRun, PayRunError> {
    let profile = source
        .wage_profile(employee_id)
        .await?
        .ok_or(PayRunError::WageProfileNotFound(employee_id))?;

    let attendance = source.month_attendance(employee_id, month).await?;
    let leaves = source.approved_leaves(employee_id, month).await?;

    let breakdown = calculator::compute_breakdown(profile.monthly_wage)?;
    let summary = payable::summarize_month(month, &attendance, &leaves);
    let pay_run_amount = payable::prorate(breakdown.net_salary, &summary);

    Ok(PayRun {
        employee_id,
        month,
        monthly_wage: profile.monthly_wage,
        breakdown,
        attendance: summary,
        pay_run_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::AttendanceStatus;
    use crate::model::leave_request::LeaveType;
    use pretty_assertions::assert_eq;

    struct FakeSource {
        profile: Option<WageProfile>,
        attendance: Vec<Attendance>,
        leaves: Vec<LeaveRequest>,
    }

    impl PayrollSource for FakeSource {
        async fn wage_profile(&self, _employee_id: i64) -> anyhow::Result<Option<WageProfile>> {
            Ok(self.profile.clone())
        }

        async fn month_attendance(
            &self,
            _employee_id: i64,
            _month: NaiveDate,
        ) -> anyhow::Result<Vec<Attendance>> {
            Ok(self.attendance.clone())
        }

        async fn approved_leaves(
            &self,
            _employee_id: i64,
            _month: NaiveDate,
        ) -> anyhow::Result<Vec<LeaveRequest>> {
            Ok(self.leaves.clone())
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[actix_rt::test]
    async fn pay_run_scales_net_by_payable_days() {
        let source = FakeSource {
            profile: Some(WageProfile {
                employee_id: 7,
                monthly_wage: 50_000.0,
                updated_at: None,
            }),
            attendance: (1u32..=20)
                .map(|day| Attendance {
                    id: i64::from(day),
                    employee_id: 7,
                    date: d(2026, 4, u32::from(day)),
                    check_in: None,
                    check_out: None,
                    status: AttendanceStatus::Present,
                })
                .collect(),
            leaves: vec![LeaveRequest {
                id: 1,
                employee_id: 7,
                start_date: d(2026, 4, 21),
                end_date: d(2026, 4, 22),
                leave_type: LeaveType::Annual.as_str().to_string(),
                status: "approved".to_string(),
            }],
        };

        let run = compute_pay_run(&source, 7, d(2026, 4, 1)).await.unwrap();
        assert_eq!(run.breakdown.net_salary, 45_550.0);
        assert_eq!(run.attendance.payable_days(), 22);
        assert_eq!(run.pay_run_amount, 33_403.33);
    }

    #[actix_rt::test]
    async fn missing_wage_profile_is_an_error() {
        let source = FakeSource {
            profile: None,
            attendance: vec![],
            leaves: vec![],
        };

        let err = compute_pay_run(&source, 9, d(2026, 4, 1)).await.unwrap_err();
        assert!(matches!(err, PayRunError::WageProfileNotFound(9)));
    }

    #[actix_rt::test]
    async fn negative_stored_wage_surfaces_invalid_input() {
        let source = FakeSource {
            profile: Some(WageProfile {
                employee_id: 7,
                monthly_wage: -5.0,
                updated_at: None,
            }),
            attendance: vec![],
            leaves: vec![],
        };

        let err = compute_pay_run(&source, 7, d(2026, 4, 1)).await.unwrap_err();
        assert!(matches!(err, PayRunError::Payroll(PayrollError::InvalidInput(_))));
    }
}
