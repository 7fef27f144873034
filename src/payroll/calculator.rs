use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::PayrollError;

// Salary structure rules. Basic is carved out of the monthly wage, every
// other component is a share of basic.
pub const BASIC_OF_WAGE: f64 = 0.50;
pub const HRA_OF_BASIC: f64 = 0.50;
pub const STANDARD_ALLOWANCE_OF_BASIC: f64 = 0.1667;
pub const PERFORMANCE_BONUS_OF_BASIC: f64 = 0.0833;
pub const LTA_OF_BASIC: f64 = 0.0833;
pub const FIXED_ALLOWANCE_OF_BASIC: f64 = 0.1167;
pub const PF_OF_BASIC: f64 = 0.12;
pub const PROFESSIONAL_TAX: f64 = 200.0;

/// Itemized monthly pay derived from a wage profile. Always recomputed on
/// demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "basic": 25000.0,
    "hra": 12500.0,
    "standard_allowance": 4167.5,
    "performance_bonus": 2082.5,
    "leave_travel_allowance": 2082.5,
    "fixed_allowance": 2917.5,
    "employee_pf": 3000.0,
    "employer_pf": 3000.0,
    "professional_tax": 200.0,
    "net_salary": 45550.0
}))]
pub struct PayBreakdown {
    pub basic: f64,
    pub hra: f64,
    pub standard_allowance: f64,
    pub performance_bonus: f64,
    pub leave_travel_allowance: f64,
    pub fixed_allowance: f64,
    /// Deducted from the employee's pay.
    pub employee_pf: f64,
    /// Employer contribution, informational only, not deducted.
    pub employer_pf: f64,
    pub professional_tax: f64,
    pub net_salary: f64,
}

impl PayBreakdown {
    pub fn earnings(&self) -> f64 {
        self.basic
            + self.hra
            + self.standard_allowance
            + self.performance_bonus
            + self.leave_travel_allowance
            + self.fixed_allowance
    }

    pub fn deductions(&self) -> f64 {
        self.employee_pf + self.professional_tax
    }
}

/// Round to 2 decimal places, half away from zero.
pub(crate) fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Derives the itemized pay breakdown from a monthly wage.
///
/// Pure and idempotent: the same wage always yields the same breakdown,
/// component by component. Rejects negative or non-finite wages.
pub fn compute_breakdown(monthly_wage: f64) -> Result<PayBreakdown, PayrollError> {
    if !monthly_wage.is_finite() || monthly_wage < 0.0 {
        return Err(PayrollError::InvalidInput(monthly_wage));
    }

    let basic = round2(BASIC_OF_WAGE * monthly_wage);
    let hra = round2(HRA_OF_BASIC * basic);
    let standard_allowance = round2(STANDARD_ALLOWANCE_OF_BASIC * basic);
    let performance_bonus = round2(PERFORMANCE_BONUS_OF_BASIC * basic);
    let leave_travel_allowance = round2(LTA_OF_BASIC * basic);
    let fixed_allowance = round2(FIXED_ALLOWANCE_OF_BASIC * basic);
    let employee_pf = round2(PF_OF_BASIC * basic);
    let employer_pf = round2(PF_OF_BASIC * basic);
    let professional_tax = PROFESSIONAL_TAX;

    let earnings = basic
        + hra
        + standard_allowance
        + performance_bonus
        + leave_travel_allowance
        + fixed_allowance;
    let net_salary = round2(earnings - employee_pf - professional_tax);

    Ok(PayBreakdown {
        basic,
        hra,
        standard_allowance,
        performance_bonus,
        leave_travel_allowance,
        fixed_allowance,
        employee_pf,
        employer_pf,
        professional_tax,
        net_salary,
    })
}
