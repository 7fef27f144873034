use crate::api::attendance::{AttendanceDayResponse, AttendanceQuery};
use crate::api::employee::{
    CodeAvailableQuery, CreateEmployee, EmployeeListResponse, EmployeeQuery,
};
use crate::api::leave_request::{CreateLeave, LeaveFilter, LeaveListResponse, LeaveResponse};
use crate::api::payroll::{PaginatedWageResponse, PayRunQuery, UpsertWage, WageListQuery};
use crate::model::attendance::AttendanceStatus;
use crate::model::employee::Employee;
use crate::model::leave_request::LeaveType;
use crate::model::wage_profile::WageProfile;
use crate::payroll::{PayBreakdown, PayRun, PayableSummary};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HR Master API",
        version = "1.0.0",
        description = r#"
## HR Master

Backend for a human-resources portal covering the day-to-day HR operations of
an organization.

### Key Features
- **Employee Directory**
  - Create, update, list, and view employee profiles; EMP#### code allocation
- **Attendance**
  - Daily check-in / check-out with derived working hours
- **Leave**
  - Apply for leave, approve/reject requests, view leave history
- **Payroll**
  - Wage profiles, derived pay breakdowns, attendance-prorated pay runs

### Security
Most endpoints are protected using **JWT Bearer authentication**.
Sensitive operations require the **Admin** or **HR** role.

### Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::attendance_history,

        crate::api::employee::create_employee,
        crate::api::employee::code_available,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::payroll::upsert_wage,
        crate::api::payroll::get_wage,
        crate::api::payroll::list_wages,
        crate::api::payroll::get_breakdown,
        crate::api::payroll::pay_run
    ),
    components(
        schemas(
            LeaveFilter,
            LeaveType,
            CreateLeave,
            LeaveResponse,
            LeaveListResponse,
            CreateEmployee,
            CodeAvailableQuery,
            EmployeeQuery,
            Employee,
            EmployeeListResponse,
            AttendanceQuery,
            AttendanceDayResponse,
            AttendanceStatus,
            WageProfile,
            UpsertWage,
            WageListQuery,
            PaginatedWageResponse,
            PayRunQuery,
            PayBreakdown,
            PayableSummary,
            PayRun
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave", description = "Leave management APIs"),
        (name = "Attendance", description = "Attendance management APIs"),
        (name = "Employee", description = "Employee directory APIs"),
        (name = "Payroll", description = "Payroll management APIs"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
