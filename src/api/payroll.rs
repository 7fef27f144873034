use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::model::attendance::Attendance;
use crate::model::leave_request::LeaveRequest;
use crate::model::wage_profile::WageProfile;
use crate::payroll::{self, PayRunError, PayrollSource, compute_breakdown, payable};

/// `PayrollSource` over the local store. The payroll core only ever sees
/// this trait, never the pool.
pub struct SqlitePayrollSource<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SqlitePayrollSource<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    fn month_bounds(month: NaiveDate) -> (NaiveDate, NaiveDate) {
        let first = month.with_day(1).expect("first of month");
        let last = NaiveDate::from_ymd_opt(
            first.year(),
            first.month(),
            payable::days_in_month(first),
        )
        .expect("last day of month");
        (first, last)
    }
}

impl PayrollSource for SqlitePayrollSource<'_> {
    async fn wage_profile(&self, employee_id: i64) -> anyhow::Result<Option<WageProfile>> {
        let profile = sqlx::query_as::<_, WageProfile>(
            "SELECT employee_id, monthly_wage, updated_at FROM wage_profiles WHERE employee_id = ?",
        )
        .bind(employee_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(profile)
    }

    async fn month_attendance(
        &self,
        employee_id: i64,
        month: NaiveDate,
    ) -> anyhow::Result<Vec<Attendance>> {
        let (first, last) = Self::month_bounds(month);

        let rows = sqlx::query_as::<_, Attendance>(
            r#"
            SELECT id, employee_id, date, check_in, check_out, status
            FROM attendance
            WHERE employee_id = ? AND date BETWEEN ? AND ?
            "#,
        )
        .bind(employee_id)
        .bind(first)
        .bind(last)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    async fn approved_leaves(
        &self,
        employee_id: i64,
        month: NaiveDate,
    ) -> anyhow::Result<Vec<LeaveRequest>> {
        let (first, last) = Self::month_bounds(month);

        let rows = sqlx::query_as::<_, LeaveRequest>(
            r#"
            SELECT id, employee_id, start_date, end_date, leave_type, status
            FROM leave_requests
            WHERE employee_id = ? AND status = 'approved'
              AND start_date <= ? AND end_date >= ?
            "#,
        )
        .bind(employee_id)
        .bind(last)
        .bind(first)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}

#[derive(Deserialize, ToSchema)]
pub struct UpsertWage {
    #[schema(example = 50000.0)]
    pub monthly_wage: f64,
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedWageResponse {
    pub data: Vec<WageProfile>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct WageListQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,

    #[schema(example = 10)]
    pub per_page: Option<u32>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PayRunQuery {
    /// Pay-run month as YYYY-MM. Defaults to the current month.
    #[schema(example = "2026-01")]
    pub month: Option<String>,
}

/// Create or replace an employee's wage profile
#[utoipa::path(
    put,
    path = "/api/payroll/wage/{employee_id}",
    request_body = UpsertWage,
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Wage profile saved"),
        (status = 400, description = "Invalid wage"),
        (status = 404, description = "Employee not found"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn upsert_wage(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    payload: web::Json<UpsertWage>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let employee_id = path.into_inner();

    // same validation the calculator applies, surfaced before writing
    if let Err(e) = compute_breakdown(payload.monthly_wage) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": e.to_string()
        })));
    }

    let employee_exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM employees WHERE id = ?)")
            .bind(employee_id)
            .fetch_one(pool.get_ref())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, employee_id, "Failed to check employee");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

    if !employee_exists {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Employee not found"
        })));
    }

    sqlx::query(
        r#"
        INSERT INTO wage_profiles (employee_id, monthly_wage, updated_at)
        VALUES (?, ?, datetime('now'))
        ON CONFLICT(employee_id) DO UPDATE
        SET monthly_wage = excluded.monthly_wage, updated_at = excluded.updated_at
        "#,
    )
    .bind(employee_id)
    .bind(payload.monthly_wage)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to save wage profile");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Wage profile saved"
    })))
}

/// Read an employee's wage profile
#[utoipa::path(
    get,
    path = "/api/payroll/wage/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, body = WageProfile),
        (status = 404, description = "No wage profile"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_wage(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    auth.require_self_or_hr(employee_id)?;

    let profile = SqlitePayrollSource::new(pool.get_ref())
        .wage_profile(employee_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Failed to fetch wage profile");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    match profile {
        Some(p) => Ok(HttpResponse::Ok().json(p)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "No wage profile for employee"
        }))),
    }
}

/// List wage profiles
#[utoipa::path(
    get,
    path = "/api/payroll/wage",
    params(WageListQuery),
    responses(
        (status = 200, body = PaginatedWageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_wages(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<WageListQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM wage_profiles")
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to count wage profiles");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let data = sqlx::query_as::<_, WageProfile>(
        r#"
        SELECT employee_id, monthly_wage, updated_at
        FROM wage_profiles
        ORDER BY employee_id
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(per_page as i64)
    .bind(offset as i64)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch wage profiles");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(PaginatedWageResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// Itemized pay breakdown, recomputed from the wage profile
#[utoipa::path(
    get,
    path = "/api/payroll/breakdown/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, body = crate::payroll::PayBreakdown),
        (status = 400, description = "Stored wage is invalid"),
        (status = 404, description = "No wage profile"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_breakdown(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    auth.require_self_or_hr(employee_id)?;

    let profile = SqlitePayrollSource::new(pool.get_ref())
        .wage_profile(employee_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Failed to fetch wage profile");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let Some(profile) = profile else {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "No wage profile for employee"
        })));
    };

    match compute_breakdown(profile.monthly_wage) {
        Ok(breakdown) => Ok(HttpResponse::Ok().json(breakdown)),
        Err(e) => Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": e.to_string()
        }))),
    }
}

/// Pay run for one employee and month: breakdown plus the
/// attendance-prorated amount
#[utoipa::path(
    get,
    path = "/api/payroll/run/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID"),
        PayRunQuery
    ),
    responses(
        (status = 200, body = crate::payroll::PayRun),
        (status = 400, description = "Bad month format or invalid stored wage"),
        (status = 404, description = "No wage profile"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn pay_run(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    query: web::Query<PayRunQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let employee_id = path.into_inner();

    let month = match &query.month {
        Some(m) => match super::parse_month(m) {
            Some(d) => d,
            None => {
                return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                    "message": "month must be formatted as YYYY-MM"
                })));
            }
        },
        None => Local::now().date_naive().with_day(1).expect("first of month"),
    };

    let source = SqlitePayrollSource::new(pool.get_ref());

    match payroll::compute_pay_run(&source, employee_id, month).await {
        Ok(run) => Ok(HttpResponse::Ok().json(run)),
        Err(PayRunError::WageProfileNotFound(_)) => {
            Ok(HttpResponse::NotFound().json(serde_json::json!({
                "message": "No wage profile for employee"
            })))
        }
        Err(PayRunError::Payroll(e)) => Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": e.to_string()
        }))),
        Err(PayRunError::Source(e)) => {
            tracing::error!(error = %e, employee_id, "Pay run failed");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}
