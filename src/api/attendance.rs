use crate::auth::auth::AuthUser;
use crate::model::attendance::{Attendance, AttendanceStatus, DayState};
use crate::payroll::payable;
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use utoipa::{IntoParams, ToSchema};

async fn today_record(
    pool: &SqlitePool,
    employee_id: i64,
    date: NaiveDate,
) -> Result<Option<Attendance>, sqlx::Error> {
    sqlx::query_as::<_, Attendance>(
        r#"
        SELECT id, employee_id, date, check_in, check_out, status
        FROM attendance
        WHERE employee_id = ? AND date = ?
        "#,
    )
    .bind(employee_id)
    .bind(date)
    .fetch_optional(pool)
    .await
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance",
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully"
        })),
        (status = 400, description = "Already checked in today", body = Object, example = json!({
            "message": "already checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
) -> actix_web::Result<impl Responder> {
    let employee_id: i64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    let now = Local::now();
    let today = now.date_naive();

    let existing = today_record(pool.get_ref(), employee_id, today)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Check-in lookup failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if let Err(e) = DayState::of(existing.as_ref()).check_in() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": e.to_string()
        })));
    }

    let check_in = now.time();

    sqlx::query(
        r#"
        INSERT INTO attendance (employee_id, date, check_in, status)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(today)
    .bind(check_in)
    .bind(AttendanceStatus::Present)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Check-in failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Checked in successfully",
        "date": today,
        "check_in": check_in.format("%H:%M:%S").to_string()
    })))
}

/// Check-out endpoint
#[utoipa::path(
    put,
    path = "/api/attendance",
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Checked out successfully",
            "working_hours": 8.5
        })),
        (status = 400, description = "No check-in record for today, or already checked out", body = Object, example = json!({
            "message": "no check-in record found for today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
) -> actix_web::Result<impl Responder> {
    let employee_id: i64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    let now = Local::now();
    let today = now.date_naive();

    let existing = today_record(pool.get_ref(), employee_id, today)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Check-out lookup failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if let Err(e) = DayState::of(existing.as_ref()).check_out() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": e.to_string()
        })));
    }

    let mut record = existing.expect("checked-in state implies a record");
    record.check_out = Some(now.time());

    sqlx::query(
        r#"
        UPDATE attendance
        SET check_out = ?
        WHERE id = ?
        "#,
    )
    .bind(record.check_out)
    .bind(record.id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Check-out failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Checked out successfully",
        "working_hours": record.working_hours()
    })))
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AttendanceQuery {
    /// Month to list, as YYYY-MM. Defaults to the current month.
    #[schema(example = "2026-01")]
    pub month: Option<String>,

    /// Another employee's history; requires HR/Admin.
    #[schema(example = 7)]
    pub employee_id: Option<i64>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceDayResponse {
    pub id: i64,
    pub employee_id: i64,

    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "09:00:00", value_type = String, nullable = true)]
    pub check_in: Option<String>,

    #[schema(example = "18:00:00", value_type = String, nullable = true)]
    pub check_out: Option<String>,

    pub status: AttendanceStatus,

    /// Derived from the two timestamps; zero while either is missing.
    #[schema(example = 9.0)]
    pub working_hours: f64,
}

impl From<Attendance> for AttendanceDayResponse {
    fn from(a: Attendance) -> Self {
        let working_hours = a.working_hours();
        AttendanceDayResponse {
            id: a.id,
            employee_id: a.employee_id,
            date: a.date,
            check_in: a.check_in.map(|t| t.format("%H:%M:%S").to_string()),
            check_out: a.check_out.map(|t| t.format("%H:%M:%S").to_string()),
            status: a.status,
            working_hours,
        }
    }
}

/// Attendance history for one month
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Attendance rows for the month", body = [AttendanceDayResponse]),
        (status = 400, description = "Bad month format"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn attendance_history(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let target = match query.employee_id {
        Some(id) => {
            auth.require_self_or_hr(id)?;
            id
        }
        None => auth
            .employee_id
            .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?,
    };

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

    let month_end = NaiveDate::from_ymd_opt(
        month.year(),
        month.month(),
        payable::days_in_month(month),
    )
    .expect("last day of month");

    let rows = sqlx::query_as::<_, Attendance>(
        r#"
        SELECT id, employee_id, date, check_in, check_out, status
        FROM attendance
        WHERE employee_id = ? AND date BETWEEN ? AND ?
        ORDER BY date DESC
        "#,
    )
    .bind(target)
    .bind(month)
    .bind(month_end)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id = target, "Failed to fetch attendance");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data: Vec<AttendanceDayResponse> =
        rows.into_iter().map(AttendanceDayResponse::from).collect();

    Ok(HttpResponse::Ok().json(data))
}
