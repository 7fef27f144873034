//! End-to-end API tests over an in-memory SQLite store.

use actix_web::web::Data;
use actix_web::{App, http::StatusCode, test};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use hrmaster::{config::Config, db, routes};

fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "integration-test-secret".to_string(),
        server_addr: "127.0.0.1:0".to_string(),
        access_token_ttl: 900,
        refresh_token_ttl: 3600,
        rate_login_per_min: 10_000,
        rate_register_per_min: 10_000,
        rate_refresh_per_min: 10_000,
        rate_protected_per_min: 100_000,
        api_prefix: "/api".to_string(),
    }
}

async fn test_pool() -> SqlitePool {
    // single connection so every query sees the same in-memory database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    db::ensure_schema(&pool).await.expect("schema");
    pool
}

macro_rules! init_app {
    ($pool:expr, $config:expr) => {{
        let config = $config.clone();
        test::init_service(
            App::new()
                .app_data(Data::new($pool.clone()))
                .app_data(Data::new(config.clone()))
                .configure(move |cfg| routes::configure(cfg, config.clone())),
        )
        .await
    }};
}

// the rate limiter keys on peer IP, so every request must carry one
fn peer() -> std::net::SocketAddr {
    "127.0.0.1:34567".parse().unwrap()
}

macro_rules! send_json {
    ($app:expr, $method:ident, $path:expr, $body:expr) => {
        test::call_service(
            &$app,
            test::TestRequest::$method()
                .uri($path)
                .peer_addr(peer())
                .set_json($body)
                .to_request(),
        )
        .await
    };
    ($app:expr, $method:ident, $path:expr, $body:expr, $token:expr) => {
        test::call_service(
            &$app,
            test::TestRequest::$method()
                .uri($path)
                .peer_addr(peer())
                .insert_header(("Authorization", format!("Bearer {}", $token)))
                .set_json($body)
                .to_request(),
        )
        .await
    };
}

macro_rules! send {
    ($app:expr, $method:ident, $path:expr, $token:expr) => {
        test::call_service(
            &$app,
            test::TestRequest::$method()
                .uri($path)
                .peer_addr(peer())
                .insert_header(("Authorization", format!("Bearer {}", $token)))
                .to_request(),
        )
        .await
    };
}

/// Registers a user and returns (access_token, refresh_token).
macro_rules! register_and_login {
    ($app:expr, $username:expr, $role_id:expr, $employee_id:expr) => {{
        let resp = send_json!(
            $app,
            post,
            "/auth/register",
            &json!({
                "username": $username,
                "password": "s3cret!",
                "role_id": $role_id,
                "employee_id": $employee_id
            })
        );
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = send_json!(
            $app,
            post,
            "/auth/login",
            &json!({ "username": $username, "password": "s3cret!" })
        );
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        (
            body["access_token"].as_str().unwrap().to_string(),
            body["refresh_token"].as_str().unwrap().to_string(),
        )
    }};
}

/// Creates a directory record as the given admin and returns its id. The
/// code filter and cache are process-wide, so each test passes its own
/// distinct employee codes.
macro_rules! create_employee {
    ($app:expr, $token:expr, $email:expr, $code:expr) => {{
        let resp = send_json!(
            $app,
            post,
            "/api/employee",
            &json!({
                "employee_code": $code,
                "first_name": "Sarah",
                "last_name": "Williams",
                "email": $email,
                "phone": "+1 555-002",
                "department": "Engineering",
                "job_title": "Full Stack Dev",
                "hire_date": "2026-01-01"
            }),
            $token
        );
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        body["id"].as_i64().unwrap()
    }};
}

#[actix_rt::test]
async fn auth_register_login_refresh_logout() {
    let pool = test_pool().await;
    let config = test_config();
    let app = init_app!(pool, config);

    let (access, refresh) = register_and_login!(app, "admin", 1, Option::<i64>::None);

    // duplicate username is rejected
    let resp = send_json!(
        app,
        post,
        "/auth/register",
        &json!({ "username": "admin", "password": "other", "role_id": 1 })
    );
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // wrong password is rejected
    let resp = send_json!(
        app,
        post,
        "/auth/login",
        &json!({ "username": "admin", "password": "wrong" })
    );
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // access token passes the auth middleware
    let resp = send!(app, get, "/api/protected", access);
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["username"], "admin");

    // an access token is not accepted as a refresh token
    let resp = send!(app, post, "/auth/refresh", access);
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // rotation: refresh yields fresh tokens and revokes the old one
    let resp = send!(app, post, "/auth/refresh", refresh);
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let rotated = body["refresh_token"].as_str().unwrap().to_string();

    let resp = send!(app, post, "/auth/refresh", refresh);
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // logout revokes, and is idempotent
    let resp = send!(app, post, "/auth/logout", rotated);
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = send!(app, post, "/auth/logout", rotated);
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send!(app, post, "/auth/refresh", rotated);
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // no token at all
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/protected")
            .peer_addr(peer())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn employee_directory_crud_and_code_allocation() {
    let pool = test_pool().await;
    let config = test_config();
    let app = init_app!(pool, config);

    let (admin, _) = register_and_login!(app, "admin", 1, Option::<i64>::None);

    // first employee gets the first generated code
    let resp = send_json!(
        app,
        post,
        "/api/employee",
        &json!({
            "first_name": "Alex",
            "last_name": "Johnson",
            "email": "alex@hrmaster.com",
            "department": "Operations",
            "job_title": "HR Director",
            "hire_date": "2023-01-01"
        }),
        admin
    );
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["employee_code"], "EMP0001");
    let id = body["id"].as_i64().unwrap();

    // availability probe reflects the allocation
    let resp = send!(app, get, "/api/employee/code-available?code=EMP0001", admin);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["available"], json!(false));

    let resp = send!(app, get, "/api/employee/code-available?code=EMP9999", admin);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["available"], json!(true));

    // explicit duplicate code is rejected up front
    let resp = send_json!(
        app,
        post,
        "/api/employee",
        &json!({
            "employee_code": "emp0001",
            "first_name": "Dup",
            "last_name": "Licate",
            "email": "dup@hrmaster.com",
            "department": "Design",
            "job_title": "UI Designer",
            "hire_date": "2026-01-01"
        }),
        admin
    );
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // list + search
    let resp = send!(app, get, "/api/employee?search=Alex", admin);
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total"], json!(1));
    assert_eq!(body["data"][0]["employee_code"], "EMP0001");

    // read one
    let resp = send!(app, get, &format!("/api/employee/{}", id), admin);
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["department"], "Operations");

    // partial update through the whitelist
    let resp = send_json!(
        app,
        put,
        &format!("/api/employee/{}", id),
        &json!({ "department": "People Ops" }),
        admin
    );
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send_json!(
        app,
        put,
        &format!("/api/employee/{}", id),
        &json!({ "password": "nope" }),
        admin
    );
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // delete frees the code again
    let resp = send!(app, delete, &format!("/api/employee/{}", id), admin);
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send!(app, get, &format!("/api/employee/{}", id), admin);
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send!(app, get, "/api/employee/code-available?code=EMP0001", admin);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["available"], json!(true));
}

#[actix_rt::test]
async fn attendance_state_machine_over_the_api() {
    let pool = test_pool().await;
    let config = test_config();
    let app = init_app!(pool, config);

    let (admin, _) = register_and_login!(app, "admin", 1, Option::<i64>::None);
    let employee_id = create_employee!(app, admin, "sarah@hrmaster.com", "ATT0001");
    let (emp, _) = register_and_login!(app, "sarah", 3, Some(employee_id));

    // check-out with no record for today
    let resp = send!(app, put, "/api/attendance", emp);
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "no check-in record found for today");

    // check-in
    let resp = send!(app, post, "/api/attendance", emp);
    assert_eq!(resp.status(), StatusCode::OK);

    // a second check-in the same day is rejected
    let resp = send!(app, post, "/api/attendance", emp);
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "already checked in today");

    // check-out closes the day
    let resp = send!(app, put, "/api/attendance", emp);
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let hours = body["working_hours"].as_f64().unwrap();
    assert!((0.0..0.1).contains(&hours), "hours was {}", hours);

    // the day is terminal: no re-check-out, no re-check-in
    let resp = send!(app, put, "/api/attendance", emp);
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let resp = send!(app, post, "/api/attendance", emp);
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // history for the current month carries the derived hours
    let resp = send!(app, get, "/api/attendance", emp);
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["status"], "Present");
    assert!(rows[0]["working_hours"].as_f64().unwrap() >= 0.0);

    // an employee cannot read someone else's history
    let resp = send!(
        app,
        get,
        &format!("/api/attendance?employee_id={}", employee_id + 1),
        emp
    );
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // HR/Admin can
    let resp = send!(
        app,
        get,
        &format!("/api/attendance?employee_id={}", employee_id),
        admin
    );
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn leave_workflow_and_role_gating() {
    let pool = test_pool().await;
    let config = test_config();
    let app = init_app!(pool, config);

    let (admin, _) = register_and_login!(app, "admin", 1, Option::<i64>::None);
    let employee_id = create_employee!(app, admin, "sarah@hrmaster.com", "LVE0001");
    let (emp, _) = register_and_login!(app, "sarah", 3, Some(employee_id));

    // reversed dates are rejected
    let resp = send_json!(
        app,
        post,
        "/api/leave",
        &json!({ "start_date": "2026-04-22", "end_date": "2026-04-21", "leave_type": "sick" }),
        emp
    );
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send_json!(
        app,
        post,
        "/api/leave",
        &json!({ "start_date": "2026-04-21", "end_date": "2026-04-22", "leave_type": "sick" }),
        emp
    );
    assert_eq!(resp.status(), StatusCode::OK);

    // the employee sees their own application
    let resp = send!(app, get, "/api/leave", emp);
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total"], json!(1));
    let leave_id = body["data"][0]["id"].as_i64().unwrap();
    assert_eq!(body["data"][0]["status"], "pending");

    // employees cannot approve
    let resp = send!(app, put, &format!("/api/leave/{}/approve", leave_id), emp);
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // HR/Admin approves exactly once
    let resp = send!(app, put, &format!("/api/leave/{}/approve", leave_id), admin);
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = send!(app, put, &format!("/api/leave/{}/approve", leave_id), admin);
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let resp = send!(app, put, &format!("/api/leave/{}/reject", leave_id), admin);
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send!(app, get, &format!("/api/leave/{}", leave_id), emp);
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "approved");
}

#[actix_rt::test]
async fn payroll_breakdown_and_prorated_pay_run() {
    let pool = test_pool().await;
    let config = test_config();
    let app = init_app!(pool, config);

    let (admin, _) = register_and_login!(app, "admin", 1, Option::<i64>::None);
    let employee_id = create_employee!(app, admin, "sarah@hrmaster.com", "PAY0001");
    let (emp, _) = register_and_login!(app, "sarah", 3, Some(employee_id));

    // only admins may write wage profiles
    let resp = send_json!(
        app,
        put,
        &format!("/api/payroll/wage/{}", employee_id),
        &json!({ "monthly_wage": 50000.0 }),
        emp
    );
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // negative wages never reach the store
    let resp = send_json!(
        app,
        put,
        &format!("/api/payroll/wage/{}", employee_id),
        &json!({ "monthly_wage": -1.0 }),
        admin
    );
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // unknown employee
    let resp = send_json!(
        app,
        put,
        "/api/payroll/wage/9999",
        &json!({ "monthly_wage": 50000.0 }),
        admin
    );
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send_json!(
        app,
        put,
        &format!("/api/payroll/wage/{}", employee_id),
        &json!({ "monthly_wage": 50000.0 }),
        admin
    );
    assert_eq!(resp.status(), StatusCode::OK);

    // the employee reads their own breakdown
    let resp = send!(
        app,
        get,
        &format!("/api/payroll/breakdown/{}", employee_id),
        emp
    );
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["basic"], json!(25000.0));
    assert_eq!(body["hra"], json!(12500.0));
    assert_eq!(body["standard_allowance"], json!(4167.5));
    assert_eq!(body["employee_pf"], json!(3000.0));
    assert_eq!(body["professional_tax"], json!(200.0));
    assert_eq!(body["net_salary"], json!(45550.0));

    // ...but not anyone else's
    let resp = send!(
        app,
        get,
        &format!("/api/payroll/breakdown/{}", employee_id + 1),
        emp
    );
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // recomputation is idempotent
    let resp = send!(
        app,
        get,
        &format!("/api/payroll/breakdown/{}", employee_id),
        emp
    );
    let again: Value = test::read_body_json(resp).await;
    assert_eq!(again["net_salary"], json!(45550.0));

    // seed April 2026: 20 present days and a 2-day approved annual leave
    for day in 1..=20 {
        let date = NaiveDate::from_ymd_opt(2026, 4, day).unwrap();
        sqlx::query(
            "INSERT INTO attendance (employee_id, date, check_in, status) VALUES (?, ?, '09:00:00', 'Present')",
        )
        .bind(employee_id)
        .bind(date)
        .execute(&pool)
        .await
        .unwrap();
    }
    sqlx::query(
        "INSERT INTO leave_requests (employee_id, start_date, end_date, leave_type, status)
         VALUES (?, '2026-04-21', '2026-04-22', 'annual', 'approved')",
    )
    .bind(employee_id)
    .execute(&pool)
    .await
    .unwrap();

    // pay runs are admin-only
    let resp = send!(
        app,
        get,
        &format!("/api/payroll/run/{}?month=2026-04", employee_id),
        emp
    );
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = send!(
        app,
        get,
        &format!("/api/payroll/run/{}?month=2026-04", employee_id),
        admin
    );
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["attendance"]["days_in_month"], json!(30));
    assert_eq!(body["attendance"]["present_days"], json!(20));
    assert_eq!(body["attendance"]["paid_leave_days"], json!(2));
    assert_eq!(body["attendance"]["unpaid_days"], json!(8));
    assert_eq!(body["breakdown"]["net_salary"], json!(45550.0));
    assert_eq!(body["pay_run_amount"], json!(33403.33));

    // bad month format
    let resp = send!(
        app,
        get,
        &format!("/api/payroll/run/{}?month=April", employee_id),
        admin
    );
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // no wage profile
    let other_id = create_employee!(app, admin, "michael@hrmaster.com", "PAY0002");
    let resp = send!(
        app,
        get,
        &format!("/api/payroll/run/{}?month=2026-04", other_id),
        admin
    );
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // admin wage list
    let resp = send!(app, get, "/api/payroll/wage", admin);
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total"], json!(1));
    let resp = send!(app, get, "/api/payroll/wage", emp);
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
