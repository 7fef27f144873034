use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_code": "EMP0001",
        "first_name": "Alex",
        "last_name": "Johnson",
        "email": "alex@hrmaster.com",
        "phone": "+1 555-001",
        "department": "Operations",
        "job_title": "HR Director",
        "hire_date": "2023-01-01",
        "status": "active"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = "EMP0001")]
    pub employee_code: String,

    #[schema(example = "Alex")]
    pub first_name: String,

    #[schema(example = "Johnson")]
    pub last_name: String,

    #[schema(example = "alex@hrmaster.com")]
    pub email: String,

    #[schema(example = "+1 555-001", nullable = true)]
    pub phone: Option<String>,

    #[schema(example = "Operations")]
    pub department: String,

    #[schema(example = "HR Director")]
    pub job_title: String,

    #[schema(
        example = "2023-01-01",
        value_type = String,
        format = "date"
    )]
    pub hire_date: NaiveDate,

    #[schema(example = "active")]
    pub status: String,
}
