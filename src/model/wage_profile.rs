use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Per-employee wage configuration. One row per employee, written by an
/// administrator; the pay breakdown is always derived from it on demand.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct WageProfile {
    #[schema(example = 7)]
    pub employee_id: i64,

    #[schema(example = 50000.0)]
    pub monthly_wage: f64,

    #[schema(example = "2026-01-01T09:00:00", value_type = String, format = "date-time", nullable = true)]
    pub updated_at: Option<NaiveDateTime>,
}
