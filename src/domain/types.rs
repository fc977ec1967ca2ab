use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One forecast entry as returned by the radiation provider, not yet tied
/// to a plant. `period_end` is the end of the forecast interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrradianceSample {
    pub period_end: DateTime<Utc>,
    /// Global horizontal irradiance (W/m²)
    pub ghi: f64,
    /// Direct normal irradiance (W/m²)
    pub dni: f64,
    /// Diffuse horizontal irradiance (W/m²)
    pub dhi: f64,
    /// Ambient air temperature (°C)
    pub air_temp: f64,
    /// Cloud opacity fraction
    pub cloud_opacity: f64,
}

/// Durable forecast row, keyed by (plant, timestamp).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ForecastPoint {
    pub plant_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub ghi: f64,
    pub dni: f64,
    pub dhi: f64,
    pub air_temp: f64,
    pub cloud_opacity: f64,
}

/// Expected daily energy output for one plant, keyed by (plant, date).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PerformanceRecord {
    pub plant_id: Uuid,
    pub date: NaiveDate,
    pub expected_kwh: f64,
    pub computed_at: DateTime<Utc>,
}

/// Account that owns plants. Managed by the user-management layer; the
/// service only reads these for login and ownership checks.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
}
