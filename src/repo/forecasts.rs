//! Forecast store and reconciler.
//!
//! Rows are keyed by (plant, timestamp). Reconciling freshly fetched
//! provider samples upserts each one: the five measured fields of an
//! existing row are overwritten in place, new timestamps become new rows.
//! Stale rows for timestamps the provider no longer returns are retained.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::{ForecastPoint, IrradianceSample};

pub struct ForecastRepository {
    pool: SqlitePool,
}

impl ForecastRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Merge one provider fetch into the store. All writes happen inside a
    /// single transaction: a failure partway through rolls everything back,
    /// so readers never observe a mix of old and new values. Applying the
    /// same samples twice leaves the store unchanged.
    ///
    /// Returns the number of points written.
    pub async fn reconcile(
        &self,
        plant_id: Uuid,
        samples: &[IrradianceSample],
    ) -> sqlx::Result<usize> {
        let mut tx = self.pool.begin().await?;
        for sample in samples {
            sqlx::query(
                r#"
                INSERT INTO forecast_points
                    (plant_id, timestamp, ghi, dni, dhi, air_temp, cloud_opacity)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT (plant_id, timestamp) DO UPDATE SET
                    ghi = excluded.ghi,
                    dni = excluded.dni,
                    dhi = excluded.dhi,
                    air_temp = excluded.air_temp,
                    cloud_opacity = excluded.cloud_opacity
                "#,
            )
            .bind(plant_id)
            .bind(sample.period_end)
            .bind(sample.ghi)
            .bind(sample.dni)
            .bind(sample.dhi)
            .bind(sample.air_temp)
            .bind(sample.cloud_opacity)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(samples.len())
    }

    pub async fn find(
        &self,
        plant_id: Uuid,
        timestamp: DateTime<Utc>,
    ) -> sqlx::Result<Option<ForecastPoint>> {
        sqlx::query_as::<_, ForecastPoint>(
            "SELECT * FROM forecast_points WHERE plant_id = ?1 AND timestamp = ?2",
        )
        .bind(plant_id)
        .bind(timestamp)
        .fetch_optional(&self.pool)
        .await
    }

    /// Points whose timestamp falls in the half-open interval `[start, end)`.
    pub async fn query_range(
        &self,
        plant_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> sqlx::Result<Vec<ForecastPoint>> {
        sqlx::query_as::<_, ForecastPoint>(
            r#"
            SELECT * FROM forecast_points
            WHERE plant_id = ?1 AND timestamp >= ?2 AND timestamp < ?3
            ORDER BY timestamp ASC
            "#,
        )
        .bind(plant_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn list_for_plant(&self, plant_id: Uuid) -> sqlx::Result<Vec<ForecastPoint>> {
        sqlx::query_as::<_, ForecastPoint>(
            "SELECT * FROM forecast_points WHERE plant_id = ?1 ORDER BY timestamp ASC",
        )
        .bind(plant_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn count_for_plant(&self, plant_id: Uuid) -> sqlx::Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM forecast_points WHERE plant_id = ?1")
                .bind(plant_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
