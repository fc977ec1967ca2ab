//! Performance ledger: one expected-output figure per plant per day.
//!
//! Writes go through an upsert on (plant, date) so re-running the daily
//! estimation replaces the previous figure instead of accumulating
//! duplicate rows.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::PerformanceRecord;

pub struct PerformanceRepository {
    pool: SqlitePool,
}

impl PerformanceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, record: &PerformanceRecord) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO plant_performance (plant_id, date, expected_kwh, computed_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (plant_id, date) DO UPDATE SET
                expected_kwh = excluded.expected_kwh,
                computed_at = excluded.computed_at
            "#,
        )
        .bind(record.plant_id)
        .bind(record.date)
        .bind(record.expected_kwh)
        .bind(record.computed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find(
        &self,
        plant_id: Uuid,
        date: NaiveDate,
    ) -> sqlx::Result<Option<PerformanceRecord>> {
        sqlx::query_as::<_, PerformanceRecord>(
            "SELECT * FROM plant_performance WHERE plant_id = ?1 AND date = ?2",
        )
        .bind(plant_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
    }

    /// Most recent records first, capped at `limit`.
    pub async fn recent(
        &self,
        plant_id: Uuid,
        limit: i64,
    ) -> sqlx::Result<Vec<PerformanceRecord>> {
        sqlx::query_as::<_, PerformanceRecord>(
            r#"
            SELECT * FROM plant_performance
            WHERE plant_id = ?1
            ORDER BY date DESC
            LIMIT ?2
            "#,
        )
        .bind(plant_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }
}
