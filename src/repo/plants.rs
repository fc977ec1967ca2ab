//! Plant directory. Plants are created by the management layer; the sync
//! pipeline treats them as read-only within a pass.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::Plant;

pub struct PlantRepository {
    pool: SqlitePool,
}

impl PlantRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, plant: &Plant) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO plants
                (id, user_id, name, latitude, longitude, capacity_kw, area_m2,
                 panel_tilt_deg, panel_azimuth_deg)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(plant.id)
        .bind(plant.user_id)
        .bind(&plant.name)
        .bind(plant.latitude)
        .bind(plant.longitude)
        .bind(plant.capacity_kw)
        .bind(plant.area_m2)
        .bind(plant.panel_tilt_deg)
        .bind(plant.panel_azimuth_deg)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list_all(&self) -> sqlx::Result<Vec<Plant>> {
        sqlx::query_as::<_, Plant>("SELECT * FROM plants ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> sqlx::Result<Vec<Plant>> {
        sqlx::query_as::<_, Plant>("SELECT * FROM plants WHERE user_id = ?1 ORDER BY name ASC")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn find_for_user(&self, user_id: Uuid, name: &str) -> sqlx::Result<Option<Plant>> {
        sqlx::query_as::<_, Plant>("SELECT * FROM plants WHERE user_id = ?1 AND name = ?2")
            .bind(user_id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
    }
}
