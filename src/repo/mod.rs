use std::str::FromStr;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

pub mod forecasts;
pub mod performance;
pub mod plants;
pub mod users;

pub use forecasts::ForecastRepository;
pub use performance::PerformanceRepository;
pub use plants::PlantRepository;
pub use users::UserRepository;

pub struct Repositories {
    pool: SqlitePool,
}

impl Repositories {
    pub async fn connect(url: &str) -> Result<Self> {
        let opts = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(false);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await?;
        init_schema(&pool).await?;
        Ok(Self { pool })
    }

    /// Private in-memory database, one connection so every handle sees the
    /// same data. Used by tests and local experiments.
    pub async fn in_memory() -> Result<Self> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(false);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await?;
        init_schema(&pool).await?;
        Ok(Self { pool })
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn plants(&self) -> PlantRepository {
        PlantRepository::new(self.pool.clone())
    }

    pub fn forecasts(&self) -> ForecastRepository {
        ForecastRepository::new(self.pool.clone())
    }

    pub fn performance(&self) -> PerformanceRepository {
        PerformanceRepository::new(self.pool.clone())
    }
}

async fn init_schema(pool: &SqlitePool) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id            BLOB PRIMARY KEY,
            username      TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS plants (
            id                BLOB PRIMARY KEY,
            user_id           BLOB NOT NULL REFERENCES users(id),
            name              TEXT NOT NULL,
            latitude          REAL NOT NULL,
            longitude         REAL NOT NULL,
            capacity_kw       REAL NOT NULL,
            area_m2           REAL NOT NULL,
            panel_tilt_deg    REAL NOT NULL DEFAULT 30.0,
            panel_azimuth_deg REAL NOT NULL DEFAULT 180.0,
            UNIQUE (user_id, name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS forecast_points (
            plant_id      BLOB NOT NULL REFERENCES plants(id),
            timestamp     TEXT NOT NULL,
            ghi           REAL NOT NULL,
            dni           REAL NOT NULL,
            dhi           REAL NOT NULL,
            air_temp      REAL NOT NULL,
            cloud_opacity REAL NOT NULL,
            PRIMARY KEY (plant_id, timestamp)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS plant_performance (
            plant_id     BLOB NOT NULL REFERENCES plants(id),
            date         TEXT NOT NULL,
            expected_kwh REAL NOT NULL,
            computed_at  TEXT NOT NULL,
            PRIMARY KEY (plant_id, date)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
