//! Sync orchestrator: drives the provider client, reconciler and estimator
//! across every known plant. One plant failing never aborts the pass; the
//! failure is logged and the remaining plants are still processed, each
//! committed on its own.

use std::sync::Arc;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::domain::{PerformanceRecord, Plant};
use crate::error::SyncError;
use crate::estimator;
use crate::provider::RadiationClient;
use crate::repo::Repositories;

/// Shared handle for HTTP handlers and background tasks.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Config,
    pub repos: Arc<Repositories>,
    pub sync: Arc<SyncService>,
}

impl AppState {
    pub async fn new(cfg: Config) -> Result<Self> {
        let repos = Arc::new(Repositories::connect(&cfg.db.url).await?);
        let provider = RadiationClient::new(&cfg.provider)?;
        let sync = Arc::new(SyncService::new(repos.clone(), provider));
        Ok(Self { cfg, repos, sync })
    }
}

/// Outcome of one pass over all plants.
#[derive(Debug, Default, Clone, Serialize)]
pub struct PassReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub points_written: usize,
}

pub struct SyncService {
    repos: Arc<Repositories>,
    provider: RadiationClient,
}

impl SyncService {
    pub fn new(repos: Arc<Repositories>, provider: RadiationClient) -> Self {
        Self { repos, provider }
    }

    /// Fetch and reconcile the irradiance forecast for every plant in the
    /// directory. Reconciliation commits per plant, so one plant's failure
    /// cannot roll back another's successfully written points.
    pub async fn sync_all_forecasts(&self) -> Result<PassReport, SyncError> {
        let plants = self.repos.plants().list_all().await?;
        let mut report = PassReport::default();

        for plant in &plants {
            report.attempted += 1;
            match self.sync_plant(plant).await {
                Ok(written) => {
                    report.succeeded += 1;
                    report.points_written += written;
                    info!(plant = %plant.name, points = written, "forecast reconciled");
                }
                Err(e) => {
                    report.failed += 1;
                    error!(plant = %plant.name, error = %e, "forecast sync failed, skipping plant");
                }
            }
        }

        Ok(report)
    }

    async fn sync_plant(&self, plant: &Plant) -> Result<usize, SyncError> {
        let samples = self.provider.fetch(plant.latitude, plant.longitude).await?;
        let written = self.repos.forecasts().reconcile(plant.id, &samples).await?;
        Ok(written)
    }

    /// Estimate expected output for `day` and record it for every plant.
    /// Same per-plant failure isolation as the forecast pass.
    pub async fn compute_all_performance(&self, day: NaiveDate) -> Result<PassReport, SyncError> {
        let plants = self.repos.plants().list_all().await?;
        let mut report = PassReport::default();

        for plant in &plants {
            report.attempted += 1;
            match self.estimate_plant(plant, day).await {
                Ok(kwh) => {
                    report.succeeded += 1;
                    info!(plant = %plant.name, %day, expected_kwh = kwh, "performance recorded");
                }
                Err(e) => {
                    report.failed += 1;
                    error!(plant = %plant.name, %day, error = %e, "performance estimation failed, skipping plant");
                }
            }
        }

        Ok(report)
    }

    /// Estimate one plant's expected output for `day` and upsert the
    /// ledger record. Geometry is validated first; a malformed plant is a
    /// [`SyncError::Validation`] and writes nothing.
    pub async fn estimate_plant(&self, plant: &Plant, day: NaiveDate) -> Result<f64, SyncError> {
        plant.validate().map_err(|reason| SyncError::Validation {
            plant: plant.name.clone(),
            reason,
        })?;

        let (start, end) = estimator::day_window(day);
        let points = self.repos.forecasts().query_range(plant.id, start, end).await?;
        let expected_kwh = estimator::daily_energy_kwh(plant, &points);

        self.repos
            .performance()
            .upsert(&PerformanceRecord {
                plant_id: plant.id,
                date: day,
                expected_kwh,
                computed_at: Utc::now(),
            })
            .await?;

        Ok(expected_kwh)
    }
}

/// Periodic driving of both passes, in the background next to the HTTP
/// server. Each loop runs its pass to completion before sleeping again, so
/// passes never overlap themselves.
pub fn spawn_sync_tasks(state: AppState, cfg: Config) {
    let sync = state.sync.clone();
    let forecast_period =
        std::time::Duration::from_secs(cfg.sync.forecast_refresh_minutes.max(1) * 60);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(forecast_period);
        loop {
            interval.tick().await;
            match sync.sync_all_forecasts().await {
                Ok(report) => info!(?report, "forecast sync pass finished"),
                Err(e) => warn!(error = %e, "forecast sync pass failed"),
            }
        }
    });

    let sync = state.sync.clone();
    let performance_period =
        std::time::Duration::from_secs(cfg.sync.performance_refresh_minutes.max(1) * 60);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(performance_period);
        loop {
            interval.tick().await;
            let today = Utc::now().date_naive();
            match sync.compute_all_performance(today).await {
                Ok(report) => info!(?report, "performance pass finished"),
                Err(e) => warn!(error = %e, "performance pass failed"),
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use uuid::Uuid;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_cfg(base_url: &str) -> ProviderConfig {
        ProviderConfig {
            base_url: base_url.to_string(),
            api_key: "test-key".to_string(),
            http_timeout_seconds: 5,
            retry_attempts: 0,
            retry_backoff_ms: 1,
        }
    }

    fn plant(name: &str, latitude: f64) -> Plant {
        Plant {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            latitude,
            longitude: 11.97,
            capacity_kw: 8.0,
            area_m2: 10.0,
            panel_tilt_deg: 30.0,
            panel_azimuth_deg: 180.0,
        }
    }

    fn forecast_body() -> serde_json::Value {
        serde_json::json!({
            "forecasts": [
                { "period_end": "2026-08-26T10:30:00Z", "ghi": 500.0, "dni": 600.0,
                  "dhi": 100.0, "air_temp": 21.0, "cloud_opacity": 0.1 }
            ]
        })
    }

    async fn service(server: &MockServer) -> (Arc<Repositories>, SyncService) {
        let repos = Arc::new(Repositories::in_memory().await.unwrap());
        let provider = RadiationClient::new(&provider_cfg(&server.uri())).unwrap();
        let sync = SyncService::new(repos.clone(), provider);
        (repos, sync)
    }

    #[tokio::test]
    async fn one_failing_plant_does_not_block_the_others() {
        let server = MockServer::start().await;
        // The plant at latitude 57.7 gets data, the one at 40.0 gets a 500.
        Mock::given(method("GET"))
            .and(path("/radiation/forecasts"))
            .and(query_param("latitude", "57.7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/radiation/forecasts"))
            .and(query_param("latitude", "40"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (repos, sync) = service(&server).await;
        let healthy = plant("healthy", 57.7);
        let broken = plant("broken", 40.0);
        repos.plants().insert(&healthy).await.unwrap();
        repos.plants().insert(&broken).await.unwrap();

        let report = sync.sync_all_forecasts().await.unwrap();
        assert_eq!(report.attempted, 2);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.points_written, 1);

        assert_eq!(repos.forecasts().count_for_plant(healthy.id).await.unwrap(), 1);
        assert_eq!(repos.forecasts().count_for_plant(broken.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn sync_pass_is_idempotent_across_runs() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/radiation/forecasts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .mount(&server)
            .await;

        let (repos, sync) = service(&server).await;
        let p = plant("roof", 57.7);
        repos.plants().insert(&p).await.unwrap();

        sync.sync_all_forecasts().await.unwrap();
        sync.sync_all_forecasts().await.unwrap();

        assert_eq!(repos.forecasts().count_for_plant(p.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn performance_pass_records_the_reference_figure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/radiation/forecasts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .mount(&server)
            .await;

        let (repos, sync) = service(&server).await;
        let p = plant("roof", 57.7);
        repos.plants().insert(&p).await.unwrap();
        sync.sync_all_forecasts().await.unwrap();

        let day: NaiveDate = "2026-08-26".parse().unwrap();
        let report = sync.compute_all_performance(day).await.unwrap();
        assert_eq!(report.succeeded, 1);

        let record = repos.performance().find(p.id, day).await.unwrap().unwrap();
        // South-facing reference plant: one point at GHI 500 / DNI 600 /
        // DHI 100 comes out at -0.3 kWh under this model.
        assert!((record.expected_kwh - (-0.3)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn day_with_no_points_records_zero() {
        let server = MockServer::start().await;
        let (repos, sync) = service(&server).await;
        let p = plant("roof", 57.7);
        repos.plants().insert(&p).await.unwrap();

        let day: NaiveDate = "2026-08-26".parse().unwrap();
        sync.compute_all_performance(day).await.unwrap();

        let record = repos.performance().find(p.id, day).await.unwrap().unwrap();
        assert_eq!(record.expected_kwh, 0.0);
    }

    #[tokio::test]
    async fn invalid_geometry_skips_that_plant_only() {
        let server = MockServer::start().await;
        let (repos, sync) = service(&server).await;
        let good = plant("good", 57.7);
        let mut bad = plant("bad", 57.7);
        bad.panel_tilt_deg = 120.0;
        repos.plants().insert(&good).await.unwrap();
        repos.plants().insert(&bad).await.unwrap();

        let day: NaiveDate = "2026-08-26".parse().unwrap();
        let report = sync.compute_all_performance(day).await.unwrap();
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);

        assert!(repos.performance().find(good.id, day).await.unwrap().is_some());
        assert!(repos.performance().find(bad.id, day).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rerunning_performance_overwrites_instead_of_duplicating() {
        let server = MockServer::start().await;
        let (repos, sync) = service(&server).await;
        let p = plant("roof", 57.7);
        repos.plants().insert(&p).await.unwrap();

        let day: NaiveDate = "2026-08-26".parse().unwrap();
        sync.compute_all_performance(day).await.unwrap();
        sync.compute_all_performance(day).await.unwrap();

        assert_eq!(repos.performance().recent(p.id, 30).await.unwrap().len(), 1);
    }
}
