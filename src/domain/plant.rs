use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered solar installation. Created by the plant-management layer;
/// the sync pipeline only ever reads these.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Plant {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Rated capacity (kW)
    pub capacity_kw: f64,
    /// Total panel surface (m²)
    pub area_m2: f64,
    /// Panel inclination from horizontal (degrees)
    pub panel_tilt_deg: f64,
    /// Panel facing direction, degrees from north
    pub panel_azimuth_deg: f64,
}

impl Plant {
    /// Check that the stored geometry is physically meaningful before it is
    /// fed into the output model.
    pub fn validate(&self) -> Result<(), String> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(format!("latitude {} out of [-90, 90]", self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(format!("longitude {} out of [-180, 180]", self.longitude));
        }
        if !(0.0..=90.0).contains(&self.panel_tilt_deg) {
            return Err(format!("panel tilt {} out of [0, 90]", self.panel_tilt_deg));
        }
        if !(0.0..360.0).contains(&self.panel_azimuth_deg) {
            return Err(format!(
                "panel azimuth {} out of [0, 360)",
                self.panel_azimuth_deg
            ));
        }
        if self.area_m2 <= 0.0 {
            return Err(format!("panel area {} must be positive", self.area_m2));
        }
        Ok(())
    }
}
