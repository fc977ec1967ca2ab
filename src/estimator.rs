//! Expected daily energy output from stored irradiance forecasts.
//!
//! The model is a simplified tilt/orientation-weighted combination of the
//! direct, diffuse and ground-reflected irradiance components. It is not a
//! rigorous solar-geometry model: the direct term uses |sin(tilt)|·cos(azimuth)
//! rather than a true angle-of-incidence projection, which makes the result
//! negative for panels facing away from north. Per-point contributions are
//! summed as-is, so the energy figure scales with point count rather than
//! being a true time integral. Existing consumers depend on these exact
//! semantics.

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{ForecastPoint, Plant};

/// Assumed conversion efficiency of the panels.
pub const PANEL_EFFICIENCY: f64 = 0.15;

/// Ground reflectance used for the reflected-irradiance term.
pub const GROUND_ALBEDO: f64 = 0.2;

/// Instantaneous plane-of-array irradiance contribution of one forecast
/// point, in the same W/m² units as the inputs.
pub fn plane_of_array(plant: &Plant, point: &ForecastPoint) -> f64 {
    let tilt = plant.panel_tilt_deg.to_radians();
    let azimuth = plant.panel_azimuth_deg.to_radians();

    point.dni * tilt.sin().abs() * azimuth.cos()
        + point.dhi * (1.0 + tilt.cos()) / 2.0
        + point.ghi * GROUND_ALBEDO * (1.0 - tilt.cos()) / 2.0
}

/// Expected energy output (kWh) for one day's worth of forecast points.
/// An empty window is an empty sum, not an error.
pub fn daily_energy_kwh(plant: &Plant, points: &[ForecastPoint]) -> f64 {
    points
        .iter()
        .map(|p| plane_of_array(plant, p))
        .sum::<f64>()
        * plant.area_m2
        * PANEL_EFFICIENCY
        / 1000.0
}

/// The half-open UTC window `[day 00:00, day+1 00:00)`. Timestamps are
/// stored in UTC, so the estimation window uses the same reference.
pub fn day_window(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_hms_opt(0, 0, 0).expect("midnight exists").and_utc();
    (start, start + chrono::Duration::days(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn plant(tilt: f64, azimuth: f64, area: f64) -> Plant {
        Plant {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "test".to_string(),
            latitude: 57.7,
            longitude: 11.97,
            capacity_kw: 10.0,
            area_m2: area,
            panel_tilt_deg: tilt,
            panel_azimuth_deg: azimuth,
        }
    }

    fn point(ghi: f64, dni: f64, dhi: f64) -> ForecastPoint {
        ForecastPoint {
            plant_id: Uuid::new_v4(),
            timestamp: "2026-08-26T12:00:00Z".parse().unwrap(),
            ghi,
            dni,
            dhi,
            air_temp: 20.0,
            cloud_opacity: 0.1,
        }
    }

    #[test]
    fn empty_window_yields_exactly_zero() {
        assert_eq!(daily_energy_kwh(&plant(30.0, 180.0, 10.0), &[]), 0.0);
    }

    #[test]
    fn south_facing_reference_scenario() {
        // tilt 30°, azimuth 180°, area 10 m², one point GHI 500 / DNI 600 / DHI 100:
        //   600·|sin 30°|·cos 180° + 100·(1+cos 30°)/2 + 500·0.2·(1−cos 30°)/2 = −200
        //   −200 · 10 · 0.15 / 1000 = −0.3 kWh
        let p = plant(30.0, 180.0, 10.0);
        let contribution = plane_of_array(&p, &point(500.0, 600.0, 100.0));
        assert!((contribution - (-200.0)).abs() < 1e-9);

        let energy = daily_energy_kwh(&p, &[point(500.0, 600.0, 100.0)]);
        assert!((energy - (-0.3)).abs() < 1e-9);
    }

    #[test]
    fn north_facing_output_is_non_negative() {
        // azimuth 0 keeps cos(azimuth) = 1, so all three terms are
        // non-negative for non-negative irradiance.
        let p = plant(45.0, 0.0, 25.0);
        let energy = daily_energy_kwh(
            &p,
            &[point(500.0, 600.0, 100.0), point(0.0, 0.0, 0.0), point(300.0, 0.0, 80.0)],
        );
        assert!(energy >= 0.0);
    }

    #[test]
    fn flat_panel_sees_only_diffuse() {
        // tilt 0: sin = 0 and (1−cos)/2 = 0, leaving the diffuse term alone.
        let p = plant(0.0, 180.0, 10.0);
        let contribution = plane_of_array(&p, &point(500.0, 600.0, 100.0));
        assert!((contribution - 100.0).abs() < 1e-9);
    }

    #[test]
    fn energy_scales_with_point_count() {
        let p = plant(30.0, 0.0, 10.0);
        let one = daily_energy_kwh(&p, &[point(500.0, 600.0, 100.0)]);
        let two = daily_energy_kwh(
            &p,
            &[point(500.0, 600.0, 100.0), point(500.0, 600.0, 100.0)],
        );
        assert!((two - 2.0 * one).abs() < 1e-9);
    }

    #[test]
    fn day_window_is_midnight_to_midnight_utc() {
        let (start, end) = day_window("2026-08-26".parse().unwrap());
        assert_eq!(start, "2026-08-26T00:00:00Z".parse::<DateTime<Utc>>().unwrap());
        assert_eq!(end, "2026-08-27T00:00:00Z".parse::<DateTime<Utc>>().unwrap());
    }
}
