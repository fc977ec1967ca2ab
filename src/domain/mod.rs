pub mod plant;
pub mod types;

pub use plant::Plant;
pub use types::{ForecastPoint, IrradianceSample, PerformanceRecord, User};
