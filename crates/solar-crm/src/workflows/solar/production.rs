use super::domain::RoofMeasurement;
use crate::workflows::assumptions::ModelAssumptions;

/// Expected annual energy yield in whole kWh.
///
/// Shading is clamped to `[0, 100]` before it becomes a multiplier, so a
/// fully shaded roof produces nothing and the estimate is never negative.
pub fn estimate_annual_production_kwh(
    measurement: &RoofMeasurement,
    assumptions: &ModelAssumptions,
) -> f64 {
    let measurement = measurement.sanitized();
    let shading = measurement.shading_percent.clamp(0.0, 100.0);
    let shading_multiplier = (1.0 - shading / 100.0).max(0.0);
    let production_factor =
        measurement.irradiance_kwh_per_square_meter_year.max(0.0) * assumptions.module_efficiency;

    let kwh =
        (measurement.roof_area_square_meters * production_factor * shading_multiplier).round();
    if kwh > 0.0 {
        kwh
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimate(area: f64, irradiance: f64, shading: f64) -> f64 {
        estimate_annual_production_kwh(
            &RoofMeasurement::new(area, irradiance, shading),
            &ModelAssumptions::default(),
        )
    }

    #[test]
    fn applies_module_efficiency_and_shading() {
        // 50 m² × (1500 × 0.18) × 0.85
        assert_eq!(estimate(50.0, 1500.0, 15.0), 11475.0);
    }

    #[test]
    fn full_or_excess_shading_yields_zero() {
        assert_eq!(estimate(80.0, 1800.0, 100.0), 0.0);
        assert_eq!(estimate(80.0, 1800.0, 140.0), 0.0);
    }

    #[test]
    fn negative_inputs_never_produce_negative_energy() {
        assert_eq!(estimate(-30.0, 1500.0, 10.0), 0.0);
        assert_eq!(estimate(30.0, -1500.0, 10.0), 0.0);
        assert_eq!(estimate(f64::NAN, 1500.0, 10.0), 0.0);
    }

    #[test]
    fn efficiency_is_taken_from_assumptions() {
        let assumptions = ModelAssumptions {
            module_efficiency: 0.20,
            ..ModelAssumptions::default()
        };
        let kwh = estimate_annual_production_kwh(
            &RoofMeasurement::new(10.0, 1000.0, 0.0),
            &assumptions,
        );
        assert_eq!(kwh, 2000.0);
    }
}
