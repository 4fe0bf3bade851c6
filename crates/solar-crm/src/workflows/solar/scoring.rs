use super::domain::{
    LeadQualification, LeadStatus, RoofMeasurement, RoofQualification, ViabilityReason,
};
use super::production::estimate_annual_production_kwh;
use crate::workflows::assumptions::ModelAssumptions;
use crate::workflows::ids::LeadId;

pub const MINIMUM_ROOF_AREA_M2: f64 = 20.0;
pub const MINIMUM_VIABLE_SCORE: u8 = 30;
pub const MAXIMUM_SHADING_PERCENT: f64 = 50.0;

const AREA_FOR_FULL_SCORE_M2: f64 = 100.0;
const IRRADIANCE_FOR_FULL_SCORE: f64 = 2000.0;

const AREA_WEIGHT: f64 = 0.4;
const IRRADIANCE_WEIGHT: f64 = 0.4;
const SHADING_WEIGHT: f64 = 0.2;

/// Scores a roof on a 0–100 scale and applies the viability gate.
///
/// Roofs smaller than [`MINIMUM_ROOF_AREA_M2`] are rejected before weighting
/// and always score zero. Out-of-range readings score low instead of failing.
pub fn compute_solar_score(
    measurement: &RoofMeasurement,
    assumptions: &ModelAssumptions,
) -> RoofQualification {
    let measurement = measurement.sanitized();
    let shading_score = shading_score(measurement.shading_percent);
    let estimated_annual_production_kwh = estimate_annual_production_kwh(&measurement, assumptions);

    if measurement.roof_area_square_meters < MINIMUM_ROOF_AREA_M2 {
        return RoofQualification {
            solar_score: 0,
            shading_score,
            roof_viable: false,
            viability_reason: ViabilityReason::InsufficientRoofArea,
            estimated_annual_production_kwh,
        };
    }

    let normalized_area = normalize(measurement.roof_area_square_meters, AREA_FOR_FULL_SCORE_M2);
    let normalized_irradiance = normalize(
        measurement.irradiance_kwh_per_square_meter_year,
        IRRADIANCE_FOR_FULL_SCORE,
    );

    let weighted = normalized_area * AREA_WEIGHT
        + normalized_irradiance * IRRADIANCE_WEIGHT
        + f64::from(shading_score) * SHADING_WEIGHT;
    let solar_score = weighted.round().clamp(0.0, 100.0) as u8;

    let excessive_shading = measurement.shading_percent > MAXIMUM_SHADING_PERCENT;
    let viability_reason = if excessive_shading {
        ViabilityReason::ExcessiveShading
    } else if solar_score < MINIMUM_VIABLE_SCORE {
        ViabilityReason::ScoreTooLow
    } else {
        ViabilityReason::MeetsCriteria
    };

    RoofQualification {
        solar_score,
        shading_score,
        roof_viable: viability_reason == ViabilityReason::MeetsCriteria,
        viability_reason,
        estimated_annual_production_kwh,
    }
}

/// Scores a lead's roof and decides which pipeline status the lead moves to.
pub fn qualify_lead_roof(
    lead_id: LeadId,
    measurement: &RoofMeasurement,
    assumptions: &ModelAssumptions,
) -> LeadQualification {
    let qualification = compute_solar_score(measurement, assumptions);
    let lead_status = if qualification.roof_viable {
        LeadStatus::Qualified
    } else {
        LeadStatus::Disqualified
    };

    LeadQualification {
        lead_id,
        lead_status,
        qualification,
    }
}

fn normalize(value: f64, full_scale: f64) -> f64 {
    (value / full_scale * 100.0).clamp(0.0, 100.0)
}

fn shading_score(shading_percent: f64) -> u8 {
    (100.0 - shading_percent).clamp(0.0, 100.0).round() as u8
}
