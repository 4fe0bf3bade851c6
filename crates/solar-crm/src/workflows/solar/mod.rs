pub mod domain;
mod import;
mod production;
mod scoring;

pub use domain::{
    LeadQualification, LeadStatus, QualificationView, RoofMeasurement, RoofQualification,
    ViabilityReason,
};
pub use import::{RoofMeasurementImporter, RoofSurvey, RoofSurveyImportError};
pub use production::estimate_annual_production_kwh;
pub use scoring::{
    compute_solar_score, qualify_lead_roof, MAXIMUM_SHADING_PERCENT, MINIMUM_ROOF_AREA_M2,
    MINIMUM_VIABLE_SCORE,
};
