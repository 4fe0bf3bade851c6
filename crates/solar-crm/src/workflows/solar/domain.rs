use crate::workflows::ids::LeadId;
use serde::{Deserialize, Serialize};

/// Raw satellite/irradiance lookup for a single roof.
///
/// Irradiance follows the lookup vendor's convention (annual sunshine-hour
/// equivalent); callers must keep that convention consistent across leads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoofMeasurement {
    #[serde(alias = "roof_area_m2")]
    pub roof_area_square_meters: f64,
    #[serde(alias = "irradiance_kwh_m2")]
    pub irradiance_kwh_per_square_meter_year: f64,
    pub shading_percent: f64,
}

impl RoofMeasurement {
    pub fn new(roof_area_square_meters: f64, irradiance: f64, shading_percent: f64) -> Self {
        Self {
            roof_area_square_meters,
            irradiance_kwh_per_square_meter_year: irradiance,
            shading_percent,
        }
    }

    /// Replaces NaN and infinite readings with zero so scoring stays total.
    pub(crate) fn sanitized(&self) -> Self {
        Self {
            roof_area_square_meters: finite_or_zero(self.roof_area_square_meters),
            irradiance_kwh_per_square_meter_year: finite_or_zero(
                self.irradiance_kwh_per_square_meter_year,
            ),
            shading_percent: finite_or_zero(self.shading_percent),
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Why a roof passed or failed the viability gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViabilityReason {
    InsufficientRoofArea,
    ExcessiveShading,
    ScoreTooLow,
    MeetsCriteria,
}

impl ViabilityReason {
    pub const fn label(self) -> &'static str {
        match self {
            Self::InsufficientRoofArea => "Insufficient roof area (minimum 20 m²)",
            Self::ExcessiveShading => "Excessive shading (maximum 50%)",
            Self::ScoreTooLow => "Solar score too low (minimum 30)",
            Self::MeetsCriteria => "Roof meets all viability criteria",
        }
    }
}

/// Scored outcome derived once from a [`RoofMeasurement`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoofQualification {
    pub solar_score: u8,
    pub shading_score: u8,
    pub roof_viable: bool,
    pub viability_reason: ViabilityReason,
    pub estimated_annual_production_kwh: f64,
}

impl RoofQualification {
    pub fn viability_label(&self) -> &'static str {
        self.viability_reason.label()
    }
}

/// Pipeline status a lead moves to once its roof has been scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    Qualified,
    Disqualified,
}

impl LeadStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Qualified => "qualified",
            Self::Disqualified => "disqualified",
        }
    }
}

/// Qualification attached to the lead it was computed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadQualification {
    pub lead_id: LeadId,
    pub lead_status: LeadStatus,
    pub qualification: RoofQualification,
}

impl LeadQualification {
    pub fn view(&self) -> QualificationView {
        QualificationView {
            lead_id: self.lead_id.clone(),
            lead_status: self.lead_status.label(),
            solar_score: self.qualification.solar_score,
            shading_score: self.qualification.shading_score,
            roof_viable: self.qualification.roof_viable,
            viability_reason: self.qualification.viability_label(),
            estimated_annual_production_kwh: self.qualification.estimated_annual_production_kwh,
        }
    }
}

/// Flattened qualification as returned to API callers.
#[derive(Debug, Clone, Serialize)]
pub struct QualificationView {
    pub lead_id: LeadId,
    pub lead_status: &'static str,
    pub solar_score: u8,
    pub shading_score: u8,
    pub roof_viable: bool,
    pub viability_reason: &'static str,
    pub estimated_annual_production_kwh: f64,
}
