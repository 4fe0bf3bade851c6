use super::domain::RoofMeasurement;
use crate::workflows::ids::LeadId;
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::Path;

/// One row of an irradiance lookup export: the lead and its roof reading.
#[derive(Debug, Clone, PartialEq)]
pub struct RoofSurvey {
    pub lead_id: LeadId,
    pub measurement: RoofMeasurement,
}

#[derive(Debug)]
pub enum RoofSurveyImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingLeadId { row: usize },
}

impl std::fmt::Display for RoofSurveyImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoofSurveyImportError::Io(err) => {
                write!(f, "failed to read roof survey export: {}", err)
            }
            RoofSurveyImportError::Csv(err) => write!(f, "invalid roof survey CSV data: {}", err),
            RoofSurveyImportError::MissingLeadId { row } => {
                write!(f, "roof survey row {} has no lead id", row)
            }
        }
    }
}

impl std::error::Error for RoofSurveyImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RoofSurveyImportError::Io(err) => Some(err),
            RoofSurveyImportError::Csv(err) => Some(err),
            RoofSurveyImportError::MissingLeadId { .. } => None,
        }
    }
}

impl From<std::io::Error> for RoofSurveyImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RoofSurveyImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Reads batches of roof measurements exported from the irradiance lookup.
///
/// Expected headers: `lead_id,roof_area_m2,irradiance_kwh_m2,shading_percent`.
/// Blank numeric cells read as zero so the row still scores.
pub struct RoofMeasurementImporter;

impl RoofMeasurementImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<RoofSurvey>, RoofSurveyImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<RoofSurvey>, RoofSurveyImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut surveys = Vec::new();

        for (index, record) in csv_reader.deserialize::<RoofSurveyRow>().enumerate() {
            let row = record?;
            let lead_id = row.lead_id.trim();
            if lead_id.is_empty() {
                return Err(RoofSurveyImportError::MissingLeadId { row: index + 1 });
            }

            surveys.push(RoofSurvey {
                lead_id: LeadId(lead_id.to_string()),
                measurement: RoofMeasurement::new(
                    row.roof_area_m2,
                    row.irradiance_kwh_m2,
                    row.shading_percent,
                ),
            });
        }

        Ok(surveys)
    }
}

#[derive(Debug, Deserialize)]
struct RoofSurveyRow {
    #[serde(alias = "\u{feff}lead_id")]
    lead_id: String,
    #[serde(default, deserialize_with = "blank_as_zero")]
    roof_area_m2: f64,
    #[serde(default, deserialize_with = "blank_as_zero")]
    irradiance_kwh_m2: f64,
    #[serde(default, deserialize_with = "blank_as_zero")]
    shading_percent: f64,
}

fn blank_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(0.0),
        Some(value) => value.parse::<f64>().map_err(serde::de::Error::custom),
    }
}
