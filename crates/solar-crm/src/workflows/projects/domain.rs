use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Installation milestones, in the order a standard project reaches them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneKey {
    Close,
    SiteSurvey,
    Engineering,
    HoaSubmitted,
    HoaApproved,
    PermitSubmitted,
    PermitApproved,
    MaterialsOrdered,
    MaterialsReceived,
    InstallScheduled,
    InstallComplete,
    InspectionPassed,
    UtilityApplied,
    MeterInstalled,
    PtoGranted,
}

impl MilestoneKey {
    pub const fn ordered() -> [Self; 15] {
        [
            Self::Close,
            Self::SiteSurvey,
            Self::Engineering,
            Self::HoaSubmitted,
            Self::HoaApproved,
            Self::PermitSubmitted,
            Self::PermitApproved,
            Self::MaterialsOrdered,
            Self::MaterialsReceived,
            Self::InstallScheduled,
            Self::InstallComplete,
            Self::InspectionPassed,
            Self::UtilityApplied,
            Self::MeterInstalled,
            Self::PtoGranted,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Close => "close",
            Self::SiteSurvey => "site_survey",
            Self::Engineering => "engineering",
            Self::HoaSubmitted => "hoa_submitted",
            Self::HoaApproved => "hoa_approved",
            Self::PermitSubmitted => "permit_submitted",
            Self::PermitApproved => "permit_approved",
            Self::MaterialsOrdered => "materials_ordered",
            Self::MaterialsReceived => "materials_received",
            Self::InstallScheduled => "install_scheduled",
            Self::InstallComplete => "install_complete",
            Self::InspectionPassed => "inspection_passed",
            Self::UtilityApplied => "utility_applied",
            Self::MeterInstalled => "meter_installed",
            Self::PtoGranted => "pto_granted",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Close => "Deal Closed",
            Self::SiteSurvey => "Site Survey Completed",
            Self::Engineering => "Engineering Design Finalized",
            Self::HoaSubmitted => "HOA Application Submitted",
            Self::HoaApproved => "HOA Approval Received",
            Self::PermitSubmitted => "Permit Application Submitted",
            Self::PermitApproved => "Permit Approved",
            Self::MaterialsOrdered => "Materials Ordered",
            Self::MaterialsReceived => "Materials Received",
            Self::InstallScheduled => "Installation Scheduled",
            Self::InstallComplete => "Installation Complete",
            Self::InspectionPassed => "Final Inspection Passed",
            Self::UtilityApplied => "Utility Interconnection Applied",
            Self::MeterInstalled => "Utility Meter Installed",
            Self::PtoGranted => "PTO Received - System Live!",
        }
    }

    /// Suffix of the `COMMISSION_PCT_*` setting for this milestone.
    pub fn config_suffix(self) -> String {
        self.as_str().to_ascii_uppercase()
    }
}

impl fmt::Display for MilestoneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MilestoneKey {
    type Err = UnknownMilestoneKey;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        Self::ordered()
            .into_iter()
            .find(|key| key.as_str() == normalized)
            .ok_or_else(|| UnknownMilestoneKey(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMilestoneKey(pub String);

impl fmt::Display for UnknownMilestoneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown milestone key {}", self.0)
    }
}

impl std::error::Error for UnknownMilestoneKey {}

/// Template entry describing one milestone of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneDefinition {
    pub key: MilestoneKey,
    pub label: String,
    /// Lower orders must be completed first.
    pub sequence_order: u32,
    pub commission_unlock_key: Option<MilestoneKey>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    Pending,
    Completed,
}

impl MilestoneStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

/// Completion state of one milestone on a live project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneRecord {
    pub key: MilestoneKey,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_by: Option<String>,
}

impl MilestoneRecord {
    pub fn pending(key: MilestoneKey) -> Self {
        Self {
            key,
            completed_at: None,
            completed_by: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn status(&self) -> MilestoneStatus {
        if self.is_completed() {
            MilestoneStatus::Completed
        } else {
            MilestoneStatus::Pending
        }
    }
}
