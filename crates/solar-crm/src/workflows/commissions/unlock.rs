use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::ids::{AgentId, ProjectId};
use crate::workflows::projects::MilestoneKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionStatus {
    Pending,
    Confirmed,
    Paid,
}

impl CommissionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Paid => "paid",
        }
    }
}

/// Commission tranche released to an agent by a completed milestone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionUnlock {
    pub project_id: ProjectId,
    pub agent_id: AgentId,
    pub milestone_key: MilestoneKey,
    /// Whole currency units.
    pub amount: f64,
    pub status: CommissionStatus,
    pub unlocked_at: DateTime<Utc>,
}

/// `round(gross × percent)`, with the percent held to `[0, 1]` and a
/// non-negative gross value.
pub fn commission_amount(project_gross_value: f64, milestone_percent: f64) -> f64 {
    let gross = if project_gross_value.is_finite() {
        project_gross_value.max(0.0)
    } else {
        0.0
    };
    let percent = if milestone_percent.is_finite() {
        milestone_percent.clamp(0.0, 1.0)
    } else {
        0.0
    };
    (gross * percent).round()
}

/// Creates a pending unlock; the percent always comes from the caller.
pub fn create_commission_unlock(
    project_id: ProjectId,
    agent_id: AgentId,
    milestone_key: MilestoneKey,
    project_gross_value: f64,
    milestone_percent: f64,
    unlocked_at: DateTime<Utc>,
) -> CommissionUnlock {
    CommissionUnlock {
        project_id,
        agent_id,
        milestone_key,
        amount: commission_amount(project_gross_value, milestone_percent),
        status: CommissionStatus::Pending,
        unlocked_at,
    }
}
