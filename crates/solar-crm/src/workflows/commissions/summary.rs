use serde::Serialize;

use super::unlock::{CommissionStatus, CommissionUnlock};
use crate::workflows::ids::AgentId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentCommissionSummary {
    pub agent_id: AgentId,
    pub pending: f64,
    pub confirmed: f64,
    pub paid: f64,
    pub total_lifetime: f64,
}

/// Totals an agent's unlocks by status. Records for other agents are ignored.
pub fn summarize(agent_id: &AgentId, records: &[CommissionUnlock]) -> AgentCommissionSummary {
    let mut summary = AgentCommissionSummary {
        agent_id: agent_id.clone(),
        pending: 0.0,
        confirmed: 0.0,
        paid: 0.0,
        total_lifetime: 0.0,
    };

    for record in records.iter().filter(|record| &record.agent_id == agent_id) {
        match record.status {
            CommissionStatus::Pending => summary.pending += record.amount,
            CommissionStatus::Confirmed => summary.confirmed += record.amount,
            CommissionStatus::Paid => summary.paid += record.amount,
        }
    }
    summary.total_lifetime = summary.pending + summary.confirmed + summary.paid;

    summary
}
