use super::unlock::CommissionUnlock;
use crate::workflows::ids::{AgentId, ProjectId};
use crate::workflows::projects::MilestoneKey;
use crate::workflows::storage::RepositoryError;

/// Storage for commission unlocks.
///
/// `record_unlock` must report [`RepositoryError::Conflict`] when the project
/// already has an unlock for the same milestone.
pub trait CommissionLedger: Send + Sync {
    fn record_unlock(&self, unlock: CommissionUnlock) -> Result<CommissionUnlock, RepositoryError>;
    fn unlock_for(
        &self,
        project_id: &ProjectId,
        milestone_key: MilestoneKey,
    ) -> Result<Option<CommissionUnlock>, RepositoryError>;
    fn unlocks_for_agent(
        &self,
        agent_id: &AgentId,
    ) -> Result<Vec<CommissionUnlock>, RepositoryError>;
}
