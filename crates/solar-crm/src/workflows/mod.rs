//! Solar sales workflows, from roof qualification through commission payout.
//!
//! Data flows one way: measurements are scored in [`solar`], the resulting
//! production estimate is priced in [`proposals`], and closed deals move
//! through installation milestones in [`projects`], which unlock tranches
//! tracked by [`commissions`].

pub mod assumptions;
pub mod commissions;
pub mod ids;
pub mod projects;
pub mod proposals;
pub mod solar;
pub mod storage;

pub use assumptions::ModelAssumptions;
pub use ids::{AgentId, LeadId, ProjectId};
pub use storage::RepositoryError;
