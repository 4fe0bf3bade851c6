//! Installation projects and their milestone state machine.
//!
//! Each milestone moves `pending -> completed` once, and only after every
//! milestone with a lower sequence order. Completing a milestone can release
//! a commission tranche for the agent who closed the deal.

mod blueprint;
mod completion;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use blueprint::ProjectBlueprint;
pub use completion::{
    complete_milestone, project_progress, MilestoneCompletion, MilestoneError, MilestoneOutcome,
    ProjectProgress,
};
pub use domain::{
    MilestoneDefinition, MilestoneKey, MilestoneRecord, MilestoneStatus, UnknownMilestoneKey,
};
pub use repository::{MilestoneView, ProjectRecord, ProjectRepository, ProjectView};
pub use router::project_router;
pub use service::{
    CompleteMilestoneRequest, GrossValueLookup, MilestoneCompletionReport, OpenProjectRequest,
    OpenedProject, ProjectService, ProjectServiceError, SYSTEM_ACTOR,
};
