//! Commission tranches unlocked by installation milestones.

mod ledger;
mod schedule;
mod summary;
mod unlock;

pub use ledger::CommissionLedger;
pub use schedule::{CommissionConfig, CommissionSchedule};
pub use summary::{summarize, AgentCommissionSummary};
pub use unlock::{commission_amount, create_commission_unlock, CommissionStatus, CommissionUnlock};
