use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::workflows::projects::MilestoneKey;

/// Per-milestone payout fractions for one deployment.
///
/// Milestones without an entry pay nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommissionSchedule {
    percents: BTreeMap<MilestoneKey, f64>,
}

impl CommissionSchedule {
    /// Sets the payout for `key` as a fraction, held to `[0, 1]`.
    pub fn with_percent(mut self, key: MilestoneKey, fraction: f64) -> Self {
        self.set_percent(key, fraction);
        self
    }

    pub fn set_percent(&mut self, key: MilestoneKey, fraction: f64) {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.percents.insert(key, fraction);
    }

    pub fn percent_for(&self, key: MilestoneKey) -> f64 {
        self.percents.get(&key).copied().unwrap_or(0.0)
    }

    pub fn entries(&self) -> impl Iterator<Item = (MilestoneKey, f64)> + '_ {
        self.percents.iter().map(|(key, percent)| (*key, *percent))
    }

    pub fn total_percent(&self) -> f64 {
        self.percents.values().sum()
    }
}

/// Commission behaviour switched by deployment configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionConfig {
    pub enabled: bool,
    pub schedule: CommissionSchedule,
}

impl Default for CommissionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            schedule: CommissionSchedule::default(),
        }
    }
}
