use super::domain::{MilestoneDefinition, MilestoneKey, MilestoneRecord};

#[derive(Debug, Clone)]
pub struct ProjectBlueprint {
    definitions: Vec<MilestoneDefinition>,
}

impl ProjectBlueprint {
    /// Deal Closed followed by the fourteen installation milestones, each
    /// unlocking its own commission tranche.
    pub fn standard() -> Self {
        let definitions = MilestoneKey::ordered()
            .into_iter()
            .zip(1..)
            .map(|(key, sequence_order)| MilestoneDefinition {
                key,
                label: key.label().to_string(),
                sequence_order,
                commission_unlock_key: Some(key),
            })
            .collect();

        Self { definitions }
    }

    pub fn from_definitions(mut definitions: Vec<MilestoneDefinition>) -> Self {
        definitions.sort_by_key(|definition| definition.sequence_order);
        Self { definitions }
    }

    pub fn definitions(&self) -> &[MilestoneDefinition] {
        &self.definitions
    }

    pub fn definition(&self, key: MilestoneKey) -> Option<&MilestoneDefinition> {
        self.definitions
            .iter()
            .find(|definition| definition.key == key)
    }

    pub fn initial_records(&self) -> Vec<MilestoneRecord> {
        self.definitions
            .iter()
            .map(|definition| MilestoneRecord::pending(definition.key))
            .collect()
    }
}

impl Default for ProjectBlueprint {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_template_starts_with_the_closed_deal() {
        let blueprint = ProjectBlueprint::standard();
        let definitions = blueprint.definitions();

        assert_eq!(definitions.len(), 15);
        assert_eq!(definitions[0].label, "Deal Closed");
        assert_eq!(definitions[0].sequence_order, 1);
        assert_eq!(definitions[14].key, MilestoneKey::PtoGranted);
        assert_eq!(definitions[14].label, "PTO Received - System Live!");
    }

    #[test]
    fn every_milestone_unlocks_its_own_tranche() {
        for definition in ProjectBlueprint::standard().definitions() {
            assert_eq!(definition.commission_unlock_key, Some(definition.key));
        }
    }

    #[test]
    fn custom_definitions_are_ordered_by_sequence() {
        let blueprint = ProjectBlueprint::from_definitions(vec![
            MilestoneDefinition {
                key: MilestoneKey::PermitApproved,
                label: "Permit".to_string(),
                sequence_order: 3,
                commission_unlock_key: None,
            },
            MilestoneDefinition {
                key: MilestoneKey::Close,
                label: "Deal Closed".to_string(),
                sequence_order: 1,
                commission_unlock_key: None,
            },
        ]);

        let keys: Vec<_> = blueprint.definitions().iter().map(|d| d.key).collect();
        assert_eq!(keys, vec![MilestoneKey::Close, MilestoneKey::PermitApproved]);
        assert!(blueprint.definition(MilestoneKey::SiteSurvey).is_none());
        assert_eq!(blueprint.initial_records().len(), 2);
    }
}
