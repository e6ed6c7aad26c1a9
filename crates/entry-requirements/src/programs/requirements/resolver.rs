use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{OrGroupId, RequirementId, RequirementRecord};

/// Anything the resolver can group: persisted records and authoring drafts alike.
pub trait GroupMember {
    fn requirement_id(&self) -> &RequirementId;
    fn or_group(&self) -> Option<&OrGroupId>;
    fn critical(&self) -> bool;
}

impl GroupMember for RequirementRecord {
    fn requirement_id(&self) -> &RequirementId {
        &self.id
    }

    fn or_group(&self) -> Option<&OrGroupId> {
        self.or_group_id.as_ref()
    }

    fn critical(&self) -> bool {
        self.is_critical
    }
}

/// Stable handle for a resolved group, used when reporting verdicts.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum GroupKey {
    Requirement(RequirementId),
    OrGroup(OrGroupId),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Requirement(id) => write!(f, "requirement:{id}"),
            GroupKey::OrGroup(id) => write!(f, "or_group:{id}"),
        }
    }
}

/// Logical requirement reconstructed from the flat list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequirementGroup<'a, T> {
    Standalone {
        requirement: &'a T,
    },
    Alternatives {
        group_id: &'a OrGroupId,
        members: Vec<&'a T>,
    },
}

impl<'a, T: GroupMember> RequirementGroup<'a, T> {
    pub fn key(&self) -> GroupKey {
        match self {
            RequirementGroup::Standalone { requirement } => {
                GroupKey::Requirement(requirement.requirement_id().clone())
            }
            RequirementGroup::Alternatives { group_id, .. } => {
                GroupKey::OrGroup((*group_id).clone())
            }
        }
    }

    /// A group is critical as soon as any member is.
    pub fn is_critical(&self) -> bool {
        self.members().iter().any(|member| member.critical())
    }

    pub fn members(&self) -> Vec<&'a T> {
        match self {
            RequirementGroup::Standalone { requirement } => vec![*requirement],
            RequirementGroup::Alternatives { members, .. } => members.clone(),
        }
    }
}

/// Rebuild logical groups from a flat requirement list.
///
/// Groups come out in first-appearance order; members of one group need not be
/// contiguous in the input. A group tag carried by a single record is reported
/// and the record is treated as stand-alone.
pub fn resolve_groups<T: GroupMember>(records: &[T]) -> Vec<RequirementGroup<'_, T>> {
    let mut slots: Vec<(Option<&OrGroupId>, Vec<&T>)> = Vec::new();
    let mut positions: HashMap<&OrGroupId, usize> = HashMap::new();

    for record in records {
        match record.or_group() {
            None => slots.push((None, vec![record])),
            Some(group_id) => match positions.get(group_id) {
                Some(&index) => slots[index].1.push(record),
                None => {
                    positions.insert(group_id, slots.len());
                    slots.push((Some(group_id), vec![record]));
                }
            },
        }
    }

    slots
        .into_iter()
        .map(|(group_id, members)| match group_id {
            Some(group_id) if members.len() > 1 => {
                RequirementGroup::Alternatives { group_id, members }
            }
            Some(group_id) => {
                let requirement = members[0];
                warn!(
                    or_group = %group_id,
                    requirement = %requirement.requirement_id(),
                    "or-group has a single member; treating it as a stand-alone requirement"
                );
                RequirementGroup::Standalone { requirement }
            }
            None => RequirementGroup::Standalone {
                requirement: members[0],
            },
        })
        .collect()
}
