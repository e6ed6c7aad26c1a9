//! Authoring-time edits over a program's requirement list.
//!
//! Every edit takes the current collection by reference and returns the next one, so a
//! collection at rest never carries an OR-group with exactly one member.

mod session;

pub use session::AuthoringSession;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::{
    Grade, OrGroupId, ProgramRequirementSet, RequirementId, RequirementRecord, SubjectId,
    SubjectLevel,
};
use super::resolver::{resolve_groups, GroupMember, RequirementGroup};
use super::validation::{validate_requirement_set, ValidationError};

const DEFAULT_AUTHORING_GRADE: u8 = 4;

/// Level and grade given to requirements the editor has not filled in yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthoringDefaults {
    pub level: SubjectLevel,
    pub min_grade: Grade,
}

impl Default for AuthoringDefaults {
    fn default() -> Self {
        Self {
            level: SubjectLevel::Standard,
            min_grade: Grade::clamped(DEFAULT_AUTHORING_GRADE),
        }
    }
}

/// In-progress requirement; the subject stays empty until the editor picks one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementDraft {
    pub id: RequirementId,
    pub subject_id: Option<SubjectId>,
    pub required_level: SubjectLevel,
    pub min_grade: Grade,
    pub is_critical: bool,
    pub or_group_id: Option<OrGroupId>,
}

impl GroupMember for RequirementDraft {
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

impl From<RequirementRecord> for RequirementDraft {
    fn from(record: RequirementRecord) -> Self {
        Self {
            id: record.id,
            subject_id: Some(record.subject_id),
            required_level: record.required_level,
            min_grade: record.min_grade,
            is_critical: record.is_critical,
            or_group_id: record.or_group_id,
        }
    }
}

/// Caller-supplied fields for a new stand-alone requirement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRequirement {
    #[serde(default)]
    pub subject_id: Option<SubjectId>,
    #[serde(default)]
    pub required_level: Option<SubjectLevel>,
    #[serde(default)]
    pub min_grade: Option<Grade>,
    #[serde(default)]
    pub is_critical: bool,
}

/// Partial update applied to one requirement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementPatch {
    #[serde(default)]
    pub subject_id: Option<SubjectId>,
    #[serde(default)]
    pub required_level: Option<SubjectLevel>,
    #[serde(default)]
    pub min_grade: Option<Grade>,
    #[serde(default)]
    pub is_critical: Option<bool>,
}

/// Ordered arena of drafts keyed by requirement id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementCollection {
    drafts: Vec<RequirementDraft>,
    defaults: AuthoringDefaults,
    sequence: u64,
}

impl RequirementCollection {
    pub fn new(defaults: AuthoringDefaults) -> Self {
        Self {
            drafts: Vec::new(),
            defaults,
            sequence: 0,
        }
    }

    /// Load persisted rows for editing, demoting members of any size-1 group.
    pub fn from_records<I>(records: I, defaults: AuthoringDefaults) -> Self
    where
        I: IntoIterator<Item = RequirementRecord>,
    {
        let mut collection = Self {
            drafts: records.into_iter().map(RequirementDraft::from).collect(),
            defaults,
            sequence: 0,
        };

        let singletons: Vec<OrGroupId> = collection
            .group_sizes()
            .into_iter()
            .filter(|(_, size)| *size == 1)
            .map(|(group_id, _)| group_id)
            .collect();
        for group_id in singletons {
            warn!(or_group = %group_id, "repairing single-member or-group on load");
            collection.dissolve_if_singleton(&group_id);
        }

        collection
    }

    pub fn drafts(&self) -> &[RequirementDraft] {
        &self.drafts
    }

    pub fn defaults(&self) -> AuthoringDefaults {
        self.defaults
    }

    pub fn get(&self, id: &RequirementId) -> Option<&RequirementDraft> {
        self.drafts.iter().find(|draft| &draft.id == id)
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    /// Grouped view for rendering; derived on every call, never cached.
    pub fn groups(&self) -> Vec<RequirementGroup<'_, RequirementDraft>> {
        resolve_groups(&self.drafts)
    }

    /// Every OR-group tag labels either zero or at least two drafts.
    pub fn is_consistent(&self) -> bool {
        self.group_sizes().values().all(|size| *size >= 2)
    }

    pub fn add_requirement(&self, new: NewRequirement) -> (Self, RequirementId) {
        let mut next = self.clone();
        let id = next.mint_requirement_id();
        next.drafts.push(RequirementDraft {
            id: id.clone(),
            subject_id: new.subject_id,
            required_level: new.required_level.unwrap_or(self.defaults.level),
            min_grade: new.min_grade.unwrap_or(self.defaults.min_grade),
            is_critical: new.is_critical,
            or_group_id: None,
        });
        debug!(requirement = %id, "added stand-alone requirement");
        (next, id)
    }

    /// Append an alternative to `existing`, forming a group first if it is stand-alone.
    ///
    /// Returns the id of the new alternative, or `None` when `existing` is unknown.
    pub fn add_alternative(&self, existing: &RequirementId) -> (Self, Option<RequirementId>) {
        let Some(position) = self.position(existing) else {
            return (self.clone(), None);
        };

        let mut next = self.clone();
        let group_id = match next.drafts[position].or_group_id.clone() {
            Some(group_id) => group_id,
            None => {
                let group_id = next.mint_group_id();
                next.drafts[position].or_group_id = Some(group_id.clone());
                group_id
            }
        };

        let is_critical = next.drafts[position].is_critical;
        let id = next.mint_requirement_id();
        next.drafts.push(RequirementDraft {
            id: id.clone(),
            subject_id: None,
            required_level: self.defaults.level,
            min_grade: self.defaults.min_grade,
            is_critical,
            or_group_id: Some(group_id.clone()),
        });
        debug!(requirement = %id, or_group = %group_id, "added alternative");
        (next, Some(id))
    }

    /// Demote one draft to stand-alone; a group left with one member dissolves.
    pub fn remove_from_group(&self, id: &RequirementId) -> Self {
        let Some(position) = self.position(id) else {
            return self.clone();
        };
        let Some(group_id) = self.drafts[position].or_group_id.clone() else {
            return self.clone();
        };

        let mut next = self.clone();
        next.drafts[position].or_group_id = None;
        next.dissolve_if_singleton(&group_id);
        next
    }

    /// Remove a draft outright; a group left with one member dissolves.
    pub fn delete_requirement(&self, id: &RequirementId) -> Self {
        let Some(position) = self.position(id) else {
            return self.clone();
        };

        let mut next = self.clone();
        let removed = next.drafts.remove(position);
        if let Some(group_id) = &removed.or_group_id {
            next.dissolve_if_singleton(group_id);
        }
        debug!(requirement = %id, "deleted requirement");
        next
    }

    /// Fill in or change a draft. Criticality is kept uniform across an OR-group.
    pub fn update_requirement(&self, id: &RequirementId, patch: RequirementPatch) -> Self {
        let Some(position) = self.position(id) else {
            return self.clone();
        };

        let mut next = self.clone();
        {
            let draft = &mut next.drafts[position];
            if let Some(subject_id) = patch.subject_id {
                draft.subject_id = Some(subject_id);
            }
            if let Some(level) = patch.required_level {
                draft.required_level = level;
            }
            if let Some(grade) = patch.min_grade {
                draft.min_grade = grade;
            }
        }

        if let Some(critical) = patch.is_critical {
            match next.drafts[position].or_group_id.clone() {
                Some(group_id) => next
                    .drafts
                    .iter_mut()
                    .filter(|member| member.or_group_id.as_ref() == Some(&group_id))
                    .for_each(|member| member.is_critical = critical),
                None => next.drafts[position].is_critical = critical,
            }
        }

        next
    }

    /// Normalize drafts into the flat form handed to persistence.
    pub fn to_requirement_set(
        &self,
        min_ib_points: u8,
    ) -> Result<ProgramRequirementSet, ValidationError> {
        let requirements = self
            .drafts
            .iter()
            .map(|draft| {
                let subject_id = draft
                    .subject_id
                    .clone()
                    .ok_or_else(|| ValidationError::MissingSubject(draft.id.clone()))?;
                Ok(RequirementRecord {
                    id: draft.id.clone(),
                    subject_id,
                    required_level: draft.required_level,
                    min_grade: draft.min_grade,
                    is_critical: draft.is_critical,
                    or_group_id: draft.or_group_id.clone(),
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;

        let set = ProgramRequirementSet {
            min_ib_points,
            requirements,
        };
        validate_requirement_set(&set)?;
        Ok(set)
    }

    fn position(&self, id: &RequirementId) -> Option<usize> {
        self.drafts.iter().position(|draft| &draft.id == id)
    }

    fn group_sizes(&self) -> BTreeMap<OrGroupId, usize> {
        let mut sizes = BTreeMap::new();
        for group_id in self.drafts.iter().filter_map(|draft| draft.or_group_id.as_ref()) {
            *sizes.entry(group_id.clone()).or_default() += 1;
        }
        sizes
    }

    fn dissolve_if_singleton(&mut self, group_id: &OrGroupId) {
        let mut members = self
            .drafts
            .iter_mut()
            .filter(|draft| draft.or_group_id.as_ref() == Some(group_id));

        if let (Some(survivor), None) = (members.next(), members.next()) {
            survivor.or_group_id = None;
            debug!(or_group = %group_id, requirement = %survivor.id, "dissolved or-group");
        }
    }

    fn mint_requirement_id(&mut self) -> RequirementId {
        loop {
            self.sequence += 1;
            let candidate = RequirementId(format!("req-{:04}", self.sequence));
            if self.get(&candidate).is_none() {
                return candidate;
            }
        }
    }

    fn mint_group_id(&mut self) -> OrGroupId {
        loop {
            self.sequence += 1;
            let candidate = OrGroupId(format!("or-{:04}", self.sequence));
            if !self
                .drafts
                .iter()
                .any(|draft| draft.or_group_id.as_ref() == Some(&candidate))
            {
                return candidate;
            }
        }
    }
}

impl Default for RequirementCollection {
    fn default() -> Self {
        Self::new(AuthoringDefaults::default())
    }
}
