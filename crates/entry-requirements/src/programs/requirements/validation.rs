use std::collections::{BTreeMap, HashSet};

use super::domain::{
    CandidateProfile, OrGroupId, ProgramRequirementSet, RequirementId, MAX_IB_POINTS,
};

/// Input errors rejected before data reaches the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("grade {0} is outside the IB 1-7 scale")]
    GradeOutOfRange(u8),
    #[error("{field} must be between 0 and 45 (found {value})")]
    PointsOutOfRange { field: &'static str, value: u8 },
    #[error("requirement {0} appears more than once")]
    DuplicateRequirement(RequirementId),
    #[error("requirement {0} has no subject selected")]
    MissingSubject(RequirementId),
    #[error("or-group {0} has a single member")]
    SingletonGroup(OrGroupId),
    #[error("unknown subject level '{0}' (expected SL or HL)")]
    UnknownLevel(String),
}

/// Structural checks for a requirement set about to be stored.
///
/// Stricter than the resolver: a size-1 group is tolerated when read back but
/// never accepted on write.
pub fn validate_requirement_set(set: &ProgramRequirementSet) -> Result<(), ValidationError> {
    check_points("min_ib_points", set.min_ib_points)?;

    let mut seen = HashSet::new();
    let mut group_sizes: BTreeMap<&OrGroupId, usize> = BTreeMap::new();
    for record in &set.requirements {
        if !seen.insert(&record.id) {
            return Err(ValidationError::DuplicateRequirement(record.id.clone()));
        }
        if let Some(group_id) = &record.or_group_id {
            *group_sizes.entry(group_id).or_default() += 1;
        }
    }

    if let Some((group_id, _)) = group_sizes.into_iter().find(|(_, size)| *size == 1) {
        return Err(ValidationError::SingletonGroup(group_id.clone()));
    }

    Ok(())
}

pub fn validate_profile(profile: &CandidateProfile) -> Result<(), ValidationError> {
    check_points("total_points", profile.total_points)
}

fn check_points(field: &'static str, value: u8) -> Result<(), ValidationError> {
    if value > MAX_IB_POINTS {
        return Err(ValidationError::PointsOutOfRange { field, value });
    }
    Ok(())
}
