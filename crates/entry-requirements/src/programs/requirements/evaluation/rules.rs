use super::super::domain::{CandidateProfile, RequirementRecord};
use super::super::resolver::RequirementGroup;
use super::GroupAssessment;

/// A candidate meets a requirement with the same subject held at the required level or
/// above and a grade at least the minimum. A missing subject simply fails.
pub(crate) fn requirement_met(record: &RequirementRecord, profile: &CandidateProfile) -> bool {
    profile
        .result_for(&record.subject_id)
        .map(|result| {
            result.level.satisfies(record.required_level) && result.grade >= record.min_grade
        })
        .unwrap_or(false)
}

pub(crate) fn assess_groups(
    groups: &[RequirementGroup<'_, RequirementRecord>],
    profile: &CandidateProfile,
) -> Vec<GroupAssessment> {
    groups
        .iter()
        .map(|group| {
            let members = group.members();
            let satisfied_by = members
                .iter()
                .find(|member| requirement_met(member, profile))
                .map(|member| member.id.clone());
            let description = members
                .iter()
                .map(|member| member.label())
                .collect::<Vec<_>>()
                .join(" or ");

            GroupAssessment {
                group: group.key(),
                critical: group.is_critical(),
                satisfied_by,
                description,
            }
        })
        .collect()
}
