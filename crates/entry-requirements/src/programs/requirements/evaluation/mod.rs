mod policy;
mod rules;

pub use policy::EligibilityVerdict;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{CandidateProfile, ProgramRequirementSet, RequirementId};
use super::resolver::{resolve_groups, GroupKey};
use policy::decide_verdict;

/// Stateless pass/fail gate comparing a candidate against a program's requirements.
///
/// Inputs are assumed to be validated by the caller: grades are on the 1-7 scale by
/// construction, and point totals are checked with
/// [`validate_profile`](super::validation::validate_profile) and
/// [`validate_requirement_set`](super::validation::validate_requirement_set) before
/// they get here. Unknown subjects and size-1 groups are not errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct EligibilityEvaluator;

impl EligibilityEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(
        &self,
        program: &ProgramRequirementSet,
        profile: &CandidateProfile,
    ) -> EligibilityVerdict {
        let groups = resolve_groups(&program.requirements);
        let assessments = rules::assess_groups(&groups, profile);
        let verdict = decide_verdict(program.min_ib_points, profile.total_points, assessments);

        debug!(
            eligible = verdict.eligible,
            points_met = verdict.points_met,
            failed_critical = verdict.failed_critical_groups.len(),
            unmet_advisory = verdict.unmet_advisory_groups.len(),
            "evaluated requirement set"
        );

        verdict
    }
}

/// Outcome for one resolved group, kept so verdicts can be audited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupAssessment {
    pub group: GroupKey,
    pub critical: bool,
    /// First member (in list order) the candidate meets, if any.
    pub satisfied_by: Option<RequirementId>,
    pub description: String,
}

impl GroupAssessment {
    pub fn is_satisfied(&self) -> bool {
        self.satisfied_by.is_some()
    }
}
