use serde::{Deserialize, Serialize};

use super::super::resolver::GroupKey;
use super::GroupAssessment;

/// Pass/fail verdict for one candidate against one program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityVerdict {
    pub eligible: bool,
    pub points_met: bool,
    pub min_ib_points: u8,
    pub total_points: u8,
    pub failed_critical_groups: Vec<GroupKey>,
    /// Unmet requirements that are recommended but not required.
    pub unmet_advisory_groups: Vec<GroupKey>,
    pub assessments: Vec<GroupAssessment>,
}

impl EligibilityVerdict {
    pub fn summary(&self) -> String {
        let describe = |keys: &[GroupKey]| {
            self.assessments
                .iter()
                .filter(|assessment| keys.contains(&assessment.group))
                .map(|assessment| assessment.description.clone())
                .collect::<Vec<_>>()
                .join("; ")
        };

        if self.eligible {
            if self.unmet_advisory_groups.is_empty() {
                "eligible".to_string()
            } else {
                format!(
                    "eligible; recommended but not required: {}",
                    describe(&self.unmet_advisory_groups)
                )
            }
        } else {
            let mut reasons = Vec::new();
            if !self.points_met {
                reasons.push(format!(
                    "{} IB points below required {}",
                    self.total_points, self.min_ib_points
                ));
            }
            if !self.failed_critical_groups.is_empty() {
                reasons.push(format!(
                    "missing required: {}",
                    describe(&self.failed_critical_groups)
                ));
            }
            format!("not eligible: {}", reasons.join("; "))
        }
    }
}

pub(crate) fn decide_verdict(
    min_ib_points: u8,
    total_points: u8,
    assessments: Vec<GroupAssessment>,
) -> EligibilityVerdict {
    let points_met = total_points >= min_ib_points;

    let mut failed_critical_groups = Vec::new();
    let mut unmet_advisory_groups = Vec::new();
    for assessment in assessments.iter().filter(|a| !a.is_satisfied()) {
        if assessment.critical {
            failed_critical_groups.push(assessment.group.clone());
        } else {
            unmet_advisory_groups.push(assessment.group.clone());
        }
    }

    EligibilityVerdict {
        eligible: points_met && failed_critical_groups.is_empty(),
        points_met,
        min_ib_points,
        total_points,
        failed_critical_groups,
        unmet_advisory_groups,
        assessments,
    }
}
