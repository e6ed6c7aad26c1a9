use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::validation::ValidationError;

/// Highest total an IB Diploma can award (six subjects plus three bonus points).
pub const MAX_IB_POINTS: u8 = 45;

/// Typical diploma pass floor, used when a program does not state its own threshold.
pub const DEFAULT_MIN_IB_POINTS: u8 = 24;

/// Identifier wrapper for a single requirement row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequirementId(pub String);

/// Reference into the external subject taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub String);

/// Tag shared by every member of an OR-group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrGroupId(pub String);

/// Identifier wrapper for catalog programs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgramId(pub String);

macro_rules! display_inner {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        })*
    };
}

display_inner!(RequirementId, SubjectId, OrGroupId, ProgramId);

/// Depth at which an IB subject was studied.
///
/// Declaration order is the dominance order: a Higher Level result satisfies a
/// Standard Level requirement for the same subject, never the other way round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SubjectLevel {
    #[serde(rename = "SL")]
    Standard = 0,
    #[serde(rename = "HL")]
    Higher = 1,
}

impl SubjectLevel {
    pub const fn label(self) -> &'static str {
        match self {
            SubjectLevel::Standard => "SL",
            SubjectLevel::Higher => "HL",
        }
    }

    /// Whether a result held at `self` meets a requirement stated at `required`.
    pub fn satisfies(self, required: SubjectLevel) -> bool {
        self >= required
    }

    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "SL" | "STANDARD" => Ok(SubjectLevel::Standard),
            "HL" | "HIGHER" => Ok(SubjectLevel::Higher),
            _ => Err(ValidationError::UnknownLevel(raw.to_string())),
        }
    }
}

impl fmt::Display for SubjectLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// IB subject grade on the 1-7 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Grade(u8);

impl Grade {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 7;

    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::GradeOutOfRange(value))
        }
    }

    /// Nearest grade on the scale, for compile-time defaults.
    pub const fn clamped(value: u8) -> Self {
        if value < Self::MIN {
            Self(Self::MIN)
        } else if value > Self::MAX {
            Self(Self::MAX)
        } else {
            Self(value)
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Grade {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Grade> for u8 {
    fn from(grade: Grade) -> Self {
        grade.0
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single "subject at level with minimum grade" entry requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementRecord {
    pub id: RequirementId,
    pub subject_id: SubjectId,
    pub required_level: SubjectLevel,
    pub min_grade: Grade,
    #[serde(default)]
    pub is_critical: bool,
    #[serde(default)]
    pub or_group_id: Option<OrGroupId>,
}

impl RequirementRecord {
    pub fn label(&self) -> String {
        format!(
            "{} {} ≥{}",
            self.subject_id, self.required_level, self.min_grade
        )
    }
}

/// Flat, persisted form of a program's entry requirements.
///
/// Grouping is never stored here; it is reconstructed by the resolver on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramRequirementSet {
    pub min_ib_points: u8,
    #[serde(default)]
    pub requirements: Vec<RequirementRecord>,
}

impl Default for ProgramRequirementSet {
    fn default() -> Self {
        Self {
            min_ib_points: DEFAULT_MIN_IB_POINTS,
            requirements: Vec::new(),
        }
    }
}

/// Catalog entry pairing a program with its requirement set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: ProgramId,
    pub name: String,
    pub requirements: ProgramRequirementSet,
}

/// Achieved result for one subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectResult {
    pub level: SubjectLevel,
    pub grade: Grade,
}

/// Candidate qualifications consumed by the evaluator.
///
/// Keying results by subject means a candidate can only hold each subject at one level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub total_points: u8,
    #[serde(default)]
    pub subject_grades: BTreeMap<SubjectId, SubjectResult>,
}

impl CandidateProfile {
    pub fn new(total_points: u8) -> Self {
        Self {
            total_points,
            subject_grades: BTreeMap::new(),
        }
    }

    pub fn with_subject(mut self, subject: &str, level: SubjectLevel, grade: Grade) -> Self {
        self.subject_grades
            .insert(SubjectId(subject.to_string()), SubjectResult { level, grade });
        self
    }

    pub fn result_for(&self, subject: &SubjectId) -> Option<&SubjectResult> {
        self.subject_grades.get(subject)
    }

    /// Grade held at exactly `level`; `None` means the subject was not taken at that level.
    pub fn grade_at(&self, subject: &SubjectId, level: SubjectLevel) -> Option<Grade> {
        self.result_for(subject)
            .filter(|result| result.level == level)
            .map(|result| result.grade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_level_dominates_standard_level() {
        assert!(SubjectLevel::Higher.satisfies(SubjectLevel::Standard));
        assert!(SubjectLevel::Higher.satisfies(SubjectLevel::Higher));
        assert!(SubjectLevel::Standard.satisfies(SubjectLevel::Standard));
        assert!(!SubjectLevel::Standard.satisfies(SubjectLevel::Higher));
    }

    #[test]
    fn grade_rejects_values_outside_scale() {
        assert!(Grade::new(0).is_err());
        assert!(Grade::new(8).is_err());
        assert_eq!(Grade::new(7).expect("valid grade").value(), 7);
    }

    #[test]
    fn grade_deserialization_is_validated() {
        let parsed: Result<Grade, _> = serde_json::from_str("9");
        assert!(parsed.is_err());
        let parsed: Grade = serde_json::from_str("5").expect("grade parses");
        assert_eq!(parsed.value(), 5);
    }

    #[test]
    fn grade_at_distinguishes_untaken_level() {
        let grade = Grade::new(6).expect("valid grade");
        let profile = CandidateProfile::new(38).with_subject("Math", SubjectLevel::Higher, grade);
        let math = SubjectId("Math".to_string());

        assert_eq!(profile.grade_at(&math, SubjectLevel::Higher), Some(grade));
        assert_eq!(profile.grade_at(&math, SubjectLevel::Standard), None);
        assert_eq!(
            profile.grade_at(&SubjectId("Physics".to_string()), SubjectLevel::Higher),
            None
        );
    }

    #[test]
    fn levels_serialize_as_ib_abbreviations() {
        assert_eq!(
            serde_json::to_string(&SubjectLevel::Higher).expect("serializes"),
            "\"HL\""
        );
        assert_eq!(SubjectLevel::parse(" sl ").expect("parses"), SubjectLevel::Standard);
        assert!(SubjectLevel::parse("AL").is_err());
    }
}
