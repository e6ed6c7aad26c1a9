//! Program entry requirements: the flat requirement model, OR-group resolution,
//! authoring-time group consistency, and candidate eligibility evaluation.

pub mod authoring;
pub mod domain;
pub mod evaluation;
pub mod repository;
pub mod resolver;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use authoring::{
    AuthoringDefaults, AuthoringSession, NewRequirement, RequirementCollection,
    RequirementDraft, RequirementPatch,
};
pub use domain::{
    CandidateProfile, Grade, OrGroupId, Program, ProgramId, ProgramRequirementSet,
    RequirementId, RequirementRecord, SubjectId, SubjectLevel, SubjectResult,
    DEFAULT_MIN_IB_POINTS, MAX_IB_POINTS,
};
pub use evaluation::{EligibilityEvaluator, EligibilityVerdict, GroupAssessment};
pub use repository::{CatalogError, ProgramCatalog};
pub use resolver::{resolve_groups, GroupKey, GroupMember, RequirementGroup};
pub use router::{program_router, GroupView, ProgramView};
pub use service::{EligibilityService, EligibilityServiceError, ProgramEvaluation};
pub use validation::{validate_profile, validate_requirement_set, ValidationError};
