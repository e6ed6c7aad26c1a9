use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::domain::{CandidateProfile, Program, ProgramId, ProgramRequirementSet};
use super::evaluation::{EligibilityEvaluator, EligibilityVerdict};
use super::repository::{CatalogError, ProgramCatalog};
use super::validation::{validate_profile, validate_requirement_set, ValidationError};

/// Service composing input validation, the program catalog, and the evaluator.
pub struct EligibilityService<C> {
    catalog: Arc<C>,
    evaluator: EligibilityEvaluator,
}

/// Verdict for one program, as handed to matching and search callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramEvaluation {
    pub program_id: ProgramId,
    pub name: String,
    pub verdict: EligibilityVerdict,
}

impl<C> EligibilityService<C>
where
    C: ProgramCatalog + 'static,
{
    pub fn new(catalog: Arc<C>) -> Self {
        Self {
            catalog,
            evaluator: EligibilityEvaluator::new(),
        }
    }

    /// Validate and store a new program.
    pub fn register(&self, program: Program) -> Result<Program, EligibilityServiceError> {
        validate_requirement_set(&program.requirements)?;
        let stored = self.catalog.insert(program)?;
        info!(
            program = %stored.id,
            requirements = stored.requirements.requirements.len(),
            "registered program"
        );
        Ok(stored)
    }

    /// Replace a program's requirement set after an authoring session saves.
    pub fn save_requirements(
        &self,
        id: &ProgramId,
        requirements: ProgramRequirementSet,
    ) -> Result<Program, EligibilityServiceError> {
        validate_requirement_set(&requirements)?;
        let stored = self.catalog.replace_requirements(id, requirements)?;
        info!(program = %id, "saved requirement set");
        Ok(stored)
    }

    pub fn get(&self, id: &ProgramId) -> Result<Program, EligibilityServiceError> {
        let program = self.catalog.fetch(id)?.ok_or(CatalogError::NotFound)?;
        Ok(program)
    }

    /// Evaluate a candidate against one program.
    pub fn evaluate(
        &self,
        id: &ProgramId,
        profile: &CandidateProfile,
    ) -> Result<ProgramEvaluation, EligibilityServiceError> {
        validate_profile(profile)?;
        let program = self.get(id)?;
        Ok(self.evaluate_program(program, profile))
    }

    /// Evaluate a candidate against every program, eligible programs first.
    pub fn match_programs(
        &self,
        profile: &CandidateProfile,
    ) -> Result<Vec<ProgramEvaluation>, EligibilityServiceError> {
        validate_profile(profile)?;
        let mut evaluations: Vec<ProgramEvaluation> = self
            .catalog
            .list()?
            .into_iter()
            .map(|program| self.evaluate_program(program, profile))
            .collect();
        evaluations.sort_by_key(|evaluation| !evaluation.verdict.eligible);

        info!(
            programs = evaluations.len(),
            eligible = evaluations
                .iter()
                .filter(|evaluation| evaluation.verdict.eligible)
                .count(),
            "matched candidate against catalog"
        );
        Ok(evaluations)
    }

    fn evaluate_program(&self, program: Program, profile: &CandidateProfile) -> ProgramEvaluation {
        let verdict = self.evaluator.evaluate(&program.requirements, profile);
        debug!(program = %program.id, summary = %verdict.summary(), "program evaluated");
        ProgramEvaluation {
            program_id: program.id,
            name: program.name,
            verdict,
        }
    }
}

/// Error raised by the eligibility service.
#[derive(Debug, thiserror::Error)]
pub enum EligibilityServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
