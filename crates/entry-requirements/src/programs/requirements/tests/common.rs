use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::programs::requirements::domain::{
    CandidateProfile, Grade, OrGroupId, Program, ProgramId, ProgramRequirementSet,
    RequirementId, RequirementRecord, SubjectId, SubjectLevel,
};
use crate::programs::requirements::repository::{CatalogError, ProgramCatalog};
use crate::programs::requirements::{program_router, EligibilityService};

pub(super) fn grade(value: u8) -> Grade {
    Grade::new(value).expect("valid grade")
}

pub(super) fn requirement(
    id: &str,
    subject: &str,
    level: SubjectLevel,
    min_grade: u8,
    critical: bool,
    group: Option<&str>,
) -> RequirementRecord {
    RequirementRecord {
        id: RequirementId(id.to_string()),
        subject_id: SubjectId(subject.to_string()),
        required_level: level,
        min_grade: grade(min_grade),
        is_critical: critical,
        or_group_id: group.map(|value| OrGroupId(value.to_string())),
    }
}

pub(super) fn rid(value: &str) -> RequirementId {
    RequirementId(value.to_string())
}

pub(super) fn gid(value: &str) -> OrGroupId {
    OrGroupId(value.to_string())
}

/// Medicine-style program: 36 points, critical Chemistry-or-Biology HL, advisory Physics SL.
pub(super) fn life_sciences_requirements() -> ProgramRequirementSet {
    ProgramRequirementSet {
        min_ib_points: 36,
        requirements: vec![
            requirement("chem", "Chemistry", SubjectLevel::Higher, 5, true, Some("chem-bio")),
            requirement("bio", "Biology", SubjectLevel::Higher, 5, true, Some("chem-bio")),
            requirement("physics", "Physics", SubjectLevel::Standard, 4, false, None),
        ],
    }
}

pub(super) fn life_sciences_program() -> Program {
    Program {
        id: ProgramId("life-sciences".to_string()),
        name: "Life Sciences BSc".to_string(),
        requirements: life_sciences_requirements(),
    }
}

pub(super) fn engineering_program() -> Program {
    Program {
        id: ProgramId("engineering".to_string()),
        name: "Engineering MEng".to_string(),
        requirements: ProgramRequirementSet {
            min_ib_points: 38,
            requirements: vec![requirement(
                "eng-math",
                "Mathematics",
                SubjectLevel::Higher,
                6,
                true,
                None,
            )],
        },
    }
}

pub(super) fn biology_candidate() -> CandidateProfile {
    CandidateProfile::new(38).with_subject("Biology", SubjectLevel::Higher, grade(6))
}

#[derive(Default, Clone)]
pub(super) struct MemoryCatalog {
    programs: Arc<Mutex<Vec<Program>>>,
}

impl ProgramCatalog for MemoryCatalog {
    fn insert(&self, program: Program) -> Result<Program, CatalogError> {
        let mut guard = self.programs.lock().expect("catalog mutex poisoned");
        if guard.iter().any(|existing| existing.id == program.id) {
            return Err(CatalogError::Conflict);
        }
        guard.push(program.clone());
        Ok(program)
    }

    fn replace_requirements(
        &self,
        id: &ProgramId,
        requirements: ProgramRequirementSet,
    ) -> Result<Program, CatalogError> {
        let mut guard = self.programs.lock().expect("catalog mutex poisoned");
        let program = guard
            .iter_mut()
            .find(|program| &program.id == id)
            .ok_or(CatalogError::NotFound)?;
        program.requirements = requirements;
        Ok(program.clone())
    }

    fn fetch(&self, id: &ProgramId) -> Result<Option<Program>, CatalogError> {
        let guard = self.programs.lock().expect("catalog mutex poisoned");
        Ok(guard.iter().find(|program| &program.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<Program>, CatalogError> {
        Ok(self.programs.lock().expect("catalog mutex poisoned").clone())
    }
}

pub(super) struct UnavailableCatalog;

impl ProgramCatalog for UnavailableCatalog {
    fn insert(&self, _program: Program) -> Result<Program, CatalogError> {
        Err(CatalogError::Unavailable("database offline".to_string()))
    }

    fn replace_requirements(
        &self,
        _id: &ProgramId,
        _requirements: ProgramRequirementSet,
    ) -> Result<Program, CatalogError> {
        Err(CatalogError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ProgramId) -> Result<Option<Program>, CatalogError> {
        Err(CatalogError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Program>, CatalogError> {
        Err(CatalogError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service() -> (EligibilityService<MemoryCatalog>, MemoryCatalog) {
    let catalog = MemoryCatalog::default();
    let service = EligibilityService::new(Arc::new(catalog.clone()));
    (service, catalog)
}

pub(super) fn router_with_service(service: EligibilityService<MemoryCatalog>) -> axum::Router {
    program_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Count of records carrying each group tag.
pub(super) fn tag_counts<'a, I>(tags: I) -> BTreeMap<OrGroupId, usize>
where
    I: IntoIterator<Item = Option<&'a OrGroupId>>,
{
    let mut counts = BTreeMap::new();
    for tag in tags.into_iter().flatten() {
        *counts.entry(tag.clone()).or_default() += 1;
    }
    counts
}
