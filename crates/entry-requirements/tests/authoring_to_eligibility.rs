//! End-to-end scenarios: an editor builds a requirement set through an authoring
//! session, saves it, and candidates are evaluated against the stored program.

mod common {
    use std::sync::{Arc, Mutex};

    use entry_requirements::programs::requirements::{
        CatalogError, EligibilityService, Program, ProgramCatalog, ProgramId,
        ProgramRequirementSet,
    };

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

    pub(super) fn service() -> EligibilityService<MemoryCatalog> {
        EligibilityService::new(Arc::new(MemoryCatalog::default()))
    }
}

use entry_requirements::programs::requirements::{
    AuthoringSession, CandidateProfile, GroupKey, Grade, NewRequirement, Program, ProgramId,
    RequirementCollection, RequirementPatch, SubjectId, SubjectLevel, ValidationError,
};

fn grade(value: u8) -> Grade {
    Grade::new(value).expect("valid grade")
}

fn subject(name: &str) -> Option<SubjectId> {
    Some(SubjectId(name.to_string()))
}

/// Builds: critical Chemistry HL ≥5 OR Biology HL ≥5, advisory Physics SL ≥4.
fn authored_session() -> AuthoringSession {
    let mut session = AuthoringSession::default();
    let chemistry = session.add_requirement(NewRequirement {
        subject_id: subject("Chemistry"),
        required_level: Some(SubjectLevel::Higher),
        min_grade: Some(grade(5)),
        is_critical: true,
    });
    let biology = session
        .add_alternative(&chemistry)
        .expect("alternative added");
    session.update_requirement(
        &biology,
        RequirementPatch {
            subject_id: subject("Biology"),
            required_level: Some(SubjectLevel::Higher),
            min_grade: Some(grade(5)),
            ..RequirementPatch::default()
        },
    );
    session.add_requirement(NewRequirement {
        subject_id: subject("Physics"),
        required_level: Some(SubjectLevel::Standard),
        min_grade: Some(grade(4)),
        is_critical: false,
    });
    session
}

#[test]
fn authored_program_evaluates_published_scenarios() {
    let session = authored_session();
    let requirements = session
        .current()
        .to_requirement_set(36)
        .expect("authored set normalizes");
    let group_id = requirements.requirements[0]
        .or_group_id
        .clone()
        .expect("chemistry is grouped");
    let physics_id = requirements.requirements[2].id.clone();

    let service = common::service();
    let program = service
        .register(Program {
            id: ProgramId("medicine".to_string()),
            name: "Medicine MBBS".to_string(),
            requirements,
        })
        .expect("program registers");

    let biology_candidate =
        CandidateProfile::new(38).with_subject("Biology", SubjectLevel::Higher, grade(6));
    let verdict = service
        .evaluate(&program.id, &biology_candidate)
        .expect("evaluates")
        .verdict;
    assert!(verdict.eligible);
    assert!(verdict.failed_critical_groups.is_empty());
    assert_eq!(
        verdict.unmet_advisory_groups,
        vec![GroupKey::Requirement(physics_id)]
    );

    let chemistry_sl_candidate =
        CandidateProfile::new(38).with_subject("Chemistry", SubjectLevel::Standard, grade(6));
    let verdict = service
        .evaluate(&program.id, &chemistry_sl_candidate)
        .expect("evaluates")
        .verdict;
    assert!(!verdict.eligible);
    assert_eq!(
        verdict.failed_critical_groups,
        vec![GroupKey::OrGroup(group_id)]
    );
}

#[test]
fn stored_program_round_trips_into_a_new_authoring_session() {
    let requirements = authored_session()
        .current()
        .to_requirement_set(36)
        .expect("normalizes");
    let service = common::service();
    let program = service
        .register(Program {
            id: ProgramId("medicine".to_string()),
            name: "Medicine MBBS".to_string(),
            requirements,
        })
        .expect("program registers");

    let stored = service.get(&program.id).expect("program stored");
    let collection = RequirementCollection::from_records(
        stored.requirements.requirements.clone(),
        Default::default(),
    );
    let mut session = AuthoringSession::new(collection);

    let chemistry = stored.requirements.requirements[0].id.clone();
    assert!(session.delete_requirement(&chemistry));
    assert!(session.current().is_consistent());

    let requirements = session
        .current()
        .to_requirement_set(stored.requirements.min_ib_points)
        .expect("still valid after delete");
    assert!(requirements
        .requirements
        .iter()
        .all(|record| record.or_group_id.is_none()));

    let saved = service
        .save_requirements(&program.id, requirements)
        .expect("saves");
    assert_eq!(saved.requirements.requirements.len(), 2);
}

#[test]
fn unfinished_alternatives_cannot_be_saved() {
    let mut session = AuthoringSession::default();
    let chemistry = session.add_requirement(NewRequirement {
        subject_id: subject("Chemistry"),
        ..NewRequirement::default()
    });
    let pending = session
        .add_alternative(&chemistry)
        .expect("alternative added");

    assert_eq!(
        session.current().to_requirement_set(30),
        Err(ValidationError::MissingSubject(pending))
    );
}
