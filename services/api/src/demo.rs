use crate::infra::InMemoryProgramCatalog;
use clap::Args;
use entry_requirements::config::AppConfig;
use entry_requirements::error::AppError;
use entry_requirements::programs::requirements::{
    resolve_groups, validate_profile, validate_requirement_set, AuthoringSession,
    CandidateProfile, EligibilityEvaluator, EligibilityService, EligibilityVerdict, Grade,
    NewRequirement, Program, ProgramId, RequirementCollection, RequirementGroup,
    RequirementPatch, SubjectId, SubjectLevel,
};
use entry_requirements::programs::ProgramSeedImporter;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Program JSON file (id, name, requirements)
    #[arg(long)]
    pub(crate) program: PathBuf,
    /// Candidate profile JSON file (total_points, subject_grades)
    #[arg(long)]
    pub(crate) profile: PathBuf,
    /// Print the full verdict as JSON instead of a one-line summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct SeedCheckArgs {
    /// Seed CSV export to validate
    #[arg(long)]
    pub(crate) csv: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Minimum IB points for the demo program
    #[arg(long, default_value_t = 36)]
    pub(crate) min_points: u8,
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let program: Program = serde_json::from_str(&fs::read_to_string(&args.program)?)?;
    let profile: CandidateProfile = serde_json::from_str(&fs::read_to_string(&args.profile)?)?;

    validate_requirement_set(&program.requirements)?;
    validate_profile(&profile)?;

    let verdict = EligibilityEvaluator::new().evaluate(&program.requirements, &profile);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else {
        println!("{} ({}): {}", program.name, program.id, verdict.summary());
    }
    Ok(())
}

pub(crate) fn run_seed_check(args: SeedCheckArgs) -> Result<(), AppError> {
    let programs = ProgramSeedImporter::from_path(&args.csv)?;

    println!("{} programs in {}", programs.len(), args.csv.display());
    for program in &programs {
        let groups = resolve_groups(&program.requirements.requirements);
        let alternatives = groups
            .iter()
            .filter(|group| matches!(group, RequirementGroup::Alternatives { .. }))
            .count();
        println!(
            "- {} ({}): {} points, {} requirements, {} or-groups",
            program.name,
            program.id,
            program.requirements.min_ib_points,
            program.requirements.requirements.len(),
            alternatives
        );
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;

    println!("Entry requirement authoring demo");
    let mut session = AuthoringSession::new(RequirementCollection::new(config.authoring));

    let chemistry = session.add_requirement(NewRequirement {
        subject_id: Some(subject("Chemistry")),
        required_level: Some(SubjectLevel::Higher),
        min_grade: Some(Grade::new(5)?),
        is_critical: true,
    });
    let biology = session.add_alternative(&chemistry);
    if let Some(biology) = &biology {
        session.update_requirement(
            biology,
            RequirementPatch {
                subject_id: Some(subject("Biology")),
                required_level: Some(SubjectLevel::Higher),
                min_grade: Some(Grade::new(5)?),
                ..RequirementPatch::default()
            },
        );
    }
    let physics = session.add_requirement(NewRequirement {
        subject_id: Some(subject("Physics")),
        ..NewRequirement::default()
    });
    render_collection(session.current());

    println!("\nUndo the Physics requirement, then redo it");
    session.undo();
    println!("- after undo: {} requirements", session.current().len());
    session.redo();
    println!(
        "- after redo: {} requirements (Physics present: {})",
        session.current().len(),
        session.current().get(&physics).is_some()
    );

    println!("\nTry deleting Biology: the Chemistry group dissolves");
    if let Some(biology) = &biology {
        let preview = session.current().delete_requirement(biology);
        render_collection(&preview);
    }

    let requirements = session.current().to_requirement_set(args.min_points)?;
    let catalog = Arc::new(InMemoryProgramCatalog::default());
    let service = EligibilityService::new(catalog);
    let program = match service.register(Program {
        id: ProgramId("life-sciences".to_string()),
        name: "Life Sciences BSc".to_string(),
        requirements,
    }) {
        Ok(program) => program,
        Err(err) => {
            println!("  Program rejected: {}", err);
            return Ok(());
        }
    };

    println!("\nCandidate checks against {}", program.name);
    for (label, profile) in demo_candidates()? {
        match service.evaluate(&program.id, &profile) {
            Ok(evaluation) => render_verdict(label, &evaluation.verdict),
            Err(err) => println!("- {label}: evaluation unavailable ({err})"),
        }
    }

    Ok(())
}

fn subject(name: &str) -> SubjectId {
    SubjectId(name.to_string())
}

fn demo_candidates() -> Result<Vec<(&'static str, CandidateProfile)>, AppError> {
    Ok(vec![
        (
            "Biology HL 6, 38 points",
            CandidateProfile::new(38).with_subject("Biology", SubjectLevel::Higher, Grade::new(6)?),
        ),
        (
            "Chemistry SL 6, 38 points",
            CandidateProfile::new(38).with_subject(
                "Chemistry",
                SubjectLevel::Standard,
                Grade::new(6)?,
            ),
        ),
        (
            "Chemistry HL 7 and Physics SL 5, 30 points",
            CandidateProfile::new(30)
                .with_subject("Chemistry", SubjectLevel::Higher, Grade::new(7)?)
                .with_subject("Physics", SubjectLevel::Standard, Grade::new(5)?),
        ),
    ])
}

fn render_collection(collection: &RequirementCollection) {
    for group in collection.groups() {
        let tag = if group.is_critical() {
            "required"
        } else {
            "recommended"
        };
        let members = group
            .members()
            .into_iter()
            .map(|draft| {
                format!(
                    "{} {} ≥{}",
                    draft
                        .subject_id
                        .as_ref()
                        .map(|id| id.0.as_str())
                        .unwrap_or("(no subject)"),
                    draft.required_level,
                    draft.min_grade
                )
            })
            .collect::<Vec<_>>()
            .join(" or ");
        println!("- [{}] {} ({})", group.key(), members, tag);
    }
}

fn render_verdict(label: &str, verdict: &EligibilityVerdict) {
    println!("- {label}: {}", verdict.summary());
    for assessment in &verdict.assessments {
        let mark = if assessment.is_satisfied() { "met" } else { "unmet" };
        println!("    {} [{}]: {}", assessment.description, mark, assessment.group);
    }
}
