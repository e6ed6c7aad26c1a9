use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Serialize;
use serde_json::json;

use super::domain::{
    CandidateProfile, Program, ProgramId, ProgramRequirementSet, RequirementId,
    RequirementRecord,
};
use super::repository::{CatalogError, ProgramCatalog};
use super::resolver::{resolve_groups, GroupKey};
use super::service::{EligibilityService, EligibilityServiceError};

/// Router builder exposing program registration, requirement saves, and eligibility checks.
pub fn program_router<C>(service: Arc<EligibilityService<C>>) -> Router
where
    C: ProgramCatalog + 'static,
{
    Router::new()
        .route("/api/v1/programs", post(register_handler::<C>))
        .route("/api/v1/programs/:program_id", get(program_handler::<C>))
        .route(
            "/api/v1/programs/:program_id/requirements",
            put(save_requirements_handler::<C>),
        )
        .route(
            "/api/v1/programs/:program_id/eligibility",
            post(eligibility_handler::<C>),
        )
        .route("/api/v1/eligibility/matches", post(matches_handler::<C>))
        .with_state(service)
}

/// Program as exposed over HTTP, including the derived grouping.
#[derive(Debug, Clone, Serialize)]
pub struct ProgramView {
    pub program_id: ProgramId,
    pub name: String,
    pub min_ib_points: u8,
    pub requirements: Vec<RequirementRecord>,
    pub groups: Vec<GroupView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupView {
    pub key: GroupKey,
    pub critical: bool,
    pub members: Vec<RequirementId>,
}

impl From<Program> for ProgramView {
    fn from(program: Program) -> Self {
        let groups = resolve_groups(&program.requirements.requirements)
            .iter()
            .map(|group| GroupView {
                key: group.key(),
                critical: group.is_critical(),
                members: group
                    .members()
                    .into_iter()
                    .map(|member| member.id.clone())
                    .collect(),
            })
            .collect();

        Self {
            program_id: program.id,
            name: program.name,
            min_ib_points: program.requirements.min_ib_points,
            requirements: program.requirements.requirements,
            groups,
        }
    }
}

pub(crate) async fn register_handler<C>(
    State(service): State<Arc<EligibilityService<C>>>,
    axum::Json(program): axum::Json<Program>,
) -> Response
where
    C: ProgramCatalog + 'static,
{
    match service.register(program) {
        Ok(program) => (
            StatusCode::CREATED,
            axum::Json(ProgramView::from(program)),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn program_handler<C>(
    State(service): State<Arc<EligibilityService<C>>>,
    Path(program_id): Path<String>,
) -> Response
where
    C: ProgramCatalog + 'static,
{
    match service.get(&ProgramId(program_id)) {
        Ok(program) => (StatusCode::OK, axum::Json(ProgramView::from(program))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn save_requirements_handler<C>(
    State(service): State<Arc<EligibilityService<C>>>,
    Path(program_id): Path<String>,
    axum::Json(requirements): axum::Json<ProgramRequirementSet>,
) -> Response
where
    C: ProgramCatalog + 'static,
{
    match service.save_requirements(&ProgramId(program_id), requirements) {
        Ok(program) => (StatusCode::OK, axum::Json(ProgramView::from(program))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn eligibility_handler<C>(
    State(service): State<Arc<EligibilityService<C>>>,
    Path(program_id): Path<String>,
    axum::Json(profile): axum::Json<CandidateProfile>,
) -> Response
where
    C: ProgramCatalog + 'static,
{
    match service.evaluate(&ProgramId(program_id), &profile) {
        Ok(evaluation) => (StatusCode::OK, axum::Json(evaluation)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn matches_handler<C>(
    State(service): State<Arc<EligibilityService<C>>>,
    axum::Json(profile): axum::Json<CandidateProfile>,
) -> Response
where
    C: ProgramCatalog + 'static,
{
    match service.match_programs(&profile) {
        Ok(matches) => {
            let eligible = matches
                .iter()
                .filter(|evaluation| evaluation.verdict.eligible)
                .count();
            let payload = json!({
                "eligible_programs": eligible,
                "matches": matches,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn error_response(error: EligibilityServiceError) -> Response {
    let status = match &error {
        EligibilityServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EligibilityServiceError::Catalog(CatalogError::Conflict) => StatusCode::CONFLICT,
        EligibilityServiceError::Catalog(CatalogError::NotFound) => StatusCode::NOT_FOUND,
        EligibilityServiceError::Catalog(CatalogError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
