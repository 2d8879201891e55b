use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::core::{Assigner, AssignmentError};
use crate::models::{AssignRequest, AssignmentResponse, ErrorResponse, HealthResponse, Roster};
use crate::report::AssignmentReport;
use crate::services::export_to_buffer;

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub roster: Arc<Roster>,
    pub assigner: Assigner,
    /// Largest headcount accepted in a posted roster
    pub max_participants: usize,
}

/// Configure all assignment-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/assignments", web::get().to(configured_assignment))
        .route("/assignments", web::post().to(assign_roster))
        .route("/assignments/export", web::post().to(export_roster));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Assignment for the roster the server was started with
///
/// GET /api/v1/assignments
async fn configured_assignment(state: web::Data<AppState>) -> impl Responder {
    run_assignment(&state.assigner, &state.roster)
}

/// Assignment for a roster supplied in the request
///
/// POST /api/v1/assignments
///
/// Request body:
/// ```json
/// {
///   "families": [{"parents": ["A"], "children": ["B"], "grandparents": []}],
///   "weights": {"twoAdults": 100},
///   "rules": {"forbidParentChild": false, "forbiddenPairs": []}
/// }
/// ```
async fn assign_roster(
    state: web::Data<AppState>,
    req: web::Json<AssignRequest>,
) -> impl Responder {
    if let Err(response) = check_request(&state, &req) {
        return response;
    }

    let assigner = request_assigner(&state.assigner, &req);
    run_assignment(&assigner, &req.roster())
}

/// Same as `assign_roster`, answered with the two-sheet workbook
///
/// POST /api/v1/assignments/export
async fn export_roster(
    state: web::Data<AppState>,
    req: web::Json<AssignRequest>,
) -> impl Responder {
    if let Err(response) = check_request(&state, &req) {
        return response;
    }

    let assigner = request_assigner(&state.assigner, &req);
    let result = match assigner.assign(&req.roster()) {
        Ok(result) => result,
        Err(e) => return no_solution(e),
    };

    let report = AssignmentReport::from_assignment(&result.assignment);
    match export_to_buffer(&report) {
        Ok(bytes) => HttpResponse::Ok()
            .content_type(XLSX_CONTENT_TYPE)
            .insert_header((
                "Content-Disposition",
                "attachment; filename=\"Secret_Santa_Result.xlsx\"",
            ))
            .body(bytes),
        Err(e) => {
            tracing::error!("Failed to build workbook: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Export failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

fn check_request(state: &AppState, req: &AssignRequest) -> Result<(), HttpResponse> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for assignment request: {:?}", errors);
        return Err(validation_failed(errors.to_string()));
    }

    let headcount = req.headcount();
    if headcount > state.max_participants {
        tracing::info!(
            "Rejected roster of {} names (limit {})",
            headcount,
            state.max_participants
        );
        return Err(validation_failed(format!(
            "roster lists {} names, at most {} are accepted",
            headcount, state.max_participants
        )));
    }

    Ok(())
}

fn request_assigner(base: &Assigner, req: &AssignRequest) -> Assigner {
    Assigner::new(
        req.weights.unwrap_or(*base.weights()),
        req.rules.clone().unwrap_or_else(|| base.rules().clone()),
    )
    .with_max_steps(base.max_steps())
}

fn run_assignment(assigner: &Assigner, roster: &Roster) -> HttpResponse {
    match assigner.assign(roster) {
        Ok(result) => {
            let participants = result.assignment.len();
            tracing::info!("Returning assignment for {} participants", participants);
            HttpResponse::Ok().json(AssignmentResponse {
                report: AssignmentReport::from_assignment(&result.assignment),
                participants,
                explored: result.explored,
                rollbacks: result.rollbacks,
            })
        }
        Err(e) => no_solution(e),
    }
}

fn no_solution(err: AssignmentError) -> HttpResponse {
    tracing::warn!("Assignment failed: {}", err);
    HttpResponse::UnprocessableEntity().json(ErrorResponse {
        error: "No solution".to_string(),
        message: err.to_string(),
        status_code: 422,
    })
}

fn validation_failed(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message,
        status_code: 400,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_overrides_weights() {
        let base = Assigner::with_default_weights().with_max_steps(50);
        let req: AssignRequest = serde_json::from_str(
            r#"{"families": [{"parents": ["A"]}], "weights": {"parentChild": 3}}"#,
        )
        .unwrap();

        let assigner = request_assigner(&base, &req);
        assert_eq!(assigner.weights().parent_child, 3);
        assert!(assigner.rules().is_empty());
        assert_eq!(assigner.max_steps(), 50);
    }
}
