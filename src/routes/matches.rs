use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::error::ApiError;
use crate::models::{CreateMatchRequest, EmailRequest};
use crate::routes::{search, AppState};
use crate::services::Store;

/// Configure all match-related routes
pub fn configure<S: Store>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/match")
            .route(web::post().to(create_match::<S>))
            .route(search().to(list_matches::<S>)),
    );
}

/// POST /match
///
/// Request body:
/// ```json
/// { "email": "string", "matchee_email": "string" }
/// ```
///
/// Both users are resolved and the match inserted atomically. Duplicate and
/// self matches are accepted.
async fn create_match<S: Store>(
    state: web::Data<AppState<S>>,
    req: web::Json<CreateMatchRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let created = state
        .store
        .create_match(&req.email, &req.matchee_email)
        .await?;

    tracing::info!(
        "Created match {}: user {} -> user {}",
        created.id,
        created.owner_id,
        created.matchee_id
    );
    Ok(HttpResponse::Ok().json(created))
}

/// SEARCH /match
///
/// Returns `{ "matches": [...], "matched_by": [...] }` for the user.
async fn list_matches<S: Store>(
    state: web::Data<AppState<S>>,
    req: web::Json<EmailRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let matches = state.store.matches_for_user(&req.email).await?;

    tracing::debug!(
        "User {} owns {} matches and is matched by {}",
        req.email,
        matches.matches.len(),
        matches.matched_by.len()
    );
    Ok(HttpResponse::Ok().json(matches))
}
