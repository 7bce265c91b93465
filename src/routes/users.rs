use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::error::ApiError;
use crate::models::{AdminEmailRequest, CreateUserRequest, EmailRequest, NewUser, UpdateUserRequest};
use crate::routes::{search, AppState};
use crate::services::Store;

/// Configure all user routes
pub fn configure<S: Store>(cfg: &mut web::ServiceConfig) {
    cfg.route("/dbTest", web::get().to(list_users::<S>)).service(
        web::resource("/users")
            .route(web::post().to(create_user::<S>))
            .route(search().to(search_user::<S>))
            .route(web::put().to(update_user::<S>))
            .route(web::delete().to(delete_user::<S>)),
    );
}

/// GET /dbTest
///
/// Every stored user, ordered by id.
async fn list_users<S: Store>(state: web::Data<AppState<S>>) -> Result<HttpResponse, ApiError> {
    let users = state.store.list_users().await?;
    Ok(HttpResponse::Ok().json(users))
}

/// POST /users
///
/// Request body:
/// ```json
/// { "name": "string", "email": "string", "petType": "string" }
/// ```
async fn create_user<S: Store>(
    state: web::Data<AppState<S>>,
    req: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let user = state.store.create_user(NewUser::from(req.into_inner())).await?;

    tracing::info!("Created new user {}", user.id);
    Ok(HttpResponse::Ok().json(user))
}

/// SEARCH /users
async fn search_user<S: Store>(
    state: web::Data<AppState<S>>,
    req: web::Json<EmailRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    tracing::debug!("Looking up user {}", req.email);

    match state.store.find_user_by_email(&req.email).await? {
        Some(user) => Ok(HttpResponse::Ok().json(user)),
        None => Err(ApiError::NotFound(format!("no user with email {}", req.email))),
    }
}

/// PUT /users
///
/// Overwrites `name` and `petType` of the user identified by `email`.
async fn update_user<S: Store>(
    state: web::Data<AppState<S>>,
    req: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    state.authorize_update(&req.credentials, "PUT /users")?;

    let user = state
        .store
        .update_user(&req.email, &req.name, &req.pet_type)
        .await?;

    tracing::info!("Updated user {}", user.id);
    Ok(HttpResponse::Ok().json(user))
}

/// DELETE /users
///
/// Requires administrative credentials. Cascades to the user's matches and messages.
async fn delete_user<S: Store>(
    state: web::Data<AppState<S>>,
    req: web::Json<AdminEmailRequest>,
) -> Result<HttpResponse, ApiError> {
    state.authorize(&req.credentials, "DELETE /users")?;
    req.validate()?;

    let user = state.store.delete_user(&req.email).await?;

    tracing::info!("Deleted user {}", user.id);
    Ok(HttpResponse::Ok().json(user))
}
