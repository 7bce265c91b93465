// Route exports
pub mod matches;
pub mod messages;
pub mod users;

use std::sync::Arc;

use actix_web::{http::Method, web, HttpResponse, Responder, Route};

use crate::core::{AdminCredentials, AuthPolicy, ProfanityFilter};
use crate::error::ApiError;
use crate::models::{AdminFields, HealthResponse};
use crate::services::Store;

/// Application state shared across all handlers
pub struct AppState<S> {
    pub store: Arc<S>,
    pub admin: Arc<AdminCredentials>,
    pub filter: Arc<ProfanityFilter>,
    pub policy: AuthPolicy,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            admin: Arc::clone(&self.admin),
            filter: Arc::clone(&self.filter),
            policy: self.policy,
        }
    }
}

impl<S: Store> AppState<S> {
    pub fn new(store: S, admin: AdminCredentials, filter: ProfanityFilter, policy: AuthPolicy) -> Self {
        Self {
            store: Arc::new(store),
            admin: Arc::new(admin),
            filter: Arc::new(filter),
            policy,
        }
    }

    /// Administrative check, run before any mutation is attempted
    pub(crate) fn authorize(&self, credentials: &AdminFields, path: &str) -> Result<(), ApiError> {
        if self.admin.verify(&credentials.admin, &credentials.pass) {
            Ok(())
        } else {
            tracing::warn!("Rejected administrative request on {}", path);
            Err(ApiError::Unauthorized)
        }
    }

    /// Administrative check for in-place updates, applied only when the policy asks for it
    pub(crate) fn authorize_update(&self, credentials: &AdminFields, path: &str) -> Result<(), ApiError> {
        if self.policy.require_admin_for_updates {
            self.authorize(credentials, path)
        } else {
            Ok(())
        }
    }
}

/// Route for the non-standard `SEARCH` method
pub fn search() -> Route {
    // A static, valid method token
    web::method(Method::from_bytes(b"SEARCH").expect("SEARCH is a valid method token"))
}

pub fn configure_routes<S: Store>(cfg: &mut web::ServiceConfig) {
    cfg.route("/hello", web::get().to(hello))
        .route("/health", web::get().to(health_check::<S>))
        .configure(users::configure::<S>)
        .configure(matches::configure::<S>)
        .configure(messages::configure::<S>);
}

async fn hello() -> impl Responder {
    HttpResponse::Ok().content_type("text/plain").body("hello")
}

/// Health check endpoint
async fn health_check<S: Store>(state: web::Data<AppState<S>>) -> impl Responder {
    let healthy = state.store.health_check().await.unwrap_or(false);

    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}
