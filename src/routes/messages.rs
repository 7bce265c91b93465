use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::core::Verdict;
use crate::error::ApiError;
use crate::models::{
    AdminEmailRequest, DeleteMessageRequest, EmailRequest, SendMessageRequest, UpdateMessageRequest,
};
use crate::routes::{search, AppState};
use crate::services::Store;

/// Configure all message routes
pub fn configure<S: Store>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/messages")
            .route(web::post().to(send_message::<S>))
            .route(search().to(received_messages::<S>))
            .route(web::put().to(update_message::<S>))
            .route(web::delete().to(delete_message::<S>)),
    )
    .service(web::resource("/messages/sent").route(search().to(sent_messages::<S>)))
    .service(web::resource("/messages/all").route(web::delete().to(delete_sent_messages::<S>)));
}

/// POST /messages
///
/// Request body:
/// ```json
/// { "sender": "email", "receiver": "email", "message": "string" }
/// ```
///
/// The body is screened before either user is looked up; a rejected body is
/// never persisted.
async fn send_message<S: Store>(
    state: web::Data<AppState<S>>,
    req: web::Json<SendMessageRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    let req = req.into_inner();

    // The word list is re-read from disk on every send
    let filter = state.filter.clone();
    let body = req.message.clone();
    let verdict = web::block(move || filter.screen(&body)).await??;

    if let Verdict::Rejected { word } = verdict {
        tracing::info!("Rejected message before persistence");
        tracing::debug!("Rejected message matched word list entry {:?}", word);
        return Err(ApiError::ContentRejected);
    }

    let created = state
        .store
        .create_message(&req.sender, &req.receiver, &req.message)
        .await?;

    tracing::info!(
        "Created message {}: user {} -> user {}",
        created.id,
        created.sender_user_id,
        created.receiver_user_id
    );
    Ok(HttpResponse::Ok().json(created))
}

/// SEARCH /messages
///
/// Messages received by the user with `email`.
async fn received_messages<S: Store>(
    state: web::Data<AppState<S>>,
    req: web::Json<EmailRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let messages = state.store.messages_received_by(&req.email).await?;

    tracing::debug!("User {} has received {} messages", req.email, messages.len());
    Ok(HttpResponse::Ok().json(messages))
}

/// SEARCH /messages/sent
async fn sent_messages<S: Store>(
    state: web::Data<AppState<S>>,
    req: web::Json<EmailRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let messages = state.store.messages_sent_by(&req.email).await?;

    tracing::debug!("User {} has sent {} messages", req.email, messages.len());
    Ok(HttpResponse::Ok().json(messages))
}

/// PUT /messages
///
/// Replaces the body only. Edits are not screened.
async fn update_message<S: Store>(
    state: web::Data<AppState<S>>,
    req: web::Json<UpdateMessageRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    state.authorize_update(&req.credentials, "PUT /messages")?;

    let updated = state
        .store
        .update_message(req.message_id.0, &req.message)
        .await?;

    tracing::info!("Updated message {}", updated.id);
    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /messages
async fn delete_message<S: Store>(
    state: web::Data<AppState<S>>,
    req: web::Json<DeleteMessageRequest>,
) -> Result<HttpResponse, ApiError> {
    state.authorize(&req.credentials, "DELETE /messages")?;

    let removed = state.store.delete_message(req.message_id.0).await?;

    tracing::info!("Deleted message {}", removed.id);
    Ok(HttpResponse::Ok().json(removed))
}

/// DELETE /messages/all
///
/// Removes every message the user sent; messages they received are kept.
async fn delete_sent_messages<S: Store>(
    state: web::Data<AppState<S>>,
    req: web::Json<AdminEmailRequest>,
) -> Result<HttpResponse, ApiError> {
    state.authorize(&req.credentials, "DELETE /messages/all")?;
    req.validate()?;

    let removed = state.store.delete_messages_sent_by(&req.email).await?;

    tracing::info!("Deleted {} messages in bulk", removed.len());
    Ok(HttpResponse::Ok().json(removed))
}
