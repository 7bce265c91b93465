// Integration tests for Doggr: the HTTP surface against the in-memory store

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use actix_web::http::{Method, StatusCode};
use actix_web::{test, web, App};
use serde_json::{json, Value};

use doggr::core::{AdminCredentials, AuthPolicy, ProfanityFilter};
use doggr::error::handle_json_payload_error;
use doggr::routes::{configure_routes, AppState};
use doggr::services::MemoryStore;

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
                .configure(configure_routes::<MemoryStore>),
        )
        .await
    };
}

fn state_with(policy: AuthPolicy, filter: ProfanityFilter) -> AppState<MemoryStore> {
    AppState::new(
        MemoryStore::new(),
        AdminCredentials::new("x", "y"),
        filter,
        policy,
    )
}

fn default_state() -> AppState<MemoryStore> {
    state_with(
        AuthPolicy::default(),
        ProfanityFilter::from_words(["darn", "heck"]),
    )
}

fn search_method() -> Method {
    Method::from_bytes(b"SEARCH").unwrap()
}

fn search(uri: &str, body: Value) -> test::TestRequest {
    test::TestRequest::default()
        .method(search_method())
        .uri(uri)
        .set_json(body)
}

fn create_user_req(email: &str) -> test::TestRequest {
    test::TestRequest::post().uri("/users").set_json(json!({
        "name": format!("Owner {}", email),
        "email": email,
        "petType": "dog",
    }))
}

fn send_req(sender: &str, receiver: &str, message: &str) -> test::TestRequest {
    test::TestRequest::post().uri("/messages").set_json(json!({
        "sender": sender,
        "receiver": receiver,
        "message": message,
    }))
}

#[actix_web::test]
async fn test_hello() {
    let app = init_app!(default_state());

    let resp = test::call_service(&app, test::TestRequest::get().uri("/hello").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(body, web::Bytes::from_static(b"hello"));
}

#[actix_web::test]
async fn test_health_reports_healthy() {
    let app = init_app!(default_state());

    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn test_create_then_search_user() {
    let app = init_app!(default_state());

    let resp = test::call_service(&app, create_user_req("rex@example.com").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let created: Value = test::read_body_json(resp).await;

    let found: Value = test::call_and_read_body_json(
        &app,
        search("/users", json!({ "email": "rex@example.com" })).to_request(),
    )
    .await;

    assert_eq!(found["id"], created["id"]);
    assert_eq!(found["email"], "rex@example.com");
    assert_eq!(found["name"], "Owner rex@example.com");
    assert_eq!(found["petType"], "dog");
}

#[actix_web::test]
async fn test_search_unknown_user_is_not_found() {
    let app = init_app!(default_state());

    let resp = test::call_service(
        &app,
        search("/users", json!({ "email": "nobody@example.com" })).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "not_found");
}

#[actix_web::test]
async fn test_duplicate_email_conflicts() {
    let app = init_app!(default_state());

    test::call_service(&app, create_user_req("rex@example.com").to_request()).await;
    let resp = test::call_service(&app, create_user_req("rex@example.com").to_request()).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let users: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/dbTest").to_request()).await;
    assert_eq!(users.as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_update_user_overwrites_name_and_pet_type() {
    let app = init_app!(default_state());

    test::call_service(&app, create_user_req("rex@example.com").to_request()).await;

    let req = test::TestRequest::put().uri("/users").set_json(json!({
        "name": "Renamed",
        "email": "rex@example.com",
        "petType": "cat",
    }));
    let updated: Value = test::call_and_read_body_json(&app, req.to_request()).await;
    assert_eq!(updated["name"], "Renamed");
    assert_eq!(updated["petType"], "cat");
    assert_eq!(updated["email"], "rex@example.com");
}

#[actix_web::test]
async fn test_update_unknown_user_is_not_found() {
    let app = init_app!(default_state());

    let req = test::TestRequest::put().uri("/users").set_json(json!({
        "name": "Ghost",
        "email": "ghost@example.com",
        "petType": "cat",
    }));
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_missing_field_is_bad_request() {
    let app = init_app!(default_state());

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({ "email": "rex@example.com" }));
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_json");
}

#[actix_web::test]
async fn test_empty_field_fails_validation() {
    let app = init_app!(default_state());

    let req = test::TestRequest::post().uri("/users").set_json(json!({
        "name": "",
        "email": "rex@example.com",
        "petType": "dog",
    }));
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_failed");
}

#[actix_web::test]
async fn test_delete_user_requires_admin() {
    let app = init_app!(default_state());

    test::call_service(&app, create_user_req("rex@example.com").to_request()).await;

    let req = test::TestRequest::delete().uri("/users").set_json(json!({
        "email": "rex@example.com",
        "admin": "wrong",
        "pass": "wrong",
    }));
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = test::call_service(
        &app,
        search("/users", json!({ "email": "rex@example.com" })).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_delete_user_cascades_to_matches_and_messages() {
    let app = init_app!(default_state());

    for email in ["a@example.com", "b@example.com"] {
        test::call_service(&app, create_user_req(email).to_request()).await;
    }

    let req = test::TestRequest::post()
        .uri("/match")
        .set_json(json!({ "email": "a@example.com", "matchee_email": "b@example.com" }));
    let created: Value = test::call_and_read_body_json(&app, req.to_request()).await;
    assert_eq!(created["owner"], 1);
    assert_eq!(created["matchee"], 2);

    test::call_service(&app, send_req("a@example.com", "b@example.com", "hi b").to_request()).await;
    test::call_service(&app, send_req("b@example.com", "a@example.com", "hi a").to_request()).await;

    let req = test::TestRequest::delete().uri("/users").set_json(json!({
        "email": "a@example.com",
        "admin": "x",
        "pass": "y",
    }));
    let deleted: Value = test::call_and_read_body_json(&app, req.to_request()).await;
    assert_eq!(deleted["email"], "a@example.com");

    let matches: Value = test::call_and_read_body_json(
        &app,
        search("/match", json!({ "email": "b@example.com" })).to_request(),
    )
    .await;
    assert!(matches["matches"].as_array().unwrap().is_empty());
    assert!(matches["matched_by"].as_array().unwrap().is_empty());

    let received: Value = test::call_and_read_body_json(
        &app,
        search("/messages", json!({ "email": "b@example.com" })).to_request(),
    )
    .await;
    assert!(received.as_array().unwrap().is_empty());

    let sent: Value = test::call_and_read_body_json(
        &app,
        search("/messages/sent", json!({ "email": "b@example.com" })).to_request(),
    )
    .await;
    assert!(sent.as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_delete_unknown_user_is_not_found() {
    let app = init_app!(default_state());

    test::call_service(&app, create_user_req("a@example.com").to_request()).await;
    test::call_service(&app, create_user_req("b@example.com").to_request()).await;

    let req = test::TestRequest::delete().uri("/users").set_json(json!({
        "email": "ghost@example.com",
        "admin": "x",
        "pass": "y",
    }));
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "not_found");

    let users: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/dbTest").to_request()).await;
    assert_eq!(users.as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn test_match_with_unknown_user_is_not_found() {
    let app = init_app!(default_state());

    test::call_service(&app, create_user_req("a@example.com").to_request()).await;

    let req = test::TestRequest::post()
        .uri("/match")
        .set_json(json!({ "email": "a@example.com", "matchee_email": "ghost@example.com" }));
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_profane_message_is_rejected_case_sensitively() {
    let app = init_app!(default_state());

    for email in ["a@example.com", "b@example.com"] {
        test::call_service(&app, create_user_req(email).to_request()).await;
    }

    let resp = test::call_service(
        &app,
        send_req("a@example.com", "b@example.com", "what the heck").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "content_rejected");
    assert_eq!(body["message"], "tsk tsk! naughty naughty! someone has a potty mouth!");

    let received: Value = test::call_and_read_body_json(
        &app,
        search("/messages", json!({ "email": "b@example.com" })).to_request(),
    )
    .await;
    assert!(received.as_array().unwrap().is_empty());

    let resp = test::call_service(
        &app,
        send_req("a@example.com", "b@example.com", "what the HECK").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_unreadable_word_list_is_internal_error() {
    let app = init_app!(state_with(
        AuthPolicy::default(),
        ProfanityFilter::from_file("/nonexistent/doggr/badwords.txt"),
    ));

    for email in ["a@example.com", "b@example.com"] {
        test::call_service(&app, create_user_req(email).to_request()).await;
    }

    let resp = test::call_service(
        &app,
        send_req("a@example.com", "b@example.com", "hello").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "internal_error");
}

#[actix_web::test]
async fn test_received_and_sent_lists_agree() {
    let app = init_app!(default_state());

    for email in ["a@example.com", "b@example.com"] {
        test::call_service(&app, create_user_req(email).to_request()).await;
    }
    for text in ["first", "second"] {
        let resp =
            test::call_service(&app, send_req("a@example.com", "b@example.com", text).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let received: Value = test::call_and_read_body_json(
        &app,
        search("/messages", json!({ "email": "b@example.com" })).to_request(),
    )
    .await;
    let sent: Value = test::call_and_read_body_json(
        &app,
        search("/messages/sent", json!({ "email": "a@example.com" })).to_request(),
    )
    .await;

    let received = received.as_array().unwrap();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0]["message"], "first");
    assert_eq!(received[1]["message"], "second");
    assert_eq!(received[0]["sender_user"], 1);
    assert_eq!(received[0]["receiver_user"], 2);
    assert_eq!(sent.as_array().unwrap(), received);
}

#[actix_web::test]
async fn test_update_message_changes_only_body() {
    let app = init_app!(default_state());

    for email in ["a@example.com", "b@example.com"] {
        test::call_service(&app, create_user_req(email).to_request()).await;
    }
    let original: Value = test::call_and_read_body_json(
        &app,
        send_req("a@example.com", "b@example.com", "hi").to_request(),
    )
    .await;

    let req = test::TestRequest::put()
        .uri("/messages")
        .set_json(json!({ "messageId": original["id"].to_string(), "message": "hello" }));
    let updated: Value = test::call_and_read_body_json(&app, req.to_request()).await;

    assert_eq!(updated["id"], original["id"]);
    assert_eq!(updated["sender_user"], original["sender_user"]);
    assert_eq!(updated["receiver_user"], original["receiver_user"]);
    assert_eq!(updated["message"], "hello");
}

#[actix_web::test]
async fn test_update_unknown_message_is_not_found() {
    let app = init_app!(default_state());

    let req = test::TestRequest::put()
        .uri("/messages")
        .set_json(json!({ "messageId": 99, "message": "hello" }));
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_message_deletes_with_wrong_admin_do_nothing() {
    let app = init_app!(default_state());

    for email in ["a@example.com", "b@example.com"] {
        test::call_service(&app, create_user_req(email).to_request()).await;
    }
    let sent: Value = test::call_and_read_body_json(
        &app,
        send_req("a@example.com", "b@example.com", "hi").to_request(),
    )
    .await;

    let req = test::TestRequest::delete().uri("/messages").set_json(json!({
        "messageId": sent["id"],
        "admin": "wrong",
        "pass": "wrong",
    }));
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "unauthorized");

    let req = test::TestRequest::delete().uri("/messages/all").set_json(json!({
        "email": "a@example.com",
        "admin": "wrong",
        "pass": "wrong",
    }));
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::delete()
        .uri("/messages/all")
        .set_json(json!({ "email": "a@example.com" }));
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let remaining: Value = test::call_and_read_body_json(
        &app,
        search("/messages/sent", json!({ "email": "a@example.com" })).to_request(),
    )
    .await;
    assert_eq!(remaining.as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_delete_single_message() {
    let app = init_app!(default_state());

    for email in ["a@example.com", "b@example.com"] {
        test::call_service(&app, create_user_req(email).to_request()).await;
    }
    let sent: Value = test::call_and_read_body_json(
        &app,
        send_req("a@example.com", "b@example.com", "hi").to_request(),
    )
    .await;

    let req = test::TestRequest::delete().uri("/messages").set_json(json!({
        "messageId": sent["id"],
        "admin": "x",
        "pass": "y",
    }));
    let deleted: Value = test::call_and_read_body_json(&app, req.to_request()).await;
    assert_eq!(deleted["id"], sent["id"]);

    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri("/messages")
            .set_json(json!({ "messageId": sent["id"], "admin": "x", "pass": "y" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_bulk_delete_keeps_received_messages() {
    let app = init_app!(default_state());

    for email in ["a@example.com", "b@example.com"] {
        test::call_service(&app, create_user_req(email).to_request()).await;
    }
    test::call_service(&app, send_req("a@example.com", "b@example.com", "one").to_request()).await;
    test::call_service(&app, send_req("a@example.com", "b@example.com", "two").to_request()).await;
    test::call_service(&app, send_req("b@example.com", "a@example.com", "reply").to_request()).await;

    let req = test::TestRequest::delete().uri("/messages/all").set_json(json!({
        "email": "a@example.com",
        "admin": "x",
        "pass": "y",
    }));
    let removed: Value = test::call_and_read_body_json(&app, req.to_request()).await;
    assert_eq!(removed.as_array().unwrap().len(), 2);

    let received: Value = test::call_and_read_body_json(
        &app,
        search("/messages", json!({ "email": "a@example.com" })).to_request(),
    )
    .await;
    assert_eq!(received.as_array().unwrap().len(), 1);
    assert_eq!(received[0]["message"], "reply");
}

#[actix_web::test]
async fn test_update_policy_guards_both_update_routes() {
    let app = init_app!(state_with(
        AuthPolicy { require_admin_for_updates: true },
        ProfanityFilter::from_words(Vec::<String>::new()),
    ));

    for email in ["a@example.com", "b@example.com"] {
        test::call_service(&app, create_user_req(email).to_request()).await;
    }
    let sent: Value = test::call_and_read_body_json(
        &app,
        send_req("a@example.com", "b@example.com", "hi").to_request(),
    )
    .await;

    let req = test::TestRequest::put().uri("/users").set_json(json!({
        "name": "Renamed",
        "email": "a@example.com",
        "petType": "cat",
    }));
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::put()
        .uri("/messages")
        .set_json(json!({ "messageId": sent["id"], "message": "edited" }));
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::put().uri("/messages").set_json(json!({
        "messageId": sent["id"],
        "message": "edited",
        "admin": "x",
        "pass": "y",
    }));
    let updated: Value = test::call_and_read_body_json(&app, req.to_request()).await;
    assert_eq!(updated["message"], "edited");
}

#[actix_web::test]
async fn test_unconfigured_admin_rejects_deletes() {
    let app = init_app!(AppState::new(
        MemoryStore::new(),
        AdminCredentials::disabled(),
        ProfanityFilter::from_words(Vec::<String>::new()),
        AuthPolicy::default(),
    ));

    test::call_service(&app, create_user_req("a@example.com").to_request()).await;

    let req = test::TestRequest::delete()
        .uri("/users")
        .set_json(json!({ "email": "a@example.com", "admin": "", "pass": "" }));
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[actix_web::test]
async fn test_mutation_logs_name_ids_not_emails() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let app = init_app!(default_state());

    test::call_service(&app, create_user_req("rex@example.com").to_request()).await;
    test::call_service(&app, create_user_req("fido@example.com").to_request()).await;
    test::call_service(
        &app,
        send_req("rex@example.com", "fido@example.com", "walk?").to_request(),
    )
    .await;

    let req = test::TestRequest::put().uri("/users").set_json(json!({
        "name": "Rex",
        "email": "rex@example.com",
        "petType": "cat",
    }));
    test::call_service(&app, req.to_request()).await;

    let req = test::TestRequest::delete().uri("/users").set_json(json!({
        "email": "rex@example.com",
        "admin": "x",
        "pass": "y",
    }));
    test::call_service(&app, req.to_request()).await;

    let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("Created new user 1"));
    assert!(output.contains("Created message 1: user 1 -> user 2"));
    assert!(output.contains("Updated user 1"));
    assert!(output.contains("Deleted user 1"));
    assert!(!output.contains("rex@example.com"));
    assert!(!output.contains("fido@example.com"));
}
