#![allow(dead_code)]

use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse},
    http::StatusCode,
    middleware::Logger,
    test, web, App,
};
use serde_json::{json, Value};
use taskboard::auth::{SessionTokenAuthority, SigningSecret};
use taskboard::routes::{self, health};
use taskboard::store::{MemoryStore, Store};

pub const SECRET: &str = "integration-test-secret";

pub fn secret() -> SigningSecret {
    SigningSecret::new(SECRET).expect("non-empty secret")
}

/// The application as `main` builds it, minus CORS, over a fresh in-memory store.
pub fn app() -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let authority = Arc::new(SessionTokenAuthority::new(&secret()));

    App::new()
        .wrap(Logger::default())
        .service(health::health)
        .service(web::scope("/api").configure(move |cfg| routes::config(cfg, store, authority)))
}

/// Response status and parsed JSON body (`Value::Null` when the body is empty).
pub async fn send(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    req: actix_http::Request,
) -> (StatusCode, Value) {
    // Errors returned by middleware are rendered the way the server renders them.
    let (status, body) = match test::try_call_service(app, req).await {
        Ok(resp) => (resp.status(), test::read_body(resp).await),
        Err(err) => {
            let resp = err.error_response();
            let status = resp.status();
            let body = actix_web::body::to_bytes(resp.into_body())
                .await
                .unwrap_or_default();
            (status, body)
        }
    };
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| {
            panic!("Body is not JSON: {:?}", String::from_utf8_lossy(&body))
        })
    };
    (status, json)
}

/// Signs up a user and returns its session token. Panics unless the server answers 201.
pub async fn signup(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    name: &str,
    email: &str,
    password: &str,
) -> String {
    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(&json!({ "name": name, "email": email, "password": password }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "Signup failed. Body: {}", body);

    body["token"]
        .as_str()
        .expect("signup response should carry a token")
        .to_string()
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
