mod common;

use actix_web::{cookie::Cookie, http::StatusCode, test};
use pretty_assertions::assert_eq;
use serde_json::json;
use taskboard::auth::{issue_token, verify_token, SigningSecret, TOKEN_COOKIE};
use uuid::Uuid;

use common::{bearer, send, signup};

#[test_log::test(actix_rt::test)]
async fn test_signup_sets_token_and_hides_password() {
    let app = test::init_service(common::app()).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(&json!({
            "name": "Ann",
            "email": "ann@example.com",
            "password": "longenough"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == TOKEN_COOKIE)
        .map(|c| c.into_owned())
        .expect("signup should set the token cookie");
    assert_eq!(cookie.http_only(), Some(true));

    let body_bytes = test::read_body(resp).await;
    let raw_body = String::from_utf8_lossy(&body_bytes).to_string();
    assert!(!raw_body.contains("password"), "Body leaks a password field: {}", raw_body);
    assert!(!raw_body.contains("longenough"));

    let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
    let token = body["token"].as_str().unwrap();
    assert_eq!(token, cookie.value());
    assert_eq!(body["user"]["name"], "Ann");
    assert_eq!(body["user"]["email"], "ann@example.com");

    let user_id: Uuid = body["user"]["id"].as_str().unwrap().parse().unwrap();
    assert_eq!(verify_token(token, &common::secret()), Ok(user_id));
}

#[actix_rt::test]
async fn test_duplicate_signup_is_rejected() {
    let app = test::init_service(common::app()).await;
    signup(&app, "Ann", "ann@example.com", "longenough").await;

    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(&json!({
            "name": "Another Ann",
            "email": "ann@example.com",
            "password": "differentpassword"
        }))
        .to_request();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "there is already a user with this email!");
}

#[actix_rt::test]
async fn test_signin_success() {
    let app = test::init_service(common::app()).await;
    signup(&app, "Ann", "ann@example.com", "longenough").await;

    let req = test::TestRequest::post()
        .uri("/api/auth/signin")
        .set_json(&json!({ "email": "ann@example.com", "password": "longenough" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp
        .response()
        .cookies()
        .any(|c| c.name() == TOKEN_COOKIE));

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["name"], "Ann");
    assert!(body.get("password").is_none());

    let token = body["token"].as_str().unwrap();
    let req = test::TestRequest::get()
        .uri("/api/boards")
        .insert_header(bearer(token))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_rt::test]
async fn test_signin_failures_are_indistinguishable() {
    let app = test::init_service(common::app()).await;
    signup(&app, "Ann", "ann@example.com", "longenough").await;

    let wrong_password = test::TestRequest::post()
        .uri("/api/auth/signin")
        .set_json(&json!({ "email": "ann@example.com", "password": "notthepassword" }))
        .to_request();
    let (wrong_password_status, wrong_password_body) = send(&app, wrong_password).await;

    let unknown_email = test::TestRequest::post()
        .uri("/api/auth/signin")
        .set_json(&json!({ "email": "nobody@example.com", "password": "longenough" }))
        .to_request();
    let (unknown_email_status, unknown_email_body) = send(&app, unknown_email).await;

    let short_password = test::TestRequest::post()
        .uri("/api/auth/signin")
        .set_json(&json!({ "email": "ann@example.com", "password": "wrong" }))
        .to_request();
    let (short_password_status, short_password_body) = send(&app, short_password).await;

    assert_eq!(wrong_password_status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_password_body["error"], "Invalid email or password");
    assert_eq!(unknown_email_status, wrong_password_status);
    assert_eq!(unknown_email_body, wrong_password_body);
    assert_eq!(short_password_status, wrong_password_status);
    assert_eq!(short_password_body, wrong_password_body);
}

#[actix_rt::test]
async fn test_validation_errors_do_not_echo_password() {
    let app = test::init_service(common::app()).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(&json!({ "name": "Ann", "email": "ann@example.com", "password": "s3cr3t" }))
        .to_request();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "password: password must be at least 8 characters");
    assert!(!body.to_string().contains("s3cr3t"), "Body echoes the password: {}", body);
}

#[actix_rt::test]
async fn test_invalid_signup_inputs() {
    let app = test::init_service(common::app()).await;

    let test_cases = vec![
        // Deserialization errors (expect 400 for missing fields)
        (
            json!({ "email": "ann@example.com", "password": "longenough" }),
            StatusCode::BAD_REQUEST,
            "missing name",
        ),
        (
            json!({ "name": "Ann", "password": "longenough" }),
            StatusCode::BAD_REQUEST,
            "missing email",
        ),
        (
            json!({ "name": "Ann", "email": "ann@example.com" }),
            StatusCode::BAD_REQUEST,
            "missing password",
        ),
        // Validation errors (expect 422 after successful deserialization)
        (
            json!({ "name": "Ann", "email": "invalid-email", "password": "longenough" }),
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid email format",
        ),
        (
            json!({ "name": "", "email": "ann@example.com", "password": "longenough" }),
            StatusCode::UNPROCESSABLE_ENTITY,
            "empty name",
        ),
        (
            json!({ "name": "Ann", "email": "ann@example.com", "password": "short" }),
            StatusCode::UNPROCESSABLE_ENTITY,
            "password too short",
        ),
    ];

    for (payload, expected_status, description) in test_cases {
        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body_bytes = test::read_body(resp).await;

        assert_eq!(
            status,
            expected_status,
            "Test case failed: {}. Body: {:?}",
            description,
            String::from_utf8_lossy(&body_bytes)
        );
    }
}

#[actix_rt::test]
async fn test_protected_route_without_token() {
    let app = test::init_service(common::app()).await;

    let req = test::TestRequest::get().uri("/api/boards").to_request();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "token must be provided");
}

#[actix_rt::test]
async fn test_protected_route_rejects_bad_tokens() {
    let app = test::init_service(common::app()).await;
    let ann = signup(&app, "Ann", "ann@example.com", "longenough").await;
    let bob = signup(&app, "Bob", "bob@example.com", "longenough").await;

    // Bob's claims under Ann's signature.
    let ann_parts: Vec<&str> = ann.split('.').collect();
    let bob_parts: Vec<&str> = bob.split('.').collect();
    let tampered = format!("{}.{}.{}", ann_parts[0], bob_parts[1], ann_parts[2]);

    let foreign_secret = SigningSecret::new("some-other-deployment").unwrap();
    let foreign = issue_token(Uuid::new_v4(), &foreign_secret).unwrap();

    let cases = vec![
        (tampered, "invalid token"),
        (foreign, "invalid token"),
        ("not-a-token".to_string(), "token is malformed"),
    ];

    for (token, expected_error) in cases {
        let req = test::TestRequest::get()
            .uri("/api/boards")
            .insert_header(bearer(&token))
            .to_request();
        let (status, body) = send(&app, req).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED, "Token accepted: {}", token);
        assert_eq!(body["error"], expected_error);
    }
}

#[actix_rt::test]
async fn test_token_cookie_grants_access() {
    let app = test::init_service(common::app()).await;
    let token = signup(&app, "Ann", "ann@example.com", "longenough").await;

    let req = test::TestRequest::post()
        .uri("/api/boards")
        .cookie(Cookie::new(TOKEN_COOKIE, token.clone()))
        .set_json(&json!({ "name": "From a cookie" }))
        .to_request();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::CREATED, "Body: {}", body);
    assert_eq!(body["name"], "From a cookie");

    let req = test::TestRequest::get()
        .uri("/api/boards")
        .insert_header((actix_web::http::header::AUTHORIZATION, "Bearer "))
        .cookie(Cookie::new(TOKEN_COOKIE, token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK, "Body: {}", body);
}

#[actix_rt::test]
async fn test_health_is_public() {
    let app = test::init_service(common::app()).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
