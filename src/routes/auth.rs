use crate::{
    auth::{session_cookie, AuthResponse, CredentialStore, SessionTokenAuthority, SigninRequest, SignupRequest},
    error::AppError,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Sign up a new user
///
/// Creates the account, then answers 201 with a session token in the body and in
/// an `HttpOnly` cookie.
#[post("/signup")]
pub async fn signup(
    credentials: web::Data<CredentialStore>,
    authority: web::Data<SessionTokenAuthority>,
    signup_data: web::Json<SignupRequest>,
) -> Result<impl Responder, AppError> {
    signup_data.validate()?;

    let user = credentials
        .register(&signup_data.name, &signup_data.email, &signup_data.password)
        .await?;
    let token = authority.issue(user.id)?;

    Ok(HttpResponse::Created()
        .cookie(session_cookie(&token))
        .json(AuthResponse { token, user }))
}

/// Sign in an existing user
///
/// Wrong password and unknown email get the same 400 answer.
#[post("/signin")]
pub async fn signin(
    credentials: web::Data<CredentialStore>,
    authority: web::Data<SessionTokenAuthority>,
    signin_data: web::Json<SigninRequest>,
) -> Result<impl Responder, AppError> {
    signin_data.validate()?;

    let user = credentials
        .authenticate(&signin_data.email, &signin_data.password)
        .await?;
    let token = authority.issue(user.id)?;

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&token))
        .json(AuthResponse { token, user }))
}
