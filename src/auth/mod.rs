pub mod credentials;
pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use actix_web::cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::User;

// Re-export necessary items
pub use credentials::{CredentialStore, INVALID_CREDENTIALS};
pub use extractors::AuthenticatedUserId;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{issue_token, verify_token, AuthError, Claims, SessionTokenAuthority, SigningSecret};

/// Name of the cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "token";

/// Represents the payload for a sign-in request.
#[derive(Debug, Deserialize, Validate)]
pub struct SigninRequest {
    /// User's email address.
    /// Must be a valid email format.
    #[validate(email)]
    pub email: String,
    /// User's password. Length is only enforced at sign-up; a short password
    /// here fails like any other wrong one.
    pub password: String,
}

/// Represents the payload for a new user sign-up request.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// Display name, 1 to 50 characters.
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    /// Email address for the new account.
    /// Must be a valid email format.
    #[validate(email)]
    pub email: String,
    /// Password for the new account.
    /// Must be at least 8 characters long.
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

/// Response body after a successful sign-up or sign-in.
/// The same token is also set as an `HttpOnly` cookie.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The session token.
    pub token: String,
    /// The authenticated user.
    pub user: User,
}

/// Builds the `HttpOnly` cookie that carries a session token.
pub fn session_cookie(token: &str) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, token.to_owned())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}
