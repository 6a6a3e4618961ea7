use std::collections::HashSet;
use std::fmt;

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Process-wide key used to sign and verify session tokens.
///
/// Loaded once at startup from configuration. Every token issued under one value
/// stops verifying as soon as the process runs with another, so it must stay fixed
/// for as long as outstanding tokens are expected to work.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret(String);

impl SigningSecret {
    /// Wraps a secret value. Returns `None` for an empty or all-whitespace value.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

/// Represents the claims encoded within a session token.
///
/// There is deliberately no `exp` claim: tokens stay valid for as long as the
/// signing secret does not change.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token, the user's id.
    pub sub: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
}

/// Why a presented token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No token in the request, or an empty one.
    MissingToken,
    /// The token could not be parsed as a signed envelope.
    Malformed,
    /// The signature does not match the claims under the configured secret.
    InvalidSignature,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "token must be provided"),
            AuthError::Malformed => write!(f, "token is malformed"),
            AuthError::InvalidSignature => write!(f, "invalid token"),
        }
    }
}

impl std::error::Error for AuthError {}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.required_spec_claims = HashSet::new();
    validation.validate_exp = false;
    validation
}

fn sign(subject: Uuid, key: &EncodingKey) -> Result<String, AppError> {
    let claims = Claims {
        sub: subject.to_string(),
        iat: chrono::Utc::now().timestamp(),
    };

    encode(&Header::new(Algorithm::HS256), &claims, key)
        .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
}

fn check(token: &str, key: &DecodingKey, validation: &Validation) -> Result<Uuid, AuthError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    let data = decode::<Claims>(token, key, validation).map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    })?;

    Uuid::parse_str(&data.claims.sub).map_err(|_| AuthError::Malformed)
}

/// Signs a session token asserting that `subject` authenticated.
pub fn issue_token(subject: Uuid, secret: &SigningSecret) -> Result<String, AppError> {
    sign(subject, &EncodingKey::from_secret(secret.as_bytes()))
}

/// Verifies a session token and returns the subject it was issued for.
///
/// An empty token is `MissingToken`, anything that does not parse as a signed
/// token is `Malformed`, and a token whose signature does not match under
/// `secret` is `InvalidSignature`.
pub fn verify_token(token: &str, secret: &SigningSecret) -> Result<Uuid, AuthError> {
    check(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation(),
    )
}

/// Issues and verifies session tokens under one fixed signing secret.
///
/// Holds the derived keys so they are built once per process rather than per
/// request. Stateless otherwise, so it is shared freely across workers.
pub struct SessionTokenAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl SessionTokenAuthority {
    pub fn new(secret: &SigningSecret) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: validation(),
        }
    }

    pub fn issue(&self, subject: Uuid) -> Result<String, AppError> {
        sign(subject, &self.encoding_key)
    }

    pub fn verify(&self, token: &str) -> Result<Uuid, AuthError> {
        check(token, &self.decoding_key, &self.validation)
    }
}
