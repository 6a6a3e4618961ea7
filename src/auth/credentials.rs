use std::sync::Arc;

use lazy_static::lazy_static;
use tokio::task::spawn_blocking;

use crate::auth::password::{hash_password, verify_password};
use crate::error::AppError;
use crate::models::{NewUser, User};
use crate::store::{Store, DUPLICATE_EMAIL};

/// Message for every failed sign-in, whichever of email or password was wrong.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

lazy_static! {
    // Verified against when the email is unknown, so that path costs a full hash too.
    static ref DUMMY_HASH: Option<String> = hash_password("dummy-password-for-timing").ok();
}

/// Turns plaintext passwords into stored credentials and checks sign-in attempts.
///
/// Hashing is CPU and memory heavy, so it runs on the blocking pool rather than
/// on the request's worker thread.
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn Store>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Creates a user with a freshly hashed password.
    ///
    /// Fails with `AppError::DuplicateResource` if the email is already registered.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<User, AppError> {
        if self.store.find_user_by_email(email).await?.is_some() {
            return Err(AppError::DuplicateResource(DUPLICATE_EMAIL.into()));
        }

        let password = password.to_owned();
        let password_hash = spawn_blocking(move || hash_password(&password)).await??;

        let user = self
            .store
            .create_user(NewUser {
                name: name.to_owned(),
                email: email.to_owned(),
                password_hash,
            })
            .await?;

        log::info!("Registered user {}", user.id);
        Ok(user)
    }

    /// Returns the user if `password` matches the one stored for `email`.
    ///
    /// Unknown email and wrong password fail identically with `AppError::BadRequest`.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AppError> {
        let record = self.store.find_user_by_email(email).await?;

        let stored_hash = record.as_ref().map(|r| r.password_hash.clone());
        let password = password.to_owned();
        let matches = spawn_blocking(move || match stored_hash {
            Some(hash) => verify_password(&password, &hash),
            None => {
                if let Some(dummy) = DUMMY_HASH.as_ref() {
                    verify_password(&password, dummy);
                }
                false
            }
        })
        .await?;

        match record {
            Some(record) if matches => Ok(record.into_user()),
            _ => Err(AppError::BadRequest(INVALID_CREDENTIALS.into())),
        }
    }
}
