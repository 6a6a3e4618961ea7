//! Data-access layer.
//!
//! Handlers and the credential store talk to persistence only through the
//! [`Store`] trait, so the Postgres backend and the in-memory backend are
//! interchangeable. Methods return boxed futures to keep the trait object safe;
//! the application holds a single `Arc<dyn Store>` built at startup.

pub mod memory;
pub mod postgres;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Entity, EntityFields, EntityKind, EntityPatch, NewUser, User, UserRecord};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Message used whenever an email is already taken.
pub const DUPLICATE_EMAIL: &str = "there is already a user with this email!";

pub trait Store: Send + Sync {
    fn find_user_by_email<'a>(
        &'a self,
        email: &'a str,
    ) -> BoxFuture<'a, Result<Option<UserRecord>, AppError>>;

    /// Inserts a user. Fails with `AppError::DuplicateResource` if the email is taken.
    fn create_user(&self, new_user: NewUser) -> BoxFuture<'_, Result<User, AppError>>;

    fn create_entity(
        &self,
        kind: EntityKind,
        fields: EntityFields,
    ) -> BoxFuture<'_, Result<Entity, AppError>>;

    /// Looks up an entity of `kind` owned by `owner_id`.
    fn find_entity(
        &self,
        kind: EntityKind,
        id: Uuid,
        owner_id: Uuid,
    ) -> BoxFuture<'_, Result<Option<Entity>, AppError>>;

    /// Lists entities of `kind` owned by `owner_id` under `parent_id`, oldest first.
    fn list_entities(
        &self,
        kind: EntityKind,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
    ) -> BoxFuture<'_, Result<Vec<Entity>, AppError>>;

    /// Applies `patch` and returns the updated entity, or `None` if it does not exist.
    fn update_entity(
        &self,
        kind: EntityKind,
        id: Uuid,
        owner_id: Uuid,
        patch: EntityPatch,
    ) -> BoxFuture<'_, Result<Option<Entity>, AppError>>;

    /// Deletes an entity and everything beneath it. Returns whether it existed.
    fn delete_entity(
        &self,
        kind: EntityKind,
        id: Uuid,
        owner_id: Uuid,
    ) -> BoxFuture<'_, Result<bool, AppError>>;
}
