use std::collections::{HashMap, HashSet};

use chrono::Utc;
use futures::future::BoxFuture;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, DUPLICATE_EMAIL};
use crate::error::AppError;
use crate::models::{Entity, EntityFields, EntityKind, EntityPatch, NewUser, User, UserRecord};

/// Process-local store. Used by the test suite and when no database is configured.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserRecord>>,
    entities: RwLock<Vec<Entity>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn find_user_by_email<'a>(
        &'a self,
        email: &'a str,
    ) -> BoxFuture<'a, Result<Option<UserRecord>, AppError>> {
        Box::pin(async move { Ok(self.users.read().await.get(email).cloned()) })
    }

    fn create_user(&self, new_user: NewUser) -> BoxFuture<'_, Result<User, AppError>> {
        Box::pin(async move {
            let mut users = self.users.write().await;
            if users.contains_key(&new_user.email) {
                return Err(AppError::DuplicateResource(DUPLICATE_EMAIL.into()));
            }

            let record = UserRecord {
                id: Uuid::new_v4(),
                name: new_user.name,
                email: new_user.email,
                password_hash: new_user.password_hash,
                created_at: Utc::now(),
            };
            users.insert(record.email.clone(), record.clone());
            Ok(record.into_user())
        })
    }

    fn create_entity(
        &self,
        kind: EntityKind,
        fields: EntityFields,
    ) -> BoxFuture<'_, Result<Entity, AppError>> {
        Box::pin(async move {
            let entity = Entity::new(kind, fields);
            self.entities.write().await.push(entity.clone());
            Ok(entity)
        })
    }

    fn find_entity(
        &self,
        kind: EntityKind,
        id: Uuid,
        owner_id: Uuid,
    ) -> BoxFuture<'_, Result<Option<Entity>, AppError>> {
        Box::pin(async move {
            Ok(self
                .entities
                .read()
                .await
                .iter()
                .find(|e| e.id == id && e.kind == kind && e.owner_id == owner_id)
                .cloned())
        })
    }

    fn list_entities(
        &self,
        kind: EntityKind,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
    ) -> BoxFuture<'_, Result<Vec<Entity>, AppError>> {
        Box::pin(async move {
            Ok(self
                .entities
                .read()
                .await
                .iter()
                .filter(|e| e.kind == kind && e.owner_id == owner_id && e.parent_id == parent_id)
                .cloned()
                .collect())
        })
    }

    fn update_entity(
        &self,
        kind: EntityKind,
        id: Uuid,
        owner_id: Uuid,
        patch: EntityPatch,
    ) -> BoxFuture<'_, Result<Option<Entity>, AppError>> {
        Box::pin(async move {
            let mut entities = self.entities.write().await;
            let entity = entities
                .iter_mut()
                .find(|e| e.id == id && e.kind == kind && e.owner_id == owner_id);

            Ok(entity.map(|entity| {
                if let Some(name) = patch.name {
                    entity.name = name;
                }
                if let Some(done) = patch.done {
                    entity.done = done;
                }
                entity.clone()
            }))
        })
    }

    fn delete_entity(
        &self,
        kind: EntityKind,
        id: Uuid,
        owner_id: Uuid,
    ) -> BoxFuture<'_, Result<bool, AppError>> {
        Box::pin(async move {
            let mut entities = self.entities.write().await;
            if !entities
                .iter()
                .any(|e| e.id == id && e.kind == kind && e.owner_id == owner_id)
            {
                return Ok(false);
            }

            // Entities are appended after their parent, so one forward pass
            // collects the whole subtree.
            let mut doomed = HashSet::from([id]);
            for entity in entities.iter() {
                if entity.parent_id.map_or(false, |p| doomed.contains(&p)) {
                    doomed.insert(entity.id);
                }
            }
            entities.retain(|e| !doomed.contains(&e.id));
            Ok(true)
        })
    }
}
