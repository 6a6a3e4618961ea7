use futures::future::BoxFuture;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Store, DUPLICATE_EMAIL};
use crate::error::AppError;
use crate::models::{Entity, EntityFields, EntityKind, EntityPatch, NewUser, User, UserRecord};

const ENTITY_COLUMNS: &str = "id, kind, owner_id, parent_id, name, done, created_at";

/// Postgres-backed store. Cloning shares the underlying connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_insert_error(error: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &error {
        if db.is_unique_violation() {
            return AppError::DuplicateResource(DUPLICATE_EMAIL.into());
        }
    }
    error.into()
}

impl Store for PgStore {
    fn find_user_by_email<'a>(
        &'a self,
        email: &'a str,
    ) -> BoxFuture<'a, Result<Option<UserRecord>, AppError>> {
        Box::pin(async move {
            let user = sqlx::query_as::<_, UserRecord>(
                "SELECT id, name, email, password_hash, created_at FROM users WHERE email = $1",
            )
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
            Ok(user)
        })
    }

    fn create_user(&self, new_user: NewUser) -> BoxFuture<'_, Result<User, AppError>> {
        Box::pin(async move {
            sqlx::query_as::<_, User>(
                "INSERT INTO users (id, name, email, password_hash) VALUES ($1, $2, $3, $4) \
                 RETURNING id, name, email, created_at",
            )
            .bind(Uuid::new_v4())
            .bind(&new_user.name)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(map_insert_error)
        })
    }

    fn create_entity(
        &self,
        kind: EntityKind,
        fields: EntityFields,
    ) -> BoxFuture<'_, Result<Entity, AppError>> {
        Box::pin(async move {
            let entity = Entity::new(kind, fields);
            let sql = format!(
                "INSERT INTO entities ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {cols}",
                cols = ENTITY_COLUMNS
            );
            let created = sqlx::query_as::<_, Entity>(&sql)
                .bind(entity.id)
                .bind(entity.kind)
                .bind(entity.owner_id)
                .bind(entity.parent_id)
                .bind(&entity.name)
                .bind(entity.done)
                .bind(entity.created_at)
                .fetch_one(&self.pool)
                .await?;
            Ok(created)
        })
    }

    fn find_entity(
        &self,
        kind: EntityKind,
        id: Uuid,
        owner_id: Uuid,
    ) -> BoxFuture<'_, Result<Option<Entity>, AppError>> {
        Box::pin(async move {
            let sql = format!(
                "SELECT {} FROM entities WHERE id = $1 AND kind = $2 AND owner_id = $3",
                ENTITY_COLUMNS
            );
            let entity = sqlx::query_as::<_, Entity>(&sql)
                .bind(id)
                .bind(kind)
                .bind(owner_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(entity)
        })
    }

    fn list_entities(
        &self,
        kind: EntityKind,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
    ) -> BoxFuture<'_, Result<Vec<Entity>, AppError>> {
        Box::pin(async move {
            let sql = format!(
                "SELECT {} FROM entities \
                 WHERE kind = $1 AND owner_id = $2 AND parent_id IS NOT DISTINCT FROM $3 \
                 ORDER BY created_at, id",
                ENTITY_COLUMNS
            );
            let entities = sqlx::query_as::<_, Entity>(&sql)
                .bind(kind)
                .bind(owner_id)
                .bind(parent_id)
                .fetch_all(&self.pool)
                .await?;
            Ok(entities)
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
            let sql = format!(
                "UPDATE entities SET name = COALESCE($4, name), done = COALESCE($5, done) \
                 WHERE id = $1 AND kind = $2 AND owner_id = $3 RETURNING {}",
                ENTITY_COLUMNS
            );
            let entity = sqlx::query_as::<_, Entity>(&sql)
                .bind(id)
                .bind(kind)
                .bind(owner_id)
                .bind(patch.name)
                .bind(patch.done)
                .fetch_optional(&self.pool)
                .await?;
            Ok(entity)
        })
    }

    fn delete_entity(
        &self,
        kind: EntityKind,
        id: Uuid,
        owner_id: Uuid,
    ) -> BoxFuture<'_, Result<bool, AppError>> {
        Box::pin(async move {
            // Descendants go with it through ON DELETE CASCADE.
            let result =
                sqlx::query("DELETE FROM entities WHERE id = $1 AND kind = $2 AND owner_id = $3")
                    .bind(id)
                    .bind(kind)
                    .bind(owner_id)
                    .execute(&self.pool)
                    .await?;
            Ok(result.rows_affected() > 0)
        })
    }
}
