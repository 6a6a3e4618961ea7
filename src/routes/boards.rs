use crate::{
    auth::AuthenticatedUserId,
    error::AppError,
    models::{BoardView, Entity, EntityFields, EntityInput, EntityKind, EntityPatch},
    store::Store,
};
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

fn not_found(kind: EntityKind) -> AppError {
    AppError::NotFound(format!("{} not found", kind.label()))
}

fn collection(segment: &str) -> Result<EntityKind, AppError> {
    EntityKind::from_collection(segment)
        .ok_or_else(|| AppError::NotFound(format!("unknown collection: {}", segment)))
}

/// Creates `kind` under `parent_id`, which must be a parent of the right kind
/// owned by the same user.
async fn create_entity(
    store: &dyn Store,
    owner_id: Uuid,
    kind: EntityKind,
    parent_id: Option<Uuid>,
    input: EntityInput,
) -> Result<Entity, AppError> {
    input.validate()?;

    if let (Some(parent_kind), Some(parent_id)) = (kind.parent_kind(), parent_id) {
        if store
            .find_entity(parent_kind, parent_id, owner_id)
            .await?
            .is_none()
        {
            return Err(not_found(parent_kind));
        }
    }

    store
        .create_entity(
            kind,
            EntityFields {
                owner_id,
                parent_id,
                name: input.name,
                done: false,
            },
        )
        .await
}

/// Lists the boards owned by the authenticated user, oldest first.
#[get("/boards")]
pub async fn list_boards(
    store: web::Data<dyn Store>,
    user: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let boards = store.list_entities(EntityKind::Board, user.0, None).await?;
    Ok(HttpResponse::Ok().json(boards))
}

#[post("/boards")]
pub async fn create_board(
    store: web::Data<dyn Store>,
    user: AuthenticatedUserId,
    input: web::Json<EntityInput>,
) -> Result<impl Responder, AppError> {
    let board = create_entity(
        store.get_ref(),
        user.0,
        EntityKind::Board,
        None,
        input.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Created().json(board))
}

/// Returns a board with its columns, tasks and subtasks nested inside it.
#[get("/boards/{id}")]
pub async fn get_board(
    store: web::Data<dyn Store>,
    user: AuthenticatedUserId,
    board_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let owner_id = user.0;
    let board = store
        .find_entity(EntityKind::Board, board_id.into_inner(), owner_id)
        .await?
        .ok_or_else(|| not_found(EntityKind::Board))?;

    let mut descendants = Vec::new();
    let statuses = store
        .list_entities(EntityKind::Status, owner_id, Some(board.id))
        .await?;
    for status in statuses {
        let tasks = store
            .list_entities(EntityKind::Task, owner_id, Some(status.id))
            .await?;
        descendants.push(status);
        for task in tasks {
            let subtasks = store
                .list_entities(EntityKind::Subtask, owner_id, Some(task.id))
                .await?;
            descendants.push(task);
            descendants.extend(subtasks);
        }
    }

    Ok(HttpResponse::Ok().json(BoardView::assemble(board, descendants)))
}

#[post("/boards/{id}/statuses")]
pub async fn create_status(
    store: web::Data<dyn Store>,
    user: AuthenticatedUserId,
    board_id: web::Path<Uuid>,
    input: web::Json<EntityInput>,
) -> Result<impl Responder, AppError> {
    let status = create_entity(
        store.get_ref(),
        user.0,
        EntityKind::Status,
        Some(board_id.into_inner()),
        input.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Created().json(status))
}

#[post("/statuses/{id}/tasks")]
pub async fn create_task(
    store: web::Data<dyn Store>,
    user: AuthenticatedUserId,
    status_id: web::Path<Uuid>,
    input: web::Json<EntityInput>,
) -> Result<impl Responder, AppError> {
    let task = create_entity(
        store.get_ref(),
        user.0,
        EntityKind::Task,
        Some(status_id.into_inner()),
        input.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Created().json(task))
}

#[post("/tasks/{id}/subtasks")]
pub async fn create_subtask(
    store: web::Data<dyn Store>,
    user: AuthenticatedUserId,
    task_id: web::Path<Uuid>,
    input: web::Json<EntityInput>,
) -> Result<impl Responder, AppError> {
    let subtask = create_entity(
        store.get_ref(),
        user.0,
        EntityKind::Subtask,
        Some(task_id.into_inner()),
        input.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Created().json(subtask))
}

/// Renames an entity or toggles its `done` flag.
#[patch("/{collection}/{id}")]
pub async fn update_entity(
    store: web::Data<dyn Store>,
    user: AuthenticatedUserId,
    path: web::Path<(String, Uuid)>,
    patch: web::Json<EntityPatch>,
) -> Result<impl Responder, AppError> {
    let (segment, id) = path.into_inner();
    let kind = collection(&segment)?;
    patch.validate()?;

    let entity = store
        .update_entity(kind, id, user.0, patch.into_inner())
        .await?
        .ok_or_else(|| not_found(kind))?;
    Ok(HttpResponse::Ok().json(entity))
}

/// Deletes an entity together with everything nested under it.
#[delete("/{collection}/{id}")]
pub async fn delete_entity(
    store: web::Data<dyn Store>,
    user: AuthenticatedUserId,
    path: web::Path<(String, Uuid)>,
) -> Result<impl Responder, AppError> {
    let (segment, id) = path.into_inner();
    let kind = collection(&segment)?;

    if !store.delete_entity(kind, id, user.0).await? {
        return Err(not_found(kind));
    }
    log::info!("User {} deleted {} {}", user.0, kind.label(), id);
    Ok(HttpResponse::NoContent().finish())
}
