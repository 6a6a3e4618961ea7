use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// The kinds of board content a user can own.
/// Corresponds to the `entity_kind` SQL enum.
///
/// Kinds form a chain: a board holds statuses (columns), a status holds tasks,
/// a task holds subtasks.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "entity_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Board,
    Status,
    Task,
    Subtask,
}

impl EntityKind {
    /// The kind this one must be created under, if any.
    pub fn parent_kind(self) -> Option<EntityKind> {
        match self {
            EntityKind::Board => None,
            EntityKind::Status => Some(EntityKind::Board),
            EntityKind::Task => Some(EntityKind::Status),
            EntityKind::Subtask => Some(EntityKind::Task),
        }
    }

    /// Parses the plural URL segment used for this kind, e.g. `statuses`.
    pub fn from_collection(segment: &str) -> Option<EntityKind> {
        match segment {
            "boards" => Some(EntityKind::Board),
            "statuses" => Some(EntityKind::Status),
            "tasks" => Some(EntityKind::Task),
            "subtasks" => Some(EntityKind::Subtask),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Board => "board",
            EntityKind::Status => "status",
            EntityKind::Task => "task",
            EntityKind::Subtask => "subtask",
        }
    }
}

/// Fields supplied to `Store::create_entity`.
#[derive(Debug, Clone)]
pub struct EntityFields {
    pub owner_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub done: bool,
}

/// A board, status, task or subtask as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Entity {
    pub id: Uuid,
    pub kind: EntityKind,
    pub owner_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
}

impl Entity {
    /// Creates a new `Entity` with a fresh id and the current time.
    pub fn new(kind: EntityKind, fields: EntityFields) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            owner_id: fields.owner_id,
            parent_id: fields.parent_id,
            name: fields.name,
            done: fields.done,
            created_at: Utc::now(),
        }
    }
}

/// Payload for creating any entity. Tasks and subtasks may send `title` instead of `name`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct EntityInput {
    #[serde(alias = "title")]
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

/// Partial update for an entity.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct EntityPatch {
    #[serde(default, alias = "title")]
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[serde(default)]
    pub done: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SubtaskView {
    pub id: Uuid,
    pub done: bool,
    pub title: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TaskView {
    pub id: Uuid,
    pub title: String,
    pub subtasks: Vec<SubtaskView>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ColumnView {
    pub id: Uuid,
    pub name: String,
    pub tasks: Vec<TaskView>,
}

/// A board with its columns, tasks and subtasks nested inside it.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct BoardView {
    pub id: Uuid,
    pub name: String,
    pub columns: Vec<ColumnView>,
}

impl BoardView {
    /// Nests `descendants` under `board` by parent id, keeping their given order.
    /// Entities whose parent is not reachable from the board are dropped.
    pub fn assemble(board: Entity, descendants: Vec<Entity>) -> Self {
        let mut children: HashMap<Uuid, Vec<Entity>> = HashMap::new();
        for entity in descendants {
            if let Some(parent_id) = entity.parent_id {
                children.entry(parent_id).or_default().push(entity);
            }
        }

        let mut take = |id: Uuid, kind: EntityKind| -> Vec<Entity> {
            children
                .remove(&id)
                .unwrap_or_default()
                .into_iter()
                .filter(|e| e.kind == kind)
                .collect()
        };

        let mut columns = Vec::new();
        for status in take(board.id, EntityKind::Status) {
            let mut tasks = Vec::new();
            for task in take(status.id, EntityKind::Task) {
                let subtasks = take(task.id, EntityKind::Subtask)
                    .into_iter()
                    .map(|s| SubtaskView {
                        id: s.id,
                        done: s.done,
                        title: s.name,
                    })
                    .collect();
                tasks.push(TaskView {
                    id: task.id,
                    title: task.name,
                    subtasks,
                });
            }
            columns.push(ColumnView {
                id: status.id,
                name: status.name,
                tasks,
            });
        }

        BoardView {
            id: board.id,
            name: board.name,
            columns,
        }
    }
}
