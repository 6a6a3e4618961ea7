pub mod entity;
pub mod user;

pub use entity::{BoardView, Entity, EntityFields, EntityInput, EntityKind, EntityPatch};
pub use user::{NewUser, User, UserRecord};
