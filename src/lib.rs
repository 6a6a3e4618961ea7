#![doc = "The `taskboard` library crate."]
#![doc = ""]
#![doc = "Boards, statuses, tasks and subtasks behind a session-token authenticated"]
#![doc = "REST API. Holds the credential store, the session token authority and its"]
#![doc = "middleware, the data-access layer, routing configuration and error handling."]
#![doc = "The binary (`main.rs`) wires these together and runs the server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;

pub use crate::error::AppError;
