#![doc = "The `task_management` library crate."]
#![doc = ""]
#![doc = "Domain models, storage, authentication, services, routing and error handling of the"]
#![doc = "task management API. The binary (`main.rs`) wires these together and runs the server."]

pub mod auth;
pub mod cache;
pub mod config;
pub mod cors;
pub mod dto;
pub mod error;
pub mod models;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod service;

pub use error::AppError;
pub use service::AppState;
