pub mod assistant;
pub mod auth;
pub mod host;
pub mod state;
pub mod tools;
pub mod workflow;
