pub mod config;
pub mod domain;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod infra;
pub mod password;
pub mod router;
pub mod state;
pub mod usecase;
