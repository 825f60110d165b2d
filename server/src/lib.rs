// Library exports for the binaries and integration tests

pub mod auth_token;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod service;
pub mod session;
pub mod state;
