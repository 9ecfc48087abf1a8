pub mod bootstrapper;
pub mod config;
pub mod db;
pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod migrations;
pub mod models;
pub mod services;
pub mod state;
