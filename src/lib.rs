pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod state;
pub mod training_plans;
pub mod users;
pub mod workouts;
