pub mod auth;
pub mod config;
pub mod error;
pub mod response;
pub mod seed;
pub mod state;
pub mod web;
