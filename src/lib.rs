//! Gamification backend: games with nested badges, missions, players and categories,
//! persisted as whole aggregates behind a REST API.

pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
