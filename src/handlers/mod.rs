// src/handlers/mod.rs

pub mod admin;
pub mod auth;
pub mod formula;
pub mod lecture;
pub mod quiz;
