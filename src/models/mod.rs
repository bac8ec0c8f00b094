// src/models/mod.rs

pub mod analysis;
pub mod lecture;
pub mod question;
pub mod user;
