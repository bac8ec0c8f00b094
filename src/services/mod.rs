// src/services/mod.rs

pub mod ai;
pub mod analysis;
pub mod cache;
pub mod questions;
pub mod samples;
pub mod scoring;
pub mod store;
