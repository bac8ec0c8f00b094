// src/utils/mod.rs

pub mod formula;
pub mod hash;
pub mod html;
pub mod jwt;
