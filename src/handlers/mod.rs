// src/handlers/mod.rs

pub mod analytics;
pub mod companion;
pub mod history;
pub mod profile;
pub mod quiz;
pub mod session;
