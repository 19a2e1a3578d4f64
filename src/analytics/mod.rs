// src/analytics/mod.rs

pub mod achievements;
pub mod dashboard;
pub mod progress;
