// src/models/mod.rs

pub mod achievement;
pub mod question;
pub mod quiz;
pub mod staged;
pub mod topic;
pub mod user;
