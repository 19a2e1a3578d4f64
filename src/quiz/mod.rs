// src/quiz/mod.rs

pub mod builder;
pub mod recorder;
pub mod runner;
pub mod session;
