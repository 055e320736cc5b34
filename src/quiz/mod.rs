// src/quiz/mod.rs

pub mod attempt;
pub mod loader;
pub mod recorder;
pub mod registry;
pub mod sample;
pub mod scorer;
pub mod timer;
pub mod tracker;
