// src/models/mod.rs

pub mod course;
pub mod post;
pub mod quiz;
pub mod submission;
