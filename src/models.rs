// src/models.rs

pub mod dashboard;
pub mod lead;
pub mod pipeline;
pub mod product;
