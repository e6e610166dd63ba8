// src/services.rs

pub mod classifier;
pub mod dashboard_service;
pub mod document_service;
pub mod lead_board;
pub mod lead_service;
pub mod product_service;
pub mod rescue;
pub mod temporal;
