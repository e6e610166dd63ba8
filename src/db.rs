// src/db.rs

pub mod document_store;
pub mod lead_repo;
pub mod product_repo;

#[cfg(test)]
pub mod memory;

pub use document_store::{DocumentStore, FsDocumentStore};
pub use lead_repo::{LeadRepository, LeadStore};
pub use product_repo::{ProductRepository, ProductStore};
