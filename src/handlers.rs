// src/handlers.rs

pub mod dashboard;
pub mod documents;
pub mod leads;
pub mod products;
pub mod proposals;
pub mod sales;

#[cfg(test)]
mod tests;
