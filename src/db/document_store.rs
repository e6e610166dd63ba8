// src/db/document_store.rs
//
// Armazenamento dos PDFs de proposta. Cada arquivo é endereçado só pelo nome.

use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;

use crate::common::error::AppError;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn put(&self, name: &str, bytes: &[u8]) -> Result<(), AppError>;
    async fn get(&self, name: &str) -> Result<Vec<u8>, AppError>;
    async fn delete(&self, name: &str) -> Result<(), AppError>;
}

/// Guarda os arquivos num diretório local.
#[derive(Clone)]
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn put(&self, name: &str, bytes: &[u8]) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(name), bytes).await?;
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Vec<u8>, AppError> {
        match tokio::fs::read(self.root.join(name)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(AppError::DocumentNotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, name: &str) -> Result<(), AppError> {
        match tokio::fs::remove_file(self.root.join(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(AppError::DocumentNotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
