// src/services/document_service.rs
//
// PDFs de proposta. Sem retomada de upload e sem checagem de integridade além
// da assinatura do arquivo.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{common::error::AppError, db::DocumentStore};

const PDF_MAGIC: &[u8] = b"%PDF-";
pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    #[schema(example = "6f1c...-1736951400000.pdf")]
    pub file_name: String,
    #[schema(example = "/api/documents/6f1c...-1736951400000.pdf")]
    pub url: String,
}

#[derive(Clone)]
pub struct DocumentService {
    store: Arc<dyn DocumentStore>,
    public_url: String,
}

/// Só aceita nomes simples, sem caminho.
fn check_file_name(name: &str) -> Result<(), AppError> {
    let bad = name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || !name.ends_with(".pdf");
    if bad {
        return Err(AppError::InvalidDocument(name.to_string()));
    }
    Ok(())
}

impl DocumentService {
    pub fn new(store: Arc<dyn DocumentStore>, public_url: impl Into<String>) -> Self {
        Self {
            store,
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, file_name: &str) -> String {
        format!("{}/{}", self.public_url, file_name)
    }

    pub async fn upload_proposal(&self, lead_id: Uuid, bytes: &[u8]) -> Result<StoredDocument, AppError> {
        if bytes.is_empty() {
            return Err(AppError::InvalidDocument("arquivo vazio".into()));
        }
        if bytes.len() > MAX_DOCUMENT_BYTES {
            return Err(AppError::InvalidDocument(format!("{} bytes", bytes.len())));
        }
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(AppError::InvalidDocument("não é PDF".into()));
        }

        let file_name = format!("{}-{}.pdf", lead_id, Utc::now().timestamp_millis());
        self.store.put(&file_name, bytes).await?;
        tracing::info!("PDF {} anexado ao lead {} ({} bytes)", file_name, lead_id, bytes.len());

        Ok(StoredDocument {
            url: self.url_for(&file_name),
            file_name,
        })
    }

    pub async fn fetch(&self, file_name: &str) -> Result<Vec<u8>, AppError> {
        check_file_name(file_name)?;
        self.store.get(file_name).await
    }

    pub async fn delete(&self, file_name: &str) -> Result<(), AppError> {
        check_file_name(file_name)?;
        self.store.delete(file_name).await?;
        tracing::info!("PDF {} removido", file_name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryDocumentStore;

    fn service() -> DocumentService {
        DocumentService::new(Arc::new(MemoryDocumentStore::default()), "/api/documents/")
    }

    #[tokio::test]
    async fn upload_names_file_after_the_lead() {
        let svc = service();
        let lead_id = Uuid::new_v4();

        let doc = svc.upload_proposal(lead_id, b"%PDF-1.7\n...").await.unwrap();
        assert!(doc.file_name.starts_with(&lead_id.to_string()));
        assert!(doc.file_name.ends_with(".pdf"));
        assert_eq!(doc.url, format!("/api/documents/{}", doc.file_name));
        assert_eq!(svc.fetch(&doc.file_name).await.unwrap(), b"%PDF-1.7\n...".to_vec());

        svc.delete(&doc.file_name).await.unwrap();
        assert!(matches!(
            svc.fetch(&doc.file_name).await,
            Err(AppError::DocumentNotFound(_))
        ));
    }

    #[tokio::test]
    async fn rejects_non_pdf_and_empty_files() {
        let svc = service();
        let id = Uuid::new_v4();
        assert!(matches!(svc.upload_proposal(id, b"").await, Err(AppError::InvalidDocument(_))));
        assert!(matches!(
            svc.upload_proposal(id, b"GIF89a").await,
            Err(AppError::InvalidDocument(_))
        ));
        let too_big = vec![b'%'; MAX_DOCUMENT_BYTES + 1];
        assert!(matches!(
            svc.upload_proposal(id, &too_big).await,
            Err(AppError::InvalidDocument(_))
        ));
    }

    #[tokio::test]
    async fn rejects_paths_in_file_names() {
        let svc = service();
        for name in ["../segredo.pdf", "a/b.pdf", "a\\b.pdf", "nota.txt"] {
            assert!(matches!(svc.fetch(name).await, Err(AppError::InvalidDocument(_))));
            assert!(matches!(svc.delete(name).await, Err(AppError::InvalidDocument(_))));
        }
    }
}
