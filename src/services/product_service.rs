// src/services/product_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ProductStore,
    models::product::{ProductPayload, ProductStatus, SolarPanel},
};

#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn ProductStore>,
}

impl ProductService {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<SolarPanel>, AppError> {
        self.store.fetch_all().await
    }

    /// Vitrine usada no formulário de proposta.
    pub async fn available(&self) -> Result<Vec<SolarPanel>, AppError> {
        let products = self.store.fetch_all().await?;
        Ok(products
            .into_iter()
            .filter(|p| p.status == ProductStatus::Disponivel)
            .collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<SolarPanel, AppError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(AppError::ProductNotFound(id))
    }

    pub async fn create(&self, payload: ProductPayload) -> Result<SolarPanel, AppError> {
        let product = self.store.insert(&payload).await?;
        tracing::info!("Produto '{}' cadastrado ({})", product.model, product.id);
        Ok(product)
    }

    pub async fn update(&self, id: Uuid, payload: ProductPayload) -> Result<SolarPanel, AppError> {
        let product = self
            .store
            .update(id, &payload)
            .await?
            .ok_or(AppError::ProductNotFound(id))?;
        tracing::info!("Produto {} atualizado", id);
        Ok(product)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.store.delete(id).await? {
            return Err(AppError::ProductNotFound(id));
        }
        tracing::info!("Produto {} removido", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryProductStore;

    fn payload(model: &str, status: ProductStatus) -> ProductPayload {
        ProductPayload {
            model: model.into(),
            status,
            stock_quantity: 10,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn crud_round() {
        let svc = ProductService::new(Arc::new(MemoryProductStore::default()));

        let created = svc.create(payload("Jinko 450W", ProductStatus::Disponivel)).await.unwrap();
        assert_eq!(svc.get(created.id).await.unwrap().model, "Jinko 450W");

        let updated = svc
            .update(created.id, payload("Jinko 460W", ProductStatus::SobEncomenda))
            .await
            .unwrap();
        assert_eq!(updated.status, ProductStatus::SobEncomenda);

        svc.delete(created.id).await.unwrap();
        assert!(matches!(svc.get(created.id).await, Err(AppError::ProductNotFound(_))));
        assert!(matches!(svc.delete(created.id).await, Err(AppError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn available_filters_by_status() {
        let svc = ProductService::new(Arc::new(MemoryProductStore::default()));
        svc.create(payload("B", ProductStatus::Disponivel)).await.unwrap();
        svc.create(payload("A", ProductStatus::Indisponivel)).await.unwrap();

        let all = svc.list().await.unwrap();
        assert_eq!(all.iter().map(|p| p.model.as_str()).collect::<Vec<_>>(), vec!["A", "B"]);

        let available = svc.available().await.unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].model, "B");
    }

    #[tokio::test]
    async fn update_of_missing_product_fails() {
        let svc = ProductService::new(Arc::new(MemoryProductStore::default()));
        let result = svc.update(Uuid::new_v4(), payload("X", ProductStatus::Disponivel)).await;
        assert!(matches!(result, Err(AppError::ProductNotFound(_))));
    }
}
