// src/db/memory.rs
//
// Implementações em memória dos stores, para os testes de serviço e de rota.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{document_store::DocumentStore, lead_repo::LeadStore, product_repo::ProductStore},
    models::{
        lead::{Lead, LeadChanges, NewLead},
        product::{ProductPayload, SolarPanel},
    },
};

#[derive(Default)]
pub struct MemoryLeadStore {
    leads: RwLock<Vec<Lead>>,
    fail_writes: AtomicBool,
}

impl MemoryLeadStore {
    pub fn with_leads(leads: Vec<Lead>) -> Self {
        Self {
            leads: RwLock::new(leads),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Faz toda escrita seguinte falhar, como uma queda de rede.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Altera uma linha por fora do serviço, como a integração do WhatsApp faz.
    pub async fn edit(&self, id: Uuid, change: impl FnOnce(&mut Lead)) {
        if let Some(lead) = self.leads.write().await.iter_mut().find(|l| l.id == id) {
            change(lead);
        }
    }

    pub async fn snapshot(&self) -> Vec<Lead> {
        self.leads.read().await.clone()
    }

    fn check_writes(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl LeadStore for MemoryLeadStore {
    async fn fetch_all(&self) -> Result<Vec<Lead>, AppError> {
        Ok(self.leads.read().await.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Lead>, AppError> {
        Ok(self.leads.read().await.iter().find(|l| l.id == id).cloned())
    }

    async fn insert(&self, new: &NewLead) -> Result<Lead, AppError> {
        self.check_writes()?;
        let mut leads = self.leads.write().await;
        if leads.iter().any(|l| l.phone == new.phone) {
            return Err(AppError::PhoneAlreadyExists(new.phone.clone()));
        }

        let lead = Lead {
            id: Uuid::new_v4(),
            phone: new.phone.clone(),
            whatsapp_name: new.whatsapp_name.clone(),
            full_name: new.full_name.clone(),
            qualification: Some(new.qualification.clone()),
            income: new.income.clone(),
            summary: new.summary.clone(),
            tax_id: new.tax_id.clone(),
            ai_paused: Some(new.ai_paused.clone()),
            proposal_value: new.proposal_value.clone(),
            payment_method: new.payment_method.clone(),
            proposal_product: new.proposal_product.clone(),
            installation_lead_time: new.installation_lead_time.clone(),
            proposal_notes: new.proposal_notes.clone(),
            proposal_pdf_url: None,
            rejection_reason: None,
            opportunity: None,
            created_at: Some(new.created_at.clone()),
            last_contact_at: None,
        };
        leads.push(lead.clone());
        Ok(lead)
    }

    async fn update(&self, changes: &LeadChanges) -> Result<(), AppError> {
        self.check_writes()?;
        let mut leads = self.leads.write().await;
        match leads.iter_mut().find(|l| l.id == changes.id) {
            Some(slot) => {
                changes.apply_to(slot);
                Ok(())
            }
            None => Err(AppError::LeadNotFound(changes.id)),
        }
    }
}

#[derive(Default)]
pub struct MemoryProductStore {
    products: RwLock<Vec<SolarPanel>>,
}

fn panel_from(id: Uuid, p: &ProductPayload) -> SolarPanel {
    SolarPanel {
        id,
        model: p.model.clone(),
        specs: p.specs.clone(),
        efficiency: p.efficiency.clone(),
        dimensions: p.dimensions.clone(),
        warranty: p.warranty.clone(),
        accepts_financing: p.accepts_financing,
        price_per_panel: p.price_per_panel,
        pack_5: p.pack_5,
        pack_10: p.pack_10,
        pack_20: p.pack_20,
        installation_model: p.installation_model.clone(),
        lead_time: p.lead_time.clone(),
        status: p.status,
        stock_quantity: p.stock_quantity,
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn fetch_all(&self) -> Result<Vec<SolarPanel>, AppError> {
        let mut products = self.products.read().await.clone();
        products.sort_by(|a, b| a.model.cmp(&b.model));
        Ok(products)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SolarPanel>, AppError> {
        Ok(self.products.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, payload: &ProductPayload) -> Result<SolarPanel, AppError> {
        let product = panel_from(Uuid::new_v4(), payload);
        self.products.write().await.push(product.clone());
        Ok(product)
    }

    async fn update(&self, id: Uuid, payload: &ProductPayload) -> Result<Option<SolarPanel>, AppError> {
        let mut products = self.products.write().await;
        Ok(products.iter_mut().find(|p| p.id == id).map(|slot| {
            *slot = panel_from(id, payload);
            slot.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() < before)
    }
}

#[derive(Default)]
pub struct MemoryDocumentStore {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn put(&self, name: &str, bytes: &[u8]) -> Result<(), AppError> {
        self.files.write().await.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Vec<u8>, AppError> {
        self.files
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::DocumentNotFound(name.to_string()))
    }

    async fn delete(&self, name: &str) -> Result<(), AppError> {
        self.files
            .write()
            .await
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| AppError::DocumentNotFound(name.to_string()))
    }
}
