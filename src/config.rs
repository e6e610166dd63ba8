// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use chrono::FixedOffset;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::{dates::LeadClock, i18n::I18nStore},
    db::{DocumentStore, FsDocumentStore, LeadRepository, LeadStore, ProductRepository, ProductStore},
    services::{
        dashboard_service::DashboardService, document_service::DocumentService,
        lead_service::LeadService, product_service::ProductService,
    },
};

/// Limiares das listas de triagem e dos gráficos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub follow_up_hours: i64,
    pub proposal_response_hours: i64,
    pub chart_window_days: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            follow_up_hours: 8,
            proposal_response_hours: 24,
            chart_window_days: 14,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub bind_addr: String,
    pub documents_dir: String,
    pub documents_public_url: String,
    pub utc_offset_hours: i32,
    pub pipeline: PipelineSettings,
}

fn var_or<T: FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} inválida ('{}'): {}", key, raw, e)),
        Err(_) => Ok(default),
    }
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = PipelineSettings::default();
        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?,
            db_max_connections: var_or("DB_MAX_CONNECTIONS", 5)?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?,
            jwt_audience: var_or("JWT_AUDIENCE", "authenticated".to_string())?,
            bind_addr: var_or("BIND_ADDR", "0.0.0.0:3000".to_string())?,
            documents_dir: var_or("DOCUMENTS_DIR", "./storage/propostas".to_string())?,
            documents_public_url: var_or("DOCUMENTS_PUBLIC_URL", "/api/documents".to_string())?,
            utc_offset_hours: var_or("UTC_OFFSET_HOURS", -3)?,
            pipeline: PipelineSettings {
                follow_up_hours: var_or("FOLLOW_UP_HOURS", defaults.follow_up_hours)?,
                proposal_response_hours: var_or(
                    "PROPOSAL_RESPONSE_HOURS",
                    defaults.proposal_response_hours,
                )?,
                chart_window_days: var_or("CHART_WINDOW_DAYS", defaults.chart_window_days)?,
            },
        })
    }

    /// Relógio no fuso da equipe (as datas do banco são hora local).
    pub fn clock(&self) -> anyhow::Result<LeadClock> {
        let offset = FixedOffset::east_opt(self.utc_offset_hours * 3600)
            .with_context(|| format!("UTC_OFFSET_HOURS fora do intervalo: {}", self.utc_offset_hours))?;
        Ok(LeadClock::new(offset))
    }
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub i18n_store: Arc<I18nStore>,
    pub lead_service: LeadService,
    pub dashboard_service: DashboardService,
    pub product_service: ProductService,
    pub document_service: DocumentService,
}

impl AppState {
    pub async fn new(settings: Settings) -> anyhow::Result<(Self, PgPool)> {
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let clock = settings.clock()?;
        let state = Self::from_parts(
            settings.clone(),
            clock,
            Arc::new(LeadRepository::new(db_pool.clone())),
            Arc::new(ProductRepository::new(db_pool.clone())),
            Arc::new(FsDocumentStore::new(&settings.documents_dir)),
        );

        Ok((state, db_pool))
    }

    /// Monta o estado a partir dos stores (produção ou memória).
    pub fn from_parts(
        settings: Settings,
        clock: LeadClock,
        leads: Arc<dyn LeadStore>,
        products: Arc<dyn ProductStore>,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        let lead_service = LeadService::new(leads, clock);
        let dashboard_service = DashboardService::new(lead_service.clone(), settings.pipeline);
        let document_service = DocumentService::new(documents, settings.documents_public_url.clone());

        Self {
            settings: Arc::new(settings),
            i18n_store: Arc::new(I18nStore::embedded()),
            lead_service,
            dashboard_service,
            product_service: ProductService::new(products),
            document_service,
        }
    }
}
