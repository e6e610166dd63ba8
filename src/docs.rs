// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Leads ---
        handlers::leads::list_leads,
        handlers::leads::create_lead,
        handlers::leads::get_lead,
        handlers::leads::update_lead,
        handlers::leads::move_stage,
        handlers::leads::normalize_qualifications,
        handlers::leads::get_kanban,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
        handlers::dashboard::get_stage_counts,
        handlers::dashboard::get_leads_chart,
        handlers::dashboard::get_proposals_chart,
        handlers::dashboard::get_rescue,

        // --- Propostas ---
        handlers::proposals::get_overview,
        handlers::proposals::get_candidates,
        handlers::proposals::register_proposal,
        handlers::proposals::record_charge,
        handlers::proposals::reject_proposal,
        handlers::proposals::register_sale,

        // --- Vendas ---
        handlers::sales::get_overview,
        handlers::sales::register_manual_sale,

        // --- Produtos ---
        handlers::products::list_products,
        handlers::products::list_available,
        handlers::products::get_product,
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::products::delete_product,

        // --- Documentos ---
        handlers::documents::upload_proposal,
        handlers::documents::get_document,
        handlers::documents::delete_document,
    ),
    components(
        schemas(
            // --- Funil ---
            models::pipeline::PipelineStage,
            models::pipeline::StageColumn,
            models::pipeline::KanbanBoard,
            models::pipeline::StageCount,
            models::pipeline::StageCounts,

            // --- Leads ---
            models::lead::Lead,
            models::lead::NormalizationReport,
            models::lead::CreateLeadPayload,
            models::lead::UpdateLeadPayload,
            models::lead::MoveStagePayload,
            models::lead::ProposalPayload,
            models::lead::ChargePayload,
            models::lead::RejectProposalPayload,
            models::lead::SalePayload,
            models::lead::ManualSalePayload,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,
            models::dashboard::DailyLeadCount,
            models::dashboard::ProposalChartEntry,
            models::dashboard::UrgencyLevel,
            models::dashboard::Staleness,
            models::dashboard::FollowUpEntry,
            models::dashboard::RescueSignal,
            models::dashboard::OpportunityEntry,
            models::dashboard::RescueSummary,
            models::dashboard::RescueOverview,
            models::dashboard::ProposalCounts,
            models::dashboard::ProposalsOverview,
            models::dashboard::SalesOverview,

            // --- Produtos ---
            models::product::ProductStatus,
            models::product::SolarPanel,
            models::product::ProductPayload,

            // --- Documentos ---
            services::document_service::StoredDocument,
        )
    ),
    tags(
        (name = "Leads", description = "Leads e quadro do funil"),
        (name = "Dashboard", description = "Indicadores, gráficos e resgate"),
        (name = "Proposals", description = "Propostas, cobranças e rejeições"),
        (name = "Sales", description = "Vendas concluídas"),
        (name = "Products", description = "Catálogo de placas solares"),
        (name = "Documents", description = "PDFs de proposta")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
