// src/main.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Settings};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;
use crate::services::document_service::MAX_DOCUMENT_BYTES;

/// Monta todas as rotas. Tudo fora de `/api/health` e da documentação exige token.
pub fn build_router(app_state: AppState) -> Router {
    let lead_routes = Router::new()
        .route("/", get(handlers::leads::list_leads).post(handlers::leads::create_lead))
        // Rota fixa antes da dinâmica para não ser confundida com um id
        .route("/normalize", post(handlers::leads::normalize_qualifications))
        .route(
            "/{id}",
            get(handlers::leads::get_lead).put(handlers::leads::update_lead),
        )
        .route("/{id}/stage", patch(handlers::leads::move_stage));

    let dashboard_routes = Router::new()
        .route("/summary", get(handlers::dashboard::get_summary))
        .route("/stages", get(handlers::dashboard::get_stage_counts))
        .route("/leads-chart", get(handlers::dashboard::get_leads_chart))
        .route("/proposals-chart", get(handlers::dashboard::get_proposals_chart));

    let proposal_routes = Router::new()
        .route("/", get(handlers::proposals::get_overview))
        .route("/candidates", get(handlers::proposals::get_candidates))
        .route("/{id}", post(handlers::proposals::register_proposal))
        .route("/{id}/charges", post(handlers::proposals::record_charge))
        .route("/{id}/reject", post(handlers::proposals::reject_proposal))
        .route("/{id}/sale", post(handlers::proposals::register_sale));

    let product_routes = Router::new()
        .route(
            "/",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route("/available", get(handlers::products::list_available))
        .route(
            "/{id}",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        );

    let document_routes = Router::new()
        .route(
            "/proposals/{lead_id}",
            // Folga acima do limite para o serviço responder com a mensagem certa
            post(handlers::documents::upload_proposal)
                .layer(DefaultBodyLimit::max(MAX_DOCUMENT_BYTES + 1024)),
        )
        .route(
            "/{file_name}",
            get(handlers::documents::get_document).delete(handlers::documents::delete_document),
        );

    let protected = Router::new()
        .nest("/leads", lead_routes)
        .route("/kanban", get(handlers::leads::get_kanban))
        .nest("/dashboard", dashboard_routes)
        .route("/rescue", get(handlers::dashboard::get_rescue))
        .nest("/proposals", proposal_routes)
        .route(
            "/sales",
            get(handlers::sales::get_overview).post(handlers::sales::register_manual_sale),
        )
        .nest("/products", product_routes)
        .nest("/documents", document_routes)
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", protected)
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let settings = Settings::from_env()?;
    let bind_addr = settings.bind_addr.clone();

    let (app_state, db_pool) = AppState::new(settings).await?;

    // Cria as tabelas se o banco for novo; no banco hospedado elas já existem
    sqlx::migrate!().run(&db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let app = build_router(app_state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
