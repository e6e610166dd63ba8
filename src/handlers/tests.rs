// src/handlers/tests.rs
//
// Testes das rotas contra o roteador real, com stores em memória.

use std::sync::Arc;

use axum::http::{header, HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::NaiveDate;
use jsonwebtoken::{encode, EncodingKey, Header};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    build_router,
    common::dates::LeadClock,
    config::{AppState, PipelineSettings, Settings},
    db::memory::{MemoryDocumentStore, MemoryLeadStore, MemoryProductStore},
    models::lead::{test_lead, Lead},
};

const SECRET: &str = "segredo-de-teste";

fn settings() -> Settings {
    Settings {
        database_url: String::new(),
        db_max_connections: 1,
        jwt_secret: SECRET.into(),
        jwt_audience: "authenticated".into(),
        bind_addr: "127.0.0.1:0".into(),
        documents_dir: String::new(),
        documents_public_url: "/api/documents".into(),
        utc_offset_hours: -3,
        pipeline: PipelineSettings::default(),
    }
}

fn token() -> String {
    let claims = json!({
        "sub": Uuid::new_v4(),
        "exp": chrono::Utc::now().timestamp() + 3600,
        "aud": "authenticated",
        "email": "vendas@solar.com",
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

fn server_with(leads: Vec<Lead>) -> (TestServer, Arc<MemoryLeadStore>) {
    let store = Arc::new(MemoryLeadStore::with_leads(leads));
    let clock = LeadClock::fixed(
        NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap(),
    );
    let state = AppState::from_parts(
        settings(),
        clock,
        store.clone(),
        Arc::new(MemoryProductStore::default()),
        Arc::new(MemoryDocumentStore::default()),
    );
    (TestServer::new(build_router(state)).unwrap(), store)
}

// =============================================================================
// AUTENTICAÇÃO
// =============================================================================

#[tokio::test]
async fn health_is_public() {
    let (server, _) = server_with(Vec::new());
    let response = server.get("/api/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}

#[tokio::test]
async fn protected_routes_need_a_token() {
    let (server, _) = server_with(Vec::new());

    let response = server.get("/api/leads").await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = server.get("/api/leads").authorization_bearer("nao-e-jwt").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "Token de autenticação inválido ou ausente.");
}

// =============================================================================
// LEADS
// =============================================================================

#[tokio::test]
async fn create_then_list() {
    let (server, _) = server_with(Vec::new());

    let response = server
        .post("/api/leads")
        .authorization_bearer(token())
        .json(&json!({ "fullName": "Ana Lima", "phone": "5511987654321" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    assert_eq!(created["qualification"], "Aquecendo");
    assert_eq!(created["createdAt"], "15-01-2025 12:00");

    let list: Vec<Value> = server
        .get("/api/leads")
        .authorization_bearer(token())
        .await
        .json();
    assert_eq!(list.len(), 1);
}

#[tokio::test]
async fn create_validates_required_fields() {
    let (server, store) = server_with(Vec::new());

    let response = server
        .post("/api/leads")
        .authorization_bearer(token())
        .add_header(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en"))
        .json(&json!({ "fullName": "", "phone": "55" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "One or more fields are invalid.");
    assert_eq!(body["details"]["full_name"], json!(["required"]));
    assert_eq!(body["details"]["phone"], json!(["invalid_phone"]));
    assert!(store.snapshot().await.is_empty());
}

#[tokio::test]
async fn move_stage_accepts_loose_labels() {
    let lead = test_lead(Some("Coletando"));
    let (server, store) = server_with(vec![lead.clone()]);

    let response = server
        .patch(&format!("/api/leads/{}/stage", lead.id))
        .authorization_bearer(token())
        .json(&json!({ "stage": "qualificado" }))
        .await;

    response.assert_status_ok();
    assert_eq!(
        store.snapshot().await[0].qualification.as_deref(),
        Some("Qualificado")
    );
}

#[tokio::test]
async fn move_stage_rejects_unknown_and_forbidden_moves() {
    let lead = test_lead(Some("Venda Concluida"));
    let (server, _) = server_with(vec![lead.clone()]);
    let path = format!("/api/leads/{}/stage", lead.id);

    server
        .patch(&path)
        .authorization_bearer(token())
        .json(&json!({ "stage": "Quente" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .patch(&path)
        .authorization_bearer(token())
        .json(&json!({ "stage": "Aquecendo" }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn failed_write_surfaces_error_and_keeps_board() {
    let lead = test_lead(Some("Qualificado"));
    let (server, store) = server_with(vec![lead.clone()]);
    store.fail_writes(true);

    let response = server
        .put(&format!("/api/leads/{}", lead.id))
        .authorization_bearer(token())
        .json(&json!({ "qualification": "Elaborando Proposta" }))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let board: Value = server.get("/api/kanban").authorization_bearer(token()).await.json();
    let columns = board["columns"].as_array().unwrap();
    let hits: Vec<&str> = columns
        .iter()
        .filter(|c| c["count"] == 1)
        .map(|c| c["title"].as_str().unwrap())
        .collect();
    assert_eq!(hits, vec!["Qualificado"]);
}

#[tokio::test]
async fn unknown_lead_is_404() {
    let (server, _) = server_with(Vec::new());
    server
        .get(&format!("/api/leads/{}", Uuid::new_v4()))
        .authorization_bearer(token())
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

// =============================================================================
// PAINEL
// =============================================================================

#[tokio::test]
async fn stage_counts_scenario() {
    let (server, _) = server_with(vec![
        test_lead(Some("Qualificado")),
        test_lead(Some("qualificado")),
        test_lead(Some("Random text")),
    ]);

    let counts: Value = server
        .get("/api/dashboard/stages")
        .authorization_bearer(token())
        .await
        .json();

    assert_eq!(counts["unclassified"], 1);
    let qualified = counts["stages"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["stage"] == "Qualificado")
        .unwrap();
    assert_eq!(qualified["count"], 2);
}

#[tokio::test]
async fn leads_chart_respects_days_param() {
    let mut old = test_lead(Some("Aquecendo"));
    old.created_at = Some("01-01-2025".into());
    let mut new = test_lead(Some("Aquecendo"));
    new.created_at = Some("15-01-2025".into());
    let (server, _) = server_with(vec![old, new]);

    let chart: Vec<Value> = server
        .get("/api/dashboard/leads-chart")
        .authorization_bearer(token())
        .await
        .json();
    assert_eq!(chart.len(), 14);
    assert_eq!(chart[13]["date"], "2025-01-15");
    assert_eq!(chart[13]["count"], 1);

    let short: Vec<Value> = server
        .get("/api/dashboard/leads-chart")
        .add_query_param("days", 3)
        .authorization_bearer(token())
        .await
        .json();
    assert_eq!(short.len(), 3);
}

#[tokio::test]
async fn proposal_flow() {
    let lead = test_lead(Some("Qualificado"));
    let (server, store) = server_with(vec![lead.clone()]);

    server
        .post(&format!("/api/proposals/{}", lead.id))
        .authorization_bearer(token())
        .json(&json!({
            "proposalValue": "45.000,00",
            "paymentMethod": "Cartao",
            "installments": 12
        }))
        .await
        .assert_status_ok();

    server
        .post(&format!("/api/proposals/{}/charges", lead.id))
        .authorization_bearer(token())
        .json(&json!({ "sequence": 1, "note": "Sem resposta" }))
        .await
        .assert_status_ok();

    let overview: Value = server.get("/api/proposals").authorization_bearer(token()).await.json();
    assert_eq!(overview["counts"]["sent"], 1);
    assert_eq!(overview["counts"]["withoutResponse"], 0);

    server
        .post(&format!("/api/proposals/{}/sale", lead.id))
        .authorization_bearer(token())
        .json(&json!({ "proposalValue": "44.000,00" }))
        .await
        .assert_status_ok();

    let stored = store.snapshot().await.remove(0);
    assert_eq!(stored.qualification.as_deref(), Some("Venda Concluida"));
    let notes = stored.proposal_notes.unwrap_or_default();
    assert!(notes.starts_with("Parcelas: 12x"));
    assert!(notes.contains("--- Cobrança 1ª (15-01-2025 12:00) ---\nSem resposta"));

    let sales: Value = server.get("/api/sales").authorization_bearer(token()).await.json();
    assert_eq!(sales["salesCompleted"], 1);
    assert_eq!(sales["totalValue"], 44000.0);
}

#[tokio::test]
async fn rescue_lists_leads_without_contact_first() {
    let mut recent = test_lead(Some("Aquecendo"));
    recent.last_contact_at = Some("14-01-2025 12:00".into());
    let silent = test_lead(Some("Informando"));
    let (server, _) = server_with(vec![recent, silent.clone()]);

    let rescue: Value = server.get("/api/rescue").authorization_bearer(token()).await.json();
    assert_eq!(rescue["summary"]["followUp"], 2);
    assert_eq!(rescue["followUp"][0]["lead"]["id"], json!(silent.id));
    assert_eq!(rescue["followUp"][0]["staleness"]["urgency"], "critical");
}

// =============================================================================
// CATÁLOGO E DOCUMENTOS
// =============================================================================

#[tokio::test]
async fn product_crud() {
    let (server, _) = server_with(Vec::new());

    let created: Value = server
        .post("/api/products")
        .authorization_bearer(token())
        .json(&json!({ "model": "Jinko 450W", "stockQuantity": 4, "acceptsFinancing": true }))
        .await
        .json();
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["status"], "disponivel");

    server
        .post("/api/products")
        .authorization_bearer(token())
        .json(&json!({ "model": "X", "stockQuantity": -1 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let available: Vec<Value> = server
        .get("/api/products/available")
        .authorization_bearer(token())
        .await
        .json();
    assert_eq!(available.len(), 1);

    server
        .delete(&format!("/api/products/{}", id))
        .authorization_bearer(token())
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get(&format!("/api/products/{}", id))
        .authorization_bearer(token())
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn proposal_pdf_upload_and_fetch() {
    let lead = test_lead(Some("Qualificado"));
    let (server, _) = server_with(vec![lead.clone()]);

    let response = server
        .post(&format!("/api/documents/proposals/{}", lead.id))
        .authorization_bearer(token())
        .content_type("application/pdf")
        .bytes(b"%PDF-1.4 proposta".to_vec().into())
        .await;
    response.assert_status(StatusCode::CREATED);
    let doc: Value = response.json();
    let url = doc["url"].as_str().unwrap().to_string();

    let pdf = server.get(&url).authorization_bearer(token()).await;
    pdf.assert_status_ok();
    assert_eq!(pdf.as_bytes().to_vec(), b"%PDF-1.4 proposta".to_vec());

    server
        .post(&format!("/api/documents/proposals/{}", lead.id))
        .authorization_bearer(token())
        .content_type("application/pdf")
        .bytes(b"nao sou pdf".to_vec().into())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
