// src/services/lead_service.rs

use std::{cmp::Reverse, sync::Arc};

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    common::{dates::{format_store_timestamp, LeadClock}, error::AppError},
    db::LeadStore,
    models::{
        lead::{
            CreateLeadPayload, Lead, LeadChanges, ManualSalePayload, NewLead, NormalizationReport,
            AI_NOT_PAUSED,
        },
        pipeline::{KanbanBoard, PipelineStage},
    },
    services::{
        classifier::{bucket_by_stage, classify, parse_stage},
        lead_board::{plan, LeadBoard, LeadCommand},
    },
};

#[derive(Clone)]
pub struct LeadService {
    store: Arc<dyn LeadStore>,
    board: Arc<Mutex<LeadBoard>>,
    clock: LeadClock,
}

/// Mais novos primeiro; datas ilegíveis vão para o fim.
fn sort_newest_first(leads: &mut [Lead]) {
    leads.sort_by_cached_key(|lead| Reverse(lead.created_at_parsed()));
}

fn matches_search(lead: &Lead, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }

    let digits: String = term.chars().filter(char::is_ascii_digit).collect();
    let name_hit = [lead.full_name.as_deref(), lead.whatsapp_name.as_deref()]
        .into_iter()
        .flatten()
        .any(|name| name.to_lowercase().contains(&term));

    name_hit || (!digits.is_empty() && lead.phone.contains(&digits))
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl LeadService {
    pub fn new(store: Arc<dyn LeadStore>, clock: LeadClock) -> Self {
        Self {
            store,
            board: Arc::new(Mutex::new(LeadBoard::new())),
            clock,
        }
    }

    pub fn clock(&self) -> LeadClock {
        self.clock
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    /// Recarrega tudo do banco e devolve a lista ordenada.
    pub async fn refresh(&self) -> Result<Vec<Lead>, AppError> {
        let mut leads = self.store.fetch_all().await?;
        sort_newest_first(&mut leads);

        let mut board = self.board.lock().await;
        board.replace_all(leads.clone());
        Ok(leads)
    }

    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Lead>, AppError> {
        let leads = self.refresh().await?;
        Ok(match search {
            Some(term) => leads.into_iter().filter(|l| matches_search(l, term)).collect(),
            None => leads,
        })
    }

    pub async fn get(&self, id: Uuid) -> Result<Lead, AppError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(AppError::LeadNotFound(id))
    }

    pub async fn kanban(&self) -> Result<KanbanBoard, AppError> {
        let leads = self.refresh().await?;
        let columns = bucket_by_stage(&leads);
        let placed: usize = columns.iter().map(|c| c.count).sum();

        Ok(KanbanBoard {
            unclassified: leads.len() - placed,
            columns,
        })
    }

    // =========================================================================
    //  ESCRITA
    // =========================================================================

    pub async fn create_lead(&self, payload: CreateLeadPayload) -> Result<Lead, AppError> {
        let stage = match blank_to_none(payload.qualification) {
            Some(raw) => parse_stage(&raw)?,
            None => PipelineStage::Warming,
        };
        let full_name = payload.full_name.trim().to_string();

        let new_lead = NewLead {
            phone: payload.phone.trim().to_string(),
            whatsapp_name: blank_to_none(payload.whatsapp_name).or_else(|| Some(full_name.clone())),
            full_name: Some(full_name),
            qualification: stage.label().to_string(),
            income: blank_to_none(payload.income),
            summary: blank_to_none(payload.summary),
            tax_id: blank_to_none(payload.tax_id),
            ai_paused: AI_NOT_PAUSED.to_string(),
            created_at: format_store_timestamp(self.clock.now()),
            ..Default::default()
        };

        self.insert(new_lead).await
    }

    /// Venda lançada sem lead prévio: entra direto como concluída.
    pub async fn register_manual_sale(&self, payload: ManualSalePayload) -> Result<Lead, AppError> {
        let full_name = payload.full_name.trim().to_string();

        let new_lead = NewLead {
            phone: payload.phone.trim().to_string(),
            whatsapp_name: Some(full_name.clone()),
            full_name: Some(full_name),
            qualification: PipelineStage::SaleCompleted.label().to_string(),
            income: blank_to_none(payload.income),
            tax_id: blank_to_none(payload.tax_id),
            ai_paused: AI_NOT_PAUSED.to_string(),
            proposal_value: Some(payload.proposal_value),
            payment_method: blank_to_none(payload.payment_method),
            proposal_product: blank_to_none(payload.proposal_product),
            installation_lead_time: blank_to_none(payload.installation_lead_time),
            proposal_notes: blank_to_none(payload.proposal_notes),
            created_at: format_store_timestamp(self.clock.now()),
            ..Default::default()
        };

        self.insert(new_lead).await
    }

    async fn insert(&self, new_lead: NewLead) -> Result<Lead, AppError> {
        let lead = self.store.insert(&new_lead).await?;
        tracing::info!(
            "Lead {} ({}) criado em '{}'",
            lead.display_name(),
            lead.id,
            new_lead.qualification
        );

        let mut board = self.board.lock().await;
        if board.is_loaded() {
            board.upsert(lead.clone());
        }
        Ok(lead)
    }

    /// Aplica um comando: relê o lead, planeja, aplica na lista, grava só o que mudou;
    /// se o banco falhar, desfaz.
    pub async fn execute(&self, command: LeadCommand) -> Result<Lead, AppError> {
        let id = command.lead_id();
        let mut board = self.board.lock().await;

        // Sempre a linha atual do banco: a integração do WhatsApp e outros usuários gravam por fora
        let current = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(AppError::LeadNotFound(id))?;
        if !board.is_loaded() {
            board.replace_all(Vec::new());
        }
        board.upsert(current.clone());

        let next = plan(&current, &command, self.clock.now())?;
        let changes = LeadChanges::between(&current, &next);
        if changes.is_empty() {
            return Ok(next);
        }

        let undo = board.apply(next.clone())?;
        if let Err(e) = self.store.update(&changes).await {
            board.revert(undo);
            tracing::error!(
                "🔥 Falha ao gravar '{}' do lead {} ({}); lista restaurada: {}",
                command.name(),
                current.display_name(),
                id,
                e
            );
            return Err(e);
        }

        tracing::info!(
            "Lead {} ({}) atualizado ({}): {} coluna(s)",
            next.display_name(),
            id,
            command.name(),
            changes.fields.len()
        );
        Ok(next)
    }

    /// Migração única: reescreve cada qualificação reconhecível com o rótulo canônico.
    pub async fn normalize_qualifications(&self) -> Result<NormalizationReport, AppError> {
        let leads = self.refresh().await?;
        let mut report = NormalizationReport::default();

        for lead in leads {
            let raw = lead.qualification.clone().unwrap_or_default();
            match classify(Some(&raw)) {
                Some(stage) if raw == stage.label() => report.already_canonical += 1,
                Some(stage) => {
                    // Mesma etapa: a tabela de transições sempre permite
                    self.execute(LeadCommand::MoveStage { id: lead.id, stage }).await?;
                    report.rewritten += 1;
                }
                None => {
                    report.unmapped += 1;
                    if !report.unmapped_values.contains(&raw) {
                        report.unmapped_values.push(raw);
                    }
                }
            }
        }

        tracing::info!(
            "Normalização concluída: {} reescritos, {} já canônicos, {} sem etapa",
            report.rewritten,
            report.already_canonical,
            report.unmapped
        );
        Ok(report)
    }

    #[cfg(test)]
    pub async fn board_snapshot(&self) -> Vec<Lead> {
        self.board.lock().await.leads().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::memory::MemoryLeadStore,
        models::lead::{test_lead, UpdateLeadPayload},
    };
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn clock() -> LeadClock {
        LeadClock::fixed(
            NaiveDate::from_ymd_opt(2025, 1, 15)
                .unwrap()
                .and_hms_opt(9, 45, 0)
                .unwrap(),
        )
    }

    fn dated(qualification: &str, created_at: &str) -> Lead {
        let mut lead = test_lead(Some(qualification));
        lead.created_at = Some(created_at.to_string());
        lead
    }

    fn service(leads: Vec<Lead>) -> (LeadService, Arc<MemoryLeadStore>) {
        let store = Arc::new(MemoryLeadStore::with_leads(leads));
        (LeadService::new(store.clone(), clock()), store)
    }

    #[tokio::test]
    async fn list_is_calendar_ordered() {
        let (svc, _) = service(vec![
            dated("Aquecendo", "02-01-2025"),
            dated("Aquecendo", "ontem"),
            dated("Aquecendo", "31-12-2024 23:00"),
            dated("Aquecendo", "10-01-2025 08:00"),
        ]);
        let dates: Vec<String> = svc
            .list(None)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.created_at.unwrap_or_default())
            .collect();

        assert_eq!(dates, vec!["10-01-2025 08:00", "02-01-2025", "31-12-2024 23:00", "ontem"]);
    }

    #[tokio::test]
    async fn search_matches_names_and_phone() {
        let mut a = dated("Aquecendo", "01-01-2025");
        a.full_name = Some("Maria Souza".into());
        a.phone = "5511911112222".into();
        let mut b = dated("Aquecendo", "02-01-2025");
        b.whatsapp_name = Some("Zé Solar".into());
        b.phone = "5521933334444".into();
        let (svc, _) = service(vec![a.clone(), b.clone()]);

        let by_name = svc.list(Some("maria")).await.unwrap();
        assert_eq!(by_name.iter().map(|l| l.id).collect::<Vec<_>>(), vec![a.id]);

        let by_phone = svc.list(Some("3333")).await.unwrap();
        assert_eq!(by_phone.iter().map(|l| l.id).collect::<Vec<_>>(), vec![b.id]);
    }

    #[tokio::test]
    async fn create_lead_fills_defaults() {
        let (svc, _) = service(Vec::new());
        let lead = svc
            .create_lead(CreateLeadPayload {
                full_name: " Ana Lima ".into(),
                phone: "5511987654321".into(),
                whatsapp_name: None,
                qualification: None,
                income: Some("".into()),
                tax_id: None,
                summary: None,
            })
            .await
            .unwrap();

        assert_eq!(lead.qualification.as_deref(), Some("Aquecendo"));
        assert_eq!(lead.whatsapp_name.as_deref(), Some("Ana Lima"));
        assert_eq!(lead.ai_paused.as_deref(), Some("Não"));
        assert_eq!(lead.created_at.as_deref(), Some("15-01-2025 09:45"));
        assert_eq!(lead.income, None);
    }

    #[tokio::test]
    async fn create_lead_rejects_unknown_stage_and_duplicates() {
        let mut existing = test_lead(Some("Aquecendo"));
        existing.phone = "5511900000000".into();
        let (svc, store) = service(vec![existing]);

        let payload = CreateLeadPayload {
            full_name: "Ana".into(),
            phone: "5511900000000".into(),
            whatsapp_name: None,
            qualification: Some("quente".into()),
            income: None,
            tax_id: None,
            summary: None,
        };
        assert!(matches!(
            svc.create_lead(payload.clone()).await,
            Err(AppError::UnknownStage(_))
        ));

        let dup = CreateLeadPayload { qualification: None, ..payload };
        assert!(matches!(
            svc.create_lead(dup).await,
            Err(AppError::PhoneAlreadyExists(_))
        ));
        assert_eq!(store.snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn execute_writes_through() {
        let lead = test_lead(Some("Coletando"));
        let (svc, store) = service(vec![lead.clone()]);

        let next = svc
            .execute(LeadCommand::MoveStage {
                id: lead.id,
                stage: PipelineStage::Qualified,
            })
            .await
            .unwrap();

        assert_eq!(next.stage(), Some(PipelineStage::Qualified));
        assert_eq!(store.snapshot().await[0], next);
    }

    #[tokio::test]
    async fn failed_write_reverts_the_board() {
        let lead = test_lead(Some("Qualificado"));
        let other = test_lead(Some("Aquecendo"));
        let (svc, store) = service(vec![lead.clone(), other]);
        svc.refresh().await.unwrap();
        let before = svc.board_snapshot().await;

        store.fail_writes(true);
        let result = svc
            .execute(LeadCommand::MoveStage {
                id: lead.id,
                stage: PipelineStage::DraftingProposal,
            })
            .await;

        assert!(matches!(result, Err(AppError::DatabaseError(_))));
        let after = svc.board_snapshot().await;
        assert_eq!(after, before);

        // O lead aparece em exatamente uma coluna, a original
        let columns = bucket_by_stage(&after);
        let hits: Vec<PipelineStage> = columns
            .iter()
            .filter(|c| c.leads.iter().any(|l| l.id == lead.id))
            .map(|c| c.stage)
            .collect();
        assert_eq!(hits, vec![PipelineStage::Qualified]);
        assert_eq!(store.snapshot().await[0], lead);
    }

    #[tokio::test]
    async fn outside_writes_survive_a_stage_move() {
        let lead = test_lead(Some("Coletando"));
        let (svc, store) = service(vec![lead.clone()]);
        svc.list(None).await.unwrap();

        // A integração grava depois da última leitura do painel
        store
            .edit(lead.id, |l| {
                l.last_contact_at = Some("15-01-2025 08:55".into());
                l.summary = Some("cliente respondeu".into());
            })
            .await;

        svc.execute(LeadCommand::MoveStage {
            id: lead.id,
            stage: PipelineStage::Qualified,
        })
        .await
        .unwrap();

        let stored = store.snapshot().await.remove(0);
        assert_eq!(stored.qualification.as_deref(), Some("Qualificado"));
        assert_eq!(stored.last_contact_at.as_deref(), Some("15-01-2025 08:55"));
        assert_eq!(stored.summary.as_deref(), Some("cliente respondeu"));
        assert_eq!(svc.board_snapshot().await, vec![stored]);
    }

    #[tokio::test]
    async fn transition_is_checked_against_the_stored_stage() {
        let lead = test_lead(Some("Proposta Enviada"));
        let (svc, store) = service(vec![lead.clone()]);
        svc.refresh().await.unwrap();

        store
            .edit(lead.id, |l| l.qualification = Some("Venda Concluida".into()))
            .await;

        let result = svc
            .execute(LeadCommand::RejectProposal {
                id: lead.id,
                reason: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::InvalidStageTransition { .. })));
        assert_eq!(
            store.snapshot().await[0].qualification.as_deref(),
            Some("Venda Concluida")
        );
    }

    #[tokio::test]
    async fn rejected_transition_does_not_touch_the_store() {
        let lead = test_lead(Some("Venda Concluida"));
        let (svc, store) = service(vec![lead.clone()]);

        let result = svc
            .execute(LeadCommand::Update {
                id: lead.id,
                changes: UpdateLeadPayload {
                    qualification: Some("Aquecendo".into()),
                    ..Default::default()
                },
            })
            .await;

        assert!(matches!(result, Err(AppError::InvalidStageTransition { .. })));
        assert_eq!(store.snapshot().await, vec![lead]);
    }

    #[tokio::test]
    async fn unknown_lead_is_not_found() {
        let (svc, _) = service(Vec::new());
        let result = svc
            .execute(LeadCommand::RejectProposal {
                id: Uuid::new_v4(),
                reason: None,
            })
            .await;
        assert!(matches!(result, Err(AppError::LeadNotFound(_))));
    }

    #[tokio::test]
    async fn kanban_reports_unclassified() {
        let (svc, _) = service(vec![
            test_lead(Some("Qualificado")),
            test_lead(Some("qualificado")),
            test_lead(Some("Random text")),
        ]);
        let board = svc.kanban().await.unwrap();

        assert_eq!(board.columns.len(), 10);
        assert_eq!(board.unclassified, 1);
        let qualified = board
            .columns
            .iter()
            .find(|c| c.stage == PipelineStage::Qualified)
            .unwrap();
        assert_eq!(qualified.count, 2);
    }

    #[tokio::test]
    async fn normalization_rewrites_only_classifiable_text() {
        let (svc, store) = service(vec![
            test_lead(Some("Qualificado")),
            test_lead(Some("venda concluída")),
            test_lead(Some("lead quente")),
            test_lead(None),
        ]);
        let report = svc.normalize_qualifications().await.unwrap();

        assert_eq!(report.already_canonical, 1);
        assert_eq!(report.rewritten, 1);
        assert_eq!(report.unmapped, 2);
        assert_eq!(report.unmapped_values, vec!["lead quente".to_string(), String::new()]);

        let stored: Vec<Option<String>> =
            store.snapshot().await.into_iter().map(|l| l.qualification).collect();
        assert!(stored.contains(&Some("Venda Concluida".to_string())));
        assert!(stored.contains(&Some("lead quente".to_string())));
    }

    #[tokio::test]
    async fn manual_sale_enters_as_completed() {
        let (svc, _) = service(Vec::new());
        let lead = svc
            .register_manual_sale(ManualSalePayload {
                full_name: "Carlos".into(),
                phone: "5511955554444".into(),
                tax_id: Some("123.456.789-00".into()),
                income: None,
                proposal_value: "32.000,00".into(),
                payment_method: Some("Pix".into()),
                proposal_product: None,
                installation_lead_time: None,
                proposal_notes: None,
            })
            .await
            .unwrap();

        assert_eq!(lead.stage(), Some(PipelineStage::SaleCompleted));
        assert_eq!(lead.proposal_value.as_deref(), Some("32.000,00"));
    }
}
