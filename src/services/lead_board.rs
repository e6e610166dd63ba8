// src/services/lead_board.rs
//
// Único ponto de entrada para alterar a lista de leads em memória.
// Cada escrita vira um `LeadCommand`; `plan` calcula a próxima versão do lead
// e `LeadBoard::apply` guarda o snapshot para desfazer se o banco recusar.

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::{
    common::{dates::format_store_timestamp, error::AppError},
    models::{
        lead::{ChargePayload, Lead, ProposalPayload, SalePayload, UpdateLeadPayload},
        pipeline::PipelineStage,
    },
    services::classifier::parse_stage,
};

// Formas de pagamento que levam o detalhamento das parcelas para as notas
const INSTALLMENT_METHODS: &[&str] = &["cartao", "cartão", "financiamento"];

#[derive(Debug, Clone, PartialEq)]
pub enum LeadCommand {
    MoveStage { id: Uuid, stage: PipelineStage },
    Update { id: Uuid, changes: UpdateLeadPayload },
    RegisterProposal { id: Uuid, proposal: ProposalPayload },
    RecordCharge { id: Uuid, charge: ChargePayload },
    RejectProposal { id: Uuid, reason: Option<String> },
    RegisterSale { id: Uuid, sale: SalePayload },
}

impl LeadCommand {
    pub fn lead_id(&self) -> Uuid {
        match self {
            LeadCommand::MoveStage { id, .. }
            | LeadCommand::Update { id, .. }
            | LeadCommand::RegisterProposal { id, .. }
            | LeadCommand::RecordCharge { id, .. }
            | LeadCommand::RejectProposal { id, .. }
            | LeadCommand::RegisterSale { id, .. } => *id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LeadCommand::MoveStage { .. } => "move_stage",
            LeadCommand::Update { .. } => "update",
            LeadCommand::RegisterProposal { .. } => "register_proposal",
            LeadCommand::RecordCharge { .. } => "record_charge",
            LeadCommand::RejectProposal { .. } => "reject_proposal",
            LeadCommand::RegisterSale { .. } => "register_sale",
        }
    }
}

/// Snapshot capturado antes de uma escrita otimista.
#[derive(Debug, Clone, PartialEq)]
pub struct Undo {
    index: usize,
    previous: Lead,
}

impl Undo {
    #[cfg(test)]
    pub fn previous(&self) -> &Lead {
        &self.previous
    }
}

/// Lista de leads como o painel a enxerga.
#[derive(Debug, Clone, Default)]
pub struct LeadBoard {
    leads: Vec<Lead>,
    loaded: bool,
}

impl LeadBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    #[cfg(test)]
    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }

    pub fn replace_all(&mut self, leads: Vec<Lead>) {
        self.leads = leads;
        self.loaded = true;
    }

    pub fn get(&self, id: Uuid) -> Option<&Lead> {
        self.leads.iter().find(|l| l.id == id)
    }

    /// Insere ou substitui pelo id, sem snapshot (usado após INSERT confirmado).
    pub fn upsert(&mut self, lead: Lead) {
        match self.leads.iter_mut().find(|l| l.id == lead.id) {
            Some(slot) => *slot = lead,
            None => self.leads.insert(0, lead),
        }
    }

    /// Aplica a nova versão e devolve o snapshot para `revert`.
    pub fn apply(&mut self, next: Lead) -> Result<Undo, AppError> {
        let index = self
            .leads
            .iter()
            .position(|l| l.id == next.id)
            .ok_or(AppError::LeadNotFound(next.id))?;

        let previous = std::mem::replace(&mut self.leads[index], next);
        Ok(Undo { index, previous })
    }

    /// Restaura exatamente o que havia antes do `apply`.
    pub fn revert(&mut self, undo: Undo) {
        match self.leads.get_mut(undo.index) {
            Some(slot) if slot.id == undo.previous.id => *slot = undo.previous,
            // A lista mudou de posição no meio do caminho; procura pelo id
            _ => self.upsert(undo.previous),
        }
    }
}

fn checked_transition(current: &Lead, to: PipelineStage) -> Result<(), AppError> {
    // Qualificação fora do padrão (dado legado) pode ir para qualquer etapa
    let Some(from) = current.stage() else {
        return Ok(());
    };

    if from.can_transition_to(to) {
        if from.is_terminal() && from != to {
            tracing::info!("Lead {} reaberto: {} -> {}", current.id, from, to);
        }
        return Ok(());
    }

    tracing::warn!("Transição recusada para o lead {}: {} -> {}", current.id, from, to);
    Err(AppError::InvalidStageTransition {
        from: from.label().to_string(),
        to: to.label().to_string(),
    })
}

fn set_stage(lead: &mut Lead, stage: PipelineStage) {
    lead.qualification = Some(stage.label().to_string());
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Notas da proposta com o detalhamento do parcelamento quando couber.
pub fn compose_proposal_notes(proposal: &ProposalPayload) -> Option<String> {
    let notes = non_blank(proposal.proposal_notes.clone());

    let method = proposal
        .payment_method
        .as_deref()
        .map(|m| m.trim().to_lowercase())
        .unwrap_or_default();
    if !INSTALLMENT_METHODS.contains(&method.as_str()) {
        return notes;
    }

    let mut details = Vec::new();
    if let Some(n) = proposal.installments {
        details.push(format!("Parcelas: {}x", n));
    }
    if let Some(value) = non_blank(proposal.installment_value.clone()) {
        details.push(format!("Valor parcela: R$ {}", value.trim()));
    }
    if let Some(inst) = non_blank(proposal.financing_institution.clone()) {
        details.push(format!("Instituição: {}", inst.trim()));
    }

    if details.is_empty() {
        return notes;
    }
    let details = details.join("\n");
    Some(match notes {
        Some(n) => format!("{}\n\n{}", n, details),
        None => details,
    })
}

/// Registro de cobrança anexado às notas da proposta.
pub fn charge_log(charge: &ChargePayload, now: NaiveDateTime) -> String {
    format!(
        "\n\n--- Cobrança {}ª ({}) ---\n{}",
        charge.sequence,
        format_store_timestamp(now),
        charge.note.trim()
    )
}

/// Calcula a próxima versão do lead. Não toca em estado nenhum.
pub fn plan(current: &Lead, command: &LeadCommand, now: NaiveDateTime) -> Result<Lead, AppError> {
    let mut next = current.clone();

    match command {
        LeadCommand::MoveStage { stage, .. } => {
            checked_transition(current, *stage)?;
            set_stage(&mut next, *stage);
        }

        LeadCommand::Update { changes, .. } => {
            if let Some(raw) = changes.qualification.as_deref() {
                let stage = parse_stage(raw)?;
                checked_transition(current, stage)?;
                set_stage(&mut next, stage);
            }

            let c = changes.clone();
            if let Some(v) = c.full_name {
                next.full_name = Some(v);
            }
            if let Some(v) = c.phone {
                next.phone = v;
            }
            if let Some(v) = c.whatsapp_name {
                next.whatsapp_name = Some(v);
            }
            if let Some(v) = c.income {
                next.income = Some(v);
            }
            if let Some(v) = c.tax_id {
                next.tax_id = Some(v);
            }
            if let Some(v) = c.summary {
                next.summary = Some(v);
            }
            if let Some(v) = c.ai_paused {
                next.ai_paused = Some(v);
            }
            if let Some(v) = c.proposal_value {
                next.proposal_value = Some(v);
            }
            if let Some(v) = c.payment_method {
                next.payment_method = Some(v);
            }
            if let Some(v) = c.proposal_product {
                next.proposal_product = Some(v);
            }
            if let Some(v) = c.installation_lead_time {
                next.installation_lead_time = Some(v);
            }
            if let Some(v) = c.proposal_notes {
                next.proposal_notes = Some(v);
            }
            if let Some(v) = c.rejection_reason {
                next.rejection_reason = Some(v);
            }
            if let Some(v) = c.opportunity {
                next.opportunity = Some(v);
            }
        }

        LeadCommand::RegisterProposal { proposal, .. } => {
            checked_transition(current, PipelineStage::ProposalSent)?;
            set_stage(&mut next, PipelineStage::ProposalSent);
            next.proposal_value = Some(proposal.proposal_value.clone());
            next.payment_method = proposal.payment_method.clone();
            next.proposal_product = proposal.proposal_product.clone();
            next.installation_lead_time = proposal.installation_lead_time.clone();
            next.proposal_notes = compose_proposal_notes(proposal);
            next.proposal_pdf_url = non_blank(proposal.pdf_url.clone());
        }

        LeadCommand::RecordCharge { charge, .. } => {
            let mut notes = current.proposal_notes.clone().unwrap_or_default();
            notes.push_str(&charge_log(charge, now));
            next.proposal_notes = Some(notes);
            next.last_contact_at = Some(format_store_timestamp(now));
        }

        LeadCommand::RejectProposal { reason, .. } => {
            checked_transition(current, PipelineStage::ProposalRejected)?;
            set_stage(&mut next, PipelineStage::ProposalRejected);
            if let Some(reason) = non_blank(reason.clone()) {
                next.rejection_reason = Some(reason);
            }
        }

        LeadCommand::RegisterSale { sale, .. } => {
            checked_transition(current, PipelineStage::SaleCompleted)?;
            set_stage(&mut next, PipelineStage::SaleCompleted);
            next.proposal_value = Some(sale.proposal_value.clone());
            next.payment_method = sale.payment_method.clone();
            next.proposal_product = sale.proposal_product.clone();
            next.installation_lead_time = sale.installation_lead_time.clone();
            if sale.proposal_notes.is_some() {
                next.proposal_notes = sale.proposal_notes.clone();
            }
        }
    }

    Ok(next)
}
