// src/services/classifier.rs
//
// Classificação da qualificação (texto livre) em uma etapa do funil.
// Nada aqui falha: "não classificado" é um resultado válido.

use crate::{
    common::error::AppError,
    models::{
        lead::Lead,
        pipeline::{PipelineStage, StageColumn, StageCount, StageCounts},
    },
};

/// Minúsculas, sem acento, espaços colapsados.
fn normalize(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| word.chars().map(fold_accent).collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        other => other,
    }
}

/// Etapa correspondente ao texto, ou `None` se nada bater.
///
/// Igualdade exata vence. Senão fica a primeira etapa, na ordem declarada, cujo
/// rótulo aparece no texto: "lead desqualificado" contém "qualificado" e cai em
/// Qualificado. Só o rótulo exato leva a Desqualificado.
pub fn classify(qualification: Option<&str>) -> Option<PipelineStage> {
    let text = normalize(qualification?);
    if text.is_empty() {
        return None;
    }

    let labels: Vec<(PipelineStage, String)> = PipelineStage::ALL
        .into_iter()
        .map(|stage| (stage, normalize(stage.label())))
        .collect();

    labels
        .iter()
        .find(|(_, label)| *label == text)
        .or_else(|| labels.iter().find(|(_, label)| text.contains(label.as_str())))
        .map(|(stage, _)| *stage)
}

/// Validação na escrita: texto que não classifica é recusado.
pub fn parse_stage(raw: &str) -> Result<PipelineStage, AppError> {
    classify(Some(raw)).ok_or_else(|| AppError::UnknownStage(raw.trim().to_string()))
}

/// Uma coluna por etapa, na ordem declarada. Não classificados ficam de fora.
pub fn bucket_by_stage(leads: &[Lead]) -> Vec<StageColumn> {
    let mut columns: Vec<StageColumn> = PipelineStage::ALL
        .iter()
        .map(|&stage| StageColumn {
            stage,
            title: stage.label(),
            color: stage.color(),
            count: 0,
            leads: Vec::new(),
        })
        .collect();

    for lead in leads {
        if let Some(stage) = lead.stage() {
            if let Some(column) = columns.iter_mut().find(|c| c.stage == stage) {
                column.leads.push(lead.clone());
                column.count += 1;
            }
        }
    }

    columns
}

pub fn count_by_stage(leads: &[Lead]) -> StageCounts {
    let mut stages: Vec<StageCount> = PipelineStage::ALL
        .iter()
        .map(|&stage| StageCount {
            stage,
            label: stage.label(),
            count: 0,
        })
        .collect();
    let mut unclassified = 0;

    for lead in leads {
        match lead.stage() {
            Some(stage) => {
                if let Some(entry) = stages.iter_mut().find(|c| c.stage == stage) {
                    entry.count += 1;
                }
            }
            None => unclassified += 1,
        }
    }

    StageCounts { stages, unclassified }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lead::test_lead;
    use PipelineStage::*;

    #[test]
    fn exact_label_in_any_case_is_classified() {
        for stage in PipelineStage::ALL {
            assert_eq!(classify(Some(stage.label())), Some(stage));
            assert_eq!(classify(Some(&stage.label().to_uppercase())), Some(stage));
            assert_eq!(classify(Some(&format!("  {}  ", stage.label()))), Some(stage));
        }
    }

    #[test]
    fn accents_and_spacing_are_ignored() {
        assert_eq!(classify(Some("Venda Concluída")), Some(SaleCompleted));
        assert_eq!(classify(Some("proposta   enviada")), Some(ProposalSent));
    }

    #[test]
    fn first_contained_label_in_declared_order_wins() {
        // "desqualificado" contém "qualificado", que vem antes na ordem
        assert_eq!(classify(Some("Lead Desqualificado (sem renda)")), Some(Qualified));
        assert_eq!(classify(Some("Cliente qualificado!")), Some(Qualified));
        assert_eq!(classify(Some("Interesse alto")), Some(Interested));
        assert_eq!(classify(Some("aquecendo, mas já coletando")), Some(Warming));
    }

    #[test]
    fn exact_label_beats_an_earlier_contained_one() {
        assert_eq!(classify(Some("desqualificado")), Some(Disqualified));
        assert_eq!(classify(Some(" DESQUALIFICADO ")), Some(Disqualified));
    }

    #[test]
    fn nothing_matching_is_unclassified() {
        assert_eq!(classify(Some("Random text")), None);
        assert_eq!(classify(Some("   ")), None);
        assert_eq!(classify(None), None);
    }

    #[test]
    fn parse_stage_rejects_unknown_text() {
        assert_eq!(parse_stage("qualificado").ok(), Some(Qualified));
        assert!(matches!(parse_stage("Quente"), Err(AppError::UnknownStage(s)) if s == "Quente"));
    }

    #[test]
    fn counts_scenario() {
        let leads = vec![
            test_lead(Some("Qualificado")),
            test_lead(Some("qualificado")),
            test_lead(Some("Random text")),
        ];
        let counts = count_by_stage(&leads);

        assert_eq!(counts.get(Qualified), 2);
        assert_eq!(counts.unclassified, 1);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn unclassified_leads_are_in_no_column() {
        let leads = vec![test_lead(Some("Aquecendo")), test_lead(Some("??"))];
        let columns = bucket_by_stage(&leads);

        assert_eq!(columns.len(), PipelineStage::ALL.len());
        assert_eq!(columns[0].stage, Warming);
        let placed: usize = columns.iter().map(|c| c.leads.len()).sum();
        assert_eq!(placed, 1);
        assert!(columns.iter().all(|c| c.count == c.leads.len()));
    }
}
