// src/common/money.rs

use rust_decimal::Decimal;
use std::str::FromStr;

/// Lê valores digitados no formato brasileiro ("R$ 45.000,00", "45000", "1.234,5").
///
/// Pontos são separadores de milhar e a vírgula é o separador decimal.
/// Qualquer outro caractere é descartado. Texto sem dígitos devolve `None`.
pub fn parse_brl_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',')
        .collect();

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    // Só a última vírgula vale como decimal
    let normalized = match cleaned.rfind(',') {
        Some(pos) => {
            let (int_part, frac_part) = cleaned.split_at(pos);
            format!("{}.{}", int_part.replace(',', ""), &frac_part[1..])
        }
        None => cleaned,
    };

    let normalized = normalized.trim_end_matches('.');
    let normalized = if normalized.starts_with('.') {
        format!("0{}", normalized)
    } else {
        normalized.to_string()
    };

    Decimal::from_str(&normalized).ok()
}
