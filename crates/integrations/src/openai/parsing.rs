//! Parsing of model output into transaction candidates.
//!
//! Models are asked for JSON but answer with whatever key spelling they like
//! (`valor`, `Amount`, `descrição`...) and sometimes wrap the object in prose
//! or code fences, so parsing is lenient about keys and strict about values.

use std::str::FromStr;

use ara_core::intake::ExtractedTransaction;
use ara_core::ledger::TransactionType;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::error::{IntegrationError, Result};

const AMOUNT_KEYS: &[&str] = &["amount", "valor", "value", "total"];
const TYPE_KEYS: &[&str] = &["type", "tipo"];
const DESCRIPTION_KEYS: &[&str] = &["description", "descrição", "descricao", "desc"];
const DATE_KEYS: &[&str] = &["date", "data"];

/// Parse a model answer into an [`ExtractedTransaction`].
pub fn parse_extraction(response: &str) -> Result<ExtractedTransaction> {
    let response = response.trim();
    let object = match (response.find('{'), response.rfind('}')) {
        (Some(s), Some(e)) if s < e => serde_json::from_str::<Map<String, Value>>(&response[s..=e])
            .map_err(|e| IntegrationError::invalid(format!("invalid extraction JSON: {e}")))?,
        _ => return Err(IntegrationError::invalid("no JSON object in model answer")),
    };

    let amount = field(&object, AMOUNT_KEYS)
        .ok_or_else(|| IntegrationError::invalid("missing amount"))
        .and_then(parse_amount)?;

    let transaction_type = field(&object, TYPE_KEYS)
        .and_then(Value::as_str)
        .and_then(parse_type)
        .ok_or_else(|| IntegrationError::invalid("missing or unknown transaction type"))?;

    let description = field(&object, DESCRIPTION_KEYS)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| IntegrationError::invalid("missing description"))?
        .to_string();

    let date = field(&object, DATE_KEYS)
        .and_then(Value::as_str)
        .and_then(parse_date);

    Ok(ExtractedTransaction {
        amount,
        transaction_type,
        description,
        date,
    })
}

fn field<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    object
        .iter()
        .find(|(k, _)| keys.contains(&k.to_lowercase().as_str()))
        .map(|(_, v)| v)
        .filter(|v| !v.is_null())
}

/// Accepts JSON numbers and strings like `"45"`, `"R$ 1.234,56"` or `"12.50"`.
pub fn parse_amount(value: &Value) -> Result<Decimal> {
    let raw = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => normalize_amount(s),
        other => return Err(IntegrationError::invalid(format!("amount is not a number: {other}"))),
    };

    let amount = Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|e| IntegrationError::invalid(format!("bad amount {raw:?}: {e}")))?;

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(IntegrationError::invalid(format!("negative amount {amount}")));
    }
    Ok(amount.round_dp(2))
}

fn normalize_amount(s: &str) -> String {
    let cleaned: String = s
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if cleaned.contains(',') {
        // pt-BR: dot groups thousands, comma is the decimal separator
        cleaned.replace('.', "").replace(',', ".")
    } else if is_thousands_grouped(&cleaned) {
        cleaned.replace('.', "")
    } else {
        cleaned
    }
}

/// `1.234` or `12.345.678`: every group after the first has exactly three digits.
fn is_thousands_grouped(s: &str) -> bool {
    let mut groups = s.split('.');
    let Some(head) = groups.next() else {
        return false;
    };
    let tail: Vec<&str> = groups.collect();
    !tail.is_empty()
        && (1..=3).contains(&head.len())
        && head.chars().all(|c| c.is_ascii_digit())
        && tail
            .iter()
            .all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()))
}

fn parse_type(s: &str) -> Option<TransactionType> {
    match s.trim().to_lowercase().as_str() {
        "income" | "receita" | "entrada" | "venda" => Some(TransactionType::Income),
        "expense" | "despesa" | "saída" | "saida" | "gasto" => Some(TransactionType::Expense),
        _ => None,
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
        .ok()
}
