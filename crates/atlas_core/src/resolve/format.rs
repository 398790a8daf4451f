//! Locale-style number, currency and plain-value formatting.

use serde_json::Value;

/// Formats an amount with the currency's symbol, grouping and precision.
///
/// Codes without a known symbol render as `CODE 1,234.50`.
pub fn format_currency(amount: f64, code: &str) -> String {
    let code = code.trim().to_ascii_uppercase();
    let decimals = match code.as_str() {
        "JPY" | "KRW" => 0,
        _ => 2,
    };
    let digits = format!("{:.*}", decimals, amount.abs());
    let grouped = group_decimal(&digits);
    let negative = amount < 0.0 && digits.chars().any(|c| c != '0' && c != '.');
    let sign = if negative { "-" } else { "" };

    match currency_symbol(&code) {
        Some(symbol) => format!("{sign}{symbol}{grouped}"),
        None => format!("{sign}{code} {grouped}"),
    }
}

fn currency_symbol(code: &str) -> Option<&'static str> {
    match code {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" => Some("¥"),
        "CNY" => Some("CN¥"),
        "KRW" => Some("₩"),
        "INR" => Some("₹"),
        "CAD" => Some("CA$"),
        "AUD" => Some("A$"),
        _ => None,
    }
}

/// Inserts `,` thousands separators into the integer part of `digits`.
pub fn group_decimal(digits: &str) -> String {
    let (integer, fraction) = match digits.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(digits.len() + integer.len() / 3);
    for (index, ch) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}

/// Direct string form of a raw value.
///
/// Arrays join their elements with `, `; objects render as compact JSON.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Array(values) => values
            .iter()
            .map(stringify)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}
