//! Display formatting for minor-unit amounts.
//!
//! Output matches en-US currency formatting with symbol display: the symbol
//! prefixes the amount, thousands are comma-grouped, and a minus sign leads.
//! Every currency is treated as two-decimal; zero-decimal currencies such as
//! JPY are therefore rendered off by a factor of 100.

use rust_decimal::Decimal;

use crate::error::ApiError;

/// en-US display symbols. Currencies missing here render as their code
/// followed by a non-breaking space.
const SYMBOLS: &[(&str, &str)] = &[
    ("USD", "$"),
    ("EUR", "€"),
    ("GBP", "£"),
    ("JPY", "¥"),
    ("CAD", "CA$"),
    ("AUD", "A$"),
    ("CNY", "CN¥"),
    ("INR", "₹"),
    ("KRW", "₩"),
    ("MXN", "MX$"),
    ("BRL", "R$"),
    ("HKD", "HK$"),
    ("NZD", "NZ$"),
    ("ILS", "₪"),
    ("VND", "₫"),
    ("TWD", "NT$"),
    ("XAF", "FCFA"),
    ("XOF", "F\u{a0}CFA"),
    ("XCD", "EC$"),
    ("PHP", "₱"),
];

/// Format `amount` (in minor units, e.g. cents) as a localized price.
///
/// `currency` is an ISO 4217 code in either case. Returns
/// `ApiError::InvalidCurrency` when it is not three ASCII letters.
pub fn format_price(amount: i64, currency: &str) -> Result<String, ApiError> {
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ApiError::InvalidCurrency(currency.to_string()));
    }
    let code = currency.to_ascii_uppercase();
    let prefix = SYMBOLS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, symbol)| (*symbol).to_string())
        .unwrap_or_else(|| format!("{code}\u{a0}"));

    let major = Decimal::new(amount, 2);
    let digits = format!("{:.2}", major.abs());
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let sign = if major.is_sign_negative() && !major.is_zero() { "-" } else { "" };
    Ok(format!("{sign}{prefix}{}.{fraction}", group_thousands(whole)))
}

fn group_thousands(whole: &str) -> String {
    let mut out = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
