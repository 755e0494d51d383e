//! Euro amount parsing and formatting.
//!
//! Amounts are entered by admins as decimal strings (`"150"`, `"150.50"`,
//! `"150,50"`) and stored as integer cents.

use crate::types::Cents;

/// Largest storable amount: 99 999 999.99 EUR.
pub const MAX_AMOUNT_CENTS: Cents = 9_999_999_999;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("Amount is required")]
    Empty,

    #[error("Amount must be a positive number with at most two decimal places")]
    Malformed,

    #[error("Amount must be greater than zero")]
    Zero,

    #[error("Amount exceeds the maximum of 99999999.99")]
    TooLarge,
}

/// Parse a user-entered amount into cents.
pub fn parse_amount(input: &str) -> Result<Cents, MoneyError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(MoneyError::Empty);
    }

    let (whole, frac) = match trimmed.find(['.', ',']) {
        Some(pos) => (&trimmed[..pos], &trimmed[pos + 1..]),
        None => (trimmed, ""),
    };

    let digits_only = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if whole.is_empty() || !digits_only(whole) || !digits_only(frac) || frac.len() > 2 {
        return Err(MoneyError::Malformed);
    }
    if trimmed.contains(['.', ',']) && frac.is_empty() {
        return Err(MoneyError::Malformed);
    }
    // 99_999_999 is the largest whole part; anything longer cannot fit.
    if whole.trim_start_matches('0').len() > 8 {
        return Err(MoneyError::TooLarge);
    }

    let whole: Cents = whole.parse().map_err(|_| MoneyError::Malformed)?;
    let frac: Cents = match frac.len() {
        0 => 0,
        1 => frac.parse::<Cents>().map_err(|_| MoneyError::Malformed)? * 10,
        _ => frac.parse().map_err(|_| MoneyError::Malformed)?,
    };

    let cents = whole * 100 + frac;
    if cents == 0 {
        return Err(MoneyError::Zero);
    }
    if cents > MAX_AMOUNT_CENTS {
        return Err(MoneyError::TooLarge);
    }
    Ok(cents)
}

/// Format cents as a plain decimal string with two places, e.g. `"150.50"`.
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}
