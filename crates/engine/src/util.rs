//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! parsing and normalization so every entry point enforces the same rules.

use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

/// Parse a decimal string into hundredths (cents, centiliters).
///
/// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
/// Rejects empty strings and more than two fractional digits.
pub(crate) fn parse_hundredths(s: &str, label: &str) -> ResultEngine<i64> {
    let empty = || EngineError::InvalidAmount(format!("empty {label}"));
    let invalid = || EngineError::InvalidAmount(format!("invalid {label}"));
    let overflow = || EngineError::InvalidAmount(format!("{label} too large"));

    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(empty());
    }

    let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
        (true, stripped)
    } else if let Some(stripped) = trimmed.strip_prefix('+') {
        (false, stripped)
    } else {
        (false, trimmed)
    };

    let rest = rest.trim();
    if rest.is_empty() {
        return Err(empty());
    }

    let rest = rest.replace(',', ".");
    let mut parts = rest.split('.');
    let whole_str = parts.next().ok_or_else(invalid)?;
    let frac_str = parts.next();

    if parts.next().is_some() {
        return Err(invalid());
    }

    if whole_str.is_empty() || !whole_str.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let whole: i64 = whole_str.parse().map_err(|_| overflow())?;

    let frac: i64 = match frac_str {
        None | Some("") => 0,
        Some(frac) => {
            if !frac.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            match frac.len() {
                1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
                2 => frac.parse::<i64>().map_err(|_| invalid())?,
                _ => {
                    return Err(EngineError::InvalidAmount(format!(
                        "too many decimals in {label}"
                    )));
                }
            }
        }
    };

    let total = whole
        .checked_mul(100)
        .and_then(|v| v.checked_add(frac))
        .ok_or_else(overflow)?;

    if negative {
        total.checked_neg().ok_or_else(overflow)
    } else {
        Ok(total)
    }
}

/// Write a hundredths value as `units.hh`.
pub(crate) fn fmt_hundredths(value: i64, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let sign = if value < 0 { "-" } else { "" };
    let abs = value.unsigned_abs();
    write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Trim a display name and reject blank input.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Comparison key for names that must be unique regardless of case.
///
/// NFKC folds compatibility forms (full-width letters, ligatures) so that
/// "ＢＭＷ" and "bmw" collide.
pub(crate) fn name_key(display: &str) -> String {
    display.trim().nfkc().collect::<String>().to_lowercase()
}
