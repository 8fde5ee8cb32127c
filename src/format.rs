// Brazilian-locale display formatting for quote fields.

use chrono::{Local, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

use crate::error::AppError;

/// Storage format for quote dates.
pub const STORAGE_DATE_FORMAT: &str = "%Y-%m-%d";
/// Display format for quote dates.
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

const CURRENCY_PREFIX: &str = "R$ ";

static PHONE_MOBILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{2})(\d{5})(\d{4})").unwrap());
static PHONE_LANDLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{2})(\d{4})(\d{4})").unwrap());
static CNPJ: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{2})(\d{3})(\d{3})(\d{4})(\d{2})").unwrap());
static CPF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{3})(\d{3})(\d{3})(\d{2})").unwrap());

/// Strip everything that is not an ASCII digit.
pub fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

// ============================================================================
// Currency
// ============================================================================

/// Format a raw cents buffer as Brazilian currency.
///
/// The last two digits are always the decimal part. The arithmetic happens on
/// the digit string itself, so there is no precision loss for long inputs.
/// Input without any digit is treated as zero.
///
/// ```
/// use orcamento_pdf::format::format_currency;
/// assert_eq!(format_currency("123456"), "R$ 1.234,56");
/// ```
pub fn format_currency(raw: &str) -> String {
    let digits = digits_only(raw);
    let significant = digits.trim_start_matches('0');
    let padded = format!("{:0>3}", significant);
    let (integer, cents) = padded.split_at(padded.len() - 2);
    format!("{}{},{}", CURRENCY_PREFIX, group_thousands(integer), cents)
}

fn group_thousands(integer: &str) -> String {
    let len = integer.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

// ============================================================================
// Phone
// ============================================================================

/// Format a phone number.
///
/// Eleven digits use the mobile mask `(DD) DDDDD-DDDD`. Any other length gets
/// the landline mask `(DD) DDDD-DDDD` applied to its first ten digits; with
/// fewer than ten digits the mask cannot match and the bare digits come back.
pub fn format_phone(raw: &str) -> String {
    let digits = digits_only(raw);
    if digits.len() == 11 {
        return PHONE_MOBILE.replace(&digits, "($1) $2-$3").into_owned();
    }
    PHONE_LANDLINE.replace(&digits, "($1) $2-$3").into_owned()
}

// ============================================================================
// CNPJ / CPF
// ============================================================================

/// Format a CNPJ (14 digits) or CPF (11 digits). Any other length returns the
/// input untouched, so the function is idempotent.
pub fn format_tax_id(raw: &str) -> String {
    let digits = digits_only(raw);
    match digits.len() {
        14 => CNPJ.replace(&digits, "$1.$2.$3/$4-$5").into_owned(),
        11 => CPF.replace(&digits, "$1.$2.$3-$4").into_owned(),
        _ => raw.to_string(),
    }
}

// ============================================================================
// Quantity
// ============================================================================

/// Parse the integer prefix of a quantity field.
///
/// Leading whitespace and an optional sign are accepted and anything after
/// the digits is ignored (`"3 un"` is 3). No leading digit means unset.
pub fn parse_quantity(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    rest[..end].parse::<i64>().ok().map(|n| n * sign)
}

// ============================================================================
// Dates
// ============================================================================

/// Today's date in storage format.
pub fn today_storage() -> String {
    Local::now().date_naive().format(STORAGE_DATE_FORMAT).to_string()
}

pub fn parse_storage_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), STORAGE_DATE_FORMAT)
        .map_err(|_| AppError::DateError(value.to_string()))
}

/// `YYYY-MM-DD` → `DD/MM/YYYY`.
pub fn storage_to_display_date(value: &str) -> Result<String, AppError> {
    Ok(parse_storage_date(value)?
        .format(DISPLAY_DATE_FORMAT)
        .to_string())
}

/// `DD/MM/YYYY` → `YYYY-MM-DD`.
pub fn display_to_storage_date(value: &str) -> Result<String, AppError> {
    NaiveDate::parse_from_str(value.trim(), DISPLAY_DATE_FORMAT)
        .map(|d| d.format(STORAGE_DATE_FORMAT).to_string())
        .map_err(|_| AppError::DateError(value.to_string()))
}

/// Accept a date typed in either format and return it in storage format.
pub fn normalize_date_input(value: &str) -> Result<String, AppError> {
    parse_storage_date(value)
        .map(|d| d.format(STORAGE_DATE_FORMAT).to_string())
        .or_else(|_| display_to_storage_date(value))
}
