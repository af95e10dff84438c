//! Field normalization
//!
//! Pure functions that canonicalize raw CSV text into validated domain
//! values or a typed rejection. Expected-case validation failures are
//! signalled through [`RejectReason`], never through panics; the caller
//! decides whether a rejection skips the row.

use chrono::NaiveDate;
use thiserror::Error;

/// Why a field (and therefore its row) was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// Tax id did not reduce to exactly 14 digits
    #[error("invalid CNPJ: expected exactly 14 digits")]
    InvalidCnpj,

    /// Collection date missing or unparseable
    #[error("missing or invalid collection date")]
    MissingOrInvalidDate,

    /// Price missing, non-numeric, zero or negative
    #[error("invalid price: expected a number greater than zero")]
    InvalidPrice,

    /// Record could not be decoded from the CSV at all
    #[error("malformed record: {0}")]
    Malformed(String),
}

/// A CNPJ tax identifier in its canonical punctuated form
/// (`NN.NNN.NNN/NNNN-NN`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cnpj(String);

impl Cnpj {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Cnpj {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a raw CNPJ string into canonical form.
///
/// Strips every non-digit character and accepts the result only if exactly
/// 14 digits remain. `"12345678000199"` and `"12.345.678/0001-99"` both
/// canonicalize to `"12.345.678/0001-99"`.
pub fn normalize_cnpj(raw: &str) -> Result<Cnpj, RejectReason> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() != 14 {
        return Err(RejectReason::InvalidCnpj);
    }

    Ok(Cnpj(format!(
        "{}.{}.{}/{}-{}",
        &digits[0..2],
        &digits[2..5],
        &digits[5..8],
        &digits[8..12],
        &digits[12..14]
    )))
}

/// Date formats seen in the dataset: Brazilian day-first and ISO.
const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y"];

/// Parse a collection date.
pub fn normalize_date(raw: &str) -> Result<NaiveDate, RejectReason> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(RejectReason::MissingOrInvalidDate);
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .ok_or(RejectReason::MissingOrInvalidDate)
}

/// Coerce a mandatory price field to a positive value.
///
/// The dataset uses the Brazilian decimal comma (`"3,59"`); a dot is
/// accepted as well. Zero, negative, and non-finite values are rejected.
pub fn normalize_price(raw: &str) -> Result<f64, RejectReason> {
    let cleaned = raw.trim().replace(',', ".");
    if cleaned.is_empty() {
        return Err(RejectReason::InvalidPrice);
    }

    let value: f64 = cleaned.parse().map_err(|_| RejectReason::InvalidPrice)?;

    if !value.is_finite() || value <= 0.0 {
        return Err(RejectReason::InvalidPrice);
    }

    Ok(value)
}

/// Coerce an optional price field.
///
/// Absence (missing column or blank field) is a valid `None`, not a
/// rejection; a present but invalid value still rejects.
pub fn normalize_optional_price(raw: Option<&str>) -> Result<Option<f64>, RejectReason> {
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => normalize_price(s).map(Some),
    }
}

/// Deterministic left-truncation to a field width, counted in characters
/// and cut on a char boundary. Never fails.
pub fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cnpj_bare_digits_are_formatted() {
        let cnpj = normalize_cnpj("12345678000199").unwrap();
        assert_eq!(cnpj.as_str(), "12.345.678/0001-99");
    }

    #[test]
    fn test_cnpj_canonical_form_unchanged() {
        let cnpj = normalize_cnpj("12.345.678/0001-99").unwrap();
        assert_eq!(cnpj.as_str(), "12.345.678/0001-99");
    }

    #[test]
    fn test_cnpj_with_stray_characters() {
        let cnpj = normalize_cnpj(" 12.345.678/0001-99 \t").unwrap();
        assert_eq!(cnpj.as_str(), "12.345.678/0001-99");
    }

    #[test]
    fn test_cnpj_wrong_length_rejected() {
        assert_eq!(normalize_cnpj("123"), Err(RejectReason::InvalidCnpj));
        assert_eq!(
            normalize_cnpj("123456780001990"),
            Err(RejectReason::InvalidCnpj)
        );
        assert_eq!(normalize_cnpj(""), Err(RejectReason::InvalidCnpj));
        assert_eq!(normalize_cnpj("não informado"), Err(RejectReason::InvalidCnpj));
    }

    #[test]
    fn test_date_brazilian_format() {
        assert_eq!(
            normalize_date("15/03/2023").unwrap(),
            NaiveDate::from_ymd_opt(2023, 3, 15).unwrap()
        );
    }

    #[test]
    fn test_date_iso_format() {
        assert_eq!(
            normalize_date("2023-03-15").unwrap(),
            NaiveDate::from_ymd_opt(2023, 3, 15).unwrap()
        );
    }

    #[test]
    fn test_date_invalid_rejected() {
        assert_eq!(normalize_date(""), Err(RejectReason::MissingOrInvalidDate));
        assert_eq!(
            normalize_date("31/02/2023"),
            Err(RejectReason::MissingOrInvalidDate)
        );
        assert_eq!(
            normalize_date("sem data"),
            Err(RejectReason::MissingOrInvalidDate)
        );
    }

    #[test]
    fn test_price_decimal_comma() {
        assert_eq!(normalize_price("3,59").unwrap(), 3.59);
        assert_eq!(normalize_price("3.59").unwrap(), 3.59);
    }

    #[test]
    fn test_price_zero_and_negative_rejected() {
        assert_eq!(normalize_price("0"), Err(RejectReason::InvalidPrice));
        assert_eq!(normalize_price("-1,50"), Err(RejectReason::InvalidPrice));
        assert_eq!(normalize_price("abc"), Err(RejectReason::InvalidPrice));
        assert_eq!(normalize_price(""), Err(RejectReason::InvalidPrice));
    }

    #[test]
    fn test_optional_price_absent_is_none() {
        assert_eq!(normalize_optional_price(None).unwrap(), None);
        assert_eq!(normalize_optional_price(Some("")).unwrap(), None);
        assert_eq!(normalize_optional_price(Some("  ")).unwrap(), None);
    }

    #[test]
    fn test_optional_price_present_must_be_valid() {
        assert_eq!(normalize_optional_price(Some("3,41")).unwrap(), Some(3.41));
        assert_eq!(
            normalize_optional_price(Some("abc")),
            Err(RejectReason::InvalidPrice)
        );
        assert_eq!(
            normalize_optional_price(Some("0")),
            Err(RejectReason::InvalidPrice)
        );
    }

    #[test]
    fn test_truncate_by_chars() {
        assert_eq!(truncate("GASOLINA", 50), "GASOLINA");
        assert_eq!(truncate("GASOLINA ADITIVADA", 8), "GASOLINA");
        assert_eq!(truncate("", 10), "");
        // multi-byte: cut on char boundary, not byte
        assert_eq!(truncate("SÃO PAULO", 3), "SÃO");
    }
}
