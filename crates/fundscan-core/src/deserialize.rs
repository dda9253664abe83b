//! Loose conversion of matched cell text into typed values, and the final
//! construction of validated holding records.
//!
//! Report cells carry locale-variant renderings ("1.234.567", "12,5%",
//! footnote markers), so the numeric parsers are deliberately tolerant:
//! stray symbols are stripped, and the first separator seen decides which of
//! `.`/`,` is the thousands separator.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::block::TextBlock;
use crate::error::FundscanError;
use crate::extract::matching::{normalize_string, normalize_word};
use crate::model::{Currency, FinancialData, Holding, Instrument};

static CLEAN_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+([.,]\d+)*$").expect("valid number regex"));
static STRAY_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z.,0-9]+").expect("valid cleanup regex"));
static GROUPED_FLOAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[1-9]\d{0,2}\.\d{3}(\.\d{3})+$").expect("valid grouping regex")
});
static GROUPED_INT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9]\d{0,2}(\.\d{3})+$").expect("valid grouping regex"));

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", // 2025-07-02
    "%d/%m/%Y", // 02/07/2025
    "%d/%m/%y", // 02/07/25
    "%m-%d-%Y", // 07-02-2025
    "%d-%m-%y", // 01-05-25
];

/// Drop anything that clearly cannot be part of a number (currency symbols,
/// footnote markers) when the cell doesn't already look like a clean one.
fn force_numeric(data: &str) -> String {
    let data = normalize_word(data);
    if CLEAN_NUMBER_RE.is_match(&data) {
        data
    } else {
        log::warn!("'{data}' does not look like a number, stripping stray characters");
        STRAY_CHARS_RE.replace_all(&data, "").into_owned()
    }
}

/// When both separators occur, the one appearing first is the thousands
/// separator: remove it and keep the other as the decimal point.
fn drop_thousands_separator(data: &mut String) {
    if let (Some(dot), Some(comma)) = (data.find('.'), data.find(',')) {
        let sep = if dot < comma { '.' } else { ',' };
        data.retain(|c| c != sep);
    }
}

/// Loosely cast a cell to a float: tolerates surrounding whitespace, stray
/// symbols, decimal commas and `#.###.###`-style thousands grouping.
pub fn to_float(data: &str) -> Result<f64, FundscanError> {
    let mut cleaned = force_numeric(data);
    drop_thousands_separator(&mut cleaned);
    cleaned = cleaned.replace(',', ".");
    if GROUPED_FLOAT_RE.is_match(&cleaned) {
        cleaned.retain(|c| c != '.');
    }
    cleaned
        .parse::<f64>()
        .map_err(|_| FundscanError::ParseNumber(data.trim().to_string()))
}

/// Like [`to_float`] but for integer cells; a nonzero fractional remainder
/// is rejected rather than truncated.
pub fn to_int(data: &str) -> Result<i64, FundscanError> {
    let mut cleaned = force_numeric(data);
    drop_thousands_separator(&mut cleaned);
    cleaned = cleaned.replace(',', ".");
    if GROUPED_INT_RE.is_match(&cleaned) {
        cleaned.retain(|c| c != '.');
    }
    if let Some(pos) = cleaned.find('.') {
        let fraction: i64 = cleaned[pos + 1..]
            .parse()
            .map_err(|_| FundscanError::ParseNumber(data.trim().to_string()))?;
        if fraction != 0 {
            return Err(FundscanError::NonIntegerNumber(cleaned));
        }
        cleaned.truncate(pos);
    }
    cleaned
        .parse::<i64>()
        .map_err(|_| FundscanError::ParseNumber(data.trim().to_string()))
}

/// Convert a percentage cell to a fraction.
///
/// A trailing `%` always forces normalization to [0, 1]; asking for the raw
/// scale on such input only earns a warning.
pub fn perc_to_float(perc: &str, norm: bool) -> Result<f64, FundscanError> {
    let mut data = normalize_word(perc);
    let mut norm = norm;
    if data.contains('%') {
        data = normalize_word(&data.replace('%', ""));
        if !norm {
            log::warn!("found percentage symbol '%' but normalization was off - forcing it");
        }
        norm = true;
    }
    let f = to_float(&data)?;
    Ok(if norm { f / 100.0 } else { f })
}

/// Trim a text cell without touching its case.
pub fn to_str(data: &str) -> String {
    normalize_string(data, false)
}

/// Look a currency cell up against the ISO code enumeration.
pub fn to_currency(data: &str) -> Result<Currency, FundscanError> {
    Currency::from_code(&normalize_word(data).to_uppercase())
}

/// Try each supported date rendering in order; first parse wins.
pub fn to_date(data: &str) -> Result<NaiveDate, FundscanError> {
    let data = normalize_word(data);
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&data, format) {
            return Ok(date);
        }
    }
    Err(FundscanError::ParseDate(data))
}

/// Per-format numeric interpretation toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeserializeRules {
    /// Monetary cells (market value, acquisition cost) are integer-rendered
    /// in most reports; formats with decimal monetary cells turn this off.
    pub cost_and_value_as_int: bool,
    /// Quantity cells rendered with decimals (truncated after parsing).
    pub quantity_as_float: bool,
}

impl Default for DeserializeRules {
    fn default() -> Self {
        DeserializeRules {
            cost_and_value_as_int: true,
            quantity_as_float: false,
        }
    }
}

/// Convert a matched block into a validated record.
///
/// Parse failures and invariant violations are row-local data problems: they
/// are logged with page and company for diagnosis and the row is dropped,
/// keeping the rest of the page alive.
pub fn deserialize(
    block: &TextBlock,
    targets: &[String],
    rules: &DeserializeRules,
) -> Option<FinancialData> {
    match try_deserialize(block, targets, rules) {
        Ok(data) => Some(data),
        Err(e) => {
            log::error!(
                "cast error page {} company {}: {e}",
                block.page(),
                block.company
            );
            log::warn!(
                "skipping page {} company {}",
                block.page(),
                block.company
            );
            None
        }
    }
}

fn try_deserialize(
    block: &TextBlock,
    targets: &[String],
    rules: &DeserializeRules,
) -> Result<FinancialData, FundscanError> {
    let money = |s: &str| -> Result<f64, FundscanError> {
        if rules.cost_and_value_as_int {
            to_int(s).map(|v| v as f64)
        } else {
            to_float(s)
        }
    };
    let quantity = |s: &str| -> Result<i64, FundscanError> {
        if rules.quantity_as_float {
            to_float(s).map(|f| f as i64)
        } else {
            to_int(s)
        }
    };

    let acquisition_cost = block
        .acquisition_cost
        .as_deref()
        .map(|s| money(s))
        .transpose()?;

    let holding = Holding::new(
        block.page(),
        targets,
        to_str(&block.company),
        to_str(block.subfund()),
        quantity(&block.quantity)?,
        money(&block.market_value)?,
        to_currency(&block.currency)?,
        perc_to_float(&block.perc_net_assets, true)?,
        acquisition_cost,
    )?;

    Ok(match block.kind {
        Instrument::Equity => FinancialData::equity(holding),
        Instrument::Bond => FinancialData::bond(
            holding,
            block.maturity.as_deref().map(to_date).transpose()?,
            block
                .interest_rate
                .as_deref()
                .map(|s| perc_to_float(s, true))
                .transpose()?,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_int_plain() {
        assert_eq!(to_int("68").unwrap(), 68);
        assert_eq!(to_int("  1000  ").unwrap(), 1000);
    }

    #[test]
    fn test_to_int_thousands_grouping() {
        assert_eq!(to_int("1,234,567").unwrap(), 1_234_567);
        assert_eq!(to_int("1.234.567").unwrap(), 1_234_567);
        assert_eq!(to_int("5,000").unwrap(), 5000);
    }

    #[test]
    fn test_to_int_mixed_separators() {
        // First separator is the thousands separator, whichever it is.
        assert_eq!(to_int("1,234,567.00").unwrap(), 1_234_567);
        assert_eq!(to_int("1.234.567,00").unwrap(), 1_234_567);
    }

    #[test]
    fn test_to_int_rejects_nonzero_fraction() {
        assert!(matches!(
            to_int("2.5"),
            Err(FundscanError::NonIntegerNumber(_))
        ));
        assert!(matches!(
            to_int("1,234.56"),
            Err(FundscanError::NonIntegerNumber(_))
        ));
    }

    #[test]
    fn test_to_int_strips_stray_symbols() {
        assert_eq!(to_int("$ 1,234 *").unwrap(), 1234);
    }

    #[test]
    fn test_to_float_decimal_comma() {
        assert_eq!(to_float("12,5").unwrap(), 12.5);
        assert_eq!(to_float("1.234.567,89").unwrap(), 1_234_567.89);
        assert_eq!(to_float("1,234,567.89").unwrap(), 1_234_567.89);
    }

    #[test]
    fn test_to_float_grouped_dots() {
        assert_eq!(to_float("1.234.567").unwrap(), 1_234_567.0);
        // A single dot group stays ambiguous and parses as a decimal.
        assert_eq!(to_float("5.000").unwrap(), 5.0);
    }

    #[test]
    fn test_to_float_garbage_is_an_error() {
        assert!(to_float("n/a").is_err());
        assert!(to_float("").is_err());
    }

    #[test]
    fn test_perc_to_float() {
        assert_eq!(perc_to_float("12.5%", true).unwrap(), 0.125);
        assert_eq!(perc_to_float("12,5%", true).unwrap(), 0.125);
        assert_eq!(perc_to_float("0.5", false).unwrap(), 0.5);
        // '%' forces normalization even when raw scale was requested.
        assert_eq!(perc_to_float("12.5%", false).unwrap(), 0.125);
    }

    #[test]
    fn test_to_currency() {
        assert_eq!(to_currency(" usd ").unwrap(), Currency::USD);
        assert_eq!(to_currency("EUR\n").unwrap(), Currency::EUR);
        assert!(to_currency("ZZZ").is_err());
    }

    #[test]
    fn test_to_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2030, 6, 15).unwrap();
        assert_eq!(to_date("2030-06-15").unwrap(), expected);
        assert_eq!(to_date("15/06/2030").unwrap(), expected);
        assert_eq!(to_date("15/06/30").unwrap(), expected);
        assert!(to_date("June 15th").is_err());
    }

    #[test]
    fn test_deserialize_drops_bad_rows() {
        use crate::block::{BlockKind, PdfBlock};
        use std::collections::BTreeMap;

        let source = PdfBlock {
            kind: BlockKind::Relevant,
            page: 1,
            subfund: "Fund".into(),
            table_col: 0,
            extra: BTreeMap::new(),
            content: "Target Corp\n".into(),
        };
        let block = TextBlock {
            kind: Instrument::Equity,
            company: "Target Corp".into(),
            quantity: "100".into(),
            market_value: "not a number".into(),
            perc_net_assets: "2.5".into(),
            currency: "USD".into(),
            acquisition_cost: None,
            interest_rate: None,
            maturity: None,
            source,
        };
        let targets = vec!["Target Corp".to_string()];
        assert!(deserialize(&block, &targets, &DeserializeRules::default()).is_none());

        let good = TextBlock {
            market_value: "5,200".into(),
            ..block
        };
        let data = deserialize(&good, &targets, &DeserializeRules::default()).unwrap();
        let record = data.record();
        assert_eq!(record.nominal_quantity, 100);
        assert_eq!(record.market_value, 5200.0);
        assert_eq!(record.perc_net_assets, 0.025);
    }
}
