pub mod matching;

use std::sync::LazyLock;

use regex::Regex;

use crate::block::{PdfBlock, TextBlock};
use crate::error::FundscanError;
use crate::model::{Currency, Instrument};
use matching::{normalize_string, MatchStrategy};

static PERC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+[.,]\d+)\s*%").expect("valid percentage regex")
});

static DATE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\d{2}[/-]\d{2}[/-]\d{4}",
        r"\d{4}[/-]\d{2}[/-]\d{2}",
        r"\d{2}[/-]\d{2}[/-]\d{2}",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid date regex"))
    .collect()
});

/// Where a row's currency comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurrencySource {
    /// Sibling cell at a signed offset from the matched row.
    Offset(i32),
    /// The format always reports in one currency.
    Fixed(Currency),
    /// Page-level currency label captured by the filter hook.
    PageLabel,
}

/// Declarative extraction rules of one report format: signed sibling offsets
/// relative to the matched row, plus the matching strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractRules {
    pub nominal_quantity_pos: i32,
    pub market_value_pos: i32,
    pub perc_net_assets_pos: i32,
    pub currency: CurrencySource,
    pub acquisition_cost_pos: Option<i32>,
    pub strategy: MatchStrategy,
}

impl ExtractRules {
    /// Reject misconfigured offsets up front: all three mandatory offsets
    /// must be non-zero and pairwise distinct. This is a programming error
    /// in the format definition, not a data problem.
    pub fn validate(&self) -> Result<(), FundscanError> {
        let (q, m, p) = (
            self.nominal_quantity_pos,
            self.market_value_pos,
            self.perc_net_assets_pos,
        );
        if q == 0 || m == 0 || p == 0 {
            return Err(FundscanError::InvalidOffsets(
                "all positions must be non-zero".into(),
            ));
        }
        if q == m || q == p || m == p {
            return Err(FundscanError::InvalidOffsets(
                "all positions should be different".into(),
            ));
        }
        Ok(())
    }
}

/// Scan the ordered block list for target matches and attach sibling cells.
///
/// Multi-row cells are handled by tentatively concatenating block `i` with
/// `i + 1` when they share a table column; if the merged text matches, the
/// neighbour is spliced out of the working list so subsequent offset lookups
/// land on the intended siblings. The list is owned by this call, so the
/// in-place mutation never escapes it.
pub fn extract_text_blocks(
    rules: &ExtractRules,
    mut blocks: Vec<PdfBlock>,
    targets: &[String],
) -> Result<Vec<TextBlock>, FundscanError> {
    rules.validate()?;

    let mut found = Vec::new();
    let mut i = 0;
    while i < blocks.len() {
        let mut content = blocks[i].content.clone();
        let mut merged = false;
        if i + 1 < blocks.len() && blocks[i].table_col == blocks[i + 1].table_col {
            content.push_str(&blocks[i + 1].content);
            merged = true;
        }

        for target in targets {
            if normalize_string(target, true).is_empty() {
                continue;
            }
            if rules.strategy.matches(&content, target) {
                if merged {
                    blocks[i].content = content;
                    blocks.remove(i + 1);
                }
                if let Some(block) = build_text_block(rules, &blocks, i, target) {
                    found.push(block);
                }
                break;
            }
        }
        i += 1;
    }
    Ok(found)
}

/// Resolve `base + offset` inside the block list.
fn sibling<'a>(blocks: &'a [PdfBlock], base: usize, offset: i32) -> Option<&'a PdfBlock> {
    let index = base as i64 + offset as i64;
    if index < 0 {
        return None;
    }
    blocks.get(index as usize)
}

fn sibling_content(
    blocks: &[PdfBlock],
    base: usize,
    offset: i32,
    what: &str,
) -> Option<String> {
    match sibling(blocks, base, offset) {
        Some(b) => Some(b.content.clone()),
        None => {
            log::error!(
                "{what} offset {offset} out of range for matched block {base} on page {}",
                blocks[base].page
            );
            None
        }
    }
}

/// Build the text block for a match, or `None` (with a log entry) when a
/// sibling offset runs past the ends of the list. A row too close to the
/// document edge is dropped rather than aborting the page.
fn build_text_block(
    rules: &ExtractRules,
    blocks: &[PdfBlock],
    i: usize,
    target: &str,
) -> Option<TextBlock> {
    let matched = &blocks[i];

    let quantity = sibling_content(blocks, i, rules.nominal_quantity_pos, "nominal quantity")?;
    let market_value = sibling_content(blocks, i, rules.market_value_pos, "market value")?;
    let perc_net_assets =
        sibling_content(blocks, i, rules.perc_net_assets_pos, "% net assets")?;

    let currency = match rules.currency {
        CurrencySource::Offset(pos) => sibling_content(blocks, i, pos, "currency")?,
        CurrencySource::Fixed(c) => c.code().to_string(),
        CurrencySource::PageLabel => match matched.extra.get("currency") {
            Some(label) => label.clone(),
            None => {
                log::error!(
                    "no page currency label for matched block on page {}",
                    matched.page
                );
                return None;
            }
        },
    };

    let acquisition_cost = match rules.acquisition_cost_pos {
        Some(pos) => Some(sibling_content(blocks, i, pos, "acquisition cost")?),
        None => None,
    };

    // An interest-rate or maturity-looking substring in the matched row
    // reclassifies it from equity to bond.
    let mut kind = Instrument::Equity;
    let mut interest_rate = None;
    let mut maturity = None;
    if let Some(m) = PERC_RE.find(&matched.content) {
        kind = Instrument::Bond;
        interest_rate = Some(m.as_str().to_string());
    }
    for re in DATE_RES.iter() {
        if let Some(m) = re.find(&matched.content) {
            kind = Instrument::Bond;
            maturity = Some(m.as_str().to_string());
            break;
        }
    }

    Some(TextBlock {
        kind,
        company: target.to_string(),
        quantity,
        market_value,
        perc_net_assets,
        currency,
        acquisition_cost,
        interest_rate,
        maturity,
        source: matched.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;
    use std::collections::BTreeMap;

    fn block(content: &str, col: usize) -> PdfBlock {
        PdfBlock {
            kind: BlockKind::Relevant,
            page: 1,
            subfund: "Fund".into(),
            table_col: col,
            extra: BTreeMap::new(),
            content: format!("{content}\n"),
        }
    }

    fn rules() -> ExtractRules {
        ExtractRules {
            nominal_quantity_pos: -1,
            market_value_pos: 1,
            perc_net_assets_pos: 2,
            currency: CurrencySource::Fixed(Currency::EUR),
            acquisition_cost_pos: None,
            strategy: MatchStrategy::Exact,
        }
    }

    fn targets() -> Vec<String> {
        vec!["Target Corp".to_string()]
    }

    #[test]
    fn test_offset_validation() {
        let mut r = rules();
        assert!(r.validate().is_ok());
        r.market_value_pos = 0;
        assert!(r.validate().is_err());
        r.market_value_pos = -1;
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_simple_match_with_siblings() {
        let blocks = vec![
            block("100", 1),
            block("Target Corp", 0),
            block("5,200", 2),
            block("2.5", 3),
        ];
        let found = extract_text_blocks(&rules(), blocks, &targets()).unwrap();
        assert_eq!(found.len(), 1);
        let tb = &found[0];
        assert_eq!(tb.company, "Target Corp");
        assert_eq!(tb.quantity, "100\n");
        assert_eq!(tb.market_value, "5,200\n");
        assert_eq!(tb.perc_net_assets, "2.5\n");
        assert_eq!(tb.currency, "EUR");
        assert_eq!(tb.kind, Instrument::Equity);
    }

    #[test]
    fn test_split_company_name_is_merged() {
        // "Target" and "Corp" sit in the same column: a wrapped name. After
        // the merge the siblings of the match must realign.
        let blocks = vec![
            block("100", 1),
            block("Target", 0),
            block("Corp", 0),
            block("5,200", 2),
            block("2.5", 3),
        ];
        let found = extract_text_blocks(&rules(), blocks, &targets()).unwrap();
        assert_eq!(found.len(), 1);
        let tb = &found[0];
        assert_eq!(tb.content(), "Target\nCorp\n");
        assert_eq!(tb.market_value, "5,200\n");
        assert_eq!(tb.perc_net_assets, "2.5\n");
    }

    #[test]
    fn test_bond_classification_from_row_content() {
        let blocks = vec![
            block("100", 1),
            block("Target Corp 3.75% 15/06/2030", 0),
            block("5,200", 2),
            block("2.5", 3),
        ];
        let found = extract_text_blocks(&rules(), blocks, &targets()).unwrap();
        let tb = &found[0];
        assert_eq!(tb.kind, Instrument::Bond);
        assert_eq!(tb.interest_rate.as_deref(), Some("3.75%"));
        assert_eq!(tb.maturity.as_deref(), Some("15/06/2030"));
    }

    #[test]
    fn test_out_of_range_offset_skips_row() {
        // The match sits at the end of the list; market value (+1) runs past
        // it, so the row is skipped instead of failing the page.
        let blocks = vec![block("100", 1), block("Target Corp", 0)];
        let found = extract_text_blocks(&rules(), blocks, &targets()).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_currency_from_page_label() {
        let mut matched = block("Target Corp", 0);
        matched.extra.insert("currency".into(), "USD".into());
        let blocks = vec![block("100", 1), matched, block("5,200", 2), block("2.5", 3)];
        let r = ExtractRules {
            currency: CurrencySource::PageLabel,
            ..rules()
        };
        let found = extract_text_blocks(&r, blocks, &targets()).unwrap();
        assert_eq!(found[0].currency, "USD");
    }

    #[test]
    fn test_currency_from_offset() {
        let blocks = vec![
            block("100", 1),
            block("Target Corp", 0),
            block("USD", 2),
            block("5,200", 3),
            block("2.5", 4),
        ];
        let r = ExtractRules {
            nominal_quantity_pos: -1,
            market_value_pos: 2,
            perc_net_assets_pos: 3,
            currency: CurrencySource::Offset(1),
            acquisition_cost_pos: None,
            strategy: MatchStrategy::Exact,
        };
        let found = extract_text_blocks(&r, blocks, &targets()).unwrap();
        assert_eq!(found[0].currency, "USD\n");
    }

    #[test]
    fn test_empty_block_list() {
        let found = extract_text_blocks(&rules(), Vec::new(), &targets()).unwrap();
        assert!(found.is_empty());
    }
}
