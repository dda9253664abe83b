pub mod block;
pub mod deserialize;
pub mod error;
pub mod extract;
pub mod filter;
pub mod formats;
pub mod model;
pub mod page;

pub use error::FundscanError;
pub use formats::FormatKind;
pub use model::{FinancialData, HoldingRecord};

use block::PdfBlock;

/// Main API entry point: run the full pipeline over a document's rendered
/// pages and return the target holdings found in them.
///
/// `pages` holds one XML tree per page, in document order; page numbers are
/// 1-based positions in the slice. All pages are filtered into a single flat
/// block list before matching, so sibling offsets may cross page boundaries
/// exactly as rows do in the printed table.
///
/// Structural problems (a header page without its subfund label, bad offset
/// configuration) fail the document; row-local problems are logged and the
/// row is dropped.
pub fn extract_document(
    format: FormatKind,
    pages: &[String],
    targets: &[String],
) -> Result<Vec<FinancialData>, FundscanError> {
    let spec = format.spec();
    spec.extract.validate()?;

    let mut blocks: Vec<PdfBlock> = Vec::new();
    for (i, xml) in pages.iter().enumerate() {
        let page_no = (i + 1) as u32;
        let page = page::parse_page(xml)?;
        let page_blocks = spec.filter.filter_page(&page, page_no)?;
        log::debug!(
            "page {page_no}: {} relevant block(s)",
            page_blocks.len()
        );
        blocks.extend(page_blocks);
    }

    let text_blocks = extract::extract_text_blocks(&spec.extract, blocks, targets)?;
    log::debug!("matched {} target row(s)", text_blocks.len());

    Ok(text_blocks
        .iter()
        .filter_map(|b| deserialize::deserialize(b, targets, &spec.deserialize))
        .collect())
}

/// Run the pipeline over a single page, keeping its real page number.
pub fn extract_page(
    format: FormatKind,
    xml: &str,
    page_no: u32,
    targets: &[String],
) -> Result<Vec<FinancialData>, FundscanError> {
    let spec = format.spec();
    spec.extract.validate()?;

    let page = page::parse_page(xml)?;
    let blocks = spec.filter.filter_page(&page, page_no)?;
    let text_blocks = extract::extract_text_blocks(&spec.extract, blocks, targets)?;

    Ok(text_blocks
        .iter()
        .filter_map(|b| deserialize::deserialize(b, targets, &spec.deserialize))
        .collect())
}
