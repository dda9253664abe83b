use std::collections::BTreeMap;
use std::fmt;

use crate::model::Instrument;
use crate::page::TextLine;

/// Classification tag of a filtered page block.
///
/// Every supported format currently emits a single tag; the enum marks the
/// slot where a format with several block roles would distinguish them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Relevant,
}

/// A classified, page-located chunk of text: one table row cell (or a merged
/// pair of cells) together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfBlock {
    pub kind: BlockKind,
    pub page: u32,
    pub subfund: String,
    pub table_col: usize,
    /// Format-specific page metadata, e.g. a page-level currency label.
    pub extra: BTreeMap<String, String>,
    pub content: String,
}

impl PdfBlock {
    /// Wrap page lines as a block; each line's glyphs are joined and
    /// newline-terminated.
    pub fn from_lines(
        kind: BlockKind,
        page: u32,
        subfund: String,
        table_col: usize,
        extra: BTreeMap<String, String>,
        lines: &[&TextLine],
    ) -> PdfBlock {
        let mut content = String::new();
        for line in lines {
            content.push_str(&line.content);
            content.push('\n');
        }
        PdfBlock {
            kind,
            page,
            subfund,
            table_col,
            extra,
            content,
        }
    }
}

impl fmt::Display for PdfBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PdfBlock page {} subfund '{}' col {}: \"{}\"",
            self.page,
            self.subfund,
            self.table_col,
            self.content.trim_end_matches('\n')
        )
    }
}

/// A block that matched a target company, with its sibling cells attached.
///
/// Field values are still raw cell text; typed conversion happens in the
/// deserialization stage.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub kind: Instrument,
    pub company: String,
    pub quantity: String,
    pub market_value: String,
    pub perc_net_assets: String,
    pub currency: String,
    pub acquisition_cost: Option<String>,
    pub interest_rate: Option<String>,
    pub maturity: Option<String>,
    pub source: PdfBlock,
}

impl TextBlock {
    pub fn page(&self) -> u32 {
        self.source.page
    }

    pub fn subfund(&self) -> &str {
        &self.source.subfund
    }

    pub fn content(&self) -> &str {
        &self.source.content
    }
}

impl fmt::Display for TextBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TextBlock ({}) company '{}' page {}: \"{}\"",
            self.kind,
            self.company,
            self.page(),
            self.content().trim_end_matches('\n')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::geometry::{Area, Range};

    fn line(content: &str) -> TextLine {
        TextLine {
            text: content.to_string(),
            content: content.to_string(),
            font: "Helvetica".to_string(),
            size: 8.0,
            area: Area::new(Range::new(0.0, 10.0), Range::new(0.0, 10.0)),
        }
    }

    #[test]
    fn test_content_is_newline_terminated_per_line() {
        let a = line("Target Corp");
        let b = line("Common Stock");
        let blk = PdfBlock::from_lines(
            BlockKind::Relevant,
            1,
            "Fund A".into(),
            0,
            BTreeMap::new(),
            &[&a, &b],
        );
        assert_eq!(blk.content, "Target Corp\nCommon Stock\n");
    }

    #[test]
    fn test_structural_equality() {
        let a = line("100");
        let mk = || {
            PdfBlock::from_lines(
                BlockKind::Relevant,
                2,
                "Fund".into(),
                1,
                BTreeMap::new(),
                &[&a],
            )
        };
        assert_eq!(mk(), mk());
        let mut other = mk();
        other.table_col = 2;
        assert_ne!(mk(), other);
    }
}
