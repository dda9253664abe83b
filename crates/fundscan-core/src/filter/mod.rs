pub mod select;
pub mod table;

use std::collections::BTreeMap;

use crate::block::{BlockKind, PdfBlock};
use crate::error::FundscanError;
use crate::page::geometry::{Area, Axis, Band};
use crate::page::Page;
use select::{deselect_text_font, select_inside};
use table::{table_positions, TableAxisOptions};

/// One side of a vertical clipping range: either a literal page coordinate or
/// the position of a text occurrence resolved per page.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipBound {
    Coordinate(f64),
    Anchor { text: String, font: String },
}

/// Vertical band the table body is clipped to. An anchor used as the top
/// bound resolves to the anchor line's bottom edge; as the bottom bound, to
/// its top edge. Unresolvable anchors leave that side unbounded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerticalClip {
    pub top: Option<ClipBound>,
    pub bottom: Option<ClipBound>,
}

/// Optional per-format page hook, expressed as data rather than an override
/// function. `CurrencyBand` captures a page-level currency label from a
/// vertical band and attaches it to every block of the page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageHook {
    None,
    CurrencyBand { font: String, band: Band },
}

/// Declarative filtering rules of one report format.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterRules {
    /// Header text gating page inclusion.
    pub header_text: String,
    pub header_font: String,
    pub subfund_font: String,
    /// Vertical band the subfund label must appear in.
    pub subfund_band: Band,
    /// Font of the table body rows.
    pub body_font: String,
    pub clip: Option<VerticalClip>,
    /// (text, font) pairs to drop from the body selection.
    pub deselect: Vec<(String, String)>,
    pub hook: PageHook,
}

/// Page filter of a format: a single rule set, or two rule sets chosen by
/// the presence of a marker line on the page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageFilter {
    Single(FilterRules),
    ByMarker {
        text: String,
        font: String,
        when_present: Box<FilterRules>,
        otherwise: Box<FilterRules>,
    },
}

impl PageFilter {
    pub fn filter_page(&self, page: &Page, page_no: u32) -> Result<Vec<PdfBlock>, FundscanError> {
        match self {
            PageFilter::Single(rules) => filter_page(rules, page, page_no),
            PageFilter::ByMarker {
                text,
                font,
                when_present,
                otherwise,
            } => {
                if page.has_text_font(text, font) {
                    filter_page(when_present, page, page_no)
                } else {
                    filter_page(otherwise, page, page_no)
                }
            }
        }
    }
}

/// Apply one format's rules to a page, producing its relevant row blocks in
/// document order.
///
/// A page without the header line is not part of the holdings section and
/// yields no blocks. A page that has the header but no subfund label is a
/// structural mismatch and fails loudly, since every downstream offset would
/// be meaningless.
pub fn filter_page(
    rules: &FilterRules,
    page: &Page,
    page_no: u32,
) -> Result<Vec<PdfBlock>, FundscanError> {
    if !page.has_text_font(&rules.header_text, &rules.header_font) {
        return Ok(Vec::new());
    }

    let subfund_lines = select_inside(
        page.lines_with_font(&rules.subfund_font),
        Axis::Y,
        &rules.subfund_band,
    );
    let subfund = subfund_lines
        .first()
        .map(|l| l.text.clone())
        .ok_or_else(|| FundscanError::ExpectedBlockNotFound {
            element: "subfund label".into(),
            page: page_no,
        })?;

    let mut lines = page.lines_with_font(&rules.body_font);
    if !rules.deselect.is_empty() {
        lines = deselect_text_font(lines, &rules.deselect);
    }
    let clip = resolve_clip(rules.clip.as_ref(), page);
    let lines = select_inside(lines, Axis::Y, &clip);

    let extra = hook_metadata(&rules.hook, page, page_no)?;

    let areas: Vec<Area> = lines.iter().map(|l| l.area).collect();
    let columns = table_positions(&areas, Axis::X, TableAxisOptions::default());

    Ok(lines
        .iter()
        .zip(columns)
        .map(|(&line, col)| {
            PdfBlock::from_lines(
                BlockKind::Relevant,
                page_no,
                subfund.clone(),
                col,
                extra.clone(),
                &[line],
            )
        })
        .collect())
}

fn resolve_clip(clip: Option<&VerticalClip>, page: &Page) -> Band {
    let Some(clip) = clip else {
        return Band::default();
    };
    let top = match &clip.top {
        None => None,
        Some(ClipBound::Coordinate(v)) => Some(*v),
        Some(ClipBound::Anchor { text, font }) => {
            page.find_text_font(text, font).map(|l| l.area.y.end)
        }
    };
    let bottom = match &clip.bottom {
        None => None,
        Some(ClipBound::Coordinate(v)) => Some(*v),
        Some(ClipBound::Anchor { text, font }) => {
            page.find_text_font(text, font).map(|l| l.area.y.start)
        }
    };
    Band::new(top, bottom)
}

fn hook_metadata(
    hook: &PageHook,
    page: &Page,
    page_no: u32,
) -> Result<BTreeMap<String, String>, FundscanError> {
    let mut extra = BTreeMap::new();
    match hook {
        PageHook::None => {}
        PageHook::CurrencyBand { font, band } => {
            let label = select_inside(page.lines_with_font(font), Axis::Y, band)
                .first()
                .map(|l| l.text.clone())
                .ok_or_else(|| FundscanError::ExpectedBlockNotFound {
                    element: "currency label".into(),
                    page: page_no,
                })?;
            extra.insert("currency".to_string(), label);
        }
    }
    Ok(extra)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::geometry::Range;
    use crate::page::TextLine;

    fn line(text: &str, font: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> TextLine {
        TextLine {
            text: text.to_string(),
            content: text.to_string(),
            font: font.to_string(),
            size: 8.0,
            area: Area::new(Range::new(x0, x1), Range::new(y0, y1)),
        }
    }

    fn rules() -> FilterRules {
        FilterRules {
            header_text: "PORTFOLIO AS AT".into(),
            header_font: "Bold".into(),
            subfund_font: "Bold".into(),
            subfund_band: Band::between(60.0, 90.0),
            body_font: "Light".into(),
            clip: Some(VerticalClip {
                top: Some(ClipBound::Coordinate(100.0)),
                bottom: Some(ClipBound::Coordinate(800.0)),
            }),
            deselect: vec![],
            hook: PageHook::None,
        }
    }

    fn page() -> Page {
        Page {
            lines: vec![
                line("PORTFOLIO AS AT 30 JUNE", "Bold", 50.0, 30.0, 200.0, 40.0),
                line("Global Equity Fund", "Bold", 50.0, 70.0, 180.0, 80.0),
                line("Target Corp", "Light", 50.0, 120.0, 150.0, 130.0),
                line("1,000", "Light", 200.0, 120.0, 240.0, 130.0),
                line("Footer note", "Light", 50.0, 820.0, 150.0, 830.0),
            ],
        }
    }

    #[test]
    fn test_page_without_header_yields_nothing() {
        let mut r = rules();
        r.header_text = "SOMETHING ELSE".into();
        let blocks = filter_page(&r, &page(), 1).unwrap();
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_missing_subfund_is_fatal_for_the_page() {
        let mut r = rules();
        r.subfund_band = Band::between(500.0, 510.0);
        let err = filter_page(&r, &page(), 4).unwrap_err();
        assert!(matches!(
            err,
            FundscanError::ExpectedBlockNotFound { page: 4, .. }
        ));
    }

    #[test]
    fn test_body_rows_are_clipped_and_annotated() {
        let blocks = filter_page(&rules(), &page(), 2).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].content, "Target Corp\n");
        assert_eq!(blocks[1].content, "1,000\n");
        assert_eq!(blocks[0].page, 2);
        assert_eq!(blocks[0].subfund, "Global Equity Fund");
        assert_eq!(blocks[0].table_col, 0);
        assert_eq!(blocks[1].table_col, 1);
    }

    #[test]
    fn test_deselection_drops_subheaders() {
        let mut p = page();
        p.lines
            .push(line("INVESTMENT FUNDS", "Light", 50.0, 150.0, 160.0, 160.0));
        let mut r = rules();
        r.deselect = vec![("INVESTMENT FUNDS".into(), "Light".into())];
        let blocks = filter_page(&r, &p, 1).unwrap();
        assert!(blocks.iter().all(|b| b.content != "INVESTMENT FUNDS\n"));
    }

    #[test]
    fn test_anchor_clip_resolves_to_line_edges() {
        let mut p = page();
        p.lines
            .push(line("Futures contracts", "Bold", 50.0, 300.0, 180.0, 310.0));
        // Keep body rows between the header line and the futures section.
        let r = FilterRules {
            clip: Some(VerticalClip {
                top: Some(ClipBound::Anchor {
                    text: "PORTFOLIO AS AT".into(),
                    font: "Bold".into(),
                }),
                bottom: Some(ClipBound::Anchor {
                    text: "Futures contracts".into(),
                    font: "Bold".into(),
                }),
            }),
            ..rules()
        };
        let blocks = filter_page(&r, &p, 1).unwrap();
        assert_eq!(blocks.len(), 2);

        // An unresolvable anchor leaves the side unbounded.
        let r = FilterRules {
            clip: Some(VerticalClip {
                top: None,
                bottom: Some(ClipBound::Anchor {
                    text: "No such anchor".into(),
                    font: "Bold".into(),
                }),
            }),
            ..rules()
        };
        let blocks = filter_page(&r, &p, 1).unwrap();
        assert_eq!(blocks.len(), 3);
    }

    #[test]
    fn test_currency_hook_attaches_page_metadata() {
        let mut p = page();
        p.lines
            .insert(0, line("EUR", "Light", 400.0, 50.0, 430.0, 58.0));
        let r = FilterRules {
            hook: PageHook::CurrencyBand {
                font: "Light".into(),
                band: Band::up_to(60.0),
            },
            ..rules()
        };
        let blocks = filter_page(&r, &p, 1).unwrap();
        assert_eq!(blocks[0].extra.get("currency").map(String::as_str), Some("EUR"));
    }

    #[test]
    fn test_marker_selects_rule_variant() {
        let short = FilterRules {
            clip: Some(VerticalClip {
                top: None,
                bottom: Some(ClipBound::Coordinate(200.0)),
            }),
            ..rules()
        };
        let pf = PageFilter::ByMarker {
            text: "Footer note".into(),
            font: "Light".into(),
            when_present: Box::new(short),
            otherwise: Box::new(rules()),
        };
        // Marker is present, so the tighter clip applies: body rows stay,
        // the footer line falls outside it.
        let blocks = pf.filter_page(&page(), 1).unwrap();
        assert_eq!(blocks.len(), 2);
    }
}
