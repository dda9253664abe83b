use crate::page::geometry::{Axis, Band};
use crate::page::TextLine;

/// Keep only lines whose center along `axis` falls inside `band`.
pub fn select_inside<'a>(lines: Vec<&'a TextLine>, axis: Axis, band: &Band) -> Vec<&'a TextLine> {
    lines
        .into_iter()
        .filter(|line| band.contains(axis.center(&line.area)))
        .collect()
}

/// Drop lines matching any of the given (text, font) pairs.
///
/// Used to discard section sub-headers that share the table body font.
pub fn deselect_text_font<'a>(
    lines: Vec<&'a TextLine>,
    deselection: &[(String, String)],
) -> Vec<&'a TextLine> {
    lines
        .into_iter()
        .filter(|line| {
            !deselection
                .iter()
                .any(|(text, font)| line.text == *text && line.font == *font)
        })
        .collect()
}
