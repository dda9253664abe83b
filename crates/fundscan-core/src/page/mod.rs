pub mod geometry;

use crate::error::FundscanError;
use geometry::Area;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// One physical text line on a page.
///
/// `text` is the line's rendered text attribute (used for text-based
/// selection); `content` is the concatenation of the line's glyph characters
/// (used as block content downstream). The two usually agree but come from
/// different places in the page tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub content: String,
    pub font: String,
    pub size: f64,
    pub area: Area,
}

/// All extractable lines of a single rendered page, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<TextLine>,
}

impl Page {
    /// All lines set in the given font.
    pub fn lines_with_font(&self, font: &str) -> Vec<&TextLine> {
        self.lines.iter().filter(|l| l.font == font).collect()
    }

    /// First line whose text contains `text` and whose font is `font`.
    pub fn find_text_font(&self, text: &str, font: &str) -> Option<&TextLine> {
        self.lines
            .iter()
            .find(|l| l.font == font && l.text.contains(text))
    }

    pub fn has_text_font(&self, text: &str, font: &str) -> bool {
        self.find_text_font(text, font).is_some()
    }
}

#[derive(Default)]
struct LineBuilder {
    text: String,
    bbox: Option<Area>,
    font: Option<(String, f64)>,
    chars: String,
    char_box: Option<Area>,
}

impl LineBuilder {
    fn finish(self) -> Option<TextLine> {
        let (font, size) = self.font?;
        // A line with no bbox of its own gets the union of its glyph boxes.
        let area = self.bbox.or(self.char_box)?;
        Some(TextLine {
            text: self.text,
            content: self.chars,
            font,
            size,
            area,
        })
    }
}

fn attr(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, FundscanError> {
    let found = e
        .try_get_attribute(name)
        .map_err(|err| FundscanError::PageXml(err.to_string()))?;
    match found {
        Some(a) => {
            let value = a
                .unescape_value()
                .map_err(|err| FundscanError::PageXml(err.to_string()))?;
            Ok(Some(value.into_owned()))
        }
        None => Ok(None),
    }
}

/// Parse one page's XML tree into a [`Page`].
///
/// The expected shape is the character-per-glyph rendering of a PDF page:
/// `line` elements carrying a `text` attribute and optionally a `bbox`
/// attribute, a nested `font` element with `name` and `size`, and `char`
/// elements with `c` and `bbox`. Lines missing font or geometry are dropped.
pub fn parse_page(xml: &str) -> Result<Page, FundscanError> {
    let mut reader = Reader::from_str(xml);

    let mut page = Page::default();
    let mut current: Option<LineBuilder> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| FundscanError::PageXml(e.to_string()))?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => match e.name().as_ref() {
                b"line" => {
                    let mut builder = LineBuilder {
                        text: attr(e, "text")?.unwrap_or_default(),
                        ..LineBuilder::default()
                    };
                    if let Some(bbox) = attr(e, "bbox")? {
                        builder.bbox = Area::from_bbox(&bbox);
                    }
                    if matches!(event, Event::Empty(_)) {
                        // Self-closing line carries no glyphs, nothing to keep.
                        continue;
                    }
                    current = Some(builder);
                }
                b"font" => {
                    if let Some(builder) = current.as_mut() {
                        if builder.font.is_none() {
                            let name = attr(e, "name")?.unwrap_or_default();
                            let size = attr(e, "size")?
                                .and_then(|s| s.parse::<f64>().ok())
                                .unwrap_or(0.0);
                            builder.font = Some((name, size));
                        }
                    }
                }
                b"char" => {
                    if let Some(builder) = current.as_mut() {
                        if let Some(c) = attr(e, "c")? {
                            builder.chars.push_str(&c);
                        }
                        if let Some(bbox) = attr(e, "bbox")? {
                            if let Some(area) = Area::from_bbox(&bbox) {
                                builder.char_box = Some(match builder.char_box {
                                    Some(existing) => existing.union(&area),
                                    None => area,
                                });
                            }
                        }
                    }
                }
                _ => {}
            },
            Event::End(ref e) => {
                if e.name().as_ref() == b"line" {
                    if let Some(builder) = current.take() {
                        match builder.finish() {
                            Some(line) => page.lines.push(line),
                            None => log::debug!("dropping line without font or geometry"),
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(page)
}
