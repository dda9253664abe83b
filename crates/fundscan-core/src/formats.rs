//! Static registry of the supported report formats.
//!
//! Each format is pure data: filtering rules (fonts, header text, vertical
//! bands), extraction offsets and matching strategy, numeric interpretation
//! toggles, and the URL patterns used for auto-detection. The pipeline engine
//! is generic over these rule sets; nothing here contains logic.

use std::sync::LazyLock;

use regex::Regex;

use crate::deserialize::DeserializeRules;
use crate::error::FundscanError;
use crate::extract::matching::MatchStrategy;
use crate::extract::{CurrencySource, ExtractRules};
use crate::filter::{ClipBound, FilterRules, PageFilter, PageHook, VerticalClip};
use crate::model::Currency;
use crate::page::geometry::Band;

/// The closed set of known report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    Eurizon,
    EurizonIt,
    EurizonOld,
    Amundi,
    Amundi2,
    Mediolanum,
    Anima,
    Arca,
    Asteria,
    Asteria2023,
    Fideuram,
}

/// Everything the pipeline needs to process one format.
#[derive(Debug, Clone)]
pub struct FormatSpec {
    pub filter: PageFilter,
    pub extract: ExtractRules,
    pub deserialize: DeserializeRules,
    /// Patterns matched against a report URL for format auto-detection.
    pub url_patterns: Vec<Regex>,
}

impl FormatKind {
    pub const ALL: &'static [FormatKind] = &[
        FormatKind::Eurizon,
        FormatKind::EurizonIt,
        FormatKind::EurizonOld,
        FormatKind::Amundi,
        FormatKind::Amundi2,
        FormatKind::Mediolanum,
        FormatKind::Anima,
        FormatKind::Arca,
        FormatKind::Asteria,
        FormatKind::Asteria2023,
        FormatKind::Fideuram,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FormatKind::Eurizon => "eurizon",
            FormatKind::EurizonIt => "eurizon_it",
            FormatKind::EurizonOld => "eurizon_old",
            FormatKind::Amundi => "amundi",
            FormatKind::Amundi2 => "amundi2",
            FormatKind::Mediolanum => "mediolanum",
            FormatKind::Anima => "anima",
            FormatKind::Arca => "arca",
            FormatKind::Asteria => "asteria",
            FormatKind::Asteria2023 => "asteria_2023",
            FormatKind::Fideuram => "fideuram",
        }
    }

    pub fn from_name(name: &str) -> Result<FormatKind, FundscanError> {
        let lower = name.trim().to_lowercase();
        FormatKind::ALL
            .iter()
            .find(|k| k.name() == lower)
            .copied()
            .ok_or_else(|| {
                let available = FormatKind::ALL
                    .iter()
                    .map(|k| k.name())
                    .collect::<Vec<_>>()
                    .join(", ");
                FundscanError::UnknownFormat(name.to_string(), available)
            })
    }

    pub fn spec(&self) -> &'static FormatSpec {
        &REGISTRY[*self as usize]
    }

    /// First format with a URL pattern matching the report URL.
    pub fn detect_from_url(url: &str) -> Option<FormatKind> {
        FormatKind::ALL
            .iter()
            .find(|k| k.spec().url_patterns.iter().any(|re| re.is_match(url)))
            .copied()
    }
}

/// Check every registered format's extraction offsets. Called once at
/// pipeline entry so a misconfigured format fails before any page work.
pub fn validate_formats() -> Result<(), FundscanError> {
    for kind in FormatKind::ALL {
        kind.spec().extract.validate().map_err(|e| {
            FundscanError::InvalidOffsets(format!("format '{}': {e}", kind.name()))
        })?;
    }
    Ok(())
}

fn url_patterns(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("valid URL pattern"))
        .collect()
}

fn single(rules: FilterRules) -> PageFilter {
    PageFilter::Single(rules)
}

fn anchor(text: &str, font: &str) -> ClipBound {
    ClipBound::Anchor {
        text: text.into(),
        font: font.into(),
    }
}

fn clip(top: Option<ClipBound>, bottom: Option<ClipBound>) -> Option<VerticalClip> {
    Some(VerticalClip { top, bottom })
}

fn at(v: f64) -> Option<ClipBound> {
    Some(ClipBound::Coordinate(v))
}

static REGISTRY: LazyLock<Vec<FormatSpec>> = LazyLock::new(|| {
    vec![
        // Eurizon
        FormatSpec {
            filter: single(FilterRules {
                header_text: "PORTFOLIO AS AT".into(),
                header_font: "Frutiger-Black".into(),
                subfund_font: "Frutiger-Black".into(),
                subfund_band: Band::between(65.0, 85.0),
                body_font: "Frutiger-Light".into(),
                clip: clip(at(160.0), at(765.0)),
                deselect: vec![],
                hook: PageHook::None,
            }),
            extract: ExtractRules {
                nominal_quantity_pos: -1,
                market_value_pos: 3,
                perc_net_assets_pos: 4,
                currency: CurrencySource::Offset(1),
                acquisition_cost_pos: Some(2),
                strategy: MatchStrategy::Exact,
            },
            deserialize: DeserializeRules {
                cost_and_value_as_int: false,
                quantity_as_float: false,
            },
            url_patterns: url_patterns(&[r"eurizoncapital\.(com|lu)"]),
        },
        // EurizonIt
        FormatSpec {
            filter: single(FilterRules {
                header_text: "Elenco".into(),
                header_font: "TrebuchetMS,Bold".into(),
                subfund_font: "TrebuchetMS,Italic".into(),
                subfund_band: Band::between(793.0, 803.0),
                body_font: "TrebuchetMS".into(),
                clip: None,
                deselect: vec![],
                hook: PageHook::None,
            }),
            extract: ExtractRules {
                nominal_quantity_pos: 1,
                market_value_pos: 2,
                perc_net_assets_pos: 4,
                currency: CurrencySource::Fixed(Currency::EUR),
                acquisition_cost_pos: None,
                strategy: MatchStrategy::Exact,
            },
            deserialize: DeserializeRules::default(),
            url_patterns: url_patterns(&[r"eurizoncapital\.it"]),
        },
        // EurizonOld
        FormatSpec {
            filter: single(FilterRules {
                header_text: "Face value/".into(),
                header_font: "ArialMT-Bold".into(),
                subfund_font: "ArialMT".into(),
                subfund_band: Band::between(82.0, 98.0),
                body_font: "Verdana".into(),
                clip: clip(at(195.0), at(710.0)),
                deselect: vec![],
                hook: PageHook::None,
            }),
            extract: ExtractRules {
                nominal_quantity_pos: 1,
                market_value_pos: 4,
                perc_net_assets_pos: 5,
                currency: CurrencySource::Offset(2),
                acquisition_cost_pos: Some(3),
                strategy: MatchStrategy::Exact,
            },
            deserialize: DeserializeRules {
                cost_and_value_as_int: false,
                quantity_as_float: false,
            },
            url_patterns: url_patterns(&[]),
        },
        // Amundi
        FormatSpec {
            filter: single(FilterRules {
                header_text: "Securities Portfolio as at".into(),
                header_font: "ArialNarrow-BoldItalic".into(),
                subfund_font: "ArialMT".into(),
                subfund_band: Band::up_to(27.0),
                body_font: "ArialNarrow".into(),
                clip: clip(None, at(768.0)),
                deselect: vec![],
                hook: PageHook::CurrencyBand {
                    font: "ArialNarrow".into(),
                    band: Band::up_to(208.0),
                },
            }),
            extract: ExtractRules {
                nominal_quantity_pos: 1,
                market_value_pos: -1,
                perc_net_assets_pos: -2,
                currency: CurrencySource::PageLabel,
                acquisition_cost_pos: None,
                strategy: MatchStrategy::Exact,
            },
            deserialize: DeserializeRules::default(),
            url_patterns: url_patterns(&[r"amundi\.(com|lu)"]),
        },
        // Amundi2
        FormatSpec {
            filter: single(FilterRules {
                header_text: "Titolo".into(),
                header_font: "TrebuchetMS-Bold".into(),
                subfund_font: "Arial-BoldItalicMT".into(),
                subfund_band: Band::up_to(60.0),
                body_font: "TrebuchetMS".into(),
                clip: None,
                deselect: vec![],
                hook: PageHook::None,
            }),
            extract: ExtractRules {
                nominal_quantity_pos: 1,
                market_value_pos: 4,
                perc_net_assets_pos: 5,
                currency: CurrencySource::Fixed(Currency::EUR),
                acquisition_cost_pos: None,
                strategy: MatchStrategy::Exact,
            },
            deserialize: DeserializeRules {
                cost_and_value_as_int: false,
                quantity_as_float: true,
            },
            url_patterns: url_patterns(&[r"amundi\.it"]),
        },
        // Mediolanum
        FormatSpec {
            filter: single(FilterRules {
                header_text: "Relazione di gestione al 30 dicembre 2024".into(),
                header_font: "Helvetica".into(),
                subfund_font: "Helvetica".into(),
                subfund_band: Band::up_to(76.0),
                body_font: "Helvetica".into(),
                clip: clip(at(83.0), None),
                deselect: vec![],
                hook: PageHook::None,
            }),
            extract: ExtractRules {
                nominal_quantity_pos: 1,
                market_value_pos: 2,
                perc_net_assets_pos: 3,
                currency: CurrencySource::Fixed(Currency::EUR),
                acquisition_cost_pos: None,
                strategy: MatchStrategy::FuzzyAndPrefix {
                    fuzzy: 0.65,
                    prefix: 0.3,
                },
            },
            deserialize: DeserializeRules::default(),
            url_patterns: url_patterns(&[r"mediolanum"]),
        },
        // Anima: short pages (with a futures section) clip to the text
        // anchors, long pages to fixed coordinates.
        FormatSpec {
            filter: PageFilter::ByMarker {
                text: "Futures contracts".into(),
                font: "Helvetica-Bold".into(),
                when_present: Box::new(anima_rules(clip(
                    Some(anchor("Holdings", "Helvetica-Bold")),
                    Some(anchor("Futures contracts", "Helvetica-Bold")),
                ))),
                otherwise: Box::new(anima_rules(clip(at(103.0), at(821.0)))),
            },
            extract: ExtractRules {
                nominal_quantity_pos: -1,
                market_value_pos: 1,
                perc_net_assets_pos: 2,
                currency: CurrencySource::Fixed(Currency::EUR),
                acquisition_cost_pos: None,
                strategy: MatchStrategy::Exact,
            },
            deserialize: DeserializeRules::default(),
            url_patterns: url_patterns(&[r"animasgr"]),
        },
        // Arca
        FormatSpec {
            filter: single(FilterRules {
                header_text: "Titoli".into(),
                header_font: "TrebuchetMS-Bold".into(),
                subfund_font: "Calibri".into(),
                subfund_band: Band::up_to(42.0),
                body_font: "TrebuchetMS".into(),
                clip: clip(at(83.0), None),
                deselect: vec![],
                hook: PageHook::None,
            }),
            extract: ExtractRules {
                nominal_quantity_pos: 3,
                market_value_pos: 2,
                perc_net_assets_pos: 4,
                currency: CurrencySource::Offset(1),
                acquisition_cost_pos: None,
                strategy: MatchStrategy::FuzzyAndPrefix {
                    fuzzy: 0.8,
                    prefix: 0.3,
                },
            },
            deserialize: DeserializeRules::default(),
            url_patterns: url_patterns(&[r"arcafondi"]),
        },
        // Asteria
        FormatSpec {
            filter: single(FilterRules {
                header_text: "Transferable securities admitted to an official stock".into(),
                header_font: "CenturyGothic-Bold".into(),
                subfund_font: "CenturyGothic-Bold".into(),
                subfund_band: Band::up_to(87.0),
                body_font: "CenturyGothic".into(),
                clip: clip(None, at(810.0)),
                deselect: vec![],
                hook: PageHook::None,
            }),
            extract: ExtractRules {
                nominal_quantity_pos: 1,
                market_value_pos: 4,
                perc_net_assets_pos: 5,
                currency: CurrencySource::Offset(2),
                acquisition_cost_pos: Some(3),
                strategy: MatchStrategy::Exact,
            },
            deserialize: DeserializeRules::default(),
            url_patterns: url_patterns(&[r"asteria"]),
        },
        // Asteria2023
        FormatSpec {
            filter: single(FilterRules {
                header_text: "Number of Shares/".into(),
                header_font: "CenturyGothic-Bold".into(),
                subfund_font: "CenturyGothic-Bold".into(),
                subfund_band: Band::between(80.0, 95.0),
                body_font: "CenturyGothic".into(),
                clip: None,
                deselect: vec![],
                hook: PageHook::None,
            }),
            extract: ExtractRules {
                nominal_quantity_pos: 1,
                market_value_pos: 4,
                perc_net_assets_pos: 5,
                currency: CurrencySource::Offset(2),
                acquisition_cost_pos: Some(3),
                strategy: MatchStrategy::Exact,
            },
            deserialize: DeserializeRules::default(),
            url_patterns: url_patterns(&[]),
        },
        // Fideuram: the section sub-headers share the body font and must be
        // deselected explicitly.
        FormatSpec {
            filter: single(FilterRules {
                header_text: "Country".into(),
                header_font: "Arial".into(),
                subfund_font: "Arial-Bold".into(),
                subfund_band: Band::up_to(82.0),
                body_font: "Arial".into(),
                clip: clip(at(103.0), at(749.0)),
                deselect: vec![
                    ("SHARES, WARRANTS, RIGHTS".into(), "Arial".into()),
                    (
                        "TRANSFERABLE SECURITIES AND MONEY MARKET INSTRUMENTS ADMITTED TO AN OFFICIAL"
                            .into(),
                        "Arial".into(),
                    ),
                    (
                        "EXCHANGE LISTING OR DEALT IN ON OTHER REGULATED MARKETS".into(),
                        "Arial".into(),
                    ),
                    ("BONDS AND ASSIMILATED STRUCTURED PRODUCTS".into(), "Arial".into()),
                    ("INVESTMENT FUNDS".into(), "Arial".into()),
                ],
                hook: PageHook::None,
            }),
            extract: ExtractRules {
                nominal_quantity_pos: -1,
                market_value_pos: 1,
                perc_net_assets_pos: 2,
                currency: CurrencySource::Offset(-2),
                acquisition_cost_pos: None,
                strategy: MatchStrategy::Exact,
            },
            deserialize: DeserializeRules::default(),
            url_patterns: url_patterns(&[r"fideuram"]),
        },
    ]
});

fn anima_rules(clip: Option<VerticalClip>) -> FilterRules {
    FilterRules {
        header_text: "Holdings".into(),
        header_font: "Helvetica-Bold".into(),
        subfund_font: "Helvetica-Condensed-Blac".into(),
        subfund_band: Band::between(62.0, 82.0),
        body_font: "Helvetica-Light".into(),
        clip,
        deselect: vec![],
        hook: PageHook::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_all_kinds() {
        assert_eq!(REGISTRY.len(), FormatKind::ALL.len());
        for kind in FormatKind::ALL {
            // Forces the lazy registry entry and its regexes.
            let _ = kind.spec();
        }
    }

    #[test]
    fn test_all_formats_have_valid_offsets() {
        validate_formats().unwrap();
    }

    #[test]
    fn test_from_name_roundtrip() {
        for kind in FormatKind::ALL {
            assert_eq!(FormatKind::from_name(kind.name()).unwrap(), *kind);
        }
        assert_eq!(
            FormatKind::from_name(" EURIZON ").unwrap(),
            FormatKind::Eurizon
        );
        assert!(FormatKind::from_name("nosuch").is_err());
    }

    #[test]
    fn test_url_detection() {
        assert_eq!(
            FormatKind::detect_from_url("https://www.eurizoncapital.lu/reports/2024.pdf"),
            Some(FormatKind::Eurizon)
        );
        assert_eq!(
            FormatKind::detect_from_url("https://www.eurizoncapital.it/doc.pdf"),
            Some(FormatKind::EurizonIt)
        );
        assert_eq!(
            FormatKind::detect_from_url("https://www.amundi.it/doc.pdf"),
            Some(FormatKind::Amundi2)
        );
        assert_eq!(FormatKind::detect_from_url("https://example.com/x.pdf"), None);
    }
}
