use std::path::{Path, PathBuf};

use fundscan_core::error::FundscanError;
use fundscan_core::{extract_document, FormatKind, HoldingRecord};

use crate::output;

pub fn run(
    page_files: Vec<PathBuf>,
    format: Option<String>,
    url: Option<String>,
    targets_file: PathBuf,
    output_format: &str,
    out: Option<PathBuf>,
) -> Result<(), FundscanError> {
    let format = resolve_format(format.as_deref(), url.as_deref())?;
    log::debug!("using {} format", format.name());

    let targets = load_targets(&targets_file)?;
    log::debug!(
        "first targets: {:?}",
        &targets[..targets.len().min(5)]
    );

    let mut pages = Vec::with_capacity(page_files.len());
    for path in &page_files {
        pages.push(std::fs::read_to_string(path)?);
    }

    let data = extract_document(format, &pages, &targets)?;
    let records: Vec<HoldingRecord> = data.iter().map(|d| d.record()).collect();
    eprintln!("Extracted {} holding(s)", records.len());

    let rendered = match output_format {
        "json" => output::json::render(&records)?,
        _ => output::csv::render(&records),
    };

    match out {
        Some(path) => std::fs::write(&path, rendered)?,
        None => print!("{rendered}"),
    }

    Ok(())
}

/// Resolve the format from an explicit name, a report URL, or both. An
/// explicit name wins over a diverging detection, with a warning.
fn resolve_format(name: Option<&str>, url: Option<&str>) -> Result<FormatKind, FundscanError> {
    let selected = name.map(FormatKind::from_name).transpose()?;
    let detected = url.and_then(FormatKind::detect_from_url);

    match (selected, detected) {
        (Some(sel), Some(det)) => {
            if sel != det {
                log::warn!(
                    "selected format '{}' does not match the format detected from the URL ('{}')",
                    sel.name(),
                    det.name()
                );
            }
            Ok(sel)
        }
        (Some(sel), None) => Ok(sel),
        (None, Some(det)) => Ok(det),
        (None, None) => Err(FundscanError::UnknownFormat(
            url.unwrap_or("<none>").to_string(),
            "pass --format or a recognizable --url".to_string(),
        )),
    }
}

/// Load target company names from a CSV file: first column, header skipped.
fn load_targets(path: &Path) -> Result<Vec<String>, FundscanError> {
    let content = std::fs::read_to_string(path)?;
    let targets: Vec<String> = content
        .lines()
        .skip(1)
        .filter_map(|row| row.split(',').next())
        .map(|name| name.trim().trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
        .collect();
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_format_prefers_explicit_name() {
        let f = resolve_format(Some("eurizon"), Some("https://www.amundi.lu/x.pdf")).unwrap();
        assert_eq!(f, FormatKind::Eurizon);
    }

    #[test]
    fn test_resolve_format_from_url_only() {
        let f = resolve_format(None, Some("https://www.amundi.lu/x.pdf")).unwrap();
        assert_eq!(f, FormatKind::Amundi);
    }

    #[test]
    fn test_resolve_format_requires_something() {
        assert!(resolve_format(None, Some("https://example.com/x.pdf")).is_err());
        assert!(resolve_format(None, None).is_err());
    }
}
