use fundscan_core::error::FundscanError;
use fundscan_core::FormatKind;

pub fn list() -> Result<(), FundscanError> {
    for kind in FormatKind::ALL {
        let spec = kind.spec();
        let patterns: Vec<&str> = spec.url_patterns.iter().map(|re| re.as_str()).collect();
        if patterns.is_empty() {
            println!("{}", kind.name());
        } else {
            println!("{}  (url: {})", kind.name(), patterns.join(", "));
        }
    }
    Ok(())
}

pub fn detect(url: &str) -> Result<(), FundscanError> {
    match FormatKind::detect_from_url(url) {
        Some(kind) => {
            println!("{}", kind.name());
            Ok(())
        }
        None => Err(FundscanError::UnknownFormat(
            url.to_string(),
            "no URL pattern matched".to_string(),
        )),
    }
}
