use fundscan_core::error::FundscanError;
use fundscan_core::HoldingRecord;

pub fn render(records: &[HoldingRecord]) -> Result<String, FundscanError> {
    let mut json = serde_json::to_string_pretty(records)?;
    json.push('\n');
    Ok(json)
}
