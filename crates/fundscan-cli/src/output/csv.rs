use fundscan_core::HoldingRecord;

const HEADER: &str = "page,company,instrument,subfund,nominal_quantity,market_value,\
currency,perc_net_assets,acquisition_cost,maturity,interest_rate";

/// Render records as CSV, header row included.
pub fn render(records: &[HoldingRecord]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for r in records {
        let fields = [
            r.page.to_string(),
            quote(&r.company),
            r.instrument.to_string(),
            quote(&r.subfund),
            r.nominal_quantity.to_string(),
            r.market_value.to_string(),
            r.currency.to_string(),
            r.perc_net_assets.to_string(),
            r.acquisition_cost.map(|v| v.to_string()).unwrap_or_default(),
            r.maturity.map(|d| d.to_string()).unwrap_or_default(),
            r.interest_rate.map(|v| v.to_string()).unwrap_or_default(),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

/// Quote a text field when it needs it; embedded quotes are doubled.
fn quote(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fundscan_core::model::{Currency, Instrument};

    #[test]
    fn test_render_quotes_company_names() {
        let record = HoldingRecord {
            page: 1,
            company: "Target Corp, Inc.".into(),
            instrument: Instrument::Equity,
            subfund: "Fund".into(),
            nominal_quantity: 100,
            market_value: 5200.0,
            currency: Currency::USD,
            perc_net_assets: 0.025,
            acquisition_cost: None,
            maturity: None,
            interest_rate: None,
        };
        let csv = render(&[record]);
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("page,company"));
        let row = lines.next().unwrap();
        assert!(row.contains("\"Target Corp, Inc.\""));
        assert!(row.ends_with(",,,"));
    }
}
