use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::FundscanError;

macro_rules! currencies {
    ($($code:ident),+ $(,)?) => {
        /// Supported 3-letter ISO currency codes.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum Currency {
            $($code,)+
        }

        impl Currency {
            pub fn code(&self) -> &'static str {
                match self {
                    $(Currency::$code => stringify!($code),)+
                }
            }

            /// Look up an uppercase ISO code.
            pub fn from_code(code: &str) -> Result<Currency, FundscanError> {
                match code {
                    $(stringify!($code) => Ok(Currency::$code),)+
                    _ => Err(FundscanError::UnknownCurrency(code.to_string())),
                }
            }
        }
    };
}

currencies!(
    USD, EUR, GBP, JPY, CNY, AUD, CAD, CHF, SEK, NOK, DKK, SGD, HKD, KRW, INR, BRL, MXN, RUB,
    ZAR, TRY, PLN, THB, IDR, MYR, PHP, ILS, AED, SAR, QAR, KWD, CLP, COP, PEN, ARS, VND, UAH,
    CZK, HUF, RON, HRK, BGN, ISK, NZD,
);

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Kind of financial instrument a matched row describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    Equity,
    Bond,
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instrument::Equity => write!(f, "equity"),
            Instrument::Bond => write!(f, "bond"),
        }
    }
}

/// Fields common to every extracted holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub page: u32,
    pub company: String,
    pub subfund: String,
    pub nominal_quantity: i64,
    pub market_value: f64,
    pub currency: Currency,
    pub perc_net_assets: f64,
    pub acquisition_cost: Option<f64>,
}

impl Holding {
    /// Build a holding, enforcing the record invariants: the percentage of
    /// net assets is a fraction in [0, 1], pages are 1-based, and the company
    /// must be one of the requested targets.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        page: u32,
        targets: &[String],
        company: String,
        subfund: String,
        nominal_quantity: i64,
        market_value: f64,
        currency: Currency,
        perc_net_assets: f64,
        acquisition_cost: Option<f64>,
    ) -> Result<Holding, FundscanError> {
        if !(0.0..=1.0).contains(&perc_net_assets) {
            return Err(FundscanError::InvalidRecord(format!(
                "perc_net_assets must be between 0 and 1, not {perc_net_assets}"
            )));
        }
        if page == 0 {
            return Err(FundscanError::InvalidRecord(
                "page should be a positive number, not 0".into(),
            ));
        }
        if !targets.iter().any(|t| t == &company) {
            return Err(FundscanError::InvalidRecord(format!(
                "company should be one of the targets, not '{company}'"
            )));
        }
        Ok(Holding {
            page,
            company,
            subfund,
            nominal_quantity,
            market_value,
            currency,
            perc_net_assets,
            acquisition_cost,
        })
    }
}

/// A fully deserialized row of the holdings table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FinancialData {
    Equity(Holding),
    Bond {
        holding: Holding,
        maturity: Option<NaiveDate>,
        interest_rate: Option<f64>,
    },
}

impl FinancialData {
    pub fn equity(holding: Holding) -> FinancialData {
        FinancialData::Equity(holding)
    }

    pub fn bond(
        holding: Holding,
        maturity: Option<NaiveDate>,
        interest_rate: Option<f64>,
    ) -> FinancialData {
        if let Some(rate) = interest_rate {
            if !(0.0..=1.0).contains(&rate) {
                log::warn!(
                    "interest rate {rate} of bond '{}' is not between 0 and 1, maybe it should be normalized?",
                    holding.company
                );
            }
        }
        FinancialData::Bond {
            holding,
            maturity,
            interest_rate,
        }
    }

    pub fn instrument(&self) -> Instrument {
        match self {
            FinancialData::Equity(_) => Instrument::Equity,
            FinancialData::Bond { .. } => Instrument::Bond,
        }
    }

    pub fn holding(&self) -> &Holding {
        match self {
            FinancialData::Equity(h) => h,
            FinancialData::Bond { holding, .. } => holding,
        }
    }

    /// Flatten into the tabular row handed to the output writer. Maturity and
    /// interest rate stay empty for equities.
    pub fn record(&self) -> HoldingRecord {
        let h = self.holding().clone();
        let (maturity, interest_rate) = match self {
            FinancialData::Equity(_) => (None, None),
            FinancialData::Bond {
                maturity,
                interest_rate,
                ..
            } => (*maturity, *interest_rate),
        };
        HoldingRecord {
            page: h.page,
            company: h.company,
            instrument: self.instrument(),
            subfund: h.subfund,
            nominal_quantity: h.nominal_quantity,
            market_value: h.market_value,
            currency: h.currency,
            perc_net_assets: h.perc_net_assets,
            acquisition_cost: h.acquisition_cost,
            maturity,
            interest_rate,
        }
    }
}

/// One flat output row, ready for CSV or JSON serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingRecord {
    pub page: u32,
    pub company: String,
    pub instrument: Instrument,
    pub subfund: String,
    pub nominal_quantity: i64,
    pub market_value: f64,
    pub currency: Currency,
    pub perc_net_assets: f64,
    pub acquisition_cost: Option<f64>,
    pub maturity: Option<NaiveDate>,
    pub interest_rate: Option<f64>,
}
