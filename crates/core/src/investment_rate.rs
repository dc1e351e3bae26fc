use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A dividend or investment rate published for a quarter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentRate {
    /// Unique identifier (assigned by the store on creation).
    #[serde(default)]
    pub id: String,
    pub year: i32,
    /// Quarter of the year, 1 through 4.
    pub quarter: u8,
    /// Annual rate as a percentage (e.g. `4.25`).
    pub rate_percent: f64,
    /// Day the rate takes effect.
    pub effective_date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
}

impl InvestmentRate {
    pub const TABLE: &'static str = "investment_rates";
}
