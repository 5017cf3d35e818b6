use crate::contract::OptionType;
use crate::errors::{EngineError, EngineResult};
use crate::feeds::yahoo::{DEFAULT_CHART_URL, DEFAULT_OPTIONS_URL};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub ticker: String,
    pub option_type: OptionType,
    pub expiration: Option<i64>,
    pub strike: Option<f64>,
    pub quantity: u32,
    pub avg_cost: Option<f64>,
    pub risk_free_rate: f64,
    pub chart_range_percent: f64,
    pub days_in_future: f64,
    pub exit_price: Option<f64>,
    pub chain_file: Option<PathBuf>,
    pub chart_url: String,
    pub options_url: String,
}

impl AppConfig {
    pub fn from_env() -> EngineResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> EngineResult<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let ticker = get("TICKER")
            .map(|t| t.trim().to_ascii_uppercase())
            .ok_or_else(|| EngineError::Config("missing env var: TICKER".into()))?;

        let option_type = parse_or("OPTION_TYPE", get("OPTION_TYPE"), OptionType::Call)?;
        let expiration = parse_opt::<i64>("EXPIRATION", get("EXPIRATION"))?;
        let strike = parse_opt::<f64>("STRIKE", get("STRIKE"))?;
        let quantity = parse_or("QUANTITY", get("QUANTITY"), 1u32)?;
        let avg_cost = parse_opt::<f64>("AVG_COST", get("AVG_COST"))?;
        let risk_free_rate = parse_or("RISK_FREE_RATE", get("RISK_FREE_RATE"), 0.014)?;
        let chart_range_percent = parse_or("CHART_RANGE_PERCENT", get("CHART_RANGE_PERCENT"), 9.0)?;
        let days_in_future = parse_or("DAYS_IN_FUTURE", get("DAYS_IN_FUTURE"), 0.0)?;
        let exit_price = parse_opt::<f64>("EXIT_PRICE", get("EXIT_PRICE"))?;

        if quantity == 0 {
            return Err(EngineError::Config("QUANTITY: must be at least 1".into()));
        }
        if days_in_future < 0.0 {
            return Err(EngineError::Config("DAYS_IN_FUTURE: must be >= 0".into()));
        }

        Ok(Self {
            ticker,
            option_type,
            expiration,
            strike,
            quantity,
            avg_cost,
            risk_free_rate,
            chart_range_percent,
            days_in_future,
            exit_price,
            chain_file: get("CHAIN_FILE").map(PathBuf::from),
            chart_url: get("YAHOO_CHART_URL").unwrap_or_else(|| DEFAULT_CHART_URL.to_string()),
            options_url: get("YAHOO_OPTIONS_URL").unwrap_or_else(|| DEFAULT_OPTIONS_URL.to_string()),
        })
    }
}

fn parse_opt<T>(key: &str, raw: Option<String>) -> EngineResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|v| {
        v.trim()
            .parse::<T>()
            .map_err(|e| EngineError::Config(format!("{key}: {e}")))
    })
    .transpose()
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> EngineResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Ok(parse_opt(key, raw)?.unwrap_or(default))
}
